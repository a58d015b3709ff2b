use axum::{
    extract::Multipart,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::PrivateCookieJar;
use tracing::{error, warn};

use crate::extract;
use crate::web::{
    session::Session,
    templates::{render_error_page, render_upload_result, truncate_chars},
};

/// Extracted text is cut to this many characters before rendering.
const PREVIEW_CHAR_LIMIT: usize = 3000;

/// POST /upload — authenticated only. Anonymous callers are silently
/// redirected home before any multipart field is read, so the extractor
/// never sees unauthenticated input.
pub async fn upload(jar: PrivateCookieJar, multipart: Multipart) -> Response {
    let session = Session::new(jar);
    let Some(user) = session.user() else {
        return Redirect::to("/").into_response();
    };

    let (filename, bytes) = match read_file_part(multipart).await {
        Ok(Some(part)) => part,
        Ok(None) => {
            warn!("upload request carried no file part");
            return error_response(StatusCode::BAD_REQUEST, "No file was provided.");
        }
        Err(message) => {
            warn!(%message, "failed to read upload form");
            return error_response(StatusCode::BAD_REQUEST, "The upload could not be read.");
        }
    };

    let content = match extract::extract(&filename, &bytes) {
        Ok(content) => content,
        Err(err) => {
            error!(%err, %filename, "text extraction failed");
            return error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                "The file could not be read as text.",
            );
        }
    };

    let preview = truncate_chars(&content, PREVIEW_CHAR_LIMIT);
    Html(render_upload_result(&user.email, preview)).into_response()
}

/// Pull the first file-bearing field out of the multipart form. The upload
/// lives in memory for this request only and is dropped when it completes.
async fn read_file_part(
    mut multipart: Multipart,
) -> Result<Option<(String, Vec<u8>)>, &'static str> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| "malformed multipart body")?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        let bytes = field
            .bytes()
            .await
            .map_err(|_| "failed to read file stream")?;
        return Ok(Some((filename, bytes.to_vec())));
    }

    Ok(None)
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Html(render_error_page(message))).into_response()
}
