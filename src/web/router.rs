use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::web::{AppState, auth, landing, upload};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(landing::home))
        .route("/login", get(auth::login))
        .route("/auth", get(auth::auth_callback))
        .route("/upload", post(upload::upload))
        .route("/logout", get(auth::logout))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, header},
        response::IntoResponse,
    };
    use axum_extra::extract::cookie::{Key, PrivateCookieJar};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::extract::test_support::pdf_with_pages;
    use crate::oidc::{OidcClient, UserClaims};
    use crate::web::session::{Session, session_key};

    use super::*;

    fn test_key() -> Key {
        session_key("router-test-secret")
    }

    fn app() -> Router {
        let oidc = OidcClient::new(None, None, "http://127.0.0.1:9/discovery").unwrap();
        build_router(AppState::from_parts(oidc, test_key()))
    }

    fn claims() -> UserClaims {
        UserClaims {
            sub: "subject-1".to_string(),
            email: "u@x.com".to_string(),
            name: None,
            picture: None,
        }
    }

    /// Encrypt a logged-in session into a `Cookie:` header value.
    fn session_cookie() -> String {
        let jar = Session::new(PrivateCookieJar::from_headers(
            &axum::http::HeaderMap::new(),
            test_key(),
        ))
        .set_user(&claims())
        .into_jar();
        let response = (jar, "").into_response();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("session cookie set")
            .to_str()
            .expect("valid header")
            .to_string();
        set_cookie.split(';').next().expect("cookie pair").to_string()
    }

    fn multipart_request(uri: &str, filename: &str, bytes: &[u8], cookie: Option<&str>) -> Request<Body> {
        let boundary = "dexora-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            );
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn anonymous_home_shows_login_prompt() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Login with Google"));
        assert!(!body.contains(r#"action="/upload""#));
    }

    #[tokio::test]
    async fn authenticated_home_greets_and_offers_upload() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(header::COOKIE, session_cookie())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Welcome u@x.com"));
        assert!(body.contains(r#"action="/upload""#));
    }

    #[tokio::test]
    async fn unauthenticated_upload_redirects_home() {
        let request = multipart_request("/upload", "doc.pdf", b"ignored", None);
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn authenticated_txt_upload_renders_content() {
        let cookie = session_cookie();
        let request = multipart_request("/upload", "notes.txt", b"hello from disk", Some(&cookie));
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("File uploaded by u@x.com"));
        assert!(body.contains("hello from disk"));
    }

    #[tokio::test]
    async fn authenticated_pdf_upload_renders_pages_in_order() {
        let cookie = session_cookie();
        let pdf = pdf_with_pages(&["Hello", "World"]);
        let request = multipart_request("/upload", "doc.pdf", &pdf, Some(&cookie));
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Hello\nWorld"));
    }

    #[tokio::test]
    async fn unsupported_upload_renders_marker_not_error() {
        let cookie = session_cookie();
        let request = multipart_request("/upload", "image.png", &[0, 1, 2], Some(&cookie));
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Unsupported file type"));
    }

    #[tokio::test]
    async fn upload_without_file_part_renders_error_page() {
        let cookie = session_cookie();
        let boundary = "dexora-test-boundary";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\njust text\r\n--{boundary}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .header(header::COOKIE, cookie)
            .body(Body::from(body))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_text(response).await;
        assert!(body.contains("No file was provided."));
    }

    #[tokio::test]
    async fn auth_callback_without_code_redirects_home() {
        let response = app()
            .oneshot(Request::builder().uri("/auth").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn logout_clears_session_and_home_shows_login_again() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/logout")
                    .header(header::COOKIE, session_cookie())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");

        let removal = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("removal cookie set")
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();

        let home = app()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(header::COOKIE, removal)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_text(home).await;
        assert!(body.contains("Login with Google"));
    }

    #[tokio::test]
    async fn healthz_reports_ok() {
        let response = app()
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
