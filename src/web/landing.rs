use axum::response::Html;
use axum_extra::extract::cookie::PrivateCookieJar;

use crate::web::{
    session::Session,
    templates::{render_home_page, render_login_page},
};

/// GET / — login prompt for anonymous visitors, upload form once signed in.
pub async fn home(jar: PrivateCookieJar) -> Html<String> {
    let session = Session::new(jar);

    match session.user() {
        Some(user) => Html(render_home_page(&user.email)),
        None => Html(render_login_page()),
    }
}
