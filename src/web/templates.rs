use chrono::{Datelike, Utc};

const BASE_STYLES: &str = r#"
        :root { color-scheme: light; }
        body { font-family: "Helvetica Neue", Arial, sans-serif; margin: 0; background: #f8fafc; color: #0f172a; display: flex; flex-direction: column; align-items: center; min-height: 100vh; padding: 2.5rem 1.5rem; box-sizing: border-box; }
        main { width: 100%; max-width: 640px; }
        .panel { background: #ffffff; border-radius: 14px; border: 1px solid #e2e8f0; padding: 2rem; box-shadow: 0 18px 40px rgba(15, 23, 42, 0.08); }
        h2, h3 { margin-top: 0; }
        a { color: #2563eb; font-weight: 600; text-decoration: none; }
        a:hover { text-decoration: underline; }
        form { margin-top: 1.25rem; }
        input[type="file"] { display: block; margin-bottom: 1rem; }
        button { padding: 0.75rem 1.2rem; border: none; border-radius: 8px; background: #2563eb; color: #ffffff; font-weight: 600; cursor: pointer; }
        button:hover { background: #1d4ed8; }
        pre { white-space: pre-wrap; background: #f1f5f9; border-radius: 10px; padding: 1rem; overflow-wrap: anywhere; }
        .error { color: #b91c1c; }
        .app-footer { margin-top: 2.5rem; text-align: center; font-size: 0.85rem; color: #94a3b8; }
"#;

fn render_page(title: &str, body_html: &str) -> String {
    let footer = render_footer();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="robots" content="noindex,nofollow">
    <style>
{styles}
    </style>
</head>
<body>
    <main>
{body_html}
        {footer}
    </main>
</body>
</html>"#,
        title = title,
        styles = BASE_STYLES,
        body_html = body_html,
        footer = footer,
    )
}

pub fn render_login_page() -> String {
    render_page(
        "Dexora AI",
        r#"        <section class="panel">
            <h2>Dexora AI</h2>
            <p>Sign in to upload a document and preview its text content.</p>
            <a href="/login">Login with Google</a>
        </section>"#,
    )
}

pub fn render_home_page(email: &str) -> String {
    let body = format!(
        r#"        <section class="panel">
            <h3>Welcome {email}</h3>
            <form action="/upload" method="post" enctype="multipart/form-data">
                <input type="file" name="file" required />
                <button type="submit">Upload File</button>
            </form>
            <br>
            <a href="/logout">Logout</a>
        </section>"#,
        email = escape_html(email),
    );
    render_page("Dexora AI", &body)
}

pub fn render_upload_result(email: &str, content: &str) -> String {
    let body = format!(
        r#"        <section class="panel">
            <h3>File uploaded by {email}</h3>
            <pre>{content}</pre>
            <br>
            <a href="/">Back</a>
        </section>"#,
        email = escape_html(email),
        content = escape_html(content),
    );
    render_page("Dexora AI", &body)
}

pub fn render_error_page(message: &str) -> String {
    let body = format!(
        r#"        <section class="panel">
            <h3 class="error">Something went wrong</h3>
            <p>{message}</p>
            <br>
            <a href="/">Back</a>
        </section>"#,
        message = escape_html(message),
    );
    render_page("Dexora AI", &body)
}

pub fn render_footer() -> String {
    let current_year = Utc::now().year();
    format!(r#"<footer class="app-footer">© {year} Dexora AI</footer>"#, year = current_year)
}

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Truncate to at most `max` characters without splitting a UTF-8 codepoint.
pub fn truncate_chars(input: &str, max: usize) -> &str {
    match input.char_indices().nth(max) {
        Some((index, _)) => &input[..index],
        None => input,
    }
}
