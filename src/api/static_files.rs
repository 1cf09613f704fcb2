//! Embedded single-page client serving

use axum::{
    body::Body,
    http::{header, StatusCode, Uri},
    response::Response,
};
use rust_embed::RustEmbed;

/// Embedded client files
#[derive(RustEmbed)]
#[folder = "web/dist/"]
#[include = "*"]
struct ClientAssets;

/// Serve the embedded client.
///
/// Exact asset matches are served directly; every other path falls back to
/// `index.html` so the client handles its own screens after a reload.
pub async fn serve_static(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');
    let path = if path.is_empty() { "index.html" } else { path };

    if let Some(content) = ClientAssets::get(path) {
        return build_response(path, &content.data);
    }

    if let Some(content) = ClientAssets::get("index.html") {
        return build_response("index.html", &content.data);
    }

    not_found()
}

/// Build a response with appropriate content type and caching headers
fn build_response(path: &str, data: &[u8]) -> Response {
    let content_type = get_content_type(path);

    let cache_control = if is_immutable_asset(path) {
        "public, max-age=31536000, immutable"
    } else if path.ends_with(".html") {
        "no-cache"
    } else {
        "public, max-age=3600"
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, cache_control)
        .body(Body::from(data.to_vec()))
        .unwrap()
}

fn not_found() -> Response {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
        .body(Body::from("<h1>404 Not Found</h1>"))
        .unwrap()
}

/// Map a file extension to its content type
fn get_content_type(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// Hashed build outputs under assets/ never change between releases
fn is_immutable_asset(path: &str) -> bool {
    path.starts_with("assets/") && (path.ends_with(".js") || path.ends_with(".css"))
}
