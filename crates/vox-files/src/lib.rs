//! Static file server for the serving directory
//!
//! Serves generated audio flat and unauthenticated: regular files with a
//! best-guess content type, directories as an HTML listing, 404 otherwise.
//! Read-only by construction: there are no write routes.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

use std::path::{Component, Path, PathBuf};

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::get,
};

/// Create the file-serving router rooted at `dir`
pub fn router(dir: PathBuf) -> Router {
    Router::new()
        .route("/", get(serve_path))
        .route("/{*path}", get(serve_path))
        .with_state(dir)
}

async fn serve_path(State(root): State<PathBuf>, uri: Uri) -> Response {
    let Some(relative) = sanitize(uri.path()) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let path = root.join(&relative);

    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_dir() => match render_listing(&path, uri.path()).await {
            Ok(html) => axum::response::Html(html).into_response(),
            Err(e) => {
                tracing::error!("failed to list {}: {e}", path.display());
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        },
        Ok(_) => match tokio::fs::read(&path).await {
            Ok(bytes) => Response::builder()
                .header(header::CONTENT_TYPE, content_type(&path))
                .body(Body::from(bytes))
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
            Err(e) => {
                tracing::error!("failed to read {}: {e}", path.display());
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        },
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Decode the request path into a relative path below the root
///
/// Rejects traversal and absolute components before the filesystem is
/// touched.
fn sanitize(request_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode(request_path.trim_start_matches('/'))?;

    let mut relative = PathBuf::new();
    for component in Path::new(&decoded).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }

    Some(relative)
}

/// Minimal percent-decoding; filenames here are model ids plus timestamps,
/// so only simple escapes (e.g. `%20`) realistically occur
fn percent_decode(input: &str) -> Option<String> {
    let mut bytes = Vec::with_capacity(input.len());
    let mut rest = input.bytes();

    while let Some(byte) = rest.next() {
        if byte == b'%' {
            let high = rest.next()?;
            let low = rest.next()?;
            let hex = [high, low];
            let hex = std::str::from_utf8(&hex).ok()?;
            bytes.push(u8::from_str_radix(hex, 16).ok()?);
        } else {
            bytes.push(byte);
        }
    }

    String::from_utf8(bytes).ok()
}

async fn render_listing(dir: &Path, request_path: &str) -> std::io::Result<String> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let mut name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type().await?.is_dir() {
            name.push('/');
        }
        names.push(name);
    }

    names.sort();

    let base = if request_path.ends_with('/') {
        request_path.to_string()
    } else {
        format!("{request_path}/")
    };

    let mut html = String::new();
    html.push_str("<!DOCTYPE html><html><head><title>Directory listing for ");
    html.push_str(&escape(&base));
    html.push_str("</title></head><body><h1>Directory listing for ");
    html.push_str(&escape(&base));
    html.push_str("</h1><hr><ul>");

    for name in &names {
        html.push_str("<li><a href=\"");
        html.push_str(&escape(&format!("{base}{name}")));
        html.push_str("\">");
        html.push_str(&escape(name));
        html.push_str("</a></li>");
    }

    html.push_str("</ul><hr></body></html>");

    Ok(html)
}

fn escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Best-guess content type from the file extension
fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("flac") => "audio/flac",
        Some("ogg") => "audio/ogg",
        Some("json") => "application/json",
        Some("html") => "text/html; charset=utf-8",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn request(router: Router, path: &str) -> (StatusCode, String, Option<String>) {
        let response = router
            .oneshot(
                axum::http::Request::builder()
                    .uri(path)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.into_body().collect().await.unwrap().to_bytes();

        (status, String::from_utf8_lossy(&body).into_owned(), content_type)
    }

    #[tokio::test]
    async fn serves_a_file_with_guessed_type() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("clip_20240309140507.mp3"), b"audio").unwrap();

        let (status, body, content_type) =
            request(router(dir.path().to_path_buf()), "/clip_20240309140507.mp3").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "audio");
        assert_eq!(content_type.as_deref(), Some("audio/mpeg"));
    }

    #[tokio::test]
    async fn missing_file_is_404() {
        let dir = tempfile::tempdir().unwrap();

        let (status, _, _) = request(router(dir.path().to_path_buf()), "/nope.mp3").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn root_renders_a_listing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.mp3"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let (status, body, content_type) = request(router(dir.path().to_path_buf()), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(content_type.as_deref().unwrap_or("").starts_with("text/html"));
        assert!(body.contains("a.mp3"));
        assert!(body.contains("sub/"));
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let dir = tempfile::tempdir().unwrap();

        let (status, _, _) = request(router(dir.path().to_path_buf()), "/%2e%2e/secret").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn sanitize_rejects_parent_components() {
        assert!(sanitize("/../etc/passwd").is_none());
        assert_eq!(sanitize("/a/b.mp3").unwrap(), PathBuf::from("a/b.mp3"));
        assert_eq!(sanitize("/").unwrap(), PathBuf::new());
    }
}
