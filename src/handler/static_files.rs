//! Static file serving module
//!
//! Maps a request onto the serving root and produces the file, redirect,
//! listing or not-modified response.

use crate::config::AppState;
use crate::error::ServeError;
use crate::handler::listing;
use crate::handler::path::translate_path;
use crate::handler::router::RequestContext;
use crate::http::{self, date, mime};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Files tried, in order, when a directory is requested
pub const INDEX_FILES: [&str; 2] = ["index.html", "index.htm"];

/// Serve the request from the serving root
pub async fn serve(
    state: &AppState,
    ctx: &RequestContext<'_>,
) -> Result<Response<Full<Bytes>>, ServeError> {
    let fs_path = translate_path(&state.root, ctx.path);
    // Any stat failure, permission problems included, reads as "not there"
    let meta = fs::metadata(&fs_path).await.map_err(|_| ServeError::NotFound)?;

    if meta.is_dir() {
        return serve_directory(ctx, &fs_path).await;
    }

    if ctx.path.ends_with('/') {
        return Err(ServeError::NotFound);
    }

    serve_file(ctx, &fs_path, &meta).await
}

async fn serve_directory(
    ctx: &RequestContext<'_>,
    dir: &Path,
) -> Result<Response<Full<Bytes>>, ServeError> {
    if !ctx.path.ends_with('/') {
        // A leading `//` would make the Location a protocol-relative URL
        let path = format!("/{}", ctx.path.trim_start_matches('/'));
        let location = match ctx.query {
            Some(query) => format!("{path}/?{query}"),
            None => format!("{path}/"),
        };
        return Ok(http::build_redirect_response(&location));
    }

    if let Some((index_path, meta)) = find_index_file(dir).await {
        return serve_file(ctx, &index_path, &meta).await;
    }

    let page = listing::list_directory(dir, ctx.path).await?;
    Ok(http::build_html_response(page, ctx.is_head))
}

/// Locate the first index file that exists as a regular file
async fn find_index_file(dir: &Path) -> Option<(PathBuf, Metadata)> {
    for name in INDEX_FILES {
        let candidate = dir.join(name);
        if let Ok(meta) = fs::metadata(&candidate).await {
            if meta.is_file() {
                return Some((candidate, meta));
            }
        }
    }
    None
}

async fn serve_file(
    ctx: &RequestContext<'_>,
    file_path: &Path,
    meta: &Metadata,
) -> Result<Response<Full<Bytes>>, ServeError> {
    let modified = meta.modified().ok();

    // If-None-Match takes precedence; without ETags it never matches
    if !ctx.has_if_none_match {
        if let (Some(modified), Some(since)) = (modified, ctx.if_modified_since) {
            if date::not_modified_since(modified, since) {
                return Ok(http::build_304_response());
            }
        }
    }

    let content_type = mime::content_type_for(file_path);
    let last_modified = modified.map(date::format_http_date);

    if ctx.is_head {
        return Ok(http::build_file_response(
            Bytes::new(),
            content_type,
            meta.len(),
            last_modified.as_deref(),
        ));
    }

    let content = fs::read(file_path).await.map_err(|e| {
        crate::logger::log_error(&format!(
            "Failed to read file '{}': {e}",
            file_path.display()
        ));
        ServeError::Read(e)
    })?;
    let content_length = u64::try_from(content.len()).unwrap_or(u64::MAX);

    Ok(http::build_file_response(
        Bytes::from(content),
        content_type,
        content_length,
        last_modified.as_deref(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::StatusCode;

    fn context(path: &str) -> RequestContext<'_> {
        RequestContext {
            path,
            query: None,
            is_head: false,
            if_modified_since: None,
            has_if_none_match: false,
        }
    }

    #[tokio::test]
    async fn test_read_failure_after_stat() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("gone.js");
        std::fs::write(&file_path, "console.log(1)").unwrap();
        let meta = std::fs::metadata(&file_path).unwrap();
        std::fs::remove_file(&file_path).unwrap();

        let err = serve_file(&context("/gone.js"), &file_path, &meta)
            .await
            .unwrap_err();
        assert!(matches!(err, ServeError::Read(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = http::build_error_response(err.status(), &err.to_string(), false);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_read_failure_error_page() {
        use http_body_util::BodyExt;

        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("gone.wasm");
        std::fs::write(&file_path, [0u8, 97, 115, 109]).unwrap();
        let meta = std::fs::metadata(&file_path).unwrap();
        std::fs::remove_file(&file_path).unwrap();

        let err = serve_file(&context("/gone.wasm"), &file_path, &meta)
            .await
            .unwrap_err();
        let response = http::apply_isolation_headers(http::build_error_response(
            err.status(),
            &err.to_string(),
            false,
        ));
        for (name, value) in http::ISOLATION_HEADERS {
            assert_eq!(response.headers()[name], value);
        }

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("<p>Error code: 500</p>"));
        assert!(body.contains("Error reading file"));
    }
}
