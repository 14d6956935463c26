//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, static file
//! dispatch, error mapping and access logging.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, IF_MODIFIED_SINCE, IF_NONE_MATCH, SERVER};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response, StatusCode, Version};
use std::net::SocketAddr;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    /// Path component of the request target, still percent-encoded
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_modified_since: Option<&'a str>,
    pub has_if_none_match: bool,
}

impl<'a> RequestContext<'a> {
    pub fn from_parts(parts: &'a Parts) -> Self {
        let headers = &parts.headers;
        Self {
            path: parts.uri.path(),
            query: parts.uri.query(),
            is_head: parts.method == Method::HEAD,
            if_modified_since: headers
                .get(IF_MODIFIED_SINCE)
                .and_then(|v| v.to_str().ok()),
            has_if_none_match: headers.contains_key(IF_NONE_MATCH),
        }
    }
}

/// Main entry point for HTTP request handling
///
/// Never fails: every error is turned into a status response here.
pub async fn handle_request<B>(
    req: Request<B>,
    state: &AppState,
    peer_addr: SocketAddr,
) -> Response<Full<Bytes>> {
    // GET and HEAD carry no meaningful body
    let (parts, _body) = req.into_parts();
    let method = &parts.method;
    let is_head = *method == Method::HEAD;

    let mut response = match method {
        &Method::GET | &Method::HEAD => {
            let ctx = RequestContext::from_parts(&parts);
            match static_files::serve(state, &ctx).await {
                Ok(response) => response,
                Err(e) => http::build_error_response(e.status(), &e.to_string(), is_head),
            }
        }
        _ => {
            logger::log_warning(&format!("Unsupported method: {method}"));
            http::build_error_response(
                StatusCode::NOT_IMPLEMENTED,
                &format!("Unsupported method ('{method}')"),
                is_head,
            )
        }
    };

    if let Ok(server) = HeaderValue::from_str(&state.server_name) {
        response.headers_mut().insert(SERVER, server);
    }

    if state.access_log {
        logger::log_access(&access_entry(&parts, peer_addr, &response));
    }

    response
}

fn access_entry(
    parts: &Parts,
    peer_addr: SocketAddr,
    response: &Response<Full<Bytes>>,
) -> AccessLogEntry {
    let target = parts
        .uri
        .path_and_query()
        .map_or_else(|| parts.uri.path().to_string(), ToString::to_string);
    let mut entry = AccessLogEntry::new(peer_addr.ip().to_string(), parts.method.to_string(), target);
    entry.http_version = version_label(parts.version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .filter(|&len| len > 0);
    entry
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn test_state(root: &std::path::Path) -> AppState {
        AppState {
            root: root.to_path_buf(),
            server_name: "coi-serve/test".to_string(),
            access_log: false,
        }
    }

    fn request(method: Method, uri: &str) -> Request<()> {
        Request::builder().method(method).uri(uri).body(()).unwrap()
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    async fn body_bytes(response: Response<Full<Bytes>>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_serves_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>Hi</h1>").unwrap();
        let state = test_state(dir.path());

        let response = handle_request(request(Method::GET, "/index.html"), &state, peer()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/html; charset=utf-8");
        assert_eq!(response.headers()[SERVER], "coi-serve/test");
        assert!(response.headers().contains_key("last-modified"));
        assert_eq!(body_bytes(response).await, "<h1>Hi</h1>");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let response = handle_request(request(Method::GET, "/nope.js"), &state, peer()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_file_with_trailing_slash() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.js"), "1").unwrap();
        let state = test_state(dir.path());

        let response = handle_request(request(Method::GET, "/app.js/"), &state, peer()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_directory_redirect_keeps_query() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        let state = test_state(dir.path());

        let response = handle_request(request(Method::GET, "/docs?v=1"), &state, peer()).await;
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()["location"], "/docs/?v=1");
    }

    #[tokio::test]
    async fn test_directory_redirect_collapses_leading_slashes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        let state = test_state(dir.path());

        let response =
            handle_request(request(Method::GET, "//evil.example/..//docs"), &state, peer()).await;
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        let location = response.headers()["location"].to_str().unwrap();
        assert!(location.starts_with('/'));
        assert!(!location.starts_with("//"));
        assert_eq!(location, "/evil.example/..//docs/");
    }

    #[tokio::test]
    async fn test_directory_index_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("app")).unwrap();
        std::fs::write(dir.path().join("app/index.htm"), "app").unwrap();
        let state = test_state(dir.path());

        let response = handle_request(request(Method::GET, "/app/"), &state, peer()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, "app");
    }

    #[tokio::test]
    async fn test_directory_listing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("one.txt"), "1").unwrap();
        std::fs::write(dir.path().join("two.wasm"), "2").unwrap();
        let state = test_state(dir.path());

        let response = handle_request(request(Method::GET, "/"), &state, peer()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();
        assert!(body.contains("Directory listing for /"));
        assert!(body.contains("<a href=\"one.txt\">one.txt</a>"));
        assert!(body.contains("<a href=\"two.wasm\">two.wasm</a>"));
    }

    #[tokio::test]
    async fn test_head_has_no_body() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("data.bin"), vec![7u8; 64]).unwrap();
        let state = test_state(dir.path());

        let response = handle_request(request(Method::HEAD, "/data.bin"), &state, peer()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-length"], "64");
        assert_eq!(response.headers()["content-type"], "application/octet-stream");
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_method() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let response = handle_request(request(Method::POST, "/"), &state, peer()).await;
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
        let body = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();
        assert!(body.contains("Unsupported method (&#x27;POST&#x27;)"));
    }

    #[tokio::test]
    async fn test_if_modified_since() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("style.css"), "body{}").unwrap();
        let state = test_state(dir.path());

        let future = Request::builder()
            .uri("/style.css")
            .header(IF_MODIFIED_SINCE, "Fri, 01 Jan 2100 00:00:00 GMT")
            .body(())
            .unwrap();
        let response = handle_request(future, &state, peer()).await;
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);

        let past = Request::builder()
            .uri("/style.css")
            .header(IF_MODIFIED_SINCE, "Thu, 01 Jan 1970 00:00:00 GMT")
            .body(())
            .unwrap();
        let response = handle_request(past, &state, peer()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_if_none_match_disables_if_modified_since() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("style.css"), "body{}").unwrap();
        let state = test_state(dir.path());

        let req = Request::builder()
            .uri("/style.css")
            .header(IF_MODIFIED_SINCE, "Fri, 01 Jan 2100 00:00:00 GMT")
            .header(IF_NONE_MATCH, "\"abc\"")
            .body(())
            .unwrap();
        let response = handle_request(req, &state, peer()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_traversal_is_contained() {
        let outer = tempfile::tempdir().unwrap();
        std::fs::write(outer.path().join("secret.txt"), "secret").unwrap();
        std::fs::create_dir(outer.path().join("www")).unwrap();
        let state = test_state(&outer.path().join("www"));

        let response =
            handle_request(request(Method::GET, "/../secret.txt"), &state, peer()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response =
            handle_request(request(Method::GET, "/%2e%2e/secret.txt"), &state, peer()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_version_label() {
        assert_eq!(version_label(Version::HTTP_10), "1.0");
        assert_eq!(version_label(Version::HTTP_11), "1.1");
    }
}
