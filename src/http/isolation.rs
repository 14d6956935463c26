//! Cross-origin isolation headers
//!
//! Browsers only expose `SharedArrayBuffer` and high-resolution timers to
//! cross-origin isolated documents. `IsolationService` wraps any hyper
//! service and stamps the three policy headers onto every response it
//! returns, whatever the status code.

use hyper::header::{HeaderName, HeaderValue};
use hyper::service::Service;
use hyper::{Request, Response};
use std::future::Future;
use std::pin::Pin;

/// Header name/value pairs added to every response
pub const ISOLATION_HEADERS: [(&str, &str); 3] = [
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-embedder-policy", "require-corp"),
    ("cross-origin-resource-policy", "cross-origin"),
];

/// Set the isolation headers on `response`.
///
/// Existing values are replaced so each header appears exactly once.
pub fn apply_isolation_headers<B>(mut response: Response<B>) -> Response<B> {
    let headers = response.headers_mut();
    for (name, value) in ISOLATION_HEADERS {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    response
}

/// Service decorator that applies [`apply_isolation_headers`] to the
/// inner service's responses
#[derive(Debug, Clone, Copy)]
pub struct IsolationService<S> {
    inner: S,
}

impl<S> IsolationService<S> {
    pub const fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for IsolationService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    S::Error: 'static,
    ResBody: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: Request<ReqBody>) -> Self::Future {
        let fut = self.inner.call(req);
        Box::pin(async move { fut.await.map(apply_isolation_headers) })
    }
}
