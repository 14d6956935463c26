//! HTTP protocol layer module
//!
//! Response builders, content types, HTTP-date handling and the
//! cross-origin isolation decorator, independent of filesystem concerns.

pub mod date;
pub mod isolation;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use isolation::{apply_isolation_headers, IsolationService, ISOLATION_HEADERS};
pub use response::{
    build_304_response, build_error_response, build_file_response, build_html_response,
    build_redirect_response,
};
