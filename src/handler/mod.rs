//! Request handler module
//!
//! Responsible for request dispatch and serving files out of the serving root.

pub mod listing;
pub mod path;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
