//! Error types
//!
//! `ServerError` covers startup and is fatal. `ServeError` covers a single
//! request and is turned into an HTTP status at the handler boundary.

use hyper::StatusCode;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("invalid listen address '{0}'")]
    InvalidAddress(String),

    #[error("cannot serve '{}': {source}", path.display())]
    Root {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("File not found")]
    NotFound,

    #[error("No permission to list directory")]
    ListingDenied(#[source] io::Error),

    #[error("Error reading file")]
    Read(#[source] io::Error),
}

impl ServeError {
    /// HTTP status reported to the client
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound | Self::ListingDenied(_) => StatusCode::NOT_FOUND,
            Self::Read(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
