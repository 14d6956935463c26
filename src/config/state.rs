// Application state module
// Read-only state shared by every connection of one server

use std::path::PathBuf;

use super::types::Config;
use crate::error::ServerError;

/// Application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Canonical serving root, resolved once at startup
    pub root: PathBuf,
    pub server_name: String,
    pub access_log: bool,
}

impl AppState {
    /// Create `AppState`, resolving the configured root against the
    /// current working directory.
    pub fn new(config: &Config) -> Result<Self, ServerError> {
        let root = std::fs::canonicalize(&config.server.root).map_err(|source| {
            ServerError::Root {
                path: config.server.root.clone(),
                source,
            }
        })?;

        Ok(Self {
            root,
            server_name: config.http.server_name.clone(),
            access_log: config.logging.access_log,
        })
    }
}
