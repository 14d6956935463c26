// Configuration module entry point
// Holds the server configuration and the per-server shared state

mod state;
mod types;

use std::net::SocketAddr;

use crate::error::ServerError;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, HttpConfig, LoggingConfig, ServerConfig, DEFAULT_HOST, DEFAULT_PORT,
    DEFAULT_SERVER_NAME,
};

impl Config {
    /// Build the configuration from built-in defaults.
    ///
    /// No file or environment source is layered on top: the server always
    /// listens on `0.0.0.0:8001` and serves the working directory.
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .set_default("server.host", types::DEFAULT_HOST)?
            .set_default("server.port", i64::from(types::DEFAULT_PORT))?
            .set_default("server.root", types::DEFAULT_ROOT)?
            .set_default("http.server_name", types::DEFAULT_SERVER_NAME)?
            .set_default("logging.level", types::DEFAULT_LOG_LEVEL)?
            .set_default("logging.access_log", true)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, ServerError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|_| ServerError::InvalidAddress(addr))
    }
}
