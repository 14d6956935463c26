//! # coi-serve
//!
//! Static file server that serves a directory over plain HTTP/1.1 and adds
//! the cross-origin isolation headers (`Cross-Origin-Opener-Policy`,
//! `Cross-Origin-Embedder-Policy`, `Cross-Origin-Resource-Policy`) to every
//! response, so pages using `SharedArrayBuffer` can be developed locally.
//!
//! ```no_run
//! use coi_serve::{Config, Server};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), coi_serve::ServerError> {
//! let server = Server::bind(&Config::default())?;
//! server.run(CancellationToken::new()).await
//! # }
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use config::Config;
pub use error::{ServeError, ServerError};
pub use server::{start, Server};
