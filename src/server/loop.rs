// Server loop module
// Binds the listener and runs the accept loop until shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use super::connection::handle_connection;
use super::listener::create_listener;
use crate::config::{AppState, Config};
use crate::error::ServerError;
use crate::logger;

/// Pause after a failed accept so errors like EMFILE don't spin the loop
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// A bound static file server.
///
/// Exists in one of two states: `Running` while [`Server::run`] is being
/// polled, `Stopped` once the token fires and `run` returns, at which point
/// the listening socket has been closed.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    state: Arc<AppState>,
}

impl Server {
    /// Resolve the serving root and bind the listening socket.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn bind(config: &Config) -> Result<Self, ServerError> {
        let state = AppState::new(config)?;
        let addr = config.get_socket_addr()?;
        let listener = create_listener(addr)?;
        let local_addr = listener.local_addr()?;

        Ok(Self {
            listener,
            local_addr,
            state: Arc::new(state),
        })
    }

    /// Address actually bound, useful when the configured port is 0
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Accept connections until `shutdown` is cancelled.
    ///
    /// Stops accepting immediately on cancellation and drops the listener.
    /// Open connections get the same token and wind down on their own.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), ServerError> {
        let Self {
            listener, state, ..
        } = self;

        loop {
            tokio::select! {
                biased;

                () = shutdown.cancelled() => break,

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, peer_addr)) => {
                            handle_connection(stream, peer_addr, Arc::clone(&state), shutdown.clone());
                        }
                        Err(e) => {
                            logger::log_error(&format!("Failed to accept connection: {e}"));
                            if backoff_after_accept_error(&shutdown).await {
                                break;
                            }
                        }
                    }
                }
            }
        }

        drop(listener);
        Ok(())
    }
}

/// Wait out [`ACCEPT_ERROR_BACKOFF`]. Returns `true` if `shutdown` fired first.
async fn backoff_after_accept_error(shutdown: &CancellationToken) -> bool {
    tokio::select! {
        () = shutdown.cancelled() => true,
        () = tokio::time::sleep(ACCEPT_ERROR_BACKOFF) => false,
    }
}

/// Bind according to `config` and serve until `shutdown` is cancelled
pub async fn start(config: &Config, shutdown: CancellationToken) -> Result<(), ServerError> {
    let server = Server::bind(config)?;
    logger::log_server_start(&server.local_addr());
    server.run(shutdown).await
}
