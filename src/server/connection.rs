// Connection handling module
// Serves one accepted TCP connection with hyper's HTTP/1.1 driver

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

use crate::config::AppState;
use crate::handler;
use crate::http::IsolationService;
use crate::logger;

/// Handle a single connection in a spawned task.
///
/// The request handler is wrapped in [`IsolationService`] so every
/// response leaving this connection carries the isolation headers. When
/// `shutdown` fires, the connection finishes its in-flight request and
/// closes instead of waiting for the next one.
pub fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    shutdown: CancellationToken,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let service = IsolationService::new(service_fn(move |req: Request<Incoming>| {
            let state = Arc::clone(&state);
            async move {
                let response = handler::handle_request(req, &state, peer_addr).await;
                Ok::<_, Infallible>(response)
            }
        }));

        let mut builder = http1::Builder::new();
        builder.keep_alive(true).title_case_headers(true);

        let conn = builder.serve_connection(io, service);
        tokio::pin!(conn);

        tokio::select! {
            result = conn.as_mut() => {
                if let Err(err) = result {
                    logger::log_connection_error(&err);
                }
            }
            () = shutdown.cancelled() => {
                conn.as_mut().graceful_shutdown();
                if let Err(err) = conn.await {
                    logger::log_connection_error(&err);
                }
            }
        }
    });
}
