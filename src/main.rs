use std::process::ExitCode;

use coi_serve::config::Config;
use coi_serve::error::ServerError;
use coi_serve::logger;
use coi_serve::server::{self, Server};
use tokio_util::sync::CancellationToken;

fn main() -> ExitCode {
    let cfg = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            logger::log_startup_failed(&ServerError::from(e));
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logger::init(&cfg.logging) {
        eprintln!("[WARN] Logging disabled: {e}");
    }

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = match runtime_builder.build() {
        Ok(runtime) => runtime,
        Err(e) => {
            logger::log_startup_failed(&ServerError::from(e));
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(async_main(cfg)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_startup_failed(&e);
            ExitCode::FAILURE
        }
    }
}

async fn async_main(cfg: Config) -> Result<(), ServerError> {
    let server = Server::bind(&cfg)?;
    logger::log_server_start(&server.local_addr());

    let shutdown = CancellationToken::new();
    server::start_signal_handler(shutdown.clone());

    server.run(shutdown).await?;
    logger::log_server_stopped();
    Ok(())
}
