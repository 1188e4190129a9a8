//! Daemon entry point: loads configuration, installs logging, builds the
//! engine and its collaborators, and serves the control API until an
//! interrupt triggers graceful shutdown.

use std::process::ExitCode;

use clap::Parser;
use scour::config::AppConfig;
use scour::setup::build_runtime;
use scour_api::{router, AppState};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "scour-server")]
struct Args {
    #[arg(long, default_value = "config.yaml")]
    config: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    scour::logging::init();

    let args = Args::parse();
    let config = match AppConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match build_runtime(&config).await {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "failed to initialize runtime");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = runtime.engine.start().await {
        error!(error = %e, "failed to start engine");
        return ExitCode::FAILURE;
    }

    let state = AppState {
        engine: runtime.engine.clone(),
        store: runtime.store.clone(),
        cache: runtime.cache.clone(),
    };
    let app = router(state);

    let listener = match tokio::net::TcpListener::bind(&config.http.bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(error = %e, bind_addr = %config.http.bind_addr, "failed to bind control API");
            let _ = runtime.engine.shutdown().await;
            return ExitCode::FAILURE;
        }
    };

    info!(bind_addr = %config.http.bind_addr, "control API listening");

    let serve = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());
    if let Err(e) = serve.await {
        error!(error = %e, "control API server error");
    }

    if let Err(e) = runtime.engine.shutdown().await {
        error!(error = %e, "engine shutdown error");
    }

    info!("shutdown complete");
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
