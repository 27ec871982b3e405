// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use kopi_server::{build_router, AppState, ServerConfig};
use kopi_store::Store;
use tera::Tera;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();

    let store = match Store::open(&config.database_path) {
        Ok(store) => store,
        Err(err) => {
            error!(error = %err, path = %config.database_path.display(), "failed to open database");
            std::process::exit(1);
        }
    };

    let templates = match Tera::new(&config.templates_glob) {
        Ok(templates) => templates,
        Err(err) => {
            error!(error = %err, glob = %config.templates_glob, "failed to load templates");
            std::process::exit(1);
        }
    };

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(store, templates, config);
    let app = build_router(state);

    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(error = %err, addr = %bind_addr, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(addr = %bind_addr, "kopi-server listening");
    if let Err(err) = axum::serve(listener, app).await {
        error!(error = %err, "server exited with error");
        std::process::exit(1);
    }
}
