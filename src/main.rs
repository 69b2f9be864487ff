use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
};

mod config;
mod error;
mod exchanges;
mod fees;
mod logic;
mod models;
mod paging;
mod pipeline;
mod report;
mod routes;
mod state;
mod symbols;
mod utils;
mod workers;

use crate::config::Config;
use crate::pipeline::Sources;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::init_tracing();

    let config = Arc::new(Config::from_env()?);
    let client = utils::http_client(config.http_timeout).context("build http client")?;
    let sources = Sources::live(client, &config);
    let state = Arc::new(AppState::new());

    workers::start_all_workers(state.clone(), sources, config.clone());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // UI from the static dir with index.html fallback
    let index = config.static_dir.join("index.html");
    let static_svc = ServeDir::new(&config.static_dir).not_found_service(ServeFile::new(index));

    let app = routes::api_router(state)
        .fallback_service(static_svc)
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await
        .context("server error")?;

    Ok(())
}
