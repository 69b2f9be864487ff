use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::PipelineError;
use crate::fees::run_fee_loop;
use crate::pipeline::{refresh, Sources};
use crate::state::SharedState;

/// Price loop: one refresh per tick. A slow cycle delays the next tick.
pub async fn run_price_loop(state: SharedState, sources: Sources, config: Arc<Config>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    loop {
        ticker.tick().await;
        match refresh(&state, &sources, &config).await {
            Ok(()) => info!("snapshot published"),
            Err(PipelineError::NotReady) => warn!("fee data not ready yet, snapshot withheld"),
            Err(e) => error!("refresh cycle failed: {}", e),
        }
    }
}

/// Spawn the price and fee loops (non-blocking).
pub fn start_all_workers(state: SharedState, sources: Sources, config: Arc<Config>) {
    {
        let s = state.clone();
        let src = sources.clone();
        let cfg = config.clone();
        let every = config.refresh_interval;
        tokio::spawn(async move {
            run_price_loop(s, src, cfg, every).await;
        });
    }

    {
        let s = state.clone();
        let gateway = sources.gateway.clone();
        let networks = config.networks.clone();
        let every = config.fee_refresh_interval;
        tokio::spawn(async move {
            run_fee_loop(s, gateway, networks, every).await;
        });
    }

    info!("workers: spawned price and fee loops");
}
