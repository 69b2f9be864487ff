use reqwest::Client;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::exchanges::coingecko::CoinGecko;
use crate::exchanges::engine::{fetch_order_books, EngineNode};
use crate::exchanges::gateway::HiveEngineGateway;
use crate::exchanges::hive::HiveNode;
use crate::exchanges::{NetworkGateway, OrderBookSource, QuoteSource, ReferenceRateSource};
use crate::fees::{assign_network_fees, ensure_fee_table};
use crate::logic::classify;
use crate::models::Token;
use crate::state::AppState;
use crate::symbols::{
    apply_pegged_rate, apply_reference_prices, apply_symbols, PEGGED_SYMBOL, REFERENCE_SYMBOL,
};

/// Remote collaborators of one refresh cycle.
#[derive(Clone)]
pub struct Sources {
    pub quotes: Arc<dyn QuoteSource>,
    pub reference_rate: Arc<dyn ReferenceRateSource>,
    pub order_books: Arc<dyn OrderBookSource>,
    pub gateway: Arc<dyn NetworkGateway>,
}

impl Sources {
    pub fn live(client: Client, config: &Config) -> Self {
        Self {
            quotes: Arc::new(CoinGecko::new(client.clone(), config.coingecko_url.clone())),
            reference_rate: Arc::new(HiveNode::new(client.clone(), config.hive_node.clone())),
            order_books: Arc::new(EngineNode::new(client.clone(), &config.engine_node)),
            gateway: Arc::new(HiveEngineGateway::new(client)),
        }
    }
}

/// Quotes, symbols and reference prices, with the chain rate for the pegged asset.
async fn priced_tokens(sources: &Sources, config: &Config) -> Result<Vec<Token>> {
    let mut tokens = sources.quotes.fetch_quotes(&config.coin_ids).await?;
    apply_symbols(&mut tokens);
    apply_reference_prices(&mut tokens, REFERENCE_SYMBOL)?;

    match sources.reference_rate.fetch_reference_rate().await {
        Ok(Some(rate)) => {
            info!("internal market {}/{} rate {}", REFERENCE_SYMBOL, PEGGED_SYMBOL, rate);
            apply_pegged_rate(&mut tokens, PEGGED_SYMBOL, rate);
        }
        Ok(None) => info!("no internal market trades in window, keeping api rate"),
        Err(e) => warn!("internal market rate unavailable, keeping api rate: {}", e),
    }

    Ok(tokens)
}

/// Run every stage in order and return the result set. Nothing is published here.
pub async fn run_cycle(state: &AppState, sources: &Sources, config: &Config) -> Result<Vec<Token>> {
    let mut tokens = priced_tokens(sources, config).await?;
    info!("loaded price and symbol data for {} tokens", tokens.len());

    state.set_latest_quotes(tokens.clone()).await;
    ensure_fee_table(state, sources.gateway.as_ref(), &config.networks).await?;
    state.signal_inputs_seen();

    let table = state.fee_table().await;
    assign_network_fees(&mut tokens, &table);
    if !state.is_ready() {
        return Err(PipelineError::NotReady);
    }
    info!("added network fee data");

    let books = fetch_order_books(sources.order_books.as_ref()).await?;
    classify(&mut tokens, &books);
    info!(
        "classified {} sell and {} buy orders",
        tokens.iter().map(|t| t.sell_orders.len()).sum::<usize>(),
        tokens.iter().map(|t| t.buy_orders.len()).sum::<usize>(),
    );

    Ok(tokens)
}

/// One cycle; swaps the snapshot only when every stage succeeded.
pub async fn refresh(state: &AppState, sources: &Sources, config: &Config) -> Result<()> {
    let tokens = run_cycle(state, sources, config).await?;
    crate::report::log_snapshot(&tokens);
    state.publish(tokens).await;
    Ok(())
}
