//! Withdrawal fee table and per-token fee selection.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::NetworkConfig;
use crate::error::Result;
use crate::exchanges::NetworkGateway;
use crate::models::{NetworkFeeEntry, Token};
use crate::state::AppState;

/// Fee for tokens with no fixed-fee withdrawal network.
pub const DEFAULT_PERCENTAGE_FEE: Decimal = dec!(0.75);
/// Fee for tokens that leave through a gas-charging network.
pub const NETWORK_PERCENTAGE_FEE: Decimal = dec!(1);

fn static_entry(name: &str, wrapped: &str, network: &str) -> NetworkFeeEntry {
    NetworkFeeEntry {
        name: name.to_string(),
        wrapped_symbol: wrapped.to_string(),
        precision: 8,
        deposit_enabled: true,
        withdrawal_enabled: true,
        network: network.to_string(),
        ..Default::default()
    }
}

/// Native coins the gateways do not list but still quote fees for.
pub fn static_entries() -> Vec<NetworkFeeEntry> {
    vec![
        static_entry("Ethereum", "SWAP.ETH", "Ethereum"),
        static_entry("BNB", "SWAP.BNB", "Binance Smart Chain"),
        static_entry("Polygon (MATIC)", "SWAP.MATIC", "Polygon (Matic)"),
    ]
}

/// Load the network -> token table the first time it is needed.
/// A failed listing leaves the table unloaded so the next cycle retries.
pub async fn ensure_fee_table(
    state: &AppState,
    gateway: &dyn NetworkGateway,
    networks: &[NetworkConfig],
) -> Result<()> {
    if state.fee_table_loaded().await {
        return Ok(());
    }

    let mut table = static_entries();
    for network in networks {
        table.extend(gateway.list_tokens(network).await?);
    }
    info!("fee table loaded with {} entries", table.len());
    state.set_fee_table(table).await;
    Ok(())
}

fn entry_matches(entry: &NetworkFeeEntry, token: &Token) -> bool {
    !token.swap_symbol.is_empty() && entry.wrapped_symbol.to_uppercase() == token.swap_symbol
}

/// Pick the cheapest withdrawal network for every token.
///
/// Tokens start at the default percentage. A matching entry switches the token
/// to the network percentage and takes over the flat fee only if it is strictly
/// cheaper than the current one, or the token has no priced fee yet. Entries
/// still waiting for a price never displace a priced one. A zero fee counts as
/// not priced yet.
pub fn assign_network_fees(tokens: &mut [Token], table: &[NetworkFeeEntry]) {
    for token in tokens.iter_mut() {
        token.network_percentage_fee = DEFAULT_PERCENTAGE_FEE;
        token.network_flat_fee = None;
        token.network.clear();

        for entry in table {
            if !entry_matches(entry, token) {
                continue;
            }
            let fee = entry.fixed_fee.filter(|f| !f.is_zero());
            let wins = match (fee, token.network_flat_fee) {
                (Some(fee), Some(current)) => fee < current,
                (Some(_), None) => true,
                (None, _) => token.network.is_empty(),
            };
            if wins {
                token.network_percentage_fee = NETWORK_PERCENTAGE_FEE;
                token.network_flat_fee = fee;
                token.network = entry.network.clone();
            }
        }
    }
}

/// Reference price of a gas currency in the latest quotes.
fn gas_price(quotes: &[Token], currency: &str) -> Option<Decimal> {
    quotes
        .iter()
        .find(|t| t.symbol.eq_ignore_ascii_case(currency))
        .map(|t| t.reference_price)
}

/// One pass over the fee table. Individual failures keep the old value.
/// Marks the state ready when the pass completes.
pub async fn refresh_fixed_fees(
    state: &AppState,
    gateway: &dyn NetworkGateway,
    networks: &[NetworkConfig],
) {
    let table = state.fee_table().await;
    let quotes = state.latest_quotes().await;
    let mut updated = 0usize;

    for (index, entry) in table.iter().enumerate() {
        if !quotes.iter().any(|t| entry_matches(entry, t)) {
            continue;
        }
        let Some(network) = networks.iter().find(|n| n.name == entry.network) else {
            warn!("no network config for {} ({})", entry.wrapped_symbol, entry.network);
            continue;
        };

        let fee = match gateway.withdrawal_fee(network, &entry.wrapped_symbol).await {
            Ok(Some(fee)) => fee,
            Ok(None) => {
                warn!("{} fee quote for {} not successful", network.name, entry.wrapped_symbol);
                continue;
            }
            Err(e) => {
                warn!("{} fee quote for {} failed: {}", network.name, entry.wrapped_symbol, e);
                continue;
            }
        };

        let Some(price) = gas_price(&quotes, &network.fee_currency) else {
            warn!("no {} price to convert {} fee", network.fee_currency, entry.wrapped_symbol);
            continue;
        };

        let converted = price * fee;
        if converted.is_zero() {
            warn!("{} fee for {} converted to zero, keeping previous", network.name, entry.wrapped_symbol);
            continue;
        }
        state.set_fixed_fee(index, converted).await;
        updated += 1;
    }

    if !state.is_ready() {
        info!("first fee pass complete, publishing enabled");
    }
    state.mark_ready();
    info!("fee pass updated {} of {} entries", updated, table.len());
}

/// Background fee loop: waits for the first priced cycle, then refreshes forever.
pub async fn run_fee_loop(
    state: std::sync::Arc<AppState>,
    gateway: std::sync::Arc<dyn NetworkGateway>,
    networks: Vec<NetworkConfig>,
    every: Duration,
) {
    state.wait_for_inputs().await;
    info!("fee loop started, refreshing every {:?}", every);

    let mut ticker = tokio::time::interval(every);
    loop {
        ticker.tick().await;
        refresh_fixed_fees(&state, gateway.as_ref(), &networks).await;
    }
}
