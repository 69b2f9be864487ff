use rust_decimal::Decimal;

use crate::error::{PipelineError, Result};
use crate::models::Token;

/// Prefix Hive Engine puts on gateway-wrapped tokens.
pub const WRAPPED_PREFIX: &str = "SWAP.";
/// Every break-even price is expressed in this asset.
pub const REFERENCE_SYMBOL: &str = "HIVE";
/// Stable asset whose rate can come from the chain's internal market.
pub const PEGGED_SYMBOL: &str = "HBD";

/// CoinGecko id -> ticker. Unknown ids map to nothing.
pub fn ticker_for(id: &str) -> Option<&'static str> {
    let ticker = match id.to_lowercase().as_str() {
        "basic-attention-token" => "BAT",
        "binancecoin" => "BNB",
        "binance-usd" => "BUSD",
        "bitcoin" => "BTC",
        "bitcoin-cash" => "BCH",
        "dogecoin" => "DOGE",
        "eos" => "EOS",
        "ethereum" => "ETH",
        "hive" => "HIVE",
        "hive_dollar" => "HBD",
        "litecoin" => "LTC",
        "matic-network" => "MATIC",
        "tether" => "USDT",
        "wax" => "WAX",
        _ => return None,
    };
    Some(ticker)
}

pub fn wrapped_symbol(ticker: &str) -> String {
    if ticker.is_empty() {
        return String::new();
    }
    format!("{WRAPPED_PREFIX}{ticker}")
}

/// Fill `symbol` and `swap_symbol` from each token's CoinGecko id.
pub fn apply_symbols(tokens: &mut [Token]) {
    for token in tokens.iter_mut() {
        let ticker = ticker_for(&token.name).unwrap_or_default();
        token.symbol = ticker.to_string();
        token.swap_symbol = wrapped_symbol(ticker);
    }
}

/// `reference_price = usd / usd(reference)`, with the reference itself pinned to 1.
pub fn apply_reference_prices(tokens: &mut [Token], reference: &str) -> Result<()> {
    let reference_usd = tokens
        .iter()
        .find(|t| t.symbol == reference)
        .map(|t| t.usd_price)
        .filter(|p| !p.is_zero())
        .ok_or_else(|| PipelineError::MissingReference(reference.to_string()))?;

    for token in tokens.iter_mut() {
        token.reference_price = if token.symbol == reference {
            Decimal::ONE
        } else {
            token.usd_price / reference_usd
        };
    }

    Ok(())
}

/// Replace the API-derived rate of `pegged` with one read from the chain.
pub fn apply_pegged_rate(tokens: &mut [Token], pegged: &str, rate: Decimal) {
    for token in tokens.iter_mut().filter(|t| t.symbol == pegged) {
        token.reference_price = rate;
    }
}

/// Regex selecting every wrapped symbol in a market `find` query.
pub fn wrapped_symbol_pattern() -> String {
    format!("^{}", WRAPPED_PREFIX.replace('.', "\\."))
}
