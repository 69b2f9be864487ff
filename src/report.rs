use tracing::debug;

use crate::models::{Book, MarketOrder, Token};
use crate::symbols::{REFERENCE_SYMBOL, WRAPPED_PREFIX};

/// One-line description of a kept order.
pub fn order_line(order: &MarketOrder, side: Book) -> String {
    let profit = order
        .profit_percentage
        .map(|p| format!("{:.2}", p.round_dp(2)))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{} {} {} at {} {}{} (@{}) ({}%)",
        side.label(),
        order.quantity,
        order.symbol,
        order.price,
        WRAPPED_PREFIX,
        REFERENCE_SYMBOL,
        order.account,
        profit,
    )
}

/// Dump a published result set at debug level.
pub fn log_snapshot(tokens: &[Token]) {
    for token in tokens {
        debug!(
            symbol = %token.symbol,
            usd = %token.usd_price,
            fee_pct = %token.network_percentage_fee,
            flat_fee = ?token.network_flat_fee,
            hive = %token.reference_price,
            swap_symbol = %token.swap_symbol,
            "token"
        );
        for order in &token.sell_orders {
            debug!("{}", order_line(order, Book::Sell));
        }
        for order in &token.buy_orders {
            debug!("{}", order_line(order, Book::Buy));
        }
    }
}
