use rust_decimal::Decimal;

use crate::models::{MarketOrder, OrderBooks, Token};

fn fee_fraction(percentage_fee: Decimal) -> Decimal {
    percentage_fee / Decimal::ONE_HUNDRED
}

/// Most we will pay for the wrapped token: `r * (1 - f/100)`.
pub fn sell_break_even(reference_price: Decimal, percentage_fee: Decimal) -> Decimal {
    reference_price * (Decimal::ONE - fee_fraction(percentage_fee))
}

/// Least we will accept for the wrapped token: `r * (1 / (1 - f/100))`.
/// Undefined once the fee reaches 100%.
pub fn buy_break_even(reference_price: Decimal, percentage_fee: Decimal) -> Option<Decimal> {
    let keep = Decimal::ONE - fee_fraction(percentage_fee);
    if keep <= Decimal::ZERO {
        return None;
    }
    Decimal::ONE
        .checked_div(keep)
        .and_then(|m| reference_price.checked_mul(m))
}

/// Profit on an underpriced sell order, in percent.
pub fn sell_profit_percent(reference_price: Decimal, order_price: Decimal) -> Decimal {
    ((reference_price - order_price) / reference_price * Decimal::ONE_HUNDRED).abs()
}

/// Profit on an overpriced buy order as a plain ratio (not multiplied by 100,
/// unlike the sell side).
pub fn buy_profit_ratio(reference_price: Decimal, order_price: Decimal) -> Decimal {
    ((reference_price - order_price) / reference_price).abs()
}

fn classifiable(token: &Token) -> bool {
    !token.swap_symbol.is_empty() && token.reference_price > Decimal::ZERO
}

/// Sell orders for this token priced at or below the sell break-even.
pub fn underpriced_sell_orders(token: &Token, orders: &[MarketOrder]) -> Vec<MarketOrder> {
    if !classifiable(token) {
        return Vec::new();
    }
    let limit = sell_break_even(token.reference_price, token.network_percentage_fee);

    orders
        .iter()
        .filter(|o| o.symbol == token.swap_symbol && o.price <= limit)
        .map(|o| MarketOrder {
            profit_percentage: Some(sell_profit_percent(token.reference_price, o.price)),
            ..o.clone()
        })
        .collect()
}

/// Buy orders for this token priced at or above the buy break-even.
pub fn overpriced_buy_orders(token: &Token, orders: &[MarketOrder]) -> Vec<MarketOrder> {
    if !classifiable(token) {
        return Vec::new();
    }
    let Some(limit) = buy_break_even(token.reference_price, token.network_percentage_fee) else {
        return Vec::new();
    };

    orders
        .iter()
        .filter(|o| o.symbol == token.swap_symbol && o.price >= limit)
        .map(|o| MarketOrder {
            profit_percentage: Some(buy_profit_ratio(token.reference_price, o.price)),
            ..o.clone()
        })
        .collect()
}

/// Attach profitable orders to every token.
pub fn classify(tokens: &mut [Token], books: &OrderBooks) {
    for token in tokens.iter_mut() {
        token.sell_orders = underpriced_sell_orders(token, &books.sell);
        token.buy_orders = overpriced_buy_orders(token, &books.buy);
    }
}
