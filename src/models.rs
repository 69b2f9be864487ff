use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One tracked asset for one refresh cycle.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Token {
    #[serde(rename = "usd")]
    pub usd_price: Decimal,
    pub usd_24h_change: Decimal,
    #[serde(rename = "btc")]
    pub btc_price: Decimal,
    pub btc_24h_change: Decimal,
    #[serde(rename = "last_updated_at")]
    pub last_updated: i64,

    // filled in by the pipeline
    /// Price in reference units (HIVE per one unit of this token).
    #[serde(rename = "hive")]
    pub reference_price: Decimal,

    pub network_percentage_fee: Decimal,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub network_flat_fee: Option<Decimal>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub network: String,

    /// CoinGecko id
    pub name: String,
    pub symbol: String,
    pub swap_symbol: String,

    #[serde(default)]
    pub sell_orders: Vec<MarketOrder>,
    #[serde(default)]
    pub buy_orders: Vec<MarketOrder>,
}

/// A resting order on the Hive Engine market.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MarketOrder {
    pub account: String,
    pub expiration: i64,
    pub price: Decimal,
    pub quantity: Decimal,
    pub symbol: String,
    pub timestamp: i64,
    #[serde(rename = "txId")]
    pub transaction_id: String,
    #[serde(rename = "_id")]
    pub id: i64,
    /// Set by the classifier, never by the market.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub profit_percentage: Option<Decimal>,
}

/// One (token, withdrawal network) pairing from a gateway listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NetworkFeeEntry {
    pub name: String,
    #[serde(rename = "heSymbol")]
    pub wrapped_symbol: String,
    #[serde(rename = "hePrecision")]
    pub precision: u32,
    #[serde(rename = "contractAddress", default)]
    pub contract_address: String,
    #[serde(rename = "depositEnabled", default)]
    pub deposit_enabled: bool,
    #[serde(rename = "withdrawalEnabled", default)]
    pub withdrawal_enabled: bool,

    #[serde(default)]
    pub network: String,
    /// Withdrawal fee in reference units. `None` until the fee task has priced it.
    #[serde(default)]
    pub fixed_fee: Option<Decimal>,
}

/// Which side of the market a book holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Book {
    Sell,
    Buy,
}

impl Book {
    pub fn table(self) -> &'static str {
        match self {
            Book::Sell => "sellBook",
            Book::Buy => "buyBook",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Book::Sell => "Sell",
            Book::Buy => "Buy",
        }
    }
}

/// Full sell and buy books for every wrapped symbol.
#[derive(Debug, Clone, Default)]
pub struct OrderBooks {
    pub sell: Vec<MarketOrder>,
    pub buy: Vec<MarketOrder>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn market_order_reads_engine_field_names() {
        let raw = r#"{
            "_id": 4711,
            "txId": "abc123",
            "timestamp": 1690000000,
            "account": "alice",
            "symbol": "SWAP.BTC",
            "quantity": "0.00120000",
            "price": "95000.00000000",
            "priceDec": {"$numberDecimal": "95000"},
            "expiration": 1692592000
        }"#;
        let order: MarketOrder = serde_json::from_str(raw).unwrap();
        assert_eq!(order.id, 4711);
        assert_eq!(order.transaction_id, "abc123");
        assert_eq!(order.price, dec!(95000));
        assert_eq!(order.quantity, dec!(0.0012));
        assert!(order.profit_percentage.is_none());
    }

    #[test]
    fn token_serializes_with_public_field_names() {
        let token = Token {
            usd_price: dec!(0.40),
            reference_price: dec!(1),
            network_percentage_fee: dec!(0.75),
            name: "hive".into(),
            symbol: "HIVE".into(),
            swap_symbol: "SWAP.HIVE".into(),
            ..Default::default()
        };
        let v = serde_json::to_value(&token).unwrap();
        assert_eq!(v["usd"], "0.40");
        assert_eq!(v["hive"], "1");
        assert_eq!(v["swap_symbol"], "SWAP.HIVE");
        assert!(v.get("network_flat_fee").is_none());
        assert!(v["sell_orders"].as_array().unwrap().is_empty());
    }

    #[test]
    fn gateway_entry_starts_without_fee() {
        let raw = r#"{"name":"Wrapped Bitcoin","heSymbol":"SWAP.WBTC","hePrecision":8,
            "contractAddress":"0x2260","depositEnabled":true,"withdrawalEnabled":true}"#;
        let entry: NetworkFeeEntry = serde_json::from_str(raw).unwrap();
        assert_eq!(entry.wrapped_symbol, "SWAP.WBTC");
        assert_eq!(entry.precision, 8);
        assert!(entry.fixed_fee.is_none());
        assert!(entry.network.is_empty());
    }
}
