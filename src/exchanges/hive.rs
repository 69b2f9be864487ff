use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{post_json, ReferenceRateSource};
use crate::error::{PipelineError, Result};
use crate::symbols::{PEGGED_SYMBOL, REFERENCE_SYMBOL};
use crate::utils::parse_asset;

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const LOOKBACK_HOURS: i64 = 4;
const TRADE_LIMIT: u32 = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct Trade {
    pub date: String,
    pub current_pays: String,
    pub open_pays: String,
}

#[derive(Debug, Deserialize)]
struct TradeHistory {
    #[serde(default)]
    result: Vec<Trade>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// Hive L1 node, used for the internal HIVE/HBD market.
pub struct HiveNode {
    client: Client,
    url: String,
}

impl HiveNode {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl ReferenceRateSource for HiveNode {
    async fn fetch_reference_rate(&self) -> Result<Option<Decimal>> {
        let end = Utc::now().naive_utc();
        let start = end - Duration::hours(LOOKBACK_HOURS);
        let req = json!({
            "id": 0,
            "jsonrpc": "2.0",
            "method": "condenser_api.get_trade_history",
            "params": [
                start.format(TIME_FORMAT).to_string(),
                end.format(TIME_FORMAT).to_string(),
                TRADE_LIMIT,
            ],
        });

        let history: TradeHistory = post_json(&self.client, &self.url, &req).await?;
        if let Some(err) = history.error {
            return Err(PipelineError::Rpc(err.to_string()));
        }
        debug!("internal market returned {} trades", history.result.len());
        rate_from_trades(&history.result)
    }
}

fn trade_time(trade: &Trade) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(&trade.date, TIME_FORMAT).ok()
}

/// HIVE paid per HBD in the most recent trade of the window.
pub fn rate_from_trades(trades: &[Trade]) -> Result<Option<Decimal>> {
    let Some(latest) = trades.iter().max_by_key(|t| trade_time(t)) else {
        return Ok(None);
    };

    let leg = |s: &str| {
        parse_asset(s).ok_or_else(|| PipelineError::Upstream(format!("unparseable amount {s:?}")))
    };
    let (current_amount, current_currency) = leg(&latest.current_pays)?;
    let (open_amount, open_currency) = leg(&latest.open_pays)?;

    let (reference, pegged) = match (current_currency.as_str(), open_currency.as_str()) {
        (REFERENCE_SYMBOL, PEGGED_SYMBOL) => (current_amount, open_amount),
        (PEGGED_SYMBOL, REFERENCE_SYMBOL) => (open_amount, current_amount),
        _ => {
            return Err(PipelineError::Upstream(format!(
                "unexpected trade pair {current_currency}/{open_currency}"
            )))
        }
    };

    reference
        .checked_div(pegged)
        .map(Some)
        .ok_or_else(|| PipelineError::Upstream("zero-sized trade leg".to_string()))
}
