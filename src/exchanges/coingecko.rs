use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::info;
use url::Url;

use super::{get_json, QuoteSource};
use crate::error::{PipelineError, Result};
use crate::models::Token;

/// One entry of `/simple/price`.
#[derive(Debug, Deserialize)]
struct SimplePrice {
    #[serde(default)]
    usd: Decimal,
    #[serde(default)]
    usd_24h_change: Option<Decimal>,
    #[serde(default)]
    btc: Decimal,
    #[serde(default)]
    btc_24h_change: Option<Decimal>,
    #[serde(default)]
    last_updated_at: i64,
}

impl SimplePrice {
    fn into_token(self, id: &str) -> Token {
        Token {
            usd_price: self.usd,
            usd_24h_change: self.usd_24h_change.unwrap_or_default(),
            btc_price: self.btc,
            btc_24h_change: self.btc_24h_change.unwrap_or_default(),
            last_updated: self.last_updated_at,
            name: id.to_string(),
            ..Default::default()
        }
    }
}

pub struct CoinGecko {
    client: Client,
    base_url: String,
}

impl CoinGecko {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn price_url(&self, ids: &[String]) -> Result<Url> {
        let endpoint = format!("{}/simple/price", self.base_url.trim_end_matches('/'));
        Url::parse_with_params(
            &endpoint,
            &[
                ("ids", ids.join(",").as_str()),
                ("vs_currencies", "usd,btc"),
                ("include_24hr_change", "true"),
                ("include_last_updated_at", "true"),
                ("precision", "full"),
            ],
        )
        .map_err(|e| PipelineError::Upstream(format!("bad coingecko url {endpoint}: {e}")))
    }
}

/// Keep basket order and drop ids the API left out.
fn tokens_in_basket_order(ids: &[String], mut prices: HashMap<String, SimplePrice>) -> Vec<Token> {
    ids.iter()
        .filter_map(|id| prices.remove(id).map(|p| p.into_token(id)))
        .collect()
}

#[async_trait]
impl QuoteSource for CoinGecko {
    async fn fetch_quotes(&self, ids: &[String]) -> Result<Vec<Token>> {
        let url = self.price_url(ids)?;
        let prices: HashMap<String, SimplePrice> = get_json(&self.client, url.as_str()).await?;
        let tokens = tokens_in_basket_order(ids, prices);
        info!("coingecko returned {} of {} ids", tokens.len(), ids.len());
        Ok(tokens)
    }
}
