//! Outbound adapters. Each remote service sits behind a trait so the
//! pipeline can run against mocks.

pub mod coingecko;
pub mod engine;
pub mod gateway;
pub mod hive;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::NetworkConfig;
use crate::error::Result;
use crate::models::{MarketOrder, NetworkFeeEntry, Token};

/// Spot USD/BTC prices for a basket of CoinGecko ids.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Tokens in basket order; ids the API did not return are skipped.
    async fn fetch_quotes(&self, ids: &[String]) -> Result<Vec<Token>>;
}

/// Higher-fidelity reference rate for the pegged stable asset.
#[async_trait]
pub trait ReferenceRateSource: Send + Sync {
    /// `Ok(None)` when the lookback window holds no trades.
    async fn fetch_reference_rate(&self) -> Result<Option<Decimal>>;
}

/// Market `find` over a single order-book table.
#[async_trait]
pub trait OrderBookSource: Send + Sync {
    async fn find_orders(
        &self,
        table: &str,
        query: &Value,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<MarketOrder>>;
}

/// Gateway utils API of one withdrawal network.
#[async_trait]
pub trait NetworkGateway: Send + Sync {
    async fn list_tokens(&self, network: &NetworkConfig) -> Result<Vec<NetworkFeeEntry>>;

    /// Fee in the network's gas currency; `None` when the gateway says no.
    async fn withdrawal_fee(&self, network: &NetworkConfig, wrapped: &str)
        -> Result<Option<Decimal>>;
}

/// GET a JSON document, failing on non-2xx.
pub(crate) async fn get_json<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T> {
    let body = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    Ok(serde_json::from_slice(&body)?)
}

/// POST a JSON body and decode the JSON reply, failing on non-2xx.
pub(crate) async fn post_json<B, T>(client: &Client, url: &str, body: &B) -> Result<T>
where
    B: serde::Serialize + ?Sized,
    T: DeserializeOwned,
{
    let body = client
        .post(url)
        .header("Accept", "application/json")
        .json(body)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    Ok(serde_json::from_slice(&body)?)
}
