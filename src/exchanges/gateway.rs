use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use super::{get_json, NetworkGateway};
use crate::config::NetworkConfig;
use crate::error::{PipelineError, Result};
use crate::models::NetworkFeeEntry;

const SUCCESS: &str = "success";

#[derive(Debug, Deserialize)]
struct TokenListing {
    status: String,
    #[serde(default)]
    data: Vec<NetworkFeeEntry>,
}

#[derive(Debug, Deserialize)]
struct FeeQuote {
    status: String,
    #[serde(default)]
    data: Option<Decimal>,
}

/// Hive Engine gateway utils API (`bscgw`, `ethgw`, `polygw`).
pub struct HiveEngineGateway {
    client: Client,
}

impl HiveEngineGateway {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn listing_entries(listing: TokenListing, network: &NetworkConfig) -> Result<Vec<NetworkFeeEntry>> {
    if listing.status != SUCCESS {
        return Err(PipelineError::Upstream(format!(
            "token listing for {} returned status {:?}",
            network.name, listing.status
        )));
    }
    Ok(listing
        .data
        .into_iter()
        .map(|entry| NetworkFeeEntry {
            network: network.name.clone(),
            fixed_fee: None,
            ..entry
        })
        .collect())
}

fn quote_fee(quote: FeeQuote) -> Option<Decimal> {
    if quote.status != SUCCESS {
        return None;
    }
    quote.data
}

#[async_trait]
impl NetworkGateway for HiveEngineGateway {
    async fn list_tokens(&self, network: &NetworkConfig) -> Result<Vec<NetworkFeeEntry>> {
        let listing: TokenListing = get_json(&self.client, &network.tokens_url).await?;
        let entries = listing_entries(listing, network)?;
        info!("{} gateway lists {} tokens", network.name, entries.len());
        Ok(entries)
    }

    async fn withdrawal_fee(
        &self,
        network: &NetworkConfig,
        wrapped: &str,
    ) -> Result<Option<Decimal>> {
        let url = format!("{}{}", network.fee_url, wrapped);
        let quote: FeeQuote = get_json(&self.client, &url).await?;
        Ok(quote_fee(quote))
    }
}
