use reqwest::Client;
use rust_decimal::Decimal;
use std::{str::FromStr, time::Duration};
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Shared outbound client; every call carries the same bounded timeout.
pub fn http_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
}

/// Split a chain asset string like `"12.345 HIVE"` into amount and currency.
pub fn parse_asset(s: &str) -> Option<(Decimal, String)> {
    let mut parts = s.split_whitespace();
    let amount = parts.next()?;
    let currency = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    let amount = Decimal::from_str(amount).ok()?;
    Some((amount, currency.to_uppercase()))
}
