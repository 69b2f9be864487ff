use anyhow::{bail, Context, Result};
use std::{path::PathBuf, str::FromStr, time::Duration};

/// CoinGecko ids tracked by default.
pub const DEFAULT_COIN_IDS: &[&str] = &[
    "hive",
    "bitcoin",
    "litecoin",
    "hive_dollar",
    "steem",
    "dogecoin",
    "ethereum",
    "tether",
    "binancecoin",
    "binance-usd",
    "wax",
    "matic-network",
    "bitcoin-cash",
    "basic-attention-token",
    "eos",
];

/// A withdrawal network that charges a gas-denominated fixed fee.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkConfig {
    pub name: String,
    /// Token listing for this network's gateway.
    pub tokens_url: String,
    /// Withdrawal fee quote; the wrapped symbol is appended.
    pub fee_url: String,
    /// Symbol of the gas currency the fee is quoted in.
    pub fee_currency: String,
}

impl NetworkConfig {
    fn new(name: &str, tokens_url: &str, fee_url: &str, fee_currency: &str) -> Self {
        Self {
            name: name.to_string(),
            tokens_url: tokens_url.to_string(),
            fee_url: fee_url.to_string(),
            fee_currency: fee_currency.to_string(),
        }
    }
}

pub fn default_networks() -> Vec<NetworkConfig> {
    vec![
        NetworkConfig::new(
            "Binance Smart Chain",
            "https://bscgw.hive-engine.com/api/utils/tokens/bep20",
            "https://bscgw.hive-engine.com/api/utils/withdrawalfee/",
            "BNB",
        ),
        NetworkConfig::new(
            "Ethereum",
            "https://ethgw.hive-engine.com/api/utils/tokens/erc20",
            "https://ethgw.hive-engine.com/api/utils/withdrawalfee/",
            "ETH",
        ),
        NetworkConfig::new(
            "Polygon (Matic)",
            "https://polygw.hive-engine.com/api/utils/tokens/erc20",
            "https://polygw.hive-engine.com/api/utils/withdrawalfee/",
            "MATIC",
        ),
    ]
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub static_dir: PathBuf,
    pub refresh_interval: Duration,
    pub fee_refresh_interval: Duration,
    pub http_timeout: Duration,
    pub coingecko_url: String,
    pub engine_node: String,
    pub hive_node: String,
    pub coin_ids: Vec<String>,
    pub networks: Vec<NetworkConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            static_dir: PathBuf::from("static"),
            refresh_interval: Duration::from_secs(10),
            fee_refresh_interval: Duration::from_secs(60),
            http_timeout: Duration::from_secs(5),
            coingecko_url: "https://api.coingecko.com/api/v3".to_string(),
            engine_node: "https://engine.rishipanthee.com".to_string(),
            hive_node: "https://api.deathwing.me/".to_string(),
            coin_ids: DEFAULT_COIN_IDS.iter().map(|s| s.to_string()).collect(),
            networks: default_networks(),
        }
    }
}

impl Config {
    /// Defaults overridden by whatever is set in the environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Config::default();

        if let Some(v) = lookup("PORT") {
            cfg.port = parse_var("PORT", &v)?;
        }
        if let Some(v) = lookup("STATIC_DIR") {
            cfg.static_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("REFRESH_SECS") {
            cfg.refresh_interval = Duration::from_secs(parse_var("REFRESH_SECS", &v)?);
        }
        if let Some(v) = lookup("FEE_REFRESH_SECS") {
            cfg.fee_refresh_interval = Duration::from_secs(parse_var("FEE_REFRESH_SECS", &v)?);
        }
        if let Some(v) = lookup("HTTP_TIMEOUT_SECS") {
            cfg.http_timeout = Duration::from_secs(parse_var("HTTP_TIMEOUT_SECS", &v)?);
        }
        if let Some(v) = lookup("COINGECKO_URL") {
            cfg.coingecko_url = v;
        }
        if let Some(v) = lookup("ENGINE_NODE") {
            cfg.engine_node = v;
        }
        if let Some(v) = lookup("HIVE_NODE") {
            cfg.hive_node = v;
        }
        if let Some(v) = lookup("COIN_IDS") {
            cfg.coin_ids = split_list(&v);
        }

        if cfg.refresh_interval.is_zero() || cfg.fee_refresh_interval.is_zero() {
            bail!("refresh intervals must be at least one second");
        }

        Ok(cfg)
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("{key} must be a number, got {raw:?}"))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
