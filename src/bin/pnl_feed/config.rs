//! Environment configuration for the feed.
//!
//! Everything comes from the environment (via a `.env` file or the
//! shell); there are no CLI flags.

use alloy::primitives::Address;
use pnl_feed::dedup::DEFAULT_CAPACITY;
use url::Url;

/// Delta scale used when `PNL_DECIMALS` is not set.
pub const DEFAULT_DECIMALS: u8 = 6;

/// Environment configuration (endpoints, credentials, tuning knobs).
#[derive(Debug, serde::Deserialize)]
pub struct EnvConfig {
    /// WebSocket RPC endpoint of the chain node
    pub ws_url: String,

    /// Address of the contract emitting `MarginSettled`
    pub contract_address: String,

    /// Base URL of the aggregation service
    pub supabase_url: String,

    /// Service credential for the aggregation service
    pub supabase_service_key: String,

    /// Fixed-point scale of the forwarded delta (default: 6)
    pub pnl_decimals: Option<u8>,

    /// Delay before reconnecting after a disconnect (default: 2s)
    pub reconnect_delay_secs: Option<u64>,

    /// Ceiling on remembered event identities (default: 50000)
    pub dedup_capacity: Option<usize>,
}

impl EnvConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Parse the chain node endpoint.
    pub fn ws_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.ws_url)
    }

    /// Parse the settlement contract address.
    pub fn contract_address(&self) -> Result<Address, alloy::primitives::hex::FromHexError> {
        self.contract_address.parse()
    }

    /// Parse the aggregation service base URL.
    pub fn supabase_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.supabase_url)
    }

    /// Effective dedup ceiling. A configured zero is rejected here so
    /// it takes the diagnostic-and-exit path like every other invalid
    /// value instead of tripping the cache's internal assert.
    pub fn dedup_capacity(&self) -> Result<usize, ConfigError> {
        match self.dedup_capacity {
            Some(0) => Err(ConfigError::ZeroDedupCapacity),
            Some(capacity) => Ok(capacity),
            None => Ok(DEFAULT_CAPACITY),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("dedup capacity cannot be zero")]
    ZeroDedupCapacity,
}
