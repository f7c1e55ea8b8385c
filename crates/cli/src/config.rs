//! Scenario configuration.
//!
//! Defaults, then an optional JSON file, then environment variables, then
//! command line flags.

use anyhow::{Context, Result};
use linear_pool_domain::Address;
use linear_pool_domain::enums::RevertType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Overrides the Euler protocol address.
pub const EULER_PROTOCOL_ENV: &str = "LINEAR_POOL_EULER_PROTOCOL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Upper target in whole main tokens.
    pub upper_target: u64,
    /// Main tokens the liquidity provider swaps into the pool.
    pub join_amount: u64,
    /// Swap fee as a fraction, e.g. 0.01 for 1%.
    pub swap_fee: Decimal,
    /// Mock eToken exchange rate multiplicator.
    pub exchange_rate_multiplicator: u64,
    /// Mock eToken behaviour when its rate is queried.
    pub revert_type: RevertType,
    /// Euler protocol; a rebalanced (versioned) factory is deployed when set.
    pub euler_protocol: Option<Address>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            upper_target: 40,
            join_amount: 60,
            swap_fee: Decimal::new(1, 2),
            exchange_rate_multiplicator: 1,
            revert_type: RevertType::DoNotRevert,
            euler_protocol: None,
        }
    }
}

impl ScenarioConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid scenario config")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        Self::from_json(&json)
    }

    /// Applies environment overrides read through `lookup`.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(value) = lookup(EULER_PROTOCOL_ENV) {
            self.euler_protocol = Some(parse_address(&value)?);
        }
        Ok(self)
    }
}

/// Parses a hex address, with or without the `0x` prefix.
pub fn parse_address(value: &str) -> Result<Address> {
    let hex = value.trim();
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    serde_json::from_str(&format!("\"0x{hex}\""))
        .with_context(|| format!("invalid address {value}"))
}
