//! Billing configuration
//!
//! Per-deployment knobs for the billing core: the dormitory's late-fee
//! schedule and the port call timeout. Values come from the environment
//! in production (`BILLING_*` variables) and from `Default` in tests.

use rust_decimal::Decimal;
use serde::Deserialize;

use core_kernel::{AdapterConfig, Money};

use crate::late_fee::LateFeePolicy;

/// Billing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BillingSettings {
    /// Late-fee surcharge per day past due
    pub late_fee_per_day: Decimal,
    /// Days past due before the surcharge starts counting
    pub late_fee_grace_days: u32,
    /// Timeout for persistence calls, in milliseconds
    pub port_timeout_ms: u64,
}

impl Default for BillingSettings {
    fn default() -> Self {
        Self {
            late_fee_per_day: Decimal::ZERO,
            late_fee_grace_days: 0,
            port_timeout_ms: 10_000,
        }
    }
}

impl BillingSettings {
    /// Loads configuration from `BILLING_*` environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("BILLING"))
            .build()?
            .try_deserialize()
    }

    /// Builds the dormitory's late-fee policy
    pub fn late_fee_policy(&self) -> LateFeePolicy {
        LateFeePolicy::new(Money::new(self.late_fee_per_day))
            .with_grace_days(self.late_fee_grace_days)
    }

    /// Builds the adapter configuration for port calls
    pub fn adapter_config(&self) -> AdapterConfig {
        AdapterConfig {
            timeout_ms: self.port_timeout_ms,
            ..AdapterConfig::default()
        }
    }
}
