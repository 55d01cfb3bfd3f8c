//! # Game Configuration
//!
//! All balance data in one aggregate, loadable from a TOML file. The
//! `Default` impls carry the shipped values; a balance file overrides
//! only what it names.

use serde::Deserialize;
use thiserror::Error;

use blackice_intrusion::IntrusionConfig;
use blackice_market::{BlackMarketConfig, MarketConfig};
use blackice_procedural::GhostConfig;
use blackice_shared::constants;

/// Configuration loading failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The balance file was not valid TOML for this schema.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] toml::de::Error),
}

/// Tick cadences for the scheduler, ms.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Intrusion processing sweep (detection + counter-measures).
    pub trace_update_interval_ms: u64,
    /// Market expiry sweep.
    pub market_sweep_interval_ms: u64,
    /// NPC liquidity restock pass.
    pub npc_restock_interval_ms: u64,
    /// Ghost spawn/expiry sweep.
    pub ghost_sweep_interval_ms: u64,
    /// Black-market decay/restock tick.
    pub blackmarket_tick_interval_ms: u64,
    /// Scheduled breach/crack resumption sweep.
    pub action_resolve_interval_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            trace_update_interval_ms: constants::TRACE_UPDATE_INTERVAL_MS,
            market_sweep_interval_ms: constants::MARKET_SWEEP_INTERVAL_MS,
            npc_restock_interval_ms: constants::NPC_RESTOCK_INTERVAL_MS,
            ghost_sweep_interval_ms: constants::GHOST_SWEEP_INTERVAL_MS,
            blackmarket_tick_interval_ms: constants::BLACKMARKET_TICK_INTERVAL_MS,
            action_resolve_interval_ms: constants::ACTION_RESOLVE_INTERVAL_MS,
        }
    }
}

/// Timings for scheduled player work.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    /// Base duration of a breach attempt, ms. ICE strength adds on top.
    pub breach_base_ms: u64,
    /// Extra breach time per point of ICE strength, ms.
    pub breach_per_strength_ms: u64,
    /// Duration of a crack attempt against a password gate, ms.
    pub crack_base_ms: u64,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            breach_base_ms: 8_000,
            breach_per_strength_ms: 100,
            crack_base_ms: 12_000,
        }
    }
}

/// The process-wide configuration aggregate.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// World generation seed.
    pub world_seed: u64,
    /// Credits granted to a new player.
    pub starting_credits: u64,
    /// Tick cadences.
    pub scheduler: SchedulerConfig,
    /// Breach/crack timings.
    pub actions: ActionConfig,
    /// Intrusion balance.
    pub intrusion: IntrusionConfig,
    /// Market balance.
    pub market: MarketConfig,
    /// Ghost network tuning.
    pub ghost: GhostConfig,
    /// Black-market tuning.
    pub blackmarket: BlackMarketConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world_seed: 0x0B1A_C1CE_0000_0001,
            starting_credits: constants::STARTING_CREDITS,
            scheduler: SchedulerConfig::default(),
            actions: ActionConfig::default(),
            intrusion: IntrusionConfig::default(),
            market: MarketConfig::default(),
            ghost: GhostConfig::default(),
            blackmarket: BlackMarketConfig::default(),
        }
    }
}

impl GameConfig {
    /// Parses a balance file, filling everything it omits from the
    /// shipped defaults.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] when the TOML does not match the schema.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_is_all_defaults() {
        let config = GameConfig::from_toml_str("").unwrap();
        assert_eq!(config.starting_credits, constants::STARTING_CREDITS);
        assert_eq!(
            config.scheduler.trace_update_interval_ms,
            constants::TRACE_UPDATE_INTERVAL_MS
        );
    }

    #[test]
    fn test_partial_override() {
        let config = GameConfig::from_toml_str(
            r#"
            starting_credits = 5000

            [market]
            listing_fee = 100

            [intrusion]
            alert_delay_ms = 10000
            "#,
        )
        .unwrap();
        assert_eq!(config.starting_credits, 5_000);
        assert_eq!(config.market.listing_fee, 100);
        assert_eq!(config.intrusion.alert_delay_ms, 10_000);
        // Untouched sections keep their defaults.
        assert_eq!(
            config.market.max_active_orders,
            constants::MARKET_MAX_ACTIVE_ORDERS
        );
        assert_eq!(config.world_seed, GameConfig::default().world_seed);
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(GameConfig::from_toml_str("starting_credits = \"lots\"").is_err());
    }

    #[test]
    fn test_shipped_balance_file_parses() {
        let raw = include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../../data/balance.toml"
        ));
        let config = GameConfig::from_toml_str(raw).unwrap();
        assert_eq!(config.ghost.max_concurrent, 2);
        assert_eq!(config.blackmarket.fence_payout_pct, 70);
    }
}
