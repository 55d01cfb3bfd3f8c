//! # Simulation Constants
//!
//! Shipped balance values. Most of these seed the `Default` impls of the
//! config structs in the simulation crate and can be overridden from the
//! balance TOML file.

// =============================================================================
// TICK CADENCES
// =============================================================================

/// Intrusion processing sweep interval (detection + counter-measures), ms.
pub const TRACE_UPDATE_INTERVAL_MS: u64 = 1_000;

/// Market expiry sweep interval, ms.
pub const MARKET_SWEEP_INTERVAL_MS: u64 = 30_000;

/// NPC liquidity restock interval, ms.
pub const NPC_RESTOCK_INTERVAL_MS: u64 = 120_000;

/// Ghost network spawn/expiry sweep interval, ms.
pub const GHOST_SWEEP_INTERVAL_MS: u64 = 5_000;

/// Black-market demand decay / supply restock interval, ms.
pub const BLACKMARKET_TICK_INTERVAL_MS: u64 = 60_000;

/// Scheduled breach/crack resumption sweep interval, ms.
pub const ACTION_RESOLVE_INTERVAL_MS: u64 = 250;

// =============================================================================
// INTRUSION
// =============================================================================

/// Delay before a defender is alerted to an intrusion, ms.
pub const INTRUSION_ALERT_DELAY_MS: u64 = 45_000;

/// Duration of a lockdown window rejecting new intrusions, ms.
pub const LOCKDOWN_WINDOW_MS: u64 = 300_000;

// =============================================================================
// MARKET
// =============================================================================

/// Flat fee charged for every listing and every modification, credits.
pub const MARKET_LISTING_FEE: u64 = 25;

/// Transaction fee burned on every sale, basis points of the total.
pub const MARKET_TRANSACTION_FEE_BPS: u32 = 500;

/// Lowest accepted unit price, credits.
pub const MARKET_MIN_PRICE: u64 = 1;

/// Highest accepted unit price, credits.
pub const MARKET_MAX_PRICE: u64 = 1_000_000;

/// Maximum concurrent active orders per seller.
pub const MARKET_MAX_ACTIVE_ORDERS: usize = 10;

/// Cooldown between modifications of one order, ms.
pub const MARKET_MODIFY_COOLDOWN_MS: u64 = 300_000;

/// Lifetime of an order before the expiry sweep removes it, ms.
pub const MARKET_ORDER_LIFETIME_MS: u64 = 86_400_000;

// =============================================================================
// PLAYERS
// =============================================================================

/// Starting credits for a new player.
pub const STARTING_CREDITS: u64 = 1_000;

/// Rig integrity of a factory-fresh computer (0 = destroyed).
pub const MAX_RIG_INTEGRITY: u32 = 100;
