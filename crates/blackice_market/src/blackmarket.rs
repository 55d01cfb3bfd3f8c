//! # Black Market
//!
//! The contraband sibling of the order book. No orders here — each item
//! carries tracked `supply` and `demand` scalars and a price derived
//! from them:
//!
//! ```text
//! price = basePrice × supplyMultiplier × demandMultiplier × volatility
//! ```
//!
//! Demand increments on buy and decays on a fixed schedule; supply
//! increments on sell and drifts back toward baseline as stock
//! replenishes.

use std::collections::HashMap;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

use crate::account::Account;
use crate::error::{MarketError, MarketResult};

/// One contraband item definition.
#[derive(Clone, Copy, Debug)]
pub struct ContrabandItem {
    /// Wire identifier.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Baseline price, credits.
    pub base_price: u64,
    /// Stock the dealer drifts back toward.
    pub baseline_stock: u32,
}

/// The shipped contraband table.
pub const CONTRABAND: &[ContrabandItem] = &[
    ContrabandItem {
        id: "military_icebreaker",
        name: "Military-Grade Icebreaker",
        base_price: 8_000,
        baseline_stock: 2,
    },
    ContrabandItem {
        id: "stolen_credentials",
        name: "Stolen Credential Bundle",
        base_price: 1_200,
        baseline_stock: 6,
    },
    ContrabandItem {
        id: "burner_identity",
        name: "Burner Identity Kit",
        base_price: 3_500,
        baseline_stock: 4,
    },
    ContrabandItem {
        id: "wetware_splice",
        name: "Wetware Splice",
        base_price: 15_000,
        baseline_stock: 1,
    },
];

/// Black-market tuning.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct BlackMarketConfig {
    /// Demand added per purchase.
    pub demand_step: f32,
    /// Supply added per sale.
    pub supply_step: f32,
    /// Per-tick pull of both scalars back toward 1.0 (0..1).
    pub decay_rate: f32,
    /// Multiplier clamp on both axes.
    pub multiplier_clamp: (f32, f32),
    /// Random volatility band applied per quote.
    pub volatility_range: (f32, f32),
    /// Fraction of the quote paid out when a player sells (the fence's
    /// cut keeps the rest).
    pub fence_payout_pct: u32,
}

impl Default for BlackMarketConfig {
    fn default() -> Self {
        Self {
            demand_step: 0.15,
            supply_step: 0.15,
            decay_rate: 0.1,
            multiplier_clamp: (0.5, 2.0),
            volatility_range: (0.95, 1.05),
            fence_payout_pct: 70,
        }
    }
}

/// Tracked state of one contraband item.
#[derive(Clone, Copy, Debug)]
struct ItemState {
    supply: f32,
    demand: f32,
    stock: u32,
}

/// A price quote for one item, as shown on the listing.
#[derive(Clone, Copy, Debug)]
pub struct ContrabandQuote {
    /// Item identifier.
    pub item_id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Current buy price.
    pub price: u64,
    /// Units the dealer has on hand.
    pub stock: u32,
}

/// The contraband dealer.
pub struct BlackMarket {
    config: BlackMarketConfig,
    rng: ChaCha8Rng,
    states: HashMap<&'static str, ItemState>,
}

impl BlackMarket {
    /// Creates the dealer with baseline stock and its own RNG stream.
    #[must_use]
    pub fn new(config: BlackMarketConfig, rng: ChaCha8Rng) -> Self {
        let states = CONTRABAND
            .iter()
            .map(|item| {
                (
                    item.id,
                    ItemState {
                        supply: 1.0,
                        demand: 1.0,
                        stock: item.baseline_stock,
                    },
                )
            })
            .collect();
        Self {
            config,
            rng,
            states,
        }
    }

    fn item(item_id: &str) -> MarketResult<&'static ContrabandItem> {
        CONTRABAND
            .iter()
            .find(|item| item.id == item_id)
            .ok_or_else(|| MarketError::UnknownItem(item_id.to_owned()))
    }

    /// Quotes the current price for an item.
    ///
    /// Scarce supply raises the price, hot demand raises it further, and
    /// a bounded volatility roll keeps quotes from being static.
    ///
    /// # Errors
    ///
    /// [`MarketError::UnknownItem`] for an unknown id.
    pub fn quote(&mut self, item_id: &str) -> MarketResult<ContrabandQuote> {
        let item = Self::item(item_id)?;
        let state = self.states[item.id];
        let (lo, hi) = self.config.multiplier_clamp;

        let supply_mult = (1.0 / state.supply).clamp(lo, hi);
        let demand_mult = state.demand.clamp(lo, hi);
        let volatility = self
            .rng
            .gen_range(self.config.volatility_range.0..self.config.volatility_range.1);

        #[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
        #[allow(clippy::cast_possible_truncation)]
        let price = (item.base_price as f32 * supply_mult * demand_mult * volatility).round() as u64;
        Ok(ContrabandQuote {
            item_id: item.id,
            name: item.name,
            price: price.max(1),
            stock: state.stock,
        })
    }

    /// Quotes every item, in table order.
    pub fn quote_all(&mut self) -> Vec<ContrabandQuote> {
        CONTRABAND
            .iter()
            .map(|item| self.quote(item.id).expect("table item"))
            .collect()
    }

    /// Buys one unit at the current quote. Demand rises.
    ///
    /// # Errors
    ///
    /// [`MarketError::UnknownItem`], [`MarketError::OutOfStock`] or
    /// [`MarketError::InsufficientCredits`]; nothing changes on error.
    pub fn buy(&mut self, account: &mut Account, item_id: &str) -> MarketResult<ContrabandQuote> {
        let quote = self.quote(item_id)?;
        if quote.stock == 0 {
            return Err(MarketError::OutOfStock);
        }
        account.charge(quote.price)?;
        account.give_gear(quote.item_id, 1);

        let state = self.states.get_mut(quote.item_id).expect("table item");
        state.stock -= 1;
        state.demand += self.config.demand_step;
        Ok(quote)
    }

    /// Sells one unit to the dealer for the fence's payout. Supply
    /// rises.
    ///
    /// # Errors
    ///
    /// [`MarketError::UnknownItem`] or insufficient gear on hand;
    /// nothing changes on error.
    pub fn sell(&mut self, account: &mut Account, item_id: &str) -> MarketResult<u64> {
        let quote = self.quote(item_id)?;
        account.take_gear(quote.item_id, 1)?;
        let payout = quote.price * u64::from(self.config.fence_payout_pct) / 100;
        account.deposit(payout);

        let state = self.states.get_mut(quote.item_id).expect("table item");
        state.stock += 1;
        state.supply += self.config.supply_step;
        Ok(payout)
    }

    /// The fixed-schedule tick: demand decays, supply drifts back, and
    /// stock replenishes one unit toward baseline.
    pub fn tick(&mut self) {
        let decay = self.config.decay_rate;
        for item in CONTRABAND {
            let state = self.states.get_mut(item.id).expect("table item");
            state.demand += (1.0 - state.demand) * decay;
            state.supply += (1.0 - state.supply) * decay;
            if state.stock < item.baseline_stock {
                state.stock += 1;
            }
        }
    }
}
