//! # BLACKICE Market
//!
//! An anonymized order book mixing player and synthetic (NPC) sell
//! orders, with Eve-style asymmetric modification rules and strict
//! credit/resource conservation.
//!
//! ## Conservation
//!
//! Everything an order promises is escrowed from its creator at creation
//! time and returned in full on cancellation or expiry. For every
//! resource kind and for credits, `on hand + escrowed in open orders`
//! is invariant across listing, modifying, cancelling and expiring.
//! Buying transfers ownership and burns the transaction fee; nothing
//! else ever leaves the system.
//!
//! ## Anonymity
//!
//! The internal [`MarketOrder`] keeps the full seller identity. Only the
//! [`PublicOrder`] projection crosses the serialization boundary, and it
//! labels every seller `"Anonymous"`.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod account;
pub mod blackmarket;
pub mod book;
pub mod catalog;
pub mod error;
pub mod npc;
pub mod order;
pub mod vendor;

pub use account::Account;
pub use blackmarket::{BlackMarket, BlackMarketConfig, ContrabandQuote};
pub use book::{
    CancelReceipt, ExpiredOrder, ListReceipt, MarketConfig, MarketEngine, ModifyReceipt,
    ReturnedEscrow, TradeReceipt,
};
pub use catalog::{CatalogItem, CATALOG};
pub use error::{MarketError, MarketResult};
pub use order::{Good, MarketOrder, OrderType, OwnOrder, PublicOrder, Seller};
pub use vendor::{Vendor, VENDORS};
