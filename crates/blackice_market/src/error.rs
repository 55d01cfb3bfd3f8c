//! # Market Error Types
//!
//! All recoverable failures of the market subsystem. Handlers turn
//! these into inline `{error}` payloads via `Display`; none of them is
//! ever logged as a server failure.

use thiserror::Error;

/// Errors that can occur in the market.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    /// Unknown order id.
    #[error("Order not found")]
    OrderNotFound,

    /// The order belongs to someone else.
    #[error("Order is not yours")]
    NotYourOrder,

    /// Buying your own order is rejected.
    #[error("You cannot buy your own order")]
    SelfTrade,

    /// Not enough credits for the operation.
    #[error("insufficient credits: need {needed}, have {available}")]
    InsufficientCredits {
        /// Credits required.
        needed: u64,
        /// Credits on hand.
        available: u64,
    },

    /// Not enough of a resource on hand.
    #[error("insufficient {resource}: need {needed}, have {available}")]
    InsufficientResources {
        /// Wire name of the resource.
        resource: &'static str,
        /// Amount required.
        needed: u32,
        /// Amount on hand.
        available: u32,
    },

    /// Zero or otherwise nonsensical amount.
    #[error("Amount must be greater than zero")]
    InvalidAmount,

    /// Unit price outside the configured band.
    #[error("Price must be between {min} and {max} credits")]
    PriceOutOfBand {
        /// Lowest accepted unit price.
        min: u64,
        /// Highest accepted unit price.
        max: u64,
    },

    /// Seller already has the maximum number of open orders.
    #[error("Maximum of {max} active orders reached")]
    TooManyOrders {
        /// The configured ceiling.
        max: usize,
    },

    /// The order was modified inside the cooldown window.
    #[error("Order was modified recently, try again later")]
    ModifyCooldown,

    /// Sell orders can only shrink; growing one would add unescrowed
    /// stock.
    #[error("Sell order quantity can only be decreased")]
    SellIncreaseForbidden,

    /// Buy orders can only grow.
    #[error("Buy order quantity can only be increased")]
    BuyDecreaseForbidden,

    /// Unknown item or resource identifier.
    #[error("Unknown item: {0}")]
    UnknownItem(String),

    /// Black-market stock for the item is exhausted.
    #[error("Item is out of stock")]
    OutOfStock,
}

/// Result type for market operations.
pub type MarketResult<T> = Result<T, MarketError>;
