//! # Market Orders & View Projections
//!
//! The internal [`MarketOrder`] retains the full seller identity. The
//! anonymization contract lives in the projection types: only
//! [`PublicOrder`] and [`OwnOrder`] are ever serialized into outbound
//! payloads, and the public one reports every seller as `"Anonymous"`.

use serde::Serialize;

use blackice_shared::{ItemType, OrderId, PlayerId, ResourceKind, SimTime};

/// Opaque seller label shown on every public listing.
pub const ANONYMOUS_SELLER: &str = "Anonymous";

/// Who created an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Seller {
    /// A real player.
    Player(PlayerId),
    /// A synthetic vendor, identified by its vendor code.
    Vendor(&'static str),
}

/// A tradeable good.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Good {
    /// A stack of a harvestable resource.
    Resource(ResourceKind),
    /// A computer rig from the catalog.
    Computer(&'static str),
    /// A rig module from the catalog.
    Module(&'static str),
}

impl Good {
    /// Category of this good.
    #[must_use]
    pub const fn item_type(self) -> ItemType {
        match self {
            Self::Resource(_) => ItemType::Resource,
            Self::Computer(_) => ItemType::Computer,
            Self::Module(_) => ItemType::Module,
        }
    }

    /// Wire identifier of this good.
    #[must_use]
    pub const fn item_id(self) -> &'static str {
        match self {
            Self::Resource(kind) => kind.as_str(),
            Self::Computer(id) | Self::Module(id) => id,
        }
    }
}

/// Sell or buy side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Offering goods for credits.
    Sell,
    /// Offering credits for goods. Present in the data model; no
    /// player-facing handler creates one.
    Buy,
}

/// An order in the book. Internal type — never serialized directly.
#[derive(Clone, Debug)]
pub struct MarketOrder {
    /// Order id.
    pub id: OrderId,
    /// Full seller identity. Never crosses the public boundary.
    pub seller: Seller,
    /// True for synthetic vendor liquidity.
    pub is_npc: bool,
    /// The good being traded.
    pub good: Good,
    /// Remaining quantity. Always bought atomically in full.
    pub quantity: u32,
    /// Price per unit, credits.
    pub unit_price: u64,
    /// Side of the book.
    pub order_type: OrderType,
    /// Creation time.
    pub created_at: SimTime,
    /// Last successful modification (initialized to `created_at`).
    pub last_modified: SimTime,
    /// Expiry deadline for the sweep.
    pub expires_at: SimTime,
}

impl MarketOrder {
    /// Total credit value of the order.
    #[must_use]
    pub fn total(&self) -> u64 {
        u64::from(self.quantity) * self.unit_price
    }

    /// Projects the anonymized public view.
    #[must_use]
    pub fn public_view(&self) -> PublicOrder {
        PublicOrder {
            order_id: self.id,
            seller: ANONYMOUS_SELLER,
            item_type: self.good.item_type().as_str(),
            item_id: self.good.item_id(),
            amount: self.quantity,
            price_per_unit: self.unit_price,
            order_type: self.order_type,
            expires_at: self.expires_at,
        }
    }

    /// Projects the originator-only view.
    #[must_use]
    pub fn own_view(&self) -> OwnOrder {
        OwnOrder {
            order_id: self.id,
            item_type: self.good.item_type().as_str(),
            item_id: self.good.item_id(),
            amount: self.quantity,
            price_per_unit: self.unit_price,
            order_type: self.order_type,
            created_at: self.created_at,
            last_modified: self.last_modified,
            expires_at: self.expires_at,
        }
    }
}

/// Anonymized listing row. The only order shape non-owners ever see.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicOrder {
    /// Order id (needed to buy).
    pub order_id: OrderId,
    /// Always [`ANONYMOUS_SELLER`].
    pub seller: &'static str,
    /// Item category.
    pub item_type: &'static str,
    /// Item identifier.
    pub item_id: &'static str,
    /// Quantity on offer.
    pub amount: u32,
    /// Price per unit.
    pub price_per_unit: u64,
    /// Side of the book.
    pub order_type: OrderType,
    /// Expiry deadline.
    pub expires_at: SimTime,
}

/// Originator's view of their own order.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnOrder {
    /// Order id.
    pub order_id: OrderId,
    /// Item category.
    pub item_type: &'static str,
    /// Item identifier.
    pub item_id: &'static str,
    /// Quantity on offer.
    pub amount: u32,
    /// Price per unit.
    pub price_per_unit: u64,
    /// Side of the book.
    pub order_type: OrderType,
    /// Creation time.
    pub created_at: SimTime,
    /// Last modification time.
    pub last_modified: SimTime,
    /// Expiry deadline.
    pub expires_at: SimTime,
}
