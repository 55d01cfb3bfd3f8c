//! # Purchasable Item Catalog
//!
//! Every computer rig and rig module NPC vendors keep in stock.
//! Resources are player-supplied and are never NPC-seeded.

use blackice_shared::{ItemType, ResourceKind};

use crate::order::Good;

/// One purchasable catalog entry.
#[derive(Clone, Copy, Debug)]
pub struct CatalogItem {
    /// The tradeable good.
    pub good: Good,
    /// Display name.
    pub name: &'static str,
    /// Base price NPC listings vary around, credits.
    pub base_price: u64,
}

/// The shipped catalog of computers and modules.
pub const CATALOG: &[CatalogItem] = &[
    // Computers
    CatalogItem {
        good: Good::Computer("breadboard_mk1"),
        name: "Breadboard Mk.1",
        base_price: 800,
    },
    CatalogItem {
        good: Good::Computer("cortex_v2"),
        name: "Cortex v2",
        base_price: 3_500,
    },
    CatalogItem {
        good: Good::Computer("phantom_deck"),
        name: "Phantom Deck",
        base_price: 12_000,
    },
    // Modules
    CatalogItem {
        good: Good::Module("coprocessor"),
        name: "Coprocessor",
        base_price: 450,
    },
    CatalogItem {
        good: Good::Module("signal_damper"),
        name: "Signal Damper",
        base_price: 900,
    },
    CatalogItem {
        good: Good::Module("icebreaker_suite"),
        name: "Icebreaker Suite",
        base_price: 2_200,
    },
    CatalogItem {
        good: Good::Module("trace_scrambler"),
        name: "Trace Scrambler",
        base_price: 1_600,
    },
];

/// Resolves a wire `(itemType, itemId)` pair to a good.
#[must_use]
pub fn resolve(item_type: ItemType, item_id: &str) -> Option<Good> {
    match item_type {
        ItemType::Resource => ResourceKind::parse(item_id).map(Good::Resource),
        ItemType::Computer | ItemType::Module => CATALOG
            .iter()
            .find(|item| item.good.item_type() == item_type && item.good.item_id() == item_id)
            .map(|item| item.good),
    }
}
