//! # NPC Liquidity
//!
//! Boot-time seeding and periodic restock of synthetic sell orders, so
//! the market is never empty of purchasable computers and modules.
//! Each listing is skinned with a random vendor's price modifier plus
//! bounded variance, then rounded to realistic price steps.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use blackice_shared::{ItemType, OrderId, SimTime};

use crate::book::MarketEngine;
use crate::catalog::{CatalogItem, CATALOG};
use crate::vendor;

/// Bounded price variance applied on top of the vendor modifier.
const VARIANCE_RANGE: (f32, f32) = (0.85, 1.15);

/// Rolls a vendor-priced listing price for an item.
fn roll_price(item: &CatalogItem, rng: &mut ChaCha8Rng) -> u64 {
    let vendor = vendor::pick(rng);
    let variance = rng.gen_range(VARIANCE_RANGE.0..VARIANCE_RANGE.1);
    #[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
    #[allow(clippy::cast_possible_truncation)]
    let raw = (item.base_price as f32 * vendor.price_modifier * variance).round() as u64;
    vendor::round_price(raw)
}

/// Rolls a listing quantity for an item category.
fn roll_quantity(item: &CatalogItem, rng: &mut ChaCha8Rng) -> u32 {
    match item.good.item_type() {
        ItemType::Computer => rng.gen_range(1..=2),
        ItemType::Module => rng.gen_range(1..=5),
        ItemType::Resource => rng.gen_range(20..=80),
    }
}

/// Seeds the book at boot.
///
/// Only runs when the book is completely empty (a restarted server with
/// restored orders must not double-stock). Returns the created order
/// ids.
pub fn seed(market: &mut MarketEngine, rng: &mut ChaCha8Rng, now: SimTime) -> Vec<OrderId> {
    if market.order_count() > 0 {
        return Vec::new();
    }

    let mut created = Vec::new();
    for item in CATALOG {
        let listings = rng.gen_range(1..=2);
        for _ in 0..listings {
            created.push(spawn_listing(market, item, rng, now));
        }
    }
    created
}

/// Tops up any catalog item whose NPC order count has fallen to zero.
///
/// Returns the created order ids.
pub fn restock(market: &mut MarketEngine, rng: &mut ChaCha8Rng, now: SimTime) -> Vec<OrderId> {
    let mut created = Vec::new();
    for item in CATALOG {
        if market.npc_order_count(item.good) == 0 {
            created.push(spawn_listing(market, item, rng, now));
        }
    }
    created
}

fn spawn_listing(
    market: &mut MarketEngine,
    item: &CatalogItem,
    rng: &mut ChaCha8Rng,
    now: SimTime,
) -> OrderId {
    let vendor_code = vendor::pick(rng).code;
    let price = roll_price(item, rng);
    let quantity = roll_quantity(item, rng);
    market.insert_npc_order(vendor_code, item.good, quantity, price, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Account;
    use crate::book::MarketConfig;
    use rand::SeedableRng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_seed_covers_every_catalog_item() {
        let mut market = MarketEngine::new(MarketConfig::default());
        let created = seed(&mut market, &mut rng(), 0);
        assert!(!created.is_empty());
        for item in CATALOG {
            assert!(
                market.npc_order_count(item.good) >= 1,
                "{} not stocked",
                item.good.item_id()
            );
        }
    }

    #[test]
    fn test_seed_skips_non_empty_book() {
        let mut market = MarketEngine::new(MarketConfig::default());
        let mut account = Account::new(10_000);
        account.give_resource(blackice_shared::ResourceKind::DataPackets, 10);
        market
            .list_sell(
                1,
                &mut account,
                blackice_shared::ResourceKind::DataPackets,
                5,
                50,
                0,
            )
            .unwrap();

        assert!(seed(&mut market, &mut rng(), 0).is_empty());
        assert_eq!(market.order_count(), 1);
    }

    #[test]
    fn test_restock_only_refills_empty_items() {
        let mut market = MarketEngine::new(MarketConfig::default());
        let mut stream = rng();
        seed(&mut market, &mut stream, 0);
        let before = market.order_count();

        // Everything stocked: restock is a no-op.
        assert!(restock(&mut market, &mut stream, 1).is_empty());
        assert_eq!(market.order_count(), before);

        // Drain one item by buying out its listings.
        let target = CATALOG[0].good;
        let mut buyer = Account::new(u64::MAX / 2);
        let ids: Vec<_> = (1..=market.order_count() as u64)
            .filter(|&id| {
                market
                    .order(id)
                    .map(|o| o.good == target)
                    .unwrap_or(false)
            })
            .collect();
        for id in ids {
            market.buy(7, &mut buyer, id).unwrap();
        }
        assert_eq!(market.npc_order_count(target), 0);

        let created = restock(&mut market, &mut stream, 2);
        assert_eq!(created.len(), 1);
        assert_eq!(market.npc_order_count(target), 1);
    }

    #[test]
    fn test_prices_land_on_realistic_steps() {
        let mut market = MarketEngine::new(MarketConfig::default());
        let created = seed(&mut market, &mut rng(), 0);
        for id in created {
            let order = market.order(id).unwrap();
            let price = order.unit_price;
            let step = if price < 1_000 {
                10
            } else if price < 10_000 {
                50
            } else {
                100
            };
            assert_eq!(price % step, 0, "price {price} off-step");
        }
    }
}
