//! # NPC Vendors
//!
//! Synthetic seller identities used to skin NPC liquidity so it looks
//! like distinct independent sellers. A vendor has no balance of its
//! own — payouts to vendors are burned.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// A synthetic seller identity.
#[derive(Clone, Copy, Debug)]
pub struct Vendor {
    /// Internal vendor code stored on NPC orders.
    pub code: &'static str,
    /// Display name (never shown on public listings, which are
    /// anonymous; kept for tooling and logs).
    pub display_name: &'static str,
    /// Multiplier applied to an item's base price.
    pub price_modifier: f32,
}

/// The shipped vendor table.
pub const VENDORS: &[Vendor] = &[
    Vendor {
        code: "VND-KESTREL",
        display_name: "Kestrel Surplus",
        price_modifier: 0.92,
    },
    Vendor {
        code: "VND-MIRAGE",
        display_name: "Mirage Imports",
        price_modifier: 1.0,
    },
    Vendor {
        code: "VND-OKONKWO",
        display_name: "Okonkwo & Sons",
        price_modifier: 1.05,
    },
    Vendor {
        code: "VND-HALCYON",
        display_name: "Halcyon Trade Co.",
        price_modifier: 1.12,
    },
    Vendor {
        code: "VND-DIMEBAG",
        display_name: "Dimebag Dynamics",
        price_modifier: 0.85,
    },
];

/// Picks a random vendor.
#[must_use]
pub fn pick(rng: &mut ChaCha8Rng) -> &'static Vendor {
    &VENDORS[rng.gen_range(0..VENDORS.len())]
}

/// Rounds a raw price to a realistic step: nearest 10 below 1,000,
/// nearest 50 below 10,000, nearest 100 above.
#[must_use]
pub fn round_price(raw: u64) -> u64 {
    let step = if raw < 1_000 {
        10
    } else if raw < 10_000 {
        50
    } else {
        100
    };
    let rounded = (raw + step / 2) / step * step;
    rounded.max(step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_price_steps() {
        assert_eq!(round_price(437), 440);
        assert_eq!(round_price(999), 1_000);
        assert_eq!(round_price(3_512), 3_500);
        assert_eq!(round_price(3_530), 3_550);
        assert_eq!(round_price(12_349), 12_300);
        assert_eq!(round_price(12_350), 12_400);
    }

    #[test]
    fn test_round_price_never_zero() {
        assert_eq!(round_price(0), 10);
        assert_eq!(round_price(3), 10);
    }

    #[test]
    fn test_vendor_identities_unique() {
        let mut codes = std::collections::HashSet::new();
        let mut names = std::collections::HashSet::new();
        for vendor in VENDORS {
            assert!(codes.insert(vendor.code));
            assert!(names.insert(vendor.display_name));
            assert!(vendor.price_modifier > 0.5 && vendor.price_modifier < 2.0);
        }
    }
}
