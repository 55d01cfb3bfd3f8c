//! # Zone Classification
//!
//! Maps a network's security scalar to its zone and the derived
//! risk/reward multipliers.
//!
//! Higher security means a safer network: slower trace accrual and lower
//! rewards. Very negative security classifies as the Ghost zone with
//! extreme values on both axes.

use serde::{Deserialize, Serialize};

/// Zone classification of a network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    /// Civilian networks, security 5.0 and above.
    ClearNet,
    /// Contested networks, security 0.0 to 5.0.
    GreyNet,
    /// Criminal networks, security below 0.0.
    DarkNet,
    /// Time-boxed extreme networks, security -8.0 and below.
    Ghost,
}

impl Zone {
    /// Classifies a security scalar into its zone.
    #[must_use]
    pub fn classify(security: f32) -> Self {
        if security <= -8.0 {
            Self::Ghost
        } else if security < 0.0 {
            Self::DarkNet
        } else if security < 5.0 {
            Self::GreyNet
        } else {
            Self::ClearNet
        }
    }

    /// Returns the display name used on the wire.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ClearNet => "ClearNet",
            Self::GreyNet => "GreyNet",
            Self::DarkNet => "DarkNet",
            Self::Ghost => "Ghost",
        }
    }
}

/// Derived attributes of a zone.
///
/// Looked up once at generation time and stored on the network.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoneProfile {
    /// The zone itself.
    pub zone: Zone,
    /// Multiplier applied to the base trace accrual rate.
    pub trace_mult: f32,
    /// Multiplier applied to harvest and loot rewards.
    pub reward_mult: f32,
}

impl ZoneProfile {
    /// Looks up the profile for a security scalar.
    #[must_use]
    pub fn for_security(security: f32) -> Self {
        match Zone::classify(security) {
            Zone::ClearNet => Self {
                zone: Zone::ClearNet,
                trace_mult: 0.6,
                reward_mult: 0.8,
            },
            Zone::GreyNet => Self {
                zone: Zone::GreyNet,
                trace_mult: 1.0,
                reward_mult: 1.0,
            },
            Zone::DarkNet => Self {
                zone: Zone::DarkNet,
                trace_mult: 1.6,
                reward_mult: 1.8,
            },
            Zone::Ghost => Self {
                zone: Zone::Ghost,
                trace_mult: 3.0,
                reward_mult: 4.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_bands() {
        assert_eq!(Zone::classify(8.3), Zone::ClearNet);
        assert_eq!(Zone::classify(5.0), Zone::ClearNet);
        assert_eq!(Zone::classify(4.9), Zone::GreyNet);
        assert_eq!(Zone::classify(0.0), Zone::GreyNet);
        assert_eq!(Zone::classify(-0.1), Zone::DarkNet);
        assert_eq!(Zone::classify(-7.9), Zone::DarkNet);
        assert_eq!(Zone::classify(-8.0), Zone::Ghost);
        assert_eq!(Zone::classify(-9.5), Zone::Ghost);
    }

    #[test]
    fn test_risk_reward_monotonic() {
        // Lower security always means more trace and more reward.
        let clear = ZoneProfile::for_security(7.0);
        let grey = ZoneProfile::for_security(2.0);
        let dark = ZoneProfile::for_security(-3.0);
        let ghost = ZoneProfile::for_security(-9.5);

        assert!(clear.trace_mult < grey.trace_mult);
        assert!(grey.trace_mult < dark.trace_mult);
        assert!(dark.trace_mult < ghost.trace_mult);

        assert!(clear.reward_mult < grey.reward_mult);
        assert!(grey.reward_mult < dark.reward_mult);
        assert!(dark.reward_mult < ghost.reward_mult);
    }
}
