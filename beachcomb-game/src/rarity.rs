//! Rarity tiers and their per-tier attribute record.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// Compact set of rarities; never holds more than the five tiers.
pub type RaritySet = SmallVec<[RarityTier; 5]>;

/// Scarcity tier of an item, ordered from most to least plentiful.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum RarityTier {
    #[default]
    Common,
    Uncommon,
    Rare,
    Legendary,
    Mythic,
}

/// Everything the simulation derives from a rarity, looked up in one place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RarityAttributes {
    /// Cursor distance under which the detector registers the item.
    pub detection_radius: f64,
    /// Click distance under which a dig unearths the item (before shovel bonus).
    pub click_radius: f64,
    /// Base sale value in coins.
    pub value: u64,
    pub xp_reward: u32,
    /// Museum sort rank; lower sorts first.
    pub museum_rank: i8,
}

impl RarityTier {
    pub const ALL: [Self; 5] = [
        Self::Common,
        Self::Uncommon,
        Self::Rare,
        Self::Legendary,
        Self::Mythic,
    ];

    #[must_use]
    pub const fn attributes(self) -> RarityAttributes {
        match self {
            Self::Common => RarityAttributes {
                detection_radius: 90.0,
                click_radius: 45.0,
                value: 50,
                xp_reward: 10,
                museum_rank: 3,
            },
            Self::Uncommon => RarityAttributes {
                detection_radius: 70.0,
                click_radius: 35.0,
                value: 200,
                xp_reward: 30,
                museum_rank: 2,
            },
            Self::Rare => RarityAttributes {
                detection_radius: 55.0,
                click_radius: 28.0,
                value: 1_000,
                xp_reward: 80,
                museum_rank: 1,
            },
            Self::Legendary => RarityAttributes {
                detection_radius: 40.0,
                click_radius: 20.0,
                value: 5_000,
                xp_reward: 200,
                museum_rank: 0,
            },
            Self::Mythic => RarityAttributes {
                detection_radius: 30.0,
                click_radius: 15.0,
                value: 25_000,
                xp_reward: 500,
                museum_rank: -1,
            },
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
            Self::Legendary => "legendary",
            Self::Mythic => "mythic",
        }
    }
}

impl fmt::Display for RarityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RarityTier {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "common" => Ok(Self::Common),
            "uncommon" => Ok(Self::Uncommon),
            "rare" => Ok(Self::Rare),
            "legendary" => Ok(Self::Legendary),
            "mythic" => Ok(Self::Mythic),
            _ => Err(()),
        }
    }
}
