//! Detector and shovel catalogs.
//!
//! Each tool line is a closed enumeration of tiers; the numbers behind a
//! tier are resolved through `stats()` so the tier id is all that needs to
//! be persisted.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::rarity::RarityTier::{Common, Legendary, Mythic, Rare, Uncommon};
use crate::rarity::{RarityTier, RaritySet};

/// Price and level gate shared by every purchasable tool.
pub trait Equipment: Copy + PartialEq + fmt::Debug {
    fn name(self) -> &'static str;
    fn price(self) -> u64;
    fn required_level(self) -> u32;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorStats {
    pub name: &'static str,
    pub glyph: &'static str,
    pub price: u64,
    pub required_level: u32,
    pub detectable: &'static [RarityTier],
    /// Shown in the shop; has no numeric effect on detection.
    pub detection_bonus: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShovelStats {
    pub name: &'static str,
    pub glyph: &'static str,
    pub price: u64,
    pub required_level: u32,
    pub click_radius_bonus: f64,
    pub value_multiplier: f64,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum DetectorTier {
    #[default]
    Basic,
    Upgraded,
    Advanced,
    Professional,
    Master,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum ShovelTier {
    #[default]
    Basic,
    Upgraded,
    Advanced,
    Professional,
    Master,
}

impl DetectorTier {
    pub const ALL: [Self; 5] = [
        Self::Basic,
        Self::Upgraded,
        Self::Advanced,
        Self::Professional,
        Self::Master,
    ];

    #[must_use]
    pub const fn stats(self) -> DetectorStats {
        match self {
            Self::Basic => DetectorStats {
                name: "Basic Metal Detector",
                glyph: "🔍",
                price: 0,
                required_level: 1,
                detectable: &[Common],
                detection_bonus: 0,
            },
            Self::Upgraded => DetectorStats {
                name: "Upgraded Detector",
                glyph: "🔬",
                price: 5_000,
                required_level: 10,
                detectable: &[Common, Uncommon],
                detection_bonus: 10,
            },
            Self::Advanced => DetectorStats {
                name: "Advanced Detector",
                glyph: "📡",
                price: 15_000,
                required_level: 25,
                detectable: &[Common, Uncommon, Rare],
                detection_bonus: 20,
            },
            Self::Professional => DetectorStats {
                name: "Professional Detector",
                glyph: "🛰️",
                price: 40_000,
                required_level: 50,
                detectable: &[Common, Uncommon, Rare, Legendary],
                detection_bonus: 30,
            },
            Self::Master => DetectorStats {
                name: "Master Detector",
                glyph: "⚡",
                price: 100_000,
                required_level: 75,
                detectable: &[Common, Uncommon, Rare, Legendary, Mythic],
                detection_bonus: 50,
            },
        }
    }

    #[must_use]
    pub fn can_detect(self, rarity: RarityTier) -> bool {
        self.stats().detectable.contains(&rarity)
    }

    #[must_use]
    pub fn detectable_rarities(self) -> RaritySet {
        self.stats().detectable.iter().copied().collect()
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        tier_id(self as u8)
    }
}

impl ShovelTier {
    pub const ALL: [Self; 5] = [
        Self::Basic,
        Self::Upgraded,
        Self::Advanced,
        Self::Professional,
        Self::Master,
    ];

    #[must_use]
    pub const fn stats(self) -> ShovelStats {
        match self {
            Self::Basic => ShovelStats {
                name: "Rusty Shovel",
                glyph: "⛏️",
                price: 0,
                required_level: 1,
                click_radius_bonus: 0.0,
                value_multiplier: 1.0,
            },
            Self::Upgraded => ShovelStats {
                name: "Iron Shovel",
                glyph: "⚒️",
                price: 3_000,
                required_level: 5,
                click_radius_bonus: 5.0,
                value_multiplier: 1.15,
            },
            Self::Advanced => ShovelStats {
                name: "Steel Shovel",
                glyph: "🔨",
                price: 10_000,
                required_level: 20,
                click_radius_bonus: 10.0,
                value_multiplier: 1.30,
            },
            Self::Professional => ShovelStats {
                name: "Titanium Shovel",
                glyph: "⚡",
                price: 30_000,
                required_level: 40,
                click_radius_bonus: 15.0,
                value_multiplier: 1.50,
            },
            Self::Master => ShovelStats {
                name: "Diamond Shovel",
                glyph: "💎",
                price: 80_000,
                required_level: 65,
                click_radius_bonus: 25.0,
                value_multiplier: 2.0,
            },
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        tier_id(self as u8)
    }
}

const fn tier_id(ordinal: u8) -> &'static str {
    match ordinal {
        0 => "basic",
        1 => "upgraded",
        2 => "advanced",
        3 => "professional",
        _ => "master",
    }
}

fn parse_tier(s: &str) -> Option<usize> {
    ["basic", "upgraded", "advanced", "professional", "master"]
        .iter()
        .position(|id| *id == s)
}

impl Equipment for DetectorTier {
    fn name(self) -> &'static str {
        self.stats().name
    }

    fn price(self) -> u64 {
        self.stats().price
    }

    fn required_level(self) -> u32 {
        self.stats().required_level
    }
}

impl Equipment for ShovelTier {
    fn name(self) -> &'static str {
        self.stats().name
    }

    fn price(self) -> u64 {
        self.stats().price
    }

    fn required_level(self) -> u32 {
        self.stats().required_level
    }
}

impl fmt::Display for DetectorTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ShovelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetectorTier {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_tier(s).map(|idx| Self::ALL[idx]).ok_or(())
    }
}

impl FromStr for ShovelTier {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_tier(s).map(|idx| Self::ALL[idx]).ok_or(())
    }
}
