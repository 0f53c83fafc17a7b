//! Item templates and the reward economy tables.
use serde::Serialize;

use crate::constants::{STREAK_BONUS_INTERVAL, STREAK_BONUS_XP};
use crate::rarity::RarityTier;
use crate::rarity::RarityTier::{Common, Legendary, Mythic, Rare, Uncommon};

/// Immutable description of a findable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ItemTemplate {
    pub name: &'static str,
    pub glyph: &'static str,
    pub rarity: RarityTier,
}

impl ItemTemplate {
    const fn new(name: &'static str, glyph: &'static str, rarity: RarityTier) -> Self {
        Self {
            name,
            glyph,
            rarity,
        }
    }
}

/// A pool of templates that joins the catalog once the player reaches `unlock_level`.
#[derive(Debug, Clone, Copy)]
pub struct ItemPool {
    pub unlock_level: u32,
    pub templates: &'static [ItemTemplate],
}

const SHORELINE_JUNK: [ItemTemplate; 10] = [
    ItemTemplate::new("Rusty Screw", "🔩", Common),
    ItemTemplate::new("Old Coin", "🪙", Common),
    ItemTemplate::new("Bottle Cap", "🍾", Common),
    ItemTemplate::new("Old Button", "⚫", Common),
    ItemTemplate::new("Bent Nail", "📌", Common),
    ItemTemplate::new("Rusted Key", "🔑", Common),
    ItemTemplate::new("Tin Can", "🥫", Common),
    ItemTemplate::new("Broken Chain", "⛓️", Common),
    ItemTemplate::new("Old Spoon", "🥄", Common),
    ItemTemplate::new("Metal Ring", "⭕", Common),
];

const LOST_VALUABLES: [ItemTemplate; 8] = [
    ItemTemplate::new("Silver Ring", "💍", Uncommon),
    ItemTemplate::new("Old Watch", "⌚", Uncommon),
    ItemTemplate::new("Copper Bracelet", "📿", Uncommon),
    ItemTemplate::new("Vintage Key", "🗝️", Uncommon),
    ItemTemplate::new("Bronze Medal", "🥉", Uncommon),
    ItemTemplate::new("Silver Locket", "💝", Uncommon),
    ItemTemplate::new("Brass Compass", "🧭", Uncommon),
    ItemTemplate::new("Copper Coin", "🟤", Uncommon),
];

const FINE_JEWELRY: [ItemTemplate; 7] = [
    ItemTemplate::new("Gold Necklace", "📿", Rare),
    ItemTemplate::new("Ruby Ring", "💍", Rare),
    ItemTemplate::new("Ancient Coin", "🪙", Rare),
    ItemTemplate::new("Emerald Brooch", "💎", Rare),
    ItemTemplate::new("Sapphire Earring", "💠", Rare),
    ItemTemplate::new("Golden Goblet", "🏺", Rare),
    ItemTemplate::new("Jade Pendant", "🟢", Rare),
];

const PIRATE_HOARD: [ItemTemplate; 6] = [
    ItemTemplate::new("Pirate Treasure", "💰", Legendary),
    ItemTemplate::new("Royal Crown", "👑", Legendary),
    ItemTemplate::new("Diamond Ring", "💎", Legendary),
    ItemTemplate::new("Golden Chalice", "🏆", Legendary),
    ItemTemplate::new("Ancient Artifact", "🔱", Legendary),
    ItemTemplate::new("Royal Scepter", "👸", Legendary),
];

const MYTHIC_RELICS: [ItemTemplate; 5] = [
    ItemTemplate::new("Excalibur Sword", "⚔️", Mythic),
    ItemTemplate::new("Dragon Crystal", "🔮", Mythic),
    ItemTemplate::new("Phoenix Feather", "🪶", Mythic),
    ItemTemplate::new("Ancient Relic", "📜", Mythic),
    ItemTemplate::new("Legendary Gem", "💠", Mythic),
];

/// Level-gated pools, ordered by unlock level.
pub const ITEM_POOLS: [ItemPool; 5] = [
    ItemPool {
        unlock_level: 1,
        templates: &SHORELINE_JUNK,
    },
    ItemPool {
        unlock_level: 10,
        templates: &LOST_VALUABLES,
    },
    ItemPool {
        unlock_level: 25,
        templates: &FINE_JEWELRY,
    },
    ItemPool {
        unlock_level: 50,
        templates: &PIRATE_HOARD,
    },
    ItemPool {
        unlock_level: 75,
        templates: &MYTHIC_RELICS,
    },
];

/// Every template whose pool is unlocked at `level`. Pools are cumulative.
#[must_use]
pub fn templates_unlocked_at(level: u32) -> Vec<&'static ItemTemplate> {
    ITEM_POOLS
        .iter()
        .filter(|pool| pool.unlock_level <= level)
        .flat_map(|pool| pool.templates.iter())
        .collect()
}

#[must_use]
pub const fn item_value(rarity: RarityTier) -> u64 {
    rarity.attributes().value
}

#[must_use]
pub const fn xp_reward(rarity: RarityTier) -> u32 {
    rarity.attributes().xp_reward
}

/// XP multiplier for a running combo count.
#[must_use]
pub const fn combo_multiplier(combo: u32) -> f64 {
    match combo {
        20.. => 5.0,
        15..=19 => 4.0,
        10..=14 => 3.0,
        5..=9 => 2.0,
        3..=4 => 1.6,
        2 => 1.3,
        _ => 1.0,
    }
}

/// Flat XP granted for a streak: 50 per completed block of five.
#[must_use]
pub const fn streak_bonus_xp(streak: u32) -> u32 {
    (streak / STREAK_BONUS_INTERVAL) * STREAK_BONUS_XP
}

/// Whether a streak of this length pays out [`streak_bonus_xp`] on the dig that reached it.
#[must_use]
pub const fn streak_pays_bonus(streak: u32) -> bool {
    streak > 0 && streak % STREAK_BONUS_INTERVAL == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_and_xp_tables_are_fixed() {
        let expected = [
            (Common, 50, 10),
            (Uncommon, 200, 30),
            (Rare, 1_000, 80),
            (Legendary, 5_000, 200),
            (Mythic, 25_000, 500),
        ];
        for (rarity, value, xp) in expected {
            assert_eq!(item_value(rarity), value);
            assert_eq!(xp_reward(rarity), xp);
        }
    }

    #[test]
    fn combo_multiplier_breakpoints() {
        let cases = [
            (0, 1.0),
            (1, 1.0),
            (2, 1.3),
            (3, 1.6),
            (4, 1.6),
            (5, 2.0),
            (9, 2.0),
            (10, 3.0),
            (14, 3.0),
            (15, 4.0),
            (19, 4.0),
            (20, 5.0),
            (25, 5.0),
        ];
        for (combo, multiplier) in cases {
            assert!(
                (combo_multiplier(combo) - multiplier).abs() < f64::EPSILON,
                "combo {combo}"
            );
        }
    }

    #[test]
    fn combo_multiplier_never_decreases() {
        for combo in 0..40 {
            assert!(combo_multiplier(combo + 1) >= combo_multiplier(combo));
        }
    }

    #[test]
    fn streak_bonus_counts_full_blocks() {
        assert_eq!(streak_bonus_xp(4), 0);
        assert_eq!(streak_bonus_xp(5), 50);
        assert_eq!(streak_bonus_xp(9), 50);
        assert_eq!(streak_bonus_xp(10), 100);
        assert!(streak_pays_bonus(5));
        assert!(!streak_pays_bonus(6));
        assert!(!streak_pays_bonus(0));
    }

    #[test]
    fn pools_accumulate_with_level() {
        assert_eq!(templates_unlocked_at(1).len(), 10);
        assert_eq!(templates_unlocked_at(9).len(), 10);
        assert_eq!(templates_unlocked_at(10).len(), 18);
        assert_eq!(templates_unlocked_at(25).len(), 25);
        assert_eq!(templates_unlocked_at(50).len(), 31);
        assert_eq!(templates_unlocked_at(75).len(), 36);
        assert!(
            templates_unlocked_at(80)
                .iter()
                .any(|template| template.rarity == Common)
        );
    }
}
