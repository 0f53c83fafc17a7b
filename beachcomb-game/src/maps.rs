//! Map catalog: the authored sequence of beaches and its infinite extension.
use serde::Serialize;

use crate::constants::{ITEMS_PER_CYCLE_INCREMENT, XP_PER_MAP_ITEM};

/// A themed map resolved for a concrete player level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapTheme {
    pub level: u32,
    pub name: &'static str,
    pub item_count: u32,
    pub description: &'static str,
}

struct MapEntry {
    name: &'static str,
    item_count: u32,
    description: &'static str,
}

const MAPS: [MapEntry; 10] = [
    MapEntry {
        name: "Sunny Beach",
        item_count: 7,
        description: "A peaceful sunny beach perfect for beginners",
    },
    MapEntry {
        name: "Rocky Shore",
        item_count: 8,
        description: "Rocky coastline with hidden treasures",
    },
    MapEntry {
        name: "Golden Sands",
        item_count: 9,
        description: "Shimmering golden sands hide valuable items",
    },
    MapEntry {
        name: "Coral Bay",
        item_count: 10,
        description: "Beautiful coral formations dot the beach",
    },
    MapEntry {
        name: "Mystic Cove",
        item_count: 11,
        description: "A mysterious cove filled with ancient relics",
    },
    MapEntry {
        name: "Volcanic Beach",
        item_count: 12,
        description: "Dark volcanic sand conceals rare treasures",
    },
    MapEntry {
        name: "Crystal Shore",
        item_count: 13,
        description: "Crystalline waters reveal sparkling treasures",
    },
    MapEntry {
        name: "Pirate's Haven",
        item_count: 14,
        description: "The legendary pirate hideout!",
    },
    MapEntry {
        name: "Emerald Coast",
        item_count: 15,
        description: "Lush green coastal paradise",
    },
    MapEntry {
        name: "Treasure Island",
        item_count: 16,
        description: "The ultimate treasure hunting destination!",
    },
];

/// Number of authored maps before the catalog cycles.
pub const MAP_TABLE_SIZE: u32 = 10;

/// Resolve the map for `level`, cycling the authored table and adding
/// [`ITEMS_PER_CYCLE_INCREMENT`] items for every completed cycle.
///
/// Levels start at 1; a level of 0 is a caller error and resolves like level 1.
#[must_use]
pub fn map_for_level(level: u32) -> MapTheme {
    debug_assert!(level >= 1, "levels start at 1");
    let offset = level.saturating_sub(1);
    let cycle = offset / MAP_TABLE_SIZE;
    let entry = &MAPS[(offset % MAP_TABLE_SIZE) as usize];
    MapTheme {
        level,
        name: entry.name,
        item_count: entry.item_count + cycle * ITEMS_PER_CYCLE_INCREMENT,
        description: entry.description,
    }
}

/// XP shown as the target for the progress bar on `level`.
#[must_use]
pub fn xp_for_next_level(level: u32) -> u32 {
    map_for_level(level).item_count * XP_PER_MAP_ITEM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_cycle_matches_authored_table() {
        assert_eq!(map_for_level(1).item_count, 7);
        assert_eq!(map_for_level(1).name, "Sunny Beach");
        assert_eq!(map_for_level(10).item_count, 16);
        assert_eq!(map_for_level(10).name, "Treasure Island");
    }

    #[test]
    fn cycles_add_two_items_each_pass() {
        assert_eq!(map_for_level(11).item_count, map_for_level(1).item_count + 2);
        assert_eq!(map_for_level(11).name, "Sunny Beach");
        assert_eq!(map_for_level(11).level, 11);
        assert_eq!(map_for_level(25).item_count, 9 + 4);
    }

    #[test]
    fn item_count_never_drops_across_cycles() {
        for level in 1..200 {
            let here = map_for_level(level);
            let next_cycle = map_for_level(level + MAP_TABLE_SIZE);
            assert!(next_cycle.item_count > here.item_count);
        }
    }

    #[test]
    fn progress_target_scales_with_item_count() {
        assert_eq!(xp_for_next_level(1), 350);
        assert_eq!(xp_for_next_level(11), 450);
    }
}
