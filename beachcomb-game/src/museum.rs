//! Read-only views over a collection.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::field::PlacedItem;
use crate::rarity::RarityTier;

/// Ordering applied to museum listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MuseumSort {
    /// Rarest first, by museum rank.
    #[default]
    Rarity,
    /// Most valuable first.
    Value,
    /// Alphabetical.
    Name,
}

impl MuseumSort {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rarity => "rarity",
            Self::Value => "value",
            Self::Name => "name",
        }
    }
}

impl fmt::Display for MuseumSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MuseumSort {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rarity" => Ok(Self::Rarity),
            "value" => Ok(Self::Value),
            "name" => Ok(Self::Name),
            _ => Err(()),
        }
    }
}

/// Items of `rarity`, or every item when `None`, in collection order.
#[must_use]
pub fn filter(collection: &[PlacedItem], rarity: Option<RarityTier>) -> Vec<&PlacedItem> {
    collection
        .iter()
        .filter(|item| rarity.is_none_or(|wanted| item.rarity == wanted))
        .collect()
}

/// Stable sort of a museum listing.
pub fn sort_by(items: &mut [&PlacedItem], order: MuseumSort) {
    match order {
        MuseumSort::Rarity => items.sort_by_key(|item| item.rarity.attributes().museum_rank),
        MuseumSort::Value => items.sort_by(|a, b| b.value.cmp(&a.value)),
        MuseumSort::Name => items.sort_by(|a, b| a.name.cmp(&b.name)),
    }
}

/// Filtered and sorted listing in one call.
#[must_use]
pub fn exhibit(
    collection: &[PlacedItem],
    rarity: Option<RarityTier>,
    order: MuseumSort,
) -> Vec<&PlacedItem> {
    let mut items = filter(collection, rarity);
    sort_by(&mut items, order);
    items
}

/// Sum of base values, sold items included.
#[must_use]
pub fn total_value(collection: &[PlacedItem]) -> u64 {
    collection.iter().map(|item| item.value).sum()
}

#[must_use]
pub fn rarity_count(collection: &[PlacedItem], rarity: RarityTier) -> usize {
    collection.iter().filter(|item| item.rarity == rarity).count()
}

#[must_use]
pub fn unsold_count(collection: &[PlacedItem]) -> usize {
    collection.iter().filter(|item| !item.sold).count()
}
