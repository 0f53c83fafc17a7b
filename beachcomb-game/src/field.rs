//! Field generation: positioned, level-appropriate items for one map.
use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::catalog::{ItemTemplate, item_value, templates_unlocked_at};
use crate::constants::{
    FIELD_MIN_X, FIELD_MIN_Y, FIELD_SPAN_X, FIELD_SPAN_Y, MIN_ITEM_SEPARATION,
    PLACEMENT_ATTEMPT_CAP,
};
use crate::equipment::DetectorTier;
use crate::maps::map_for_level;
use crate::rarity::RarityTier;
use crate::seed::field_rng;

/// A point in field coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Whether the point lies inside the rectangle items are placed in.
    #[must_use]
    pub fn in_playable_area(self) -> bool {
        (FIELD_MIN_X..=FIELD_MIN_X + FIELD_SPAN_X).contains(&self.x)
            && (FIELD_MIN_Y..=FIELD_MIN_Y + FIELD_SPAN_Y).contains(&self.y)
    }
}

/// An item buried in a field. Also the record kept in the collection once dug up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedItem {
    pub id: u64,
    #[serde(flatten)]
    pub position: Position,
    pub name: String,
    pub emoji: String,
    pub rarity: RarityTier,
    pub value: u64,
    #[serde(default)]
    pub found: bool,
    #[serde(default)]
    pub sold: bool,
    /// Combo multiplier in effect when the item was dug up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combo_multiplier: Option<f64>,
}

impl PlacedItem {
    #[must_use]
    pub fn from_template(id: u64, position: Position, template: &ItemTemplate) -> Self {
        Self {
            id,
            position,
            name: template.name.to_string(),
            emoji: template.glyph.to_string(),
            rarity: template.rarity,
            value: item_value(template.rarity),
            found: false,
            sold: false,
            combo_multiplier: None,
        }
    }

    #[must_use]
    pub fn distance_to(&self, point: Position) -> f64 {
        self.position.distance_to(point)
    }
}

fn sample_position<R: Rng + ?Sized>(rng: &mut R) -> Position {
    Position::new(
        FIELD_MIN_X + rng.gen_range(0.0..FIELD_SPAN_X),
        FIELD_MIN_Y + rng.gen_range(0.0..FIELD_SPAN_Y),
    )
}

fn well_separated(candidate: Position, placed: &[PlacedItem]) -> bool {
    placed
        .iter()
        .all(|item| item.position.distance_to(candidate) >= MIN_ITEM_SEPARATION)
}

/// Place up to the map's item count of detectable templates for `level`.
///
/// Ids are assigned sequentially starting at `first_id`. Separation is a soft
/// target: once [`PLACEMENT_ATTEMPT_CAP`] samples fail, the last sample is kept.
/// A detectable set that excludes every unlocked template yields an empty field.
pub fn generate_field<R: Rng + ?Sized>(
    level: u32,
    detectable: &[RarityTier],
    rng: &mut R,
    first_id: u64,
) -> Vec<PlacedItem> {
    let map = map_for_level(level);
    let pool: Vec<&ItemTemplate> = templates_unlocked_at(level)
        .into_iter()
        .filter(|template| detectable.contains(&template.rarity))
        .collect();

    let mut items: Vec<PlacedItem> = Vec::with_capacity(map.item_count as usize);
    if pool.is_empty() {
        debug!("level {level}: nothing detectable on {}", map.name);
        return items;
    }

    let mut crowded = 0usize;
    let mut next_id = first_id;
    for _ in 0..map.item_count {
        let Some(template) = pool.choose(rng) else {
            break;
        };
        let mut position = sample_position(rng);
        let mut attempts = 1;
        while !well_separated(position, &items) && attempts < PLACEMENT_ATTEMPT_CAP {
            position = sample_position(rng);
            attempts += 1;
        }
        if !well_separated(position, &items) {
            crowded += 1;
        }
        items.push(PlacedItem::from_template(next_id, position, template));
        next_id += 1;
    }

    debug!(
        "level {level}: placed {} items on {} ({crowded} crowded)",
        items.len(),
        map.name
    );
    items
}

/// Session-owned generator: derives a fresh RNG stream per field and keeps
/// item ids unique across every field it produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldGenerator {
    seed: u64,
    generation: u64,
    next_id: u64,
}

impl FieldGenerator {
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            seed,
            generation: 0,
            next_id: 1,
        }
    }

    /// Resume a generator so new ids start after `highest_used_id`.
    #[must_use]
    pub const fn resume(seed: u64, generation: u64, highest_used_id: u64) -> Self {
        Self {
            seed,
            generation,
            next_id: highest_used_id + 1,
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of fields generated so far.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Generate the next field in this session's sequence.
    pub fn next_field(&mut self, level: u32, detector: DetectorTier) -> Vec<PlacedItem> {
        let mut rng = field_rng(self.seed, self.generation);
        self.generation += 1;
        let detectable = detector.detectable_rarities();
        let items = generate_field(level, &detectable, &mut rng, self.next_id);
        if let Some(last) = items.last() {
            self.next_id = last.id + 1;
        }
        items
    }
}
