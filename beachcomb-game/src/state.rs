//! Session state, lifecycle phase, and the persisted progression snapshot.
use serde::{Deserialize, Deserializer, Serialize};

use crate::equipment::{DetectorTier, ShovelTier};
use crate::field::PlacedItem;

/// Where a session is in its detect → dig → advance lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum SessionPhase {
    /// No field has been generated yet.
    #[default]
    Idle,
    /// A field is in progress.
    Active,
    /// Every item in the field is found; the next level starts at `advance_at`.
    FieldCleared { advance_at: u64 },
}

impl SessionPhase {
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Mutable root of a play session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub player_level: u32,
    pub player_xp: u32,
    pub coins: u64,
    pub detector: DetectorTier,
    pub shovel: ShovelTier,
    pub combo: u32,
    /// Millisecond timestamp at which the combo lapses; `None` while no combo runs.
    pub combo_deadline: Option<u64>,
    pub streak: u32,
    pub best_streak: u32,
    pub current_field: Vec<PlacedItem>,
    /// Every item ever dug up, in dig order.
    pub collection: Vec<PlacedItem>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            player_level: 1,
            player_xp: 0,
            coins: 0,
            detector: DetectorTier::default(),
            shovel: ShovelTier::default(),
            combo: 0,
            combo_deadline: None,
            streak: 0,
            best_streak: 0,
            current_field: Vec::new(),
            collection: Vec::new(),
        }
    }
}

impl SessionState {
    /// Items in the current field that are still buried.
    pub fn hidden_items(&self) -> impl Iterator<Item = &PlacedItem> {
        self.current_field.iter().filter(|item| !item.found)
    }

    #[must_use]
    pub fn hidden_count(&self) -> usize {
        self.hidden_items().count()
    }

    /// Collection entries not yet sold, in collection order.
    pub fn unsold_items(&self) -> impl Iterator<Item = &PlacedItem> {
        self.collection.iter().filter(|item| !item.sold)
    }

    #[must_use]
    pub fn unsold_count(&self) -> usize {
        self.unsold_items().count()
    }

    /// Highest item id this session has handed out, across field and collection.
    #[must_use]
    pub fn highest_item_id(&self) -> u64 {
        self.current_field
            .iter()
            .chain(&self.collection)
            .map(|item| item.id)
            .max()
            .unwrap_or(0)
    }

    /// Progression fields that are persisted between runs.
    #[must_use]
    pub fn progress(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            level: self.player_level,
            xp: self.player_xp,
            coins: self.coins,
            detector: self.detector,
            shovel: self.shovel,
            best_streak: self.best_streak,
        }
    }
}

/// The `gameState` blob: a snapshot of progression, written after every change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub xp: u32,
    #[serde(default)]
    pub coins: u64,
    #[serde(default, deserialize_with = "stored_tool")]
    pub detector: DetectorTier,
    #[serde(default, deserialize_with = "stored_tool")]
    pub shovel: ShovelTier,
    #[serde(default)]
    pub best_streak: u32,
}

/// Default level for snapshots missing the field.
fn default_level() -> u32 {
    1
}

/// A saved tool: either its tier id or the whole catalog entry.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredTool<T> {
    Id(T),
    Entry { tier: T },
}

fn stored_tool<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    match StoredTool::<T>::deserialize(deserializer)? {
        StoredTool::Id(tier) | StoredTool::Entry { tier } => Ok(tier),
    }
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        SessionState::default().progress()
    }
}

impl ProgressSnapshot {
    /// Build a state from a persisted snapshot and collection.
    #[must_use]
    pub fn into_state(self, collection: Vec<PlacedItem>) -> SessionState {
        SessionState {
            player_level: self.level.max(1),
            player_xp: self.xp,
            coins: self.coins,
            detector: self.detector,
            shovel: self.shovel,
            best_streak: self.best_streak,
            collection,
            ..SessionState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Position;

    fn item(id: u64, found: bool, sold: bool) -> PlacedItem {
        PlacedItem {
            id,
            position: Position::new(200.0, 200.0),
            name: format!("Item {id}"),
            emoji: "🪙".to_string(),
            rarity: crate::RarityTier::Common,
            value: 50,
            found,
            sold,
            combo_multiplier: None,
        }
    }

    #[test]
    fn default_state_starts_at_level_one_with_starter_tools() {
        let state = SessionState::default();
        assert_eq!(state.player_level, 1);
        assert_eq!(state.detector, DetectorTier::Basic);
        assert_eq!(state.shovel, ShovelTier::Basic);
        assert_eq!(state.highest_item_id(), 0);
    }

    #[test]
    fn counts_hidden_and_unsold() {
        let state = SessionState {
            current_field: vec![item(1, true, false), item(2, false, false)],
            collection: vec![item(1, true, true), item(7, true, false)],
            ..SessionState::default()
        };
        assert_eq!(state.hidden_count(), 1);
        assert_eq!(state.unsold_count(), 1);
        assert_eq!(state.highest_item_id(), 7);
    }

    #[test]
    fn snapshot_fills_missing_fields_with_defaults() {
        let snapshot: ProgressSnapshot = serde_json::from_str(r#"{"coins": 900}"#).unwrap();
        assert_eq!(snapshot.level, 1);
        assert_eq!(snapshot.coins, 900);
        assert_eq!(snapshot.detector, DetectorTier::Basic);
    }

    #[test]
    fn snapshot_reads_tools_saved_as_catalog_entries() {
        let snapshot: ProgressSnapshot = serde_json::from_str(
            r#"{
                "level": 9,
                "detector": {"id": 2, "name": "Upgraded Detector", "tier": "upgraded", "price": 5000},
                "shovel": {"id": 1, "tier": "basic", "valueMultiplier": 1}
            }"#,
        )
        .unwrap();
        assert_eq!(snapshot.level, 9);
        assert_eq!(snapshot.detector, DetectorTier::Upgraded);
        assert_eq!(snapshot.shovel, ShovelTier::Basic);

        let unknown = r#"{"detector": {"id": 9, "tier": "golden"}}"#;
        assert!(serde_json::from_str::<ProgressSnapshot>(unknown).is_err());
    }

    #[test]
    fn snapshot_uses_persisted_key_names() {
        let snapshot = ProgressSnapshot {
            level: 4,
            xp: 120,
            coins: 3_000,
            detector: DetectorTier::Upgraded,
            shovel: ShovelTier::Basic,
            best_streak: 9,
        };
        let value = serde_json::to_value(snapshot).unwrap();
        assert_eq!(value["level"], 4);
        assert_eq!(value["bestStreak"], 9);
        assert_eq!(value["detector"], "upgraded");
    }

    #[test]
    fn level_zero_snapshot_restores_to_level_one() {
        let snapshot = ProgressSnapshot {
            level: 0,
            ..ProgressSnapshot::default()
        };
        assert_eq!(snapshot.into_state(Vec::new()).player_level, 1);
    }

    #[test]
    fn phase_reports_activity() {
        assert!(SessionPhase::Active.is_active());
        assert!(!SessionPhase::FieldCleared { advance_at: 5 }.is_active());
        assert_eq!(SessionPhase::default(), SessionPhase::Idle);
    }
}
