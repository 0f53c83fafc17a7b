//! Centralized balance and tuning constants for Beachcomb game logic.
//!
//! These values define the deterministic math for the core simulation.
//! Keeping them together ensures that gameplay can only be adjusted via
//! code changes reviewed in version control.

// Playable rectangle --------------------------------------------------------
pub const FIELD_MIN_X: f64 = 120.0;
pub const FIELD_SPAN_X: f64 = 660.0;
pub const FIELD_MIN_Y: f64 = 100.0;
pub const FIELD_SPAN_Y: f64 = 360.0;

// Placement -----------------------------------------------------------------
pub const MIN_ITEM_SEPARATION: f64 = 80.0;
pub const PLACEMENT_ATTEMPT_CAP: u32 = 100;

// Map progression -----------------------------------------------------------
pub const ITEMS_PER_CYCLE_INCREMENT: u32 = 2;
pub const XP_PER_MAP_ITEM: u32 = 50;

// Combo & streak ------------------------------------------------------------
pub const COMBO_TIMEOUT_MS: u64 = 10_000;
pub const STREAK_BONUS_INTERVAL: u32 = 5;
pub const STREAK_BONUS_XP: u32 = 50;

// Session flow --------------------------------------------------------------
pub const LEVEL_ADVANCE_DELAY_MS: u64 = 2_000;
pub const GLOW_STRENGTH_THRESHOLD: f64 = 50.0;
pub const MAX_DETECTION_STRENGTH: f64 = 100.0;

// Persistence keys ----------------------------------------------------------
pub const GAME_STATE_KEY: &str = "gameState";
pub const COLLECTION_KEY: &str = "treasureCollection";

// RNG domain tags -----------------------------------------------------------
pub(crate) const FIELD_STREAM_TAG: &[u8] = b"field";
