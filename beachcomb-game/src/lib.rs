//! Beachcomb Game Engine
//!
//! Platform-agnostic core logic for a treasure-hunting game on procedurally
//! generated beaches: detector readings, digging, combos and streaks, level
//! progression, the collection economy and persistence. No rendering, audio
//! or wall-clock timers live here; the host passes timestamps in.

pub mod catalog;
pub mod constants;
pub mod equipment;
pub mod field;
pub mod maps;
pub mod museum;
pub mod numbers;
pub mod rarity;
pub mod seed;
pub mod session;
pub mod state;
pub mod storage;

// Re-export commonly used types
pub use catalog::{
    ItemPool, ItemTemplate, combo_multiplier, streak_bonus_xp, templates_unlocked_at,
};
pub use equipment::{DetectorStats, DetectorTier, Equipment, ShovelStats, ShovelTier};
pub use field::{FieldGenerator, PlacedItem, Position, generate_field};
pub use maps::{MapTheme, map_for_level, xp_for_next_level};
pub use museum::MuseumSort;
pub use rarity::{RarityAttributes, RaritySet, RarityTier};
pub use seed::{derive_stream_seed, entropy_seed};
pub use session::{
    DeclineReason, DetectionGlow, DetectionReading, DigOutcome, DigReward, GameSession,
    PurchaseOutcome, SellError, SessionEvent, TickOutcome, ToolPurchase,
};
pub use state::{ProgressSnapshot, SessionPhase, SessionState};
pub use storage::{GameStorage, MemoryStorage, StorageError};

use constants::{COLLECTION_KEY, GAME_STATE_KEY};
use log::{debug, warn};

/// Main game engine: binds sessions to a storage backend.
pub struct GameEngine<S>
where
    S: GameStorage,
{
    storage: S,
}

impl<S> GameEngine<S>
where
    S: GameStorage,
{
    /// Create a new game engine with the provided storage
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Start a brand-new session without touching storage.
    #[must_use]
    pub fn new_session(&self, seed: u64) -> GameSession {
        let mut session = GameSession::new(seed);
        session.start();
        session
    }

    /// Restore progression and collection, then start a session on a fresh field.
    ///
    /// Missing, unreadable or corrupt blobs fall back to defaults; loading
    /// never fails.
    #[must_use]
    pub fn load_session(&self, seed: u64) -> GameSession {
        let progress = self.read_blob(GAME_STATE_KEY);
        let collection = self.read_blob(COLLECTION_KEY);
        let snapshot = storage::decode_progress(progress.as_deref());
        let collection = storage::decode_collection(collection.as_deref());
        debug!(
            "restored level {} with {} collected items",
            snapshot.level.max(1),
            collection.len()
        );
        let mut session = GameSession::from_state(seed, snapshot.into_state(collection));
        session.start();
        session
    }

    fn read_blob(&self, key: &'static str) -> Option<String> {
        self.storage.read(key).unwrap_or_else(|err| {
            warn!("could not read {key}: {err}");
            None
        })
    }

    /// Persist progression and collection.
    ///
    /// # Errors
    ///
    /// Returns an error if either blob cannot be encoded or written.
    pub fn save_session(&self, session: &GameSession) -> Result<(), StorageError<S::Error>> {
        let state = session.state();
        self.write_json(GAME_STATE_KEY, &state.progress())?;
        self.write_json(COLLECTION_KEY, &state.collection)
    }

    fn write_json<T: serde::Serialize + ?Sized>(
        &self,
        key: &'static str,
        value: &T,
    ) -> Result<(), StorageError<S::Error>> {
        let blob =
            serde_json::to_string(value).map_err(|source| StorageError::Encode { key, source })?;
        self.storage
            .write(key, &blob)
            .map_err(|source| StorageError::Backend { key, source })
    }

    /// Forget every persisted blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects a removal.
    pub fn reset(&self) -> Result<(), StorageError<S::Error>> {
        for key in [GAME_STATE_KEY, COLLECTION_KEY] {
            self.storage
                .remove(key)
                .map_err(|source| StorageError::Backend { key, source })?;
        }
        Ok(())
    }
}
