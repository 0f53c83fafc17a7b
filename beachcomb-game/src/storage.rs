//! Key/value persistence of progression and the collection.
use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::rc::Rc;

use log::warn;
use thiserror::Error;

use crate::field::PlacedItem;
use crate::state::ProgressSnapshot;

/// Trait for abstracting blob persistence.
/// Platform-specific implementations should provide this.
pub trait GameStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the blob stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Store `blob` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn write(&self, key: &str, blob: &str) -> Result<(), Self::Error>;

    /// Delete the blob under `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the removal.
    fn remove(&self, key: &str) -> Result<(), Self::Error>;
}

#[derive(Debug, Error)]
pub enum StorageError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[error("failed to encode {key}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("storage backend failed on {key}")]
    Backend {
        key: &'static str,
        #[source]
        source: E,
    },
}

/// In-process storage, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blobs: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blobs.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blobs.borrow().is_empty()
    }
}

impl GameStorage for MemoryStorage {
    type Error = Infallible;

    fn read(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.blobs.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, blob: &str) -> Result<(), Self::Error> {
        self.blobs
            .borrow_mut()
            .insert(key.to_string(), blob.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        self.blobs.borrow_mut().remove(key);
        Ok(())
    }
}

/// Decode a `gameState` blob, falling back to a fresh snapshot.
#[must_use]
pub fn decode_progress(blob: Option<&str>) -> ProgressSnapshot {
    let Some(blob) = blob else {
        return ProgressSnapshot::default();
    };
    serde_json::from_str(blob).unwrap_or_else(|err| {
        warn!("discarding unreadable game state: {err}");
        ProgressSnapshot::default()
    })
}

/// Decode a `treasureCollection` blob, falling back to an empty collection.
#[must_use]
pub fn decode_collection(blob: Option<&str>) -> Vec<PlacedItem> {
    let Some(blob) = blob else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<PlacedItem>>(blob) {
        Ok(mut items) => {
            for item in &mut items {
                item.found = true;
            }
            items
        }
        Err(err) => {
            warn!("discarding unreadable collection: {err}");
            Vec::new()
        }
    }
}
