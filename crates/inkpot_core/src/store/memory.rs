//! Ephemeral collection store.
//!
//! # Responsibility
//! - Hold serialized collections in memory for tests and short-lived use.
//! - Expose the raw serialized form so tests can inject malformed content
//!   and inspect exactly what a flush produced.
//!
//! # Invariants
//! - Content goes through the same serialize/deserialize pipeline as the
//!   durable store, so shape mismatches surface identically.

use super::{validate_collection_name, CollectionStore, StoreError, StoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory collection store keyed by collection name.
///
/// Wrap it in an `Arc` to share one backing map across repositories.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the serialized text held for `collection`, if any.
    pub fn raw(&self, collection: &str) -> Option<String> {
        self.read_guard().get(collection).cloned()
    }

    /// Replaces `collection` with raw serialized text, bypassing encoding.
    ///
    /// Intended for tests that need malformed or hand-authored content.
    pub fn put_raw(&self, collection: &str, text: impl Into<String>) {
        self.write_guard()
            .insert(collection.to_string(), text.into());
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, HashMap<String, String>> {
        // Writers replace whole entries, so adopting a poisoned map is safe.
        self.collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, HashMap<String, String>> {
        self.collections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl CollectionStore for MemoryStore {
    fn load<T: DeserializeOwned>(&self, collection: &str) -> StoreResult<Vec<T>> {
        validate_collection_name(collection)?;
        let text = self
            .read_guard()
            .get(collection)
            .cloned()
            .ok_or_else(|| StoreError::Missing {
                collection: collection.to_string(),
            })?;

        serde_json::from_str(&text).map_err(|err| StoreError::Malformed {
            collection: collection.to_string(),
            message: err.to_string(),
        })
    }

    fn save<T: Serialize>(&self, collection: &str, records: &[T]) -> StoreResult<()> {
        validate_collection_name(collection)?;
        let mut text =
            serde_json::to_string_pretty(records).map_err(|err| StoreError::Encode {
                collection: collection.to_string(),
                message: err.to_string(),
            })?;
        text.push('\n');

        self.write_guard().insert(collection.to_string(), text);
        Ok(())
    }
}
