//! Flat-file collection storage boundary.
//!
//! # Responsibility
//! - Define the whole-collection load/save contract used by repositories.
//! - Keep encoding and filesystem details out of repository/service code.
//!
//! # Invariants
//! - `load` is all-or-nothing: a malformed collection never partially parses.
//! - `save` rewrites the whole collection; a failed save leaves the previous
//!   content readable.
//! - Collection names are restricted to `[a-z0-9_]+` so they stay safe as
//!   file stems and map keys.
//!
//! # See also
//! - docs/architecture/storage.md

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from collection load/save operations.
#[derive(Debug)]
pub enum StoreError {
    /// The collection has never been saved.
    Missing { collection: String },
    /// The persisted content cannot be decoded into the requested records.
    Malformed { collection: String, message: String },
    /// The records cannot be encoded into the persisted representation.
    Encode { collection: String, message: String },
    /// Filesystem-level failure while reading or writing the collection.
    Io {
        collection: String,
        source: std::io::Error,
    },
    /// Collection name is unusable as a storage key.
    InvalidName(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing { collection } => {
                write!(f, "collection `{collection}` does not exist")
            }
            Self::Malformed {
                collection,
                message,
            } => write!(f, "collection `{collection}` is malformed: {message}"),
            Self::Encode {
                collection,
                message,
            } => write!(f, "collection `{collection}` cannot be encoded: {message}"),
            Self::Io { collection, source } => {
                write!(f, "collection `{collection}` io failure: {source}")
            }
            Self::InvalidName(name) => write!(
                f,
                "invalid collection name `{name}`; expected [a-z0-9_]+"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Whole-collection storage contract.
///
/// Implementations persist each named collection as one self-contained
/// document. There is no per-record access: repositories own in-memory state
/// and use this trait only to hydrate at startup and to flush after
/// mutations.
pub trait CollectionStore {
    /// Loads every record of `collection`.
    ///
    /// # Errors
    /// - `Missing` when the collection has never been saved.
    /// - `Malformed` when the persisted content cannot be decoded. No
    ///   partial result is ever produced.
    fn load<T: DeserializeOwned>(&self, collection: &str) -> StoreResult<Vec<T>>;

    /// Replaces `collection` with exactly `records`.
    ///
    /// # Errors
    /// - `Encode` when the records cannot be serialized.
    /// - `Io` when the write fails; previous content stays readable.
    fn save<T: Serialize>(&self, collection: &str, records: &[T]) -> StoreResult<()>;
}

/// Lets several repositories share one store instance.
impl<S: CollectionStore> CollectionStore for Arc<S> {
    fn load<T: DeserializeOwned>(&self, collection: &str) -> StoreResult<Vec<T>> {
        (**self).load(collection)
    }

    fn save<T: Serialize>(&self, collection: &str, records: &[T]) -> StoreResult<()> {
        (**self).save(collection, records)
    }
}

/// Validates a collection name for use as a storage key and file stem.
pub fn validate_collection_name(name: &str) -> StoreResult<()> {
    let acceptable = !name.is_empty()
        && name
            .bytes()
            .all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'_');
    if !acceptable {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate_collection_name;

    #[test]
    fn collection_names_are_lowercase_snake() {
        assert!(validate_collection_name("users").is_ok());
        assert!(validate_collection_name("blog_posts_v2").is_ok());

        assert!(validate_collection_name("").is_err());
        assert!(validate_collection_name("Users").is_err());
        assert!(validate_collection_name("users/accounts").is_err());
        assert!(validate_collection_name("users.json").is_err());
        assert!(validate_collection_name("../users").is_err());
    }
}
