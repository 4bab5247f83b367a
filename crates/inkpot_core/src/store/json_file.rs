//! Durable JSON collection store.
//!
//! # Responsibility
//! - Persist each collection as one human-readable `<name>.json` file.
//! - Keep collection replacement atomic with respect to concurrent readers.
//!
//! # Invariants
//! - Files hold a pretty-printed JSON array plus a trailing newline; the
//!   formatting is not semantically significant and must round-trip.
//! - A failed save leaves the previous file untouched (write to a temp file
//!   in the same directory, then rename over the target).
//!
//! # See also
//! - docs/architecture/storage.md

use super::{validate_collection_name, CollectionStore, StoreError, StoreResult};
use log::{error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// File-backed collection store rooted at one directory.
///
/// The directory is created lazily on first save, so pointing the store at a
/// fresh deployment path needs no separate setup step.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Creates a store over `dir`. The directory itself may not exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the backing directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file path that backs `collection`.
    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{collection}.json"))
    }

    fn replace_collection_file(&self, collection: &str, bytes: &[u8]) -> StoreResult<()> {
        fs::create_dir_all(&self.dir).map_err(|source| io_error(collection, source))?;

        let target = self.collection_path(collection);
        let (mut file, temp_path) = self.create_temp_file(collection)?;

        if let Err(source) = file.write_all(bytes) {
            let _ = fs::remove_file(&temp_path);
            return Err(io_error(collection, source));
        }
        if let Err(source) = file.sync_all() {
            let _ = fs::remove_file(&temp_path);
            return Err(io_error(collection, source));
        }
        if let Err(source) = fs::rename(&temp_path, &target) {
            let _ = fs::remove_file(&temp_path);
            return Err(io_error(collection, source));
        }

        // The rename is only durable once the directory entry is synced.
        #[cfg(unix)]
        {
            if let Err(source) = sync_dir(&self.dir) {
                warn!(
                    "event=dir_sync module=store status=error collection={collection} error={source}"
                );
            }
        }

        Ok(())
    }

    fn create_temp_file(&self, collection: &str) -> StoreResult<(File, PathBuf)> {
        const MAX_ATTEMPTS: u32 = 16;

        for attempt in 0..MAX_ATTEMPTS {
            let candidate = self.dir.join(format!(
                ".{collection}.json.tmp.{}.{attempt}",
                std::process::id()
            ));
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
            {
                Ok(file) => return Ok((file, candidate)),
                Err(source) if source.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(io_error(collection, source)),
            }
        }

        Err(io_error(
            collection,
            io::Error::new(
                io::ErrorKind::AlreadyExists,
                "temp file name space exhausted",
            ),
        ))
    }
}

impl CollectionStore for JsonFileStore {
    fn load<T: DeserializeOwned>(&self, collection: &str) -> StoreResult<Vec<T>> {
        validate_collection_name(collection)?;
        let started_at = Instant::now();
        info!("event=collection_load module=store status=start collection={collection}");

        let path = self.collection_path(collection);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                warn!(
                    "event=collection_load module=store status=error collection={collection} duration_ms={} error_code=collection_missing",
                    started_at.elapsed().as_millis()
                );
                return Err(StoreError::Missing {
                    collection: collection.to_string(),
                });
            }
            Err(source) => {
                error!(
                    "event=collection_load module=store status=error collection={collection} duration_ms={} error_code=collection_io error={source}",
                    started_at.elapsed().as_millis()
                );
                return Err(io_error(collection, source));
            }
        };

        match serde_json::from_str::<Vec<T>>(&text) {
            Ok(records) => {
                info!(
                    "event=collection_load module=store status=ok collection={collection} records={} duration_ms={}",
                    records.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(records)
            }
            Err(err) => {
                error!(
                    "event=collection_load module=store status=error collection={collection} duration_ms={} error_code=collection_malformed error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(StoreError::Malformed {
                    collection: collection.to_string(),
                    message: err.to_string(),
                })
            }
        }
    }

    fn save<T: Serialize>(&self, collection: &str, records: &[T]) -> StoreResult<()> {
        validate_collection_name(collection)?;
        let started_at = Instant::now();
        info!(
            "event=collection_save module=store status=start collection={collection} records={}",
            records.len()
        );

        let mut text = match serde_json::to_string_pretty(records) {
            Ok(text) => text,
            Err(err) => {
                error!(
                    "event=collection_save module=store status=error collection={collection} duration_ms={} error_code=collection_encode error={err}",
                    started_at.elapsed().as_millis()
                );
                return Err(StoreError::Encode {
                    collection: collection.to_string(),
                    message: err.to_string(),
                });
            }
        };
        text.push('\n');

        match self.replace_collection_file(collection, text.as_bytes()) {
            Ok(()) => {
                info!(
                    "event=collection_save module=store status=ok collection={collection} records={} duration_ms={}",
                    records.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=collection_save module=store status=error collection={collection} duration_ms={} error_code=collection_write_failed error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }
}

fn io_error(collection: &str, source: io::Error) -> StoreError {
    StoreError::Io {
        collection: collection.to_string(),
        source,
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}
