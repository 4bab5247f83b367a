//! Canonical domain records for the Inkpot platform.
//!
//! # Responsibility
//! - Define the persisted data structures used by core business logic.
//! - Own record-level validation so every write path shares one rule set.
//!
//! # Invariants
//! - Every record is identified by a numeric id that is never reused.
//! - Timestamps are Unix epoch milliseconds stamped by core, not by storage.
//!
//! # See also
//! - docs/architecture/data-model.md

use std::time::{SystemTime, UNIX_EPOCH};

pub mod blog;
pub mod user;

/// Returns the current wall-clock time as Unix epoch milliseconds.
///
/// A clock set before the epoch collapses to `0` rather than failing; record
/// timestamps are informational and must never block a mutation.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as i64)
}
