//! Repository layer: resident caches over collection storage.
//!
//! # Responsibility
//! - Own the authoritative in-memory state for each persisted collection.
//! - Serialize mutations and keep cache and file in lockstep.
//!
//! # Invariants
//! - Each collection has exactly one owning repository per process; nothing
//!   else writes its backing file.
//! - A mutation flushes the new state through the store before the resident
//!   cache is replaced; a failed flush changes nothing.
//! - Repository reads never touch storage after startup.
//!
//! # See also
//! - docs/architecture/storage.md

pub mod blog_repo;
pub mod user_repo;
