//! User account domain model.
//!
//! # Responsibility
//! - Define the canonical account record persisted in the `users` collection.
//! - Provide profile patch merge semantics and record-level validation.
//!
//! # Invariants
//! - `id` is stable and never reused for another account.
//! - `email` is unique across the collection (enforced by the repository,
//!   compared after normalization).
//! - `roles` is never empty for a registered account.
//!
//! # See also
//! - docs/architecture/data-model.md

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier for a user account.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
/// Assigned monotonically per collection (`max + 1`).
pub type UserId = u64;

/// Canonical persisted account record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable numeric id used for session binding and lookups.
    pub id: UserId,
    /// Login identity, stored normalized (trimmed, ASCII-lowercased).
    pub email: String,
    /// Display name. Defaults to the email local part at registration.
    pub name: String,
    /// Opaque secret material. Core compares it through a
    /// `PasswordVerifier`; it never interprets the content.
    pub password: String,
    /// Optional descriptive fields, patched per-field.
    #[serde(default)]
    pub profile: Profile,
    /// Sorted, deduplicated role names. Non-empty after registration.
    pub roles: BTreeSet<String>,
    /// Unix epoch milliseconds, stamped at creation.
    pub created_at: i64,
    /// Unix epoch milliseconds, bumped by profile/role mutations.
    pub updated_at: i64,
}

/// Fixed set of optional descriptive account fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
}

/// Per-field profile update. Absent fields leave the stored value untouched.
///
/// There is no clear-a-field channel: a patch can set values but never remove
/// them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePatch {
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
}

impl Profile {
    /// Merges `patch` into this profile with per-field last-write-wins.
    pub fn apply(&mut self, patch: &ProfilePatch) {
        if let Some(bio) = &patch.bio {
            self.bio = Some(bio.clone());
        }
        if let Some(avatar_url) = &patch.avatar_url {
            self.avatar_url = Some(avatar_url.clone());
        }
        if let Some(location) = &patch.location {
            self.location = Some(location.clone());
        }
        if let Some(website) = &patch.website {
            self.website = Some(website.clone());
        }
    }
}

/// Record-level validation failures for `User`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserValidationError {
    /// Email is empty or whitespace-only.
    BlankEmail,
    /// Password is empty or whitespace-only.
    BlankPassword,
    /// Role set is empty.
    EmptyRoles,
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankEmail => write!(f, "user email cannot be blank"),
            Self::BlankPassword => write!(f, "user password cannot be blank"),
            Self::EmptyRoles => write!(f, "user role set cannot be empty"),
        }
    }
}

impl Error for UserValidationError {}

impl User {
    /// Checks record-level invariants shared by every write path.
    ///
    /// # Errors
    /// - `BlankEmail` when the email is empty or whitespace-only.
    /// - `BlankPassword` when the password is empty or whitespace-only.
    /// - `EmptyRoles` when the role set is empty.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        if self.email.trim().is_empty() {
            return Err(UserValidationError::BlankEmail);
        }
        if self.password.trim().is_empty() {
            return Err(UserValidationError::BlankPassword);
        }
        if self.roles.is_empty() {
            return Err(UserValidationError::EmptyRoles);
        }
        Ok(())
    }

    /// Marks this record as mutated at `now` (epoch milliseconds).
    pub fn touch(&mut self, now: i64) {
        self.updated_at = now;
    }
}
