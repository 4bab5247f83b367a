//! Single-slot session state.
//!
//! # Responsibility
//! - Track which account, if any, is currently signed in.
//!
//! # Invariants
//! - At most one binding exists at a time; a new bind replaces the old one.
//! - Session state is volatile: it is never persisted and every process
//!   starts signed out.
//! - `clear` is idempotent.

use crate::model::user::UserId;
use log::error;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Holder of the current-user slot.
///
/// Injected explicitly into services that need sign-in state; there is no
/// process-global session.
#[derive(Debug, Default)]
pub struct SessionManager {
    current: RwLock<Option<UserId>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the slot to `user_id`, replacing any previous binding.
    pub fn bind(&self, user_id: UserId) {
        *self.write_guard() = Some(user_id);
    }

    /// Clears the slot. Safe to call when already signed out.
    pub fn clear(&self) {
        *self.write_guard() = None;
    }

    /// Returns the currently bound account id, if any.
    pub fn current(&self) -> Option<UserId> {
        *self.read_guard()
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, Option<UserId>> {
        match self.current.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                // The slot is written in one assignment, so a poisoned value
                // is still a complete binding.
                error!("event=lock_recovered module=session status=error lock=current");
                self.current.clear_poison();
                poisoned.into_inner()
            }
        }
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, Option<UserId>> {
        match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("event=lock_recovered module=session status=error lock=current");
                self.current.clear_poison();
                poisoned.into_inner()
            }
        }
    }
}
