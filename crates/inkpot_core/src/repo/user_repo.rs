//! User account repository.
//!
//! # Responsibility
//! - Provide account CRUD over the resident `users` collection cache.
//! - Enforce id stability and normalized-email uniqueness.
//!
//! # Invariants
//! - Write paths call `User::validate()` before the flush.
//! - The resident cache is replaced only after a successful flush.
//! - Load paths reject duplicate ids/emails instead of masking them.
//!
//! # See also
//! - docs/architecture/storage.md

use crate::model::now_epoch_ms;
use crate::model::user::{Profile, ProfilePatch, User, UserId, UserValidationError};
use crate::store::{CollectionStore, StoreError, StoreResult};
use log::error;
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

const USERS_COLLECTION: &str = "users";

pub type UserRepoResult<T> = Result<T, UserRepoError>;

/// Errors from user persistence and lookup operations.
#[derive(Debug)]
pub enum UserRepoError {
    /// Record-level invariant violated before persisting.
    Validation(UserValidationError),
    /// Another account already owns this normalized email.
    DuplicateEmail(String),
    /// Target account does not exist.
    NotFound(UserId),
    /// Persisted collection content violates repository invariants.
    InvalidData(String),
    /// Storage-layer failure.
    Store(StoreError),
}

impl Display for UserRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateEmail(email) => write!(f, "email already registered: {email}"),
            Self::NotFound(id) => write!(f, "user not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted user data: {message}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for UserRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UserValidationError> for UserRepoError {
    fn from(value: UserValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for UserRepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Input for account creation. Ids and timestamps are assigned by the
/// repository.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password: String,
    pub profile: Profile,
    pub roles: BTreeSet<String>,
}

/// Collection-store-backed account repository.
///
/// Holds the authoritative account map in memory; the store is hydrated once
/// at construction and written through after every mutation.
#[derive(Debug)]
pub struct UserRepository<S: CollectionStore> {
    store: S,
    users: RwLock<BTreeMap<UserId, User>>,
}

impl<S: CollectionStore> UserRepository<S> {
    /// Opens the repository over an existing `users` collection.
    ///
    /// # Errors
    /// - `Store(Missing)` when the collection has never been saved; use
    ///   [`UserRepository::open_or_init`] for first-run bootstrap.
    /// - `InvalidData` when the persisted content breaks id or email
    ///   uniqueness or fails record validation.
    pub fn open(store: S) -> UserRepoResult<Self> {
        let records: Vec<User> = store.load(USERS_COLLECTION)?;
        let users = index_users(records)?;
        Ok(Self {
            store,
            users: RwLock::new(users),
        })
    }

    /// Opens the repository, writing an empty collection on first run.
    pub fn open_or_init(store: S) -> UserRepoResult<Self> {
        match store.load::<User>(USERS_COLLECTION) {
            Ok(records) => {
                let users = index_users(records)?;
                Ok(Self {
                    store,
                    users: RwLock::new(users),
                })
            }
            Err(StoreError::Missing { .. }) => {
                store.save::<User>(USERS_COLLECTION, &[])?;
                Ok(Self {
                    store,
                    users: RwLock::new(BTreeMap::new()),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Gets one account by id.
    pub fn find(&self, id: UserId) -> Option<User> {
        self.read_guard().get(&id).cloned()
    }

    /// Gets one account by email, compared after normalization.
    pub fn find_by_email(&self, email: &str) -> Option<User> {
        let normalized = normalize_email(email);
        self.read_guard()
            .values()
            .find(|user| normalize_email(&user.email) == normalized)
            .cloned()
    }

    /// Lists all accounts in id order.
    pub fn list(&self) -> Vec<User> {
        self.read_guard().values().cloned().collect()
    }

    /// Creates an account with the next free id and freshly stamped
    /// timestamps. The stored email is the normalized form.
    ///
    /// # Errors
    /// - `DuplicateEmail` when the normalized email is already registered.
    /// - `Validation` when the resulting record is invalid.
    /// - `Store` when the flush fails; nothing is applied.
    pub fn create(&self, new_user: NewUser) -> UserRepoResult<User> {
        let mut users = self.write_guard();

        let email = normalize_email(&new_user.email);
        let duplicate = users
            .values()
            .any(|user| normalize_email(&user.email) == email);
        if duplicate {
            return Err(UserRepoError::DuplicateEmail(email));
        }

        let now = now_epoch_ms();
        let user = User {
            id: next_id(&users),
            email,
            name: new_user.name,
            password: new_user.password,
            profile: new_user.profile,
            roles: new_user.roles,
            created_at: now,
            updated_at: now,
        };
        user.validate()?;

        let mut updated = users.clone();
        updated.insert(user.id, user.clone());
        self.flush(&updated)?;
        *users = updated;

        Ok(user)
    }

    /// Merges `patch` into the account profile, field by field.
    ///
    /// # Errors
    /// - `NotFound` when the account does not exist.
    /// - `Store` when the flush fails; nothing is applied.
    pub fn update_profile(&self, id: UserId, patch: &ProfilePatch) -> UserRepoResult<User> {
        let mut users = self.write_guard();

        let mut updated = users.clone();
        let user = updated.get_mut(&id).ok_or(UserRepoError::NotFound(id))?;
        user.profile.apply(patch);
        user.touch(now_epoch_ms());
        let result = user.clone();

        self.flush(&updated)?;
        *users = updated;

        Ok(result)
    }

    /// Replaces the whole role set. This is not a merge: roles absent from
    /// `roles` are removed.
    ///
    /// # Errors
    /// - `NotFound` when the account does not exist.
    /// - `Validation(EmptyRoles)` when `roles` is empty.
    /// - `Store` when the flush fails; nothing is applied.
    pub fn replace_roles(&self, id: UserId, roles: BTreeSet<String>) -> UserRepoResult<User> {
        let mut users = self.write_guard();

        let mut updated = users.clone();
        let user = updated.get_mut(&id).ok_or(UserRepoError::NotFound(id))?;
        user.roles = roles;
        user.touch(now_epoch_ms());
        user.validate()?;
        let result = user.clone();

        self.flush(&updated)?;
        *users = updated;

        Ok(result)
    }

    fn flush(&self, users: &BTreeMap<UserId, User>) -> StoreResult<()> {
        let records: Vec<&User> = users.values().collect();
        self.store.save(USERS_COLLECTION, &records)
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, BTreeMap<UserId, User>> {
        match self.users.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                // The cache is only replaced wholesale after a successful
                // flush, so a panicked writer cannot leave it half-applied.
                error!("event=lock_recovered module=user_repo status=error lock=users");
                self.users.clear_poison();
                poisoned.into_inner()
            }
        }
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, BTreeMap<UserId, User>> {
        match self.users.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("event=lock_recovered module=user_repo status=error lock=users");
                self.users.clear_poison();
                poisoned.into_inner()
            }
        }
    }
}

/// Normalizes an email for uniqueness checks and lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Normalizes a raw role list: entries are trimmed, blanks dropped and
/// duplicates collapsed. Case is preserved.
pub fn normalize_roles(roles: &[String]) -> BTreeSet<String> {
    roles
        .iter()
        .map(|role| role.trim())
        .filter(|role| !role.is_empty())
        .map(str::to_string)
        .collect()
}

fn next_id(users: &BTreeMap<UserId, User>) -> UserId {
    users.keys().next_back().map_or(1, |last| last + 1)
}

fn index_users(records: Vec<User>) -> UserRepoResult<BTreeMap<UserId, User>> {
    let mut users = BTreeMap::new();
    let mut emails = BTreeSet::new();

    for user in records {
        if let Err(err) = user.validate() {
            return Err(UserRepoError::InvalidData(format!(
                "user {}: {err}",
                user.id
            )));
        }
        if !emails.insert(normalize_email(&user.email)) {
            return Err(UserRepoError::InvalidData(format!(
                "duplicate email `{}` in users collection",
                user.email
            )));
        }
        let id = user.id;
        if users.insert(id, user).is_some() {
            return Err(UserRepoError::InvalidData(format!(
                "duplicate user id `{id}` in users collection"
            )));
        }
    }

    Ok(users)
}
