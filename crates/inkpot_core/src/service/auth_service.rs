//! Account and sign-in use-case service.
//!
//! # Responsibility
//! - Provide register/login/logout/current-user APIs over the user
//!   repository and session slot.
//! - Own request-level validation: field presence, email format, role
//!   normalization.
//!
//! # Invariants
//! - A failed login or registration never changes the session binding.
//! - `login` reports the same opaque error for unknown email and wrong
//!   password.
//! - Accounts registered without roles receive `DEFAULT_ROLES`.
//!
//! # See also
//! - docs/architecture/storage.md

use crate::model::user::{ProfilePatch, User, UserId};
use crate::repo::user_repo::{
    normalize_email, normalize_roles, NewUser, UserRepoError, UserRepository,
};
use crate::session::SessionManager;
use crate::store::CollectionStore;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Role set granted to accounts registered without explicit roles.
pub const DEFAULT_ROLES: &[&str] = &["gamer", "investor"];

/// Service error for account and sign-in use-cases.
#[derive(Debug)]
pub enum AuthServiceError {
    /// A required request field is empty.
    MissingField(&'static str),
    /// Email does not look like an address.
    InvalidEmail(String),
    /// Another account already owns this email.
    EmailTaken(String),
    /// Unknown email or wrong password; deliberately indistinguishable.
    InvalidCredentials,
    /// Target account does not exist.
    UserNotFound(UserId),
    /// Role update would leave the account with no roles.
    EmptyRoles,
    /// Persistence-layer failure.
    Repo(UserRepoError),
}

impl Display for AuthServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing required field: {field}"),
            Self::InvalidEmail(email) => write!(f, "invalid email address: {email}"),
            Self::EmailTaken(email) => write!(f, "email already registered: {email}"),
            Self::InvalidCredentials => write!(f, "invalid credentials"),
            Self::UserNotFound(user_id) => write!(f, "user not found: {user_id}"),
            Self::EmptyRoles => write!(f, "role update must keep at least one role"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UserRepoError> for AuthServiceError {
    fn from(value: UserRepoError) -> Self {
        match value {
            UserRepoError::DuplicateEmail(email) => Self::EmailTaken(email),
            UserRepoError::NotFound(user_id) => Self::UserNotFound(user_id),
            other => Self::Repo(other),
        }
    }
}

/// Registration input. `name` falls back to the email local part.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

/// Password check seam.
///
/// Core treats stored password material as opaque; swapping in a hashing
/// verifier touches nothing else.
pub trait PasswordVerifier {
    /// Returns whether `candidate` matches the `stored` secret material.
    fn verify(&self, candidate: &str, stored: &str) -> bool;
}

/// Plain comparison verifier for stores holding raw secrets.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatchVerifier;

impl PasswordVerifier for ExactMatchVerifier {
    fn verify(&self, candidate: &str, stored: &str) -> bool {
        candidate == stored
    }
}

/// Account/sign-in service facade.
pub struct AuthService<S: CollectionStore, V: PasswordVerifier = ExactMatchVerifier> {
    users: UserRepository<S>,
    session: SessionManager,
    verifier: V,
}

impl<S: CollectionStore> AuthService<S> {
    /// Creates a service using plain password comparison.
    pub fn new(users: UserRepository<S>, session: SessionManager) -> Self {
        Self::with_verifier(users, session, ExactMatchVerifier)
    }
}

impl<S: CollectionStore, V: PasswordVerifier> AuthService<S, V> {
    /// Creates a service with a caller-provided password verifier.
    pub fn with_verifier(users: UserRepository<S>, session: SessionManager, verifier: V) -> Self {
        Self {
            users,
            session,
            verifier,
        }
    }

    /// Registers an account and signs it in.
    ///
    /// The email is normalized before validation and storage. A missing
    /// display name falls back to the email local part; roles default to
    /// [`DEFAULT_ROLES`].
    ///
    /// # Errors
    /// - `MissingField` when email or password is blank.
    /// - `InvalidEmail` when the email does not look like an address.
    /// - `EmailTaken` when the normalized email is already registered.
    /// - `Repo` on persistence failure; the session stays unchanged.
    pub fn register(&self, request: RegisterRequest) -> Result<User, AuthServiceError> {
        let email = normalize_email(&request.email);
        if email.is_empty() {
            return Err(AuthServiceError::MissingField("email"));
        }
        if request.password.trim().is_empty() {
            return Err(AuthServiceError::MissingField("password"));
        }
        if !EMAIL_RE.is_match(&email) {
            return Err(AuthServiceError::InvalidEmail(email));
        }

        let name = match request.name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => default_name_for(&email),
        };

        let user = self.users.create(NewUser {
            email,
            name,
            password: request.password,
            profile: Default::default(),
            roles: default_roles(),
        })?;

        self.session.bind(user.id);
        Ok(user)
    }

    /// Signs an account in.
    ///
    /// # Errors
    /// - `InvalidCredentials` for unknown email and for wrong password; the
    ///   two cases are deliberately indistinguishable and the session stays
    ///   unchanged.
    pub fn login(&self, email: &str, password: &str) -> Result<User, AuthServiceError> {
        let user = self
            .users
            .find_by_email(email)
            .ok_or(AuthServiceError::InvalidCredentials)?;
        if !self.verifier.verify(password, &user.password) {
            return Err(AuthServiceError::InvalidCredentials);
        }

        self.session.bind(user.id);
        Ok(user)
    }

    /// Signs out. Safe to call when already signed out.
    pub fn logout(&self) {
        self.session.clear();
    }

    /// Returns the signed-in account, if any. Never fails.
    pub fn current_user(&self) -> Option<User> {
        self.session
            .current()
            .and_then(|user_id| self.users.find(user_id))
    }

    /// Merges `patch` into the account profile, field by field.
    ///
    /// # Errors
    /// - `UserNotFound` when the account does not exist.
    /// - `Repo` on persistence failure; nothing is applied.
    pub fn update_profile(
        &self,
        user_id: UserId,
        patch: ProfilePatch,
    ) -> Result<User, AuthServiceError> {
        Ok(self.users.update_profile(user_id, &patch)?)
    }

    /// Replaces the account's whole role set with the normalized `roles`.
    ///
    /// # Errors
    /// - `EmptyRoles` when `roles` normalizes to an empty set.
    /// - `UserNotFound` when the account does not exist.
    /// - `Repo` on persistence failure; nothing is applied.
    pub fn update_roles(
        &self,
        user_id: UserId,
        roles: Vec<String>,
    ) -> Result<User, AuthServiceError> {
        let normalized = normalize_roles(&roles);
        if normalized.is_empty() {
            return Err(AuthServiceError::EmptyRoles);
        }
        Ok(self.users.replace_roles(user_id, normalized)?)
    }

    /// Returns the session slot, mainly for boundary layers that surface
    /// sign-in state.
    pub fn session(&self) -> &SessionManager {
        &self.session
    }
}

fn default_roles() -> BTreeSet<String> {
    DEFAULT_ROLES.iter().map(|role| (*role).to_string()).collect()
}

fn default_name_for(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}
