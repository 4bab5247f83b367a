//! Boundary result envelope.
//!
//! # Responsibility
//! - Classify core errors into a transport-agnostic kind set with a stable
//!   HTTP status mapping.
//! - Keep credential failures opaque across the boundary.
//!
//! # Invariants
//! - Every core error maps to exactly one kind.
//! - `InvalidCredentials` envelopes never say which factor failed.
//! - Invalid persisted state and storage failures surface as
//!   `StorageUnavailable`, not as caller mistakes.

use crate::repo::blog_repo::BlogRepoError;
use crate::repo::user_repo::UserRepoError;
use crate::service::auth_service::AuthServiceError;
use crate::service::blog_service::BlogServiceError;
use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Transport-agnostic failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Request input violates a validation rule.
    Validation,
    /// Target entity does not exist.
    NotFound,
    /// Request conflicts with existing state (e.g. email already taken).
    Conflict,
    /// Sign-in failed; which factor failed is never disclosed.
    InvalidCredentials,
    /// Persistence failed or persisted state is unusable.
    StorageUnavailable,
}

impl ErrorKind {
    /// Returns the HTTP status a transport layer should respond with.
    pub fn http_status(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::InvalidCredentials => 401,
            Self::StorageUnavailable => 500,
        }
    }
}

/// Serializable failure envelope handed to boundary layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Returns the HTTP status for this failure's kind.
    pub fn http_status(&self) -> u16 {
        self.kind.http_status()
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for Failure {}

impl From<AuthServiceError> for Failure {
    fn from(value: AuthServiceError) -> Self {
        let kind = match &value {
            AuthServiceError::MissingField(_)
            | AuthServiceError::InvalidEmail(_)
            | AuthServiceError::EmptyRoles => ErrorKind::Validation,
            AuthServiceError::EmailTaken(_) => ErrorKind::Conflict,
            AuthServiceError::InvalidCredentials => ErrorKind::InvalidCredentials,
            AuthServiceError::UserNotFound(_) => ErrorKind::NotFound,
            AuthServiceError::Repo(err) => user_repo_kind(err),
        };
        Self::new(kind, value.to_string())
    }
}

impl From<BlogServiceError> for Failure {
    fn from(value: BlogServiceError) -> Self {
        let kind = match &value {
            BlogServiceError::BlankTitle
            | BlogServiceError::BlankAuthor
            | BlogServiceError::BlankCommentText => ErrorKind::Validation,
            BlogServiceError::BlogNotFound(_) => ErrorKind::NotFound,
            BlogServiceError::Repo(err) => blog_repo_kind(err),
        };
        Self::new(kind, value.to_string())
    }
}

impl From<StoreError> for Failure {
    fn from(value: StoreError) -> Self {
        Self::new(ErrorKind::StorageUnavailable, value.to_string())
    }
}

fn user_repo_kind(err: &UserRepoError) -> ErrorKind {
    match err {
        UserRepoError::Validation(_) => ErrorKind::Validation,
        UserRepoError::DuplicateEmail(_) => ErrorKind::Conflict,
        UserRepoError::NotFound(_) => ErrorKind::NotFound,
        UserRepoError::InvalidData(_) | UserRepoError::Store(_) => ErrorKind::StorageUnavailable,
    }
}

fn blog_repo_kind(err: &BlogRepoError) -> ErrorKind {
    match err {
        BlogRepoError::Validation(_) => ErrorKind::Validation,
        BlogRepoError::NotFound(_) => ErrorKind::NotFound,
        BlogRepoError::InvalidData(_) | BlogRepoError::Store(_) => ErrorKind::StorageUnavailable,
    }
}
