//! Core record store for the Inkpot content platform.
//! This crate is the single source of truth for business invariants.

pub mod api;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;
pub mod store;

pub use api::{ErrorKind, Failure};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::blog::{Blog, BlogId, BlogValidationError, Comment, CommentId};
pub use model::user::{Profile, ProfilePatch, User, UserId, UserValidationError};
pub use repo::blog_repo::{BlogRepoError, BlogRepoResult, BlogRepository, NewBlog};
pub use repo::user_repo::{NewUser, UserRepoError, UserRepoResult, UserRepository};
pub use service::auth_service::{
    AuthService, AuthServiceError, ExactMatchVerifier, PasswordVerifier, RegisterRequest,
    DEFAULT_ROLES,
};
pub use service::blog_service::{BlogService, BlogServiceError, CreateBlogRequest};
pub use session::SessionManager;
pub use store::{CollectionStore, JsonFileStore, MemoryStore, StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
