//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and session calls into use-case level APIs.
//! - Keep boundary layers decoupled from storage and cache details.
//!
//! # Invariants
//! - Input validation happens before any state change; a rejected request
//!   mutates nothing.
//!
//! # See also
//! - docs/architecture/storage.md

pub mod auth_service;
pub mod blog_service;
