//! Blog post domain model.
//!
//! # Responsibility
//! - Define the canonical post record persisted in the `blogs` collection.
//! - Own comment id assignment along with the append-only comment list.
//! - Provide like/unlike tally helpers with a zero floor.
//!
//! # Invariants
//! - `id` is stable and never reused for another post.
//! - `comments` is append-only; comment ids count up `1, 2, 3, ...` within
//!   one post and are meaningless across posts.
//! - `likes` can never go below zero.
//!
//! # See also
//! - docs/architecture/data-model.md

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier for a blog post.
///
/// Assigned monotonically per collection (`max + 1`).
pub type BlogId = u64;

/// Identifier for a comment, unique only within its parent post.
pub type CommentId = u64;

/// Canonical persisted blog post record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    /// Stable numeric id used for lookups and mutations.
    pub id: BlogId,
    /// Post headline. Descriptive only; core never edits it after creation.
    pub title: String,
    /// Author display name. Descriptive only.
    pub author: String,
    /// Post body. Descriptive only.
    pub content: String,
    /// Append-only comment list. Ids count up from 1 in append order.
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Aggregate like tally. Structurally non-negative.
    #[serde(default)]
    pub likes: u64,
    /// Unix epoch milliseconds, stamped at creation.
    pub created_at: i64,
    /// Unix epoch milliseconds, bumped by comment appends. Like tally
    /// changes deliberately do not bump it.
    pub updated_at: i64,
}

/// Comment owned exclusively by its parent post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Position-derived id: `comments.len() + 1` at append time. Unique
    /// within the parent only while the list stays append-only.
    pub id: CommentId,
    pub author: String,
    pub content: String,
    /// Unix epoch milliseconds, stamped at append.
    pub created_at: i64,
    /// Per-comment like tally. Starts at zero.
    #[serde(default)]
    pub likes: u64,
}

/// Record-level validation failures for `Blog`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlogValidationError {
    /// Title is empty or whitespace-only.
    BlankTitle,
    /// Author is empty or whitespace-only.
    BlankAuthor,
}

impl Display for BlogValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "blog title cannot be blank"),
            Self::BlankAuthor => write!(f, "blog author cannot be blank"),
        }
    }
}

impl Error for BlogValidationError {}

impl Blog {
    /// Checks record-level invariants shared by every write path.
    ///
    /// # Errors
    /// - `BlankTitle` when the title is empty or whitespace-only.
    /// - `BlankAuthor` when the author is empty or whitespace-only.
    pub fn validate(&self) -> Result<(), BlogValidationError> {
        if self.title.trim().is_empty() {
            return Err(BlogValidationError::BlankTitle);
        }
        if self.author.trim().is_empty() {
            return Err(BlogValidationError::BlankAuthor);
        }
        Ok(())
    }

    /// Returns the id the next appended comment will receive.
    pub fn next_comment_id(&self) -> CommentId {
        self.comments.len() as CommentId + 1
    }

    /// Appends a comment at `now` and returns it.
    ///
    /// # Invariants
    /// - The new comment id is `next_comment_id()` at call time.
    /// - The parent `updated_at` is bumped to `now`.
    pub fn append_comment(
        &mut self,
        author: impl Into<String>,
        content: impl Into<String>,
        now: i64,
    ) -> Comment {
        let comment = Comment {
            id: self.next_comment_id(),
            author: author.into(),
            content: content.into(),
            created_at: now,
            likes: 0,
        };
        self.comments.push(comment.clone());
        self.updated_at = now;
        comment
    }

    /// Increments the like tally with a ceiling clamp and returns the new
    /// value.
    pub fn like(&mut self) -> u64 {
        self.likes = self.likes.saturating_add(1);
        self.likes
    }

    /// Decrements the like tally with a zero floor and returns the new value.
    ///
    /// Unliking at zero is a no-op, not an error.
    pub fn unlike(&mut self) -> u64 {
        self.likes = self.likes.saturating_sub(1);
        self.likes
    }
}
