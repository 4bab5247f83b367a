//! Blog post use-case service.
//!
//! # Responsibility
//! - Provide post create/get/list APIs and the comment/like mutation APIs.
//! - Own request-level validation for post and comment text fields.
//!
//! # Invariants
//! - Comment ids count up `1, 2, 3, ...` within one post in append order.
//! - The like tally never goes below zero; unliking at zero is a no-op.
//!
//! # See also
//! - docs/architecture/storage.md

use crate::model::blog::{Blog, BlogId, Comment};
use crate::repo::blog_repo::{BlogRepoError, BlogRepository, NewBlog};
use crate::store::CollectionStore;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for blog use-cases.
#[derive(Debug)]
pub enum BlogServiceError {
    /// Post title is empty or whitespace-only.
    BlankTitle,
    /// Post or comment author is empty or whitespace-only.
    BlankAuthor,
    /// Comment text is empty or whitespace-only.
    BlankCommentText,
    /// Target post does not exist.
    BlogNotFound(BlogId),
    /// Persistence-layer failure.
    Repo(BlogRepoError),
}

impl Display for BlogServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "blog title cannot be blank"),
            Self::BlankAuthor => write!(f, "author cannot be blank"),
            Self::BlankCommentText => write!(f, "comment text cannot be blank"),
            Self::BlogNotFound(blog_id) => write!(f, "blog not found: {blog_id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BlogServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BlogRepoError> for BlogServiceError {
    fn from(value: BlogRepoError) -> Self {
        match value {
            BlogRepoError::NotFound(blog_id) => Self::BlogNotFound(blog_id),
            other => Self::Repo(other),
        }
    }
}

/// Post creation input. The body may be empty; title and author may not.
#[derive(Debug, Clone)]
pub struct CreateBlogRequest {
    pub title: String,
    pub author: String,
    pub content: String,
}

/// Blog service facade over the post repository.
pub struct BlogService<S: CollectionStore> {
    blogs: BlogRepository<S>,
}

impl<S: CollectionStore> BlogService<S> {
    /// Creates a service using the provided repository.
    pub fn new(blogs: BlogRepository<S>) -> Self {
        Self { blogs }
    }

    /// Creates a post with no comments and a zero like tally.
    ///
    /// # Errors
    /// - `BlankTitle` / `BlankAuthor` when required fields are blank.
    /// - `Repo` on persistence failure; nothing is applied.
    pub fn create_blog(&self, request: CreateBlogRequest) -> Result<Blog, BlogServiceError> {
        if request.title.trim().is_empty() {
            return Err(BlogServiceError::BlankTitle);
        }
        if request.author.trim().is_empty() {
            return Err(BlogServiceError::BlankAuthor);
        }

        Ok(self.blogs.create(NewBlog {
            title: request.title,
            author: request.author,
            content: request.content,
        })?)
    }

    /// Gets one post by id.
    pub fn get_blog(&self, blog_id: BlogId) -> Option<Blog> {
        self.blogs.find(blog_id)
    }

    /// Lists all posts in id order.
    pub fn list_blogs(&self) -> Vec<Blog> {
        self.blogs.list()
    }

    /// Appends a comment to a post and returns it.
    ///
    /// # Errors
    /// - `BlankAuthor` / `BlankCommentText` when inputs are blank.
    /// - `BlogNotFound` when the post does not exist.
    /// - `Repo` on persistence failure; nothing is applied.
    pub fn add_comment(
        &self,
        blog_id: BlogId,
        author: &str,
        text: &str,
    ) -> Result<Comment, BlogServiceError> {
        if author.trim().is_empty() {
            return Err(BlogServiceError::BlankAuthor);
        }
        if text.trim().is_empty() {
            return Err(BlogServiceError::BlankCommentText);
        }

        Ok(self.blogs.add_comment(blog_id, author, text)?)
    }

    /// Increments a post's like tally and returns the new value.
    ///
    /// # Errors
    /// - `BlogNotFound` when the post does not exist.
    /// - `Repo` on persistence failure; nothing is applied.
    pub fn like(&self, blog_id: BlogId) -> Result<u64, BlogServiceError> {
        Ok(self.blogs.like(blog_id)?)
    }

    /// Decrements a post's like tally with a zero floor and returns the new
    /// value.
    ///
    /// # Errors
    /// - `BlogNotFound` when the post does not exist.
    /// - `Repo` on persistence failure; nothing is applied.
    pub fn unlike(&self, blog_id: BlogId) -> Result<u64, BlogServiceError> {
        Ok(self.blogs.unlike(blog_id)?)
    }
}
