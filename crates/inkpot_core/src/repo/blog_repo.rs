//! Blog post repository.
//!
//! # Responsibility
//! - Provide post CRUD and engagement mutations over the resident `blogs`
//!   collection cache.
//! - Keep comment id assignment inside the serialized mutation path.
//!
//! # Invariants
//! - Write paths call `Blog::validate()` before the flush.
//! - The resident cache is replaced only after a successful flush.
//! - Comment appends bump the parent `updated_at`; like tally changes do
//!   not.
//!
//! # See also
//! - docs/architecture/storage.md

use crate::model::blog::{Blog, BlogId, BlogValidationError, Comment};
use crate::model::now_epoch_ms;
use crate::store::{CollectionStore, StoreError, StoreResult};
use log::error;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

const BLOGS_COLLECTION: &str = "blogs";

pub type BlogRepoResult<T> = Result<T, BlogRepoError>;

/// Errors from blog persistence and lookup operations.
#[derive(Debug)]
pub enum BlogRepoError {
    /// Record-level invariant violated before persisting.
    Validation(BlogValidationError),
    /// Target post does not exist.
    NotFound(BlogId),
    /// Persisted collection content violates repository invariants.
    InvalidData(String),
    /// Storage-layer failure.
    Store(StoreError),
}

impl Display for BlogRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "blog not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted blog data: {message}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BlogRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BlogValidationError> for BlogRepoError {
    fn from(value: BlogValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for BlogRepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Input for post creation. Ids, timestamps, comments and the like tally are
/// assigned by the repository.
#[derive(Debug, Clone)]
pub struct NewBlog {
    pub title: String,
    pub author: String,
    pub content: String,
}

/// Collection-store-backed post repository.
///
/// Holds the authoritative post map in memory; the store is hydrated once at
/// construction and written through after every mutation.
#[derive(Debug)]
pub struct BlogRepository<S: CollectionStore> {
    store: S,
    blogs: RwLock<BTreeMap<BlogId, Blog>>,
}

impl<S: CollectionStore> BlogRepository<S> {
    /// Opens the repository over an existing `blogs` collection.
    ///
    /// # Errors
    /// - `Store(Missing)` when the collection has never been saved; use
    ///   [`BlogRepository::open_or_init`] for first-run bootstrap.
    /// - `InvalidData` when the persisted content breaks id uniqueness or
    ///   fails record validation.
    pub fn open(store: S) -> BlogRepoResult<Self> {
        let records: Vec<Blog> = store.load(BLOGS_COLLECTION)?;
        let blogs = index_blogs(records)?;
        Ok(Self {
            store,
            blogs: RwLock::new(blogs),
        })
    }

    /// Opens the repository, writing an empty collection on first run.
    pub fn open_or_init(store: S) -> BlogRepoResult<Self> {
        match store.load::<Blog>(BLOGS_COLLECTION) {
            Ok(records) => {
                let blogs = index_blogs(records)?;
                Ok(Self {
                    store,
                    blogs: RwLock::new(blogs),
                })
            }
            Err(StoreError::Missing { .. }) => {
                store.save::<Blog>(BLOGS_COLLECTION, &[])?;
                Ok(Self {
                    store,
                    blogs: RwLock::new(BTreeMap::new()),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Gets one post by id.
    pub fn find(&self, id: BlogId) -> Option<Blog> {
        self.read_guard().get(&id).cloned()
    }

    /// Lists all posts in id order.
    pub fn list(&self) -> Vec<Blog> {
        self.read_guard().values().cloned().collect()
    }

    /// Creates a post with the next free id, no comments and a zero like
    /// tally.
    ///
    /// # Errors
    /// - `Validation` when the resulting record is invalid.
    /// - `Store` when the flush fails; nothing is applied.
    pub fn create(&self, new_blog: NewBlog) -> BlogRepoResult<Blog> {
        let mut blogs = self.write_guard();

        let now = now_epoch_ms();
        let blog = Blog {
            id: next_id(&blogs),
            title: new_blog.title,
            author: new_blog.author,
            content: new_blog.content,
            comments: Vec::new(),
            likes: 0,
            created_at: now,
            updated_at: now,
        };
        blog.validate()?;

        let mut updated = blogs.clone();
        updated.insert(blog.id, blog.clone());
        self.flush(&updated)?;
        *blogs = updated;

        Ok(blog)
    }

    /// Appends a comment and returns it. The comment id is the post's
    /// current comment count plus one.
    ///
    /// # Errors
    /// - `NotFound` when the post does not exist.
    /// - `Store` when the flush fails; nothing is applied.
    pub fn add_comment(
        &self,
        id: BlogId,
        author: &str,
        content: &str,
    ) -> BlogRepoResult<Comment> {
        let mut blogs = self.write_guard();

        let mut updated = blogs.clone();
        let blog = updated.get_mut(&id).ok_or(BlogRepoError::NotFound(id))?;
        let comment = blog.append_comment(author, content, now_epoch_ms());

        self.flush(&updated)?;
        *blogs = updated;

        Ok(comment)
    }

    /// Increments the post's like tally and returns the new value.
    ///
    /// # Errors
    /// - `NotFound` when the post does not exist.
    /// - `Store` when the flush fails; nothing is applied.
    pub fn like(&self, id: BlogId) -> BlogRepoResult<u64> {
        let mut blogs = self.write_guard();

        let mut updated = blogs.clone();
        let blog = updated.get_mut(&id).ok_or(BlogRepoError::NotFound(id))?;
        let likes = blog.like();

        self.flush(&updated)?;
        *blogs = updated;

        Ok(likes)
    }

    /// Decrements the post's like tally with a zero floor and returns the
    /// new value. Unliking at zero is a no-op, not an error.
    ///
    /// # Errors
    /// - `NotFound` when the post does not exist.
    /// - `Store` when the flush fails; nothing is applied.
    pub fn unlike(&self, id: BlogId) -> BlogRepoResult<u64> {
        let mut blogs = self.write_guard();

        let mut updated = blogs.clone();
        let blog = updated.get_mut(&id).ok_or(BlogRepoError::NotFound(id))?;
        let likes = blog.unlike();

        self.flush(&updated)?;
        *blogs = updated;

        Ok(likes)
    }

    fn flush(&self, blogs: &BTreeMap<BlogId, Blog>) -> StoreResult<()> {
        let records: Vec<&Blog> = blogs.values().collect();
        self.store.save(BLOGS_COLLECTION, &records)
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, BTreeMap<BlogId, Blog>> {
        match self.blogs.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                // The cache is only replaced wholesale after a successful
                // flush, so a panicked writer cannot leave it half-applied.
                error!("event=lock_recovered module=blog_repo status=error lock=blogs");
                self.blogs.clear_poison();
                poisoned.into_inner()
            }
        }
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, BTreeMap<BlogId, Blog>> {
        match self.blogs.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("event=lock_recovered module=blog_repo status=error lock=blogs");
                self.blogs.clear_poison();
                poisoned.into_inner()
            }
        }
    }
}

fn next_id(blogs: &BTreeMap<BlogId, Blog>) -> BlogId {
    blogs.keys().next_back().map_or(1, |last| last + 1)
}

fn index_blogs(records: Vec<Blog>) -> BlogRepoResult<BTreeMap<BlogId, Blog>> {
    let mut blogs = BTreeMap::new();

    for blog in records {
        if let Err(err) = blog.validate() {
            return Err(BlogRepoError::InvalidData(format!(
                "blog {}: {err}",
                blog.id
            )));
        }
        let id = blog.id;
        if blogs.insert(id, blog).is_some() {
            return Err(BlogRepoError::InvalidData(format!(
                "duplicate blog id `{id}` in blogs collection"
            )));
        }
    }

    Ok(blogs)
}
