//! # Core Traits (Ports)
//!
//! Any storage plugin must implement these traits to be used by the binary.
//! Lookups report absence as `Ok(None)`; errors are reserved for failures.

use async_trait::async_trait;
#[cfg(any(test, feature = "testing"))]
use mockall::automock;

use crate::error::Result;
use crate::filters::{Related, ThreadFilter, UserFilter};
use crate::models::{Forum, NewThread, Post, PostFull, Thread, User};

#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Case-insensitive lookup; the returned user carries the stored spelling.
    async fn find_by_nickname(&self, nickname: &str) -> Result<Option<User>>;
}

#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait ForumRepo: Send + Sync {
    /// Fails with `AppError::Conflict` when the slug is taken.
    async fn create(&self, forum: &Forum) -> Result<()>;
    async fn find(&self, slug: &str) -> Result<Option<Forum>>;
    async fn find_forum_threads(&self, slug: &str, filter: &ThreadFilter) -> Result<Vec<Thread>>;
    async fn find_forum_users(&self, forum: &Forum, filter: &UserFilter) -> Result<Vec<User>>;
}

#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait ThreadRepo: Send + Sync {
    /// Fails with `AppError::Conflict` when the slug is taken.
    async fn create_thread(&self, draft: &NewThread) -> Result<Thread>;
    /// `id == 0` means "match by slug only".
    async fn find_by_id_or_slug(&self, id: i64, slug: &str) -> Result<Option<Thread>>;
}

#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait PostRepo: Send + Sync {
    async fn find_by_id(&self, id: i64, related: Related) -> Result<Option<PostFull>>;
    async fn update(&self, id: i64, message: &str) -> Result<Post>;
}
