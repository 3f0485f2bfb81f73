//! # Post Usecase
//!
//! Post lookup with optional expansion and message edits.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::filters::Related;
use crate::models::{Post, PostFull};
use crate::traits::PostRepo;

pub struct PostUsecase {
    posts: Arc<dyn PostRepo>,
}

impl PostUsecase {
    pub fn new(posts: Arc<dyn PostRepo>) -> Self {
        Self { posts }
    }

    /// `related` is the raw comma-separated expansion list, e.g. `"user,thread"`.
    pub async fn find_by_id(&self, id: i64, related: Option<&str>) -> Result<PostFull> {
        self.fetch(id, Related::parse(related)).await
    }

    /// Replaces the message. An empty or unchanged message leaves the post
    /// untouched and never reaches the write path.
    pub async fn update(&self, id: i64, message: &str) -> Result<Post> {
        let current = self.fetch(id, Related::default()).await?;

        if message.is_empty() || current.post.message == message {
            return Ok(current.post);
        }

        self.posts
            .update(id, message)
            .await
            .map_err(|e| e.context("post repository update"))
    }

    async fn fetch(&self, id: i64, related: Related) -> Result<PostFull> {
        self.posts
            .find_by_id(id, related)
            .await
            .map_err(|e| e.context("post repository find_by_id"))?
            .ok_or_else(|| AppError::not_found("post", id))
    }
}
