//! # Forum Usecase
//!
//! Forum creation, thread creation under a forum and forum-scoped listings.
//! Every write runs resolve-dependencies, check-uniqueness, write, classify.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::filters::{ThreadFilter, UserFilter};
use crate::models::{Forum, NewThread, Thread, User};
use crate::traits::{ForumRepo, ThreadRepo, UserRepo};
use crate::usecase::Outcome;

pub struct ForumUsecase {
    forums: Arc<dyn ForumRepo>,
    users: Arc<dyn UserRepo>,
    threads: Arc<dyn ThreadRepo>,
}

impl ForumUsecase {
    pub fn new(forums: Arc<dyn ForumRepo>, users: Arc<dyn UserRepo>, threads: Arc<dyn ThreadRepo>) -> Self {
        Self { forums, users, threads }
    }

    /// Creates a forum, or hands back the existing one when the slug is taken.
    pub async fn create_forum(&self, mut draft: Forum) -> Outcome<Forum> {
        let author = match self.resolve_user(&draft.author).await {
            Ok(user) => user,
            Err(err) => return Outcome::NotFound(err),
        };

        draft.author = author.nickname;
        draft.threads = 0;
        draft.posts = 0;

        match self.forums.create(&draft).await {
            Ok(()) => Outcome::Created(draft),
            Err(err) if err.is_conflict() => match self.find(&draft.slug).await {
                Ok(Some(existing)) => Outcome::AlreadyExists(existing),
                Ok(None) => Outcome::Conflict(err.context("forum repository create")),
                Err(lookup) => Outcome::Conflict(lookup),
            },
            Err(err) => Outcome::Failed(err.context("forum repository create")),
        }
    }

    /// `Ok(None)` when no forum has this slug.
    pub async fn find(&self, slug: &str) -> Result<Option<Forum>> {
        self.forums.find(slug).await.map_err(|e| e.context("forum repository find"))
    }

    pub async fn get_threads_by_forum(&self, slug: &str, filter: &ThreadFilter) -> Outcome<Vec<Thread>> {
        if let Err(err) = self.resolve_forum(slug).await {
            return Outcome::NotFound(err);
        }

        match self.forums.find_forum_threads(slug, filter).await {
            Ok(threads) => Outcome::Ok(threads),
            Err(err) => Outcome::Failed(err.context("forum repository find_forum_threads")),
        }
    }

    pub async fn get_users_by_forum(&self, slug: &str, filter: &UserFilter) -> Outcome<Vec<User>> {
        let forum = match self.resolve_forum(slug).await {
            Ok(forum) => forum,
            Err(err) => return Outcome::NotFound(err),
        };

        match self.forums.find_forum_users(&forum, filter).await {
            Ok(users) => Outcome::Ok(users),
            Err(err) => Outcome::Failed(err.context("forum repository find_forum_users")),
        }
    }

    /// Creates a thread under `forum_slug`. A draft whose slug is already in
    /// use yields the existing thread instead of a duplicate.
    pub async fn create_thread(&self, forum_slug: &str, mut draft: NewThread) -> Outcome<Thread> {
        let author = match self.resolve_user(&draft.author).await {
            Ok(user) => user,
            Err(err) => return Outcome::NotFound(err),
        };
        let forum = match self.resolve_forum(forum_slug).await {
            Ok(forum) => forum,
            Err(err) => return Outcome::NotFound(err),
        };

        draft.author = author.nickname;
        draft.forum = Some(forum.slug);

        if let Some(slug) = draft.slug() {
            match self.threads.find_by_id_or_slug(0, slug).await {
                Ok(Some(existing)) => return Outcome::AlreadyExists(existing),
                Ok(None) => {}
                Err(err) => return Outcome::Failed(err.context("thread repository find_by_id_or_slug")),
            }
        }

        match self.threads.create_thread(&draft).await {
            Ok(thread) => Outcome::Created(thread),
            // Lost a race against a concurrent create with the same slug.
            Err(err) if err.is_conflict() => {
                let Some(slug) = draft.slug() else {
                    return Outcome::Conflict(err.context("thread repository create_thread"));
                };
                match self.threads.find_by_id_or_slug(0, slug).await {
                    Ok(Some(existing)) => Outcome::AlreadyExists(existing),
                    Ok(None) => Outcome::Conflict(err.context("thread repository create_thread")),
                    Err(lookup) => Outcome::Conflict(lookup.context("thread repository find_by_id_or_slug")),
                }
            }
            Err(err) => Outcome::Failed(err.context("thread repository create_thread")),
        }
    }

    async fn resolve_user(&self, nickname: &str) -> Result<User> {
        self.users
            .find_by_nickname(nickname)
            .await
            .map_err(|e| e.context("user repository find_by_nickname"))?
            .ok_or_else(|| AppError::not_found("user", nickname))
    }

    async fn resolve_forum(&self, slug: &str) -> Result<Forum> {
        self.find(slug).await?.ok_or_else(|| AppError::not_found("forum", slug))
    }
}
