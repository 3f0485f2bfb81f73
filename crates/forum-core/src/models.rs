//! # Domain Models
//!
//! These structs represent the core entities of the forum service.
//! Field names on the wire follow the public forum API (camelCase where it differs).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered participant. The core only ever reads users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub nickname: String,
    #[serde(default)]
    pub fullname: String,
    #[serde(default)]
    pub about: String,
    #[serde(default)]
    pub email: String,
}

/// A forum, addressed by its slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forum {
    pub slug: String,
    pub title: String,
    /// Nickname of the creator, canonicalized against the user store
    #[serde(rename = "user")]
    pub author: String,
    /// Maintained by storage, ignored on input
    #[serde(default)]
    pub threads: i64,
    #[serde(default)]
    pub posts: i64,
}

/// A thread as stored. `id` is assigned by storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub title: String,
    pub author: String,
    pub forum: String,
    pub message: String,
    #[serde(default)]
    pub votes: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
}

/// Caller-supplied thread draft. `forum` is never trusted and gets replaced
/// with the canonical slug of the forum the thread is created under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewThread {
    #[serde(default)]
    pub slug: Option<String>,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub forum: Option<String>,
    pub message: String,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
}

impl NewThread {
    /// The slug, if one was given. An empty string counts as "no slug".
    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref().filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    #[serde(default)]
    pub parent: i64,
    pub author: String,
    pub message: String,
    #[serde(default)]
    pub is_edited: bool,
    pub forum: String,
    pub thread: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
}

/// A post together with whichever related entities were asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostFull {
    pub post: Post,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forum: Option<Forum>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread: Option<Thread>,
}

impl PostFull {
    pub fn bare(post: Post) -> Self {
        Self { post, author: None, forum: None, thread: None }
    }
}

/// Body of a post message edit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostUpdate {
    #[serde(default)]
    pub message: String,
}
