//! # Query Options
//!
//! Typed listing and expansion options. The HTTP layer decodes these from the
//! query string once; storage interprets them.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Options for listing a forum's threads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ThreadFilter {
    /// Only threads created at/after this instant (at/before when `desc`)
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
    #[serde(default)]
    pub desc: bool,
}

/// Options for listing a forum's participants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserFilter {
    /// Only nicknames sorting strictly after this one (strictly before when `desc`)
    pub since: Option<String>,
    pub limit: Option<u32>,
    #[serde(default)]
    pub desc: bool,
}

/// Which related entities to attach to a post lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Related {
    pub user: bool,
    pub forum: bool,
    pub thread: bool,
}

impl Related {
    /// Parses a comma-separated token list such as `"user,thread"`.
    /// Unknown tokens are ignored.
    pub fn parse(raw: Option<&str>) -> Self {
        let mut related = Related::default();
        for token in raw.unwrap_or_default().split(',').map(str::trim) {
            match token {
                "user" => related.user = true,
                "forum" => related.forum = true,
                "thread" => related.thread = true,
                _ => {}
            }
        }
        related
    }
}
