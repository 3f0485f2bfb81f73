//! # forum-db-sqlite Implementation
//!
//! This module implements the data mapping between the SQLite relational model
//! and the `forum-core` domain models. One `SqliteForumRepo` backs every port.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use forum_core::error::{AppError, Result};
use forum_core::filters::{Related, ThreadFilter, UserFilter};
use forum_core::models::{Forum, NewThread, Post, PostFull, Thread, User};
use forum_core::traits::{ForumRepo, PostRepo, ThreadRepo, UserRepo};
use sqlx::sqlite::{Sqlite, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id       INTEGER PRIMARY KEY,
        nickname TEXT NOT NULL UNIQUE COLLATE NOCASE,
        fullname TEXT NOT NULL DEFAULT '',
        about    TEXT NOT NULL DEFAULT '',
        email    TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS forums (
        id      INTEGER PRIMARY KEY,
        slug    TEXT NOT NULL UNIQUE COLLATE NOCASE,
        title   TEXT NOT NULL,
        author  TEXT NOT NULL COLLATE NOCASE REFERENCES users (nickname),
        threads INTEGER NOT NULL DEFAULT 0,
        posts   INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS threads (
        id      INTEGER PRIMARY KEY AUTOINCREMENT,
        slug    TEXT UNIQUE COLLATE NOCASE,
        title   TEXT NOT NULL,
        author  TEXT NOT NULL COLLATE NOCASE REFERENCES users (nickname),
        forum   TEXT NOT NULL COLLATE NOCASE REFERENCES forums (slug),
        message TEXT NOT NULL,
        votes   INTEGER NOT NULL DEFAULT 0,
        created TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS threads_forum_created ON threads (forum, created)",
    "CREATE TABLE IF NOT EXISTS posts (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        parent    INTEGER NOT NULL DEFAULT 0,
        author    TEXT NOT NULL COLLATE NOCASE REFERENCES users (nickname),
        message   TEXT NOT NULL,
        is_edited INTEGER NOT NULL DEFAULT 0,
        forum     TEXT NOT NULL COLLATE NOCASE REFERENCES forums (slug),
        thread    INTEGER NOT NULL REFERENCES threads (id),
        created   TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS posts_forum_author ON posts (forum, author)",
];

const THREAD_COLUMNS: &str = "id, slug, title, author, forum, message, votes, created";
const POST_COLUMNS: &str = "id, parent, author, message, is_edited, forum, thread, created";

pub struct SqliteForumRepo {
    pool: SqlitePool,
}

impl SqliteForumRepo {
    /// Connects and bootstraps the schema.
    ///
    /// In-memory databases live only as long as their connection, so they are
    /// pinned to a single connection that is never recycled.
    pub async fn new(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(storage_error)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if url.contains(":memory:") || url.contains("mode=memory") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };
        let pool = pool_options.connect_with(options).await.map_err(storage_error)?;

        let repo = Self { pool };
        repo.bootstrap().await?;
        Ok(repo)
    }

    async fn bootstrap(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await.map_err(storage_error)?;
        }
        log::info!("sqlite schema ready ({} statements)", SCHEMA.len());
        Ok(())
    }

    /// Seeds a user. Users are owned outside the forum service, so this is
    /// not part of any port.
    pub async fn insert_user(&self, user: &User) -> Result<()> {
        sqlx::query("INSERT INTO users (nickname, fullname, about, email) VALUES (?, ?, ?, ?)")
            .bind(&user.nickname)
            .bind(&user.fullname)
            .bind(&user.about)
            .bind(&user.email)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    /// Seeds a post and bumps its forum's post counter. `id` and `is_edited`
    /// on the input are ignored.
    pub async fn insert_post(&self, post: &Post) -> Result<Post> {
        let created = post.created.unwrap_or_else(Utc::now).trunc_subsecs(6);
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let id = sqlx::query(
            "INSERT INTO posts (parent, author, message, is_edited, forum, thread, created) VALUES (?, ?, ?, 0, ?, ?, ?)",
        )
        .bind(post.parent)
        .bind(&post.author)
        .bind(&post.message)
        .bind(&post.forum)
        .bind(post.thread)
        .bind(encode_ts(created))
        .execute(&mut *tx)
        .await
        .map_err(storage_error)?
        .last_insert_rowid();

        sqlx::query("UPDATE forums SET posts = posts + 1 WHERE slug = ?")
            .bind(&post.forum)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;

        tx.commit().await.map_err(storage_error)?;

        Ok(Post { id, is_edited: false, created: Some(created), ..post.clone() })
    }

    async fn fetch_user(&self, nickname: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT nickname, fullname, about, email FROM users WHERE nickname = ?")
            .bind(nickname)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.as_ref().map(user_from_row).transpose().map_err(storage_error)
    }

    async fn fetch_forum(&self, slug: &str) -> Result<Option<Forum>> {
        let row = sqlx::query("SELECT slug, title, author, threads, posts FROM forums WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.as_ref().map(forum_from_row).transpose().map_err(storage_error)
    }

    /// By id when `id != 0`, otherwise by slug.
    async fn fetch_thread(&self, id: i64, slug: &str) -> Result<Option<Thread>> {
        if id == 0 && slug.is_empty() {
            return Ok(None);
        }

        let by_id = id != 0;
        let sql = format!(
            "SELECT {THREAD_COLUMNS} FROM threads WHERE {} = ?",
            if by_id { "id" } else { "slug" }
        );
        let query = sqlx::query::<Sqlite>(&sql);
        let query = if by_id { query.bind(id) } else { query.bind(slug) };

        let row = query.fetch_optional(&self.pool).await.map_err(storage_error)?;
        row.as_ref().map(thread_from_row).transpose().map_err(storage_error)
    }

    async fn fetch_post(&self, id: i64) -> Result<Option<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.as_ref().map(post_from_row).transpose().map_err(storage_error)
    }
}

#[async_trait]
impl UserRepo for SqliteForumRepo {
    async fn find_by_nickname(&self, nickname: &str) -> Result<Option<User>> {
        self.fetch_user(nickname).await
    }
}

#[async_trait]
impl ForumRepo for SqliteForumRepo {
    async fn create(&self, forum: &Forum) -> Result<()> {
        sqlx::query("INSERT INTO forums (slug, title, author) VALUES (?, ?, ?)")
            .bind(&forum.slug)
            .bind(&forum.title)
            .bind(&forum.author)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    async fn find(&self, slug: &str) -> Result<Option<Forum>> {
        self.fetch_forum(slug).await
    }

    async fn find_forum_threads(&self, slug: &str, filter: &ThreadFilter) -> Result<Vec<Thread>> {
        let mut sql = format!("SELECT {THREAD_COLUMNS} FROM threads WHERE forum = ?");
        if filter.since.is_some() {
            sql.push_str(if filter.desc { " AND created <= ?" } else { " AND created >= ?" });
        }
        sql.push_str(if filter.desc {
            " ORDER BY created DESC, id DESC"
        } else {
            " ORDER BY created ASC, id ASC"
        });
        sql.push_str(" LIMIT ?");

        let mut query = sqlx::query::<Sqlite>(&sql).bind(slug);
        if let Some(since) = filter.since {
            query = query.bind(encode_ts(since));
        }

        query
            .bind(sql_limit(filter.limit))
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?
            .iter()
            .map(thread_from_row)
            .collect::<std::result::Result<_, _>>()
            .map_err(storage_error)
    }

    /// Distinct authors of the forum's threads and posts, ordered by nickname.
    async fn find_forum_users(&self, forum: &Forum, filter: &UserFilter) -> Result<Vec<User>> {
        let mut sql = String::from(
            "SELECT nickname, fullname, about, email FROM users \
             WHERE nickname IN (SELECT author FROM threads WHERE forum = ? \
                                UNION SELECT author FROM posts WHERE forum = ?)",
        );
        if filter.since.is_some() {
            sql.push_str(if filter.desc { " AND nickname < ?" } else { " AND nickname > ?" });
        }
        sql.push_str(if filter.desc { " ORDER BY nickname DESC" } else { " ORDER BY nickname ASC" });
        sql.push_str(" LIMIT ?");

        let mut query = sqlx::query::<Sqlite>(&sql).bind(&forum.slug).bind(&forum.slug);
        if let Some(since) = &filter.since {
            query = query.bind(since);
        }

        query
            .bind(sql_limit(filter.limit))
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?
            .iter()
            .map(user_from_row)
            .collect::<std::result::Result<_, _>>()
            .map_err(storage_error)
    }
}

#[async_trait]
impl ThreadRepo for SqliteForumRepo {
    /// Inserts the thread and bumps the forum's thread counter atomically.
    async fn create_thread(&self, draft: &NewThread) -> Result<Thread> {
        let forum = draft
            .forum
            .clone()
            .ok_or_else(|| AppError::Validation("thread draft has no forum".into()))?;
        let created = draft.created.unwrap_or_else(Utc::now).trunc_subsecs(6);
        let slug = draft.slug().map(str::to_string);

        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let id = sqlx::query(
            "INSERT INTO threads (slug, title, author, forum, message, created) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&slug)
        .bind(&draft.title)
        .bind(&draft.author)
        .bind(&forum)
        .bind(&draft.message)
        .bind(encode_ts(created))
        .execute(&mut *tx)
        .await
        .map_err(storage_error)?
        .last_insert_rowid();

        sqlx::query("UPDATE forums SET threads = threads + 1 WHERE slug = ?")
            .bind(&forum)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;

        tx.commit().await.map_err(storage_error)?;

        Ok(Thread {
            id,
            slug,
            title: draft.title.clone(),
            author: draft.author.clone(),
            forum,
            message: draft.message.clone(),
            votes: 0,
            created: Some(created),
        })
    }

    async fn find_by_id_or_slug(&self, id: i64, slug: &str) -> Result<Option<Thread>> {
        self.fetch_thread(id, slug).await
    }
}

#[async_trait]
impl PostRepo for SqliteForumRepo {
    async fn find_by_id(&self, id: i64, related: Related) -> Result<Option<PostFull>> {
        let Some(post) = self.fetch_post(id).await? else {
            return Ok(None);
        };

        let mut full = PostFull::bare(post);
        if related.user {
            full.author = self.fetch_user(&full.post.author).await?;
        }
        if related.forum {
            full.forum = self.fetch_forum(&full.post.forum).await?;
        }
        if related.thread {
            full.thread = self.fetch_thread(full.post.thread, "").await?;
        }
        Ok(Some(full))
    }

    async fn update(&self, id: i64, message: &str) -> Result<Post> {
        let updated = sqlx::query("UPDATE posts SET message = ?, is_edited = 1 WHERE id = ?")
            .bind(message)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?
            .rows_affected();

        if updated == 0 {
            return Err(AppError::not_found("post", id));
        }

        self.fetch_post(id).await?.ok_or_else(|| AppError::not_found("post", id))
    }
}

/// Unique-constraint violations become `Conflict`; everything else is internal.
fn storage_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict(db.message().to_string()),
        _ => {
            log::error!("sqlite failure: {err}");
            AppError::Internal(err.to_string())
        }
    }
}

// SQLite treats a negative LIMIT as "no limit".
fn sql_limit(limit: Option<u32>) -> i64 {
    limit.map(i64::from).unwrap_or(-1)
}

// Fixed-width UTC timestamps compare correctly as text.
fn encode_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_ts(raw: &str) -> std::result::Result<DateTime<Utc>, sqlx::Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

fn user_from_row(row: &SqliteRow) -> std::result::Result<User, sqlx::Error> {
    Ok(User {
        nickname: row.try_get("nickname")?,
        fullname: row.try_get("fullname")?,
        about: row.try_get("about")?,
        email: row.try_get("email")?,
    })
}

fn forum_from_row(row: &SqliteRow) -> std::result::Result<Forum, sqlx::Error> {
    Ok(Forum {
        slug: row.try_get("slug")?,
        title: row.try_get("title")?,
        author: row.try_get("author")?,
        threads: row.try_get("threads")?,
        posts: row.try_get("posts")?,
    })
}

fn thread_from_row(row: &SqliteRow) -> std::result::Result<Thread, sqlx::Error> {
    Ok(Thread {
        id: row.try_get("id")?,
        slug: row.try_get("slug")?,
        title: row.try_get("title")?,
        author: row.try_get("author")?,
        forum: row.try_get("forum")?,
        message: row.try_get("message")?,
        votes: row.try_get("votes")?,
        created: Some(decode_ts(row.try_get("created")?)?),
    })
}

fn post_from_row(row: &SqliteRow) -> std::result::Result<Post, sqlx::Error> {
    Ok(Post {
        id: row.try_get("id")?,
        parent: row.try_get("parent")?,
        author: row.try_get("author")?,
        message: row.try_get("message")?,
        is_edited: row.try_get("is_edited")?,
        forum: row.try_get("forum")?,
        thread: row.try_get("thread")?,
        created: Some(decode_ts(row.try_get("created")?)?),
    })
}
