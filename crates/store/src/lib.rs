//! Relational storage for Yatube.
//!
//! [`Store`] owns a SQLite connection pool and exposes the operations the web
//! layer composes into pages:
//!
//! - the entity store for users, groups, posts and comments,
//! - the feed queries (all posts, one group, one author, followed authors),
//! - the follow graph between users,
//! - form validation for posts, comments, groups and accounts.
//!
//! Referential actions live in the schema: removing a user removes their
//! posts, comments and follow edges; removing a group detaches its posts.
//!
//! ```no_run
//! # async fn demo() -> Result<(), yatube_store::StoreError> {
//! use yatube_store::{PageRequest, Store};
//!
//! let store = Store::connect("sqlite://yatube.db?mode=rwc").await?;
//! let page = store.list_all(PageRequest::new(1)).await?;
//! println!("{} posts in total", page.total);
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod comments;
mod error;
mod feeds;
mod follows;
mod groups;
mod models;
mod pagination;
mod posts;
#[cfg(test)]
mod testing;
mod users;
mod validation;

use std::str::FromStr;
use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

pub use error::{Result, StoreError};
pub use feeds::{AuthorFeed, GroupFeed};
pub use follows::FollowOutcome;
pub use models::{
    Comment, CommentId, CommentView, Group, GroupId, NewComment, NewGroup, NewPost, NewUser, Post, PostChanges,
    PostId, PostView, User, UserId,
};
pub use pagination::{PAGE_SIZE, Page, PageRequest};
pub use validation::{FieldErrors, RESERVED_USERNAMES, image_extension, messages};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Handle to the Yatube database.
///
/// Cloning is cheap: clones share the same connection pool.
#[derive(Clone, Debug)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Connects to the database at `url` and applies pending migrations.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await?;
        Self::from_pool(pool).await
    }

    /// Opens a private in-memory database.
    ///
    /// The pool is pinned to a single connection that never expires, since every
    /// SQLite in-memory connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;
        Self::from_pool(pool).await
    }

    /// Wraps an existing pool, applying pending migrations first.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        MIGRATOR.run(&pool).await?;
        tracing::debug!("database migrations applied");
        Ok(Self { pool })
    }

    /// The underlying connection pool.
    #[inline]
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
