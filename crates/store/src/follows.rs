use chrono::Utc;

use crate::error::Result;
use crate::models::UserId;
use crate::Store;

/// What [`Store::follow`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FollowOutcome {
    /// A new edge was stored.
    Created,
    /// The edge already existed, nothing changed.
    AlreadyFollowing,
    /// Viewer and target are the same user, nothing changed.
    SelfFollow,
}

impl Store {
    /// Makes `viewer` follow `target`. Idempotent, and following yourself is a no-op.
    pub async fn follow(&self, viewer: UserId, target: UserId) -> Result<FollowOutcome> {
        if viewer == target {
            return Ok(FollowOutcome::SelfFollow);
        }
        let done = sqlx::query(
            "INSERT INTO follows (user_id, author_id, created) VALUES (?, ?, ?)
             ON CONFLICT (user_id, author_id) DO NOTHING",
        )
        .bind(viewer)
        .bind(target)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        if done.rows_affected() == 0 {
            return Ok(FollowOutcome::AlreadyFollowing);
        }
        tracing::debug!(%viewer, %target, "follow created");
        Ok(FollowOutcome::Created)
    }

    /// Removes the edge if present. Returns whether anything was removed.
    pub async fn unfollow(&self, viewer: UserId, target: UserId) -> Result<bool> {
        let done = sqlx::query("DELETE FROM follows WHERE user_id = ? AND author_id = ?")
            .bind(viewer)
            .bind(target)
            .execute(&self.pool)
            .await?;
        let removed = done.rows_affected() > 0;
        if removed {
            tracing::debug!(%viewer, %target, "follow removed");
        }
        Ok(removed)
    }

    /// `false` for anonymous viewers.
    pub async fn is_following(&self, viewer: Option<UserId>, target: UserId) -> Result<bool> {
        let Some(viewer) = viewer else {
            return Ok(false);
        };
        let exists: i64 =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM follows WHERE user_id = ? AND author_id = ?)")
                .bind(viewer)
                .bind(target)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists != 0)
    }

    /// How many users follow `author`.
    pub async fn follower_count(&self, author: UserId) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE author_id = ?")
            .bind(author)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// How many authors `user` follows.
    pub async fn following_count(&self, user: UserId) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE user_id = ?")
            .bind(user)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
