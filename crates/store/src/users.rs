use chrono::Utc;

use crate::error::{Result, StoreError};
use crate::models::{NewUser, User, UserId};
use crate::validation::{FieldErrors, RESERVED_USERNAMES, is_valid_username, messages};
use crate::Store;

impl Store {
    /// Registers a user.
    ///
    /// Fails with [`StoreError::Validation`] when the username is malformed,
    /// reserved or already taken.
    pub async fn create_user(&self, new: NewUser) -> Result<User> {
        let username = new.username.trim();
        let mut errors = FieldErrors::new();
        if username.is_empty() {
            errors.add("username", messages::REQUIRED);
        } else if !is_valid_username(username) {
            errors.add("username", messages::INVALID_USERNAME);
        } else if RESERVED_USERNAMES.contains(&username) {
            errors.add("username", messages::USERNAME_RESERVED);
        } else if self.find_user_by_username(username).await?.is_some() {
            errors.add("username", messages::USERNAME_TAKEN);
        }
        errors.into_result()?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash, date_joined) VALUES (?, ?, ?)
             RETURNING id, username, password_hash, date_joined",
        )
        .bind(username)
        .bind(&new.password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(user = %user.username, "user registered");
        Ok(user)
    }

    /// Looks a user up by primary key.
    pub async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT id, username, password_hash, date_joined FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Looks a user up by username.
    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, date_joined FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Like [`Store::find_user_by_username`] but a missing user is [`StoreError::NotFound`].
    pub async fn user_by_username(&self, username: &str) -> Result<User> {
        self.find_user_by_username(username)
            .await?
            .ok_or(StoreError::NotFound("user"))
    }

    /// Deletes a user together with their posts, comments and follow edges.
    pub async fn delete_user(&self, id: UserId) -> Result<()> {
        let done = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if done.rows_affected() == 0 {
            return Err(StoreError::NotFound("user"));
        }
        tracing::info!(%id, "user deleted");
        Ok(())
    }
}
