use chrono::Utc;

use crate::error::{Result, StoreError};
use crate::models::{Comment, CommentId, CommentView, NewComment, PostId};
use crate::validation::{FieldErrors, messages};
use crate::Store;

impl Store {
    /// Attaches a comment to a post. The text must not be blank.
    pub async fn add_comment(&self, new: NewComment) -> Result<Comment> {
        let text = new.text.trim();
        if text.is_empty() {
            return Err(StoreError::Validation(FieldErrors::single("text", messages::REQUIRED)));
        }
        let comment = sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (post_id, author_id, text, created) VALUES (?, ?, ?, ?)
             RETURNING id, post_id, author_id, text, created",
        )
        .bind(new.post)
        .bind(new.author)
        .bind(text)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        tracing::debug!(comment = %comment.id, post = %comment.post_id, "comment added");
        Ok(comment)
    }

    /// Comments on `post`, newest first.
    pub async fn comments_for_post(&self, post: PostId) -> Result<Vec<CommentView>> {
        let comments = sqlx::query_as::<_, CommentView>(
            "SELECT c.id, c.post_id, c.author_id, u.username AS author_username, c.text, c.created
             FROM comments c JOIN users u ON u.id = c.author_id
             WHERE c.post_id = ?
             ORDER BY c.created DESC, c.id DESC",
        )
        .bind(post)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    /// Loads a comment, requiring that it belongs to `post`.
    pub async fn comment_of_post(&self, post: PostId, id: CommentId) -> Result<Comment> {
        sqlx::query_as::<_, Comment>(
            "SELECT id, post_id, author_id, text, created FROM comments WHERE id = ? AND post_id = ?",
        )
        .bind(id)
        .bind(post)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound("comment"))
    }

    /// Deletes one comment.
    pub async fn delete_comment(&self, id: CommentId) -> Result<()> {
        let done = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if done.rows_affected() == 0 {
            return Err(StoreError::NotFound("comment"));
        }
        tracing::debug!(comment = %id, "comment deleted");
        Ok(())
    }
}
