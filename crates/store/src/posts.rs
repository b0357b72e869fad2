use chrono::Utc;

use crate::error::{Result, StoreError};
use crate::models::{GroupId, NewPost, Post, PostChanges, PostId, PostView};
use crate::validation::{FieldErrors, messages};
use crate::Store;

const POST_COLUMNS: &str = "id, text, pub_date, author_id, group_id, image";

pub(crate) const POST_VIEW_SELECT: &str = "SELECT p.id, p.text, p.pub_date, p.image, p.author_id, \
    u.username AS author_username, p.group_id, g.slug AS group_slug, g.title AS group_title, \
    (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comments_count \
    FROM posts p \
    JOIN users u ON u.id = p.author_id \
    LEFT JOIN post_groups g ON g.id = p.group_id";

impl Store {
    /// Publishes a post. `pub_date` is assigned here and never changes afterwards.
    ///
    /// The text must be non-empty and must not equal the text of any stored post.
    pub async fn create_post(&self, new: NewPost) -> Result<Post> {
        let text = new.text.trim();
        self.validate_post(text, new.group).await?;

        let post = sqlx::query_as::<_, Post>(&format!(
            "INSERT INTO posts (text, pub_date, author_id, group_id, image) VALUES (?, ?, ?, ?, ?) RETURNING {POST_COLUMNS}"
        ))
        .bind(text)
        .bind(Utc::now())
        .bind(new.author)
        .bind(new.group)
        .bind(new.image.as_deref())
        .fetch_one(&self.pool)
        .await?;
        tracing::debug!(post = %post.id, author = %post.author_id, "post created");
        Ok(post)
    }

    /// Loads a post by primary key.
    pub async fn get_post(&self, id: PostId) -> Result<Post> {
        sqlx::query_as::<_, Post>(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("post"))
    }

    /// Loads a post for display, requiring that `username` wrote it.
    pub async fn post_view(&self, username: &str, id: PostId) -> Result<PostView> {
        sqlx::query_as::<_, PostView>(&format!("{POST_VIEW_SELECT} WHERE p.id = ? AND u.username = ?"))
            .bind(id)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("post"))
    }

    /// Rewrites a post's text, group and optionally its image.
    ///
    /// The same uniqueness rule as [`Store::create_post`] applies, which means
    /// resubmitting the unchanged text is rejected too.
    pub async fn update_post(&self, id: PostId, changes: PostChanges) -> Result<Post> {
        let current = self.get_post(id).await?;
        let text = changes.text.trim();
        self.validate_post(text, changes.group).await?;

        let image = changes.image.or(current.image);
        let post = sqlx::query_as::<_, Post>(&format!(
            "UPDATE posts SET text = ?, group_id = ?, image = ? WHERE id = ? RETURNING {POST_COLUMNS}"
        ))
        .bind(text)
        .bind(changes.group)
        .bind(image.as_deref())
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        tracing::debug!(post = %post.id, "post updated");
        Ok(post)
    }

    /// Deletes a post and its comments.
    pub async fn delete_post(&self, id: PostId) -> Result<()> {
        let done = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if done.rows_affected() == 0 {
            return Err(StoreError::NotFound("post"));
        }
        tracing::debug!(post = %id, "post deleted");
        Ok(())
    }

    /// Number of stored posts.
    pub async fn count_posts(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Returns `true` if any post already has exactly this text.
    pub async fn post_text_exists(&self, text: &str) -> Result<bool> {
        let exists: i64 = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM posts WHERE text = ?)")
            .bind(text)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists != 0)
    }

    /// Collects the field errors [`Store::create_post`] would report for this
    /// text and group, without writing anything.
    pub async fn check_post(&self, text: &str, group: Option<GroupId>) -> Result<FieldErrors> {
        let text = text.trim();
        let mut errors = FieldErrors::new();
        if text.is_empty() {
            errors.add("text", messages::REQUIRED);
        } else if self.post_text_exists(text).await? {
            errors.add("text", messages::TEXT_NOT_UNIQUE);
        }
        if let Some(group) = group {
            if !self.group_exists(group).await? {
                errors.add("group", messages::UNKNOWN_GROUP);
            }
        }
        Ok(errors)
    }

    async fn validate_post(&self, text: &str, group: Option<GroupId>) -> Result<()> {
        let errors = self.check_post(text, group).await?;
        if !errors.is_empty() {
            tracing::debug!(%errors, "post rejected");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{group, new_store, post, user};
    use crate::{GroupId, NewPost, PostChanges, PostId, StoreError, messages};

    #[tokio::test]
    async fn test_create_post_assigns_pub_date_and_trims() {
        let store = new_store().await;
        let author = user(&store, "kek1").await;
        let created = store
            .create_post(NewPost {
                author: author.id,
                text: "  Test post  ".into(),
                group: None,
                image: Some("posts/small.gif".into()),
            })
            .await
            .unwrap();
        assert_eq!(created.text, "Test post");
        assert_eq!(created.image.as_deref(), Some("posts/small.gif"));
        assert_eq!(store.get_post(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_duplicate_text_is_rejected() {
        let store = new_store().await;
        let first = user(&store, "kek1").await;
        let second = user(&store, "kek2").await;
        post(&store, &first, "Test post", None).await;

        let err = store
            .create_post(NewPost {
                author: second.id,
                text: "Test post".into(),
                group: None,
                image: None,
            })
            .await
            .unwrap_err();
        let StoreError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.get("text"), [messages::TEXT_NOT_UNIQUE]);
        assert_eq!(store.count_posts().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_text_and_unknown_group() {
        let store = new_store().await;
        let author = user(&store, "kek1").await;
        let err = store
            .create_post(NewPost {
                author: author.id,
                text: "   ".into(),
                group: Some(GroupId(404)),
                image: None,
            })
            .await
            .unwrap_err();
        let StoreError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.get("text"), [messages::REQUIRED]);
        assert_eq!(errors.get("group"), [messages::UNKNOWN_GROUP]);
        assert_eq!(store.count_posts().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_check_post_reports_without_writing() {
        let store = new_store().await;
        let author = user(&store, "kek1").await;
        post(&store, &author, "Test post", None).await;

        let errors = store.check_post("  Test post ", Some(GroupId(404))).await.unwrap();
        assert_eq!(errors.get("text"), [messages::TEXT_NOT_UNIQUE]);
        assert_eq!(errors.get("group"), [messages::UNKNOWN_GROUP]);
        assert!(store.check_post("Fresh text", None).await.unwrap().is_empty());
        assert_eq!(store.count_posts().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_post() {
        let store = new_store().await;
        let author = user(&store, "kek1").await;
        let cats = group(&store, "cats").await;
        let original = store
            .create_post(NewPost {
                author: author.id,
                text: "Test post".into(),
                group: None,
                image: Some("posts/a.png".into()),
            })
            .await
            .unwrap();

        let updated = store
            .update_post(
                original.id,
                PostChanges {
                    text: "Edited test post".into(),
                    group: Some(cats.id),
                    image: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.text, "Edited test post");
        assert_eq!(updated.group_id, Some(cats.id));
        assert_eq!(updated.pub_date, original.pub_date);
        assert_eq!(updated.image.as_deref(), Some("posts/a.png"));

        // Unchanged text collides with itself.
        let err = store
            .update_post(
                original.id,
                PostChanges {
                    text: "Edited test post".into(),
                    group: None,
                    image: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(store.get_post(original.id).await.unwrap().text, "Edited test post");
    }

    #[tokio::test]
    async fn test_post_view_requires_matching_author() {
        let store = new_store().await;
        let author = user(&store, "Petya").await;
        let other = user(&store, "Vasya").await;
        let created = post(&store, &author, "Petya's post", None).await;

        let view = store.post_view("Petya", created.id).await.unwrap();
        assert_eq!(view.author_username, "Petya");
        assert_eq!(view.comments_count, 0);
        assert!(store.post_view(&other.username, created.id).await.unwrap_err().is_not_found());
        assert!(store.post_view("Petya", PostId(999)).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_post() {
        let store = new_store().await;
        let author = user(&store, "kek1").await;
        let created = post(&store, &author, "short lived", None).await;
        store.delete_post(created.id).await.unwrap();
        assert!(store.get_post(created.id).await.unwrap_err().is_not_found());
        assert!(store.delete_post(created.id).await.unwrap_err().is_not_found());
    }
}
