use crate::error::{Result, StoreError};
use crate::models::{Group, GroupId, NewGroup};
use crate::validation::{FieldErrors, is_valid_slug, messages};
use crate::Store;

impl Store {
    /// Creates a group. Groups are administered out of band, there is no HTTP route for this.
    pub async fn create_group(&self, new: NewGroup) -> Result<Group> {
        let title = new.title.trim();
        let slug = new.slug.trim();
        let mut errors = FieldErrors::new();
        if title.is_empty() {
            errors.add("title", messages::REQUIRED);
        }
        if !is_valid_slug(slug) {
            errors.add("slug", messages::INVALID_SLUG);
        } else if self.find_group_by_slug(slug).await?.is_some() {
            errors.add("slug", messages::SLUG_TAKEN);
        }
        errors.into_result()?;

        let description = new.description.as_deref().map(str::trim).filter(|d| !d.is_empty());
        let group = sqlx::query_as::<_, Group>(
            "INSERT INTO post_groups (title, slug, description) VALUES (?, ?, ?)
             RETURNING id, title, slug, description",
        )
        .bind(title)
        .bind(slug)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(slug = %group.slug, "group created");
        Ok(group)
    }

    /// Looks a group up by slug.
    pub async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        let group = sqlx::query_as::<_, Group>("SELECT id, title, slug, description FROM post_groups WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(group)
    }

    /// Like [`Store::find_group_by_slug`] but a missing group is [`StoreError::NotFound`].
    pub async fn group_by_slug(&self, slug: &str) -> Result<Group> {
        self.find_group_by_slug(slug)
            .await?
            .ok_or(StoreError::NotFound("group"))
    }

    /// All groups ordered by title, for selectors.
    pub async fn list_groups(&self) -> Result<Vec<Group>> {
        let groups = sqlx::query_as::<_, Group>("SELECT id, title, slug, description FROM post_groups ORDER BY title, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(groups)
    }

    pub(crate) async fn group_exists(&self, id: GroupId) -> Result<bool> {
        let exists: i64 = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM post_groups WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists != 0)
    }

    /// Deletes a group. Its posts stay and lose their group.
    pub async fn delete_group(&self, id: GroupId) -> Result<()> {
        let done = sqlx::query("DELETE FROM post_groups WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if done.rows_affected() == 0 {
            return Err(StoreError::NotFound("group"));
        }
        tracing::info!(%id, "group deleted");
        Ok(())
    }
}
