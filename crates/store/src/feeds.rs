use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite};

use crate::error::Result;
use crate::models::{Group, GroupId, PostView, User, UserId};
use crate::pagination::{Page, PageRequest};
use crate::posts::POST_VIEW_SELECT;
use crate::Store;

/// The posts of one group, newest first.
#[derive(Clone, Debug, Serialize)]
pub struct GroupFeed {
    /// The group looked up by slug.
    pub group: Group,
    /// Requested page of its posts.
    pub page: Page<PostView>,
}

/// An author's profile: their posts plus follow statistics.
#[derive(Clone, Debug, Serialize)]
pub struct AuthorFeed {
    /// The author looked up by username.
    pub author: User,
    /// Requested page of their posts.
    pub page: Page<PostView>,
    /// Posts written by the author across all pages.
    pub posts_count: i64,
    /// Whether the viewer follows the author. Always `false` for anonymous viewers.
    pub following: bool,
    /// Users following the author.
    pub followers_count: i64,
    /// Authors the author follows.
    pub following_count: i64,
}

#[derive(Clone, Copy, Debug)]
enum Scope {
    All,
    Group(GroupId),
    Author(UserId),
    FollowedBy(UserId),
}

impl Scope {
    fn push_filter(self, query: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            Self::All => {}
            Self::Group(group) => {
                query.push(" WHERE p.group_id = ").push_bind(group);
            }
            Self::Author(author) => {
                query.push(" WHERE p.author_id = ").push_bind(author);
            }
            Self::FollowedBy(user) => {
                query
                    .push(" WHERE p.author_id IN (SELECT f.author_id FROM follows f WHERE f.user_id = ")
                    .push_bind(user)
                    .push(")");
            }
        }
    }
}

impl Store {
    async fn page_of(&self, scope: Scope, request: PageRequest) -> Result<Page<PostView>> {
        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM posts p");
        scope.push_filter(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let window = request.resolve(total);
        let mut select = QueryBuilder::<Sqlite>::new(POST_VIEW_SELECT);
        scope.push_filter(&mut select);
        select
            .push(" ORDER BY p.pub_date DESC, p.id DESC LIMIT ")
            .push_bind(window.limit)
            .push(" OFFSET ")
            .push_bind(window.offset);
        let items = select.build_query_as::<PostView>().fetch_all(&self.pool).await?;
        tracing::trace!(?scope, number = window.number, total, "feed page loaded");
        Ok(Page::new(items, window, total))
    }

    /// Every post, newest first.
    pub async fn list_all(&self, request: PageRequest) -> Result<Page<PostView>> {
        self.page_of(Scope::All, request).await
    }

    /// Posts filed under the group with `slug`. Unknown slugs are [`StoreError::NotFound`](crate::StoreError::NotFound).
    pub async fn list_by_group(&self, slug: &str, request: PageRequest) -> Result<GroupFeed> {
        let group = self.group_by_slug(slug).await?;
        let page = self.page_of(Scope::Group(group.id), request).await?;
        Ok(GroupFeed { group, page })
    }

    /// An author's posts and profile statistics as seen by `viewer`.
    pub async fn list_by_author(
        &self,
        username: &str,
        viewer: Option<UserId>,
        request: PageRequest,
    ) -> Result<AuthorFeed> {
        let author = self.user_by_username(username).await?;
        let page = self.page_of(Scope::Author(author.id), request).await?;
        let following = self.is_following(viewer, author.id).await?;
        let followers_count = self.follower_count(author.id).await?;
        let following_count = self.following_count(author.id).await?;
        Ok(AuthorFeed {
            posts_count: page.total,
            author,
            page,
            following,
            followers_count,
            following_count,
        })
    }

    /// Posts by the authors `viewer` follows. Anonymous viewers get an empty page.
    pub async fn list_followed_feed(&self, viewer: Option<UserId>, request: PageRequest) -> Result<Page<PostView>> {
        match viewer {
            Some(user) => self.page_of(Scope::FollowedBy(user), request).await,
            None => Ok(Page::empty()),
        }
    }

    /// Number of posts written by `author`.
    pub async fn count_posts_by(&self, author: UserId) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE author_id = ?")
            .bind(author)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
