use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(pub i64);

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

id_type!(
    /// Primary key of a [`User`].
    UserId
);
id_type!(
    /// Primary key of a [`Group`].
    GroupId
);
id_type!(
    /// Primary key of a [`Post`].
    PostId
);
id_type!(
    /// Primary key of a [`Comment`].
    CommentId
);

/// A registered author or reader.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, FromRow)]
pub struct User {
    /// Primary key.
    pub id: UserId,
    /// Unique login name, also the profile path segment.
    pub username: String,
    /// Argon2 PHC string. Never serialized.
    #[serde(skip)]
    pub password_hash: String,
    /// Registration time.
    pub date_joined: DateTime<Utc>,
}

/// Input for [`Store::create_user`](crate::Store::create_user).
#[derive(Clone, Debug, Default)]
pub struct NewUser {
    /// Requested login name, trimmed before validation.
    pub username: String,
    /// Already hashed; the store never sees plain passwords.
    pub password_hash: String,
}

/// A community posts can be filed under.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, FromRow)]
pub struct Group {
    /// Primary key.
    pub id: GroupId,
    /// Display name.
    pub title: String,
    /// Unique URL segment under `/group/`.
    pub slug: String,
    /// Optional blurb shown on the group page.
    pub description: Option<String>,
}

/// Input for [`Store::create_group`](crate::Store::create_group).
#[derive(Clone, Debug, Default)]
pub struct NewGroup {
    /// Display name.
    pub title: String,
    /// URL segment, `[A-Za-z0-9_-]+`.
    pub slug: String,
    /// Optional blurb.
    pub description: Option<String>,
}

/// A post row as stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, FromRow)]
pub struct Post {
    /// Primary key.
    pub id: PostId,
    /// Body text, unique across all posts.
    pub text: String,
    /// Publication time, set on insert.
    pub pub_date: DateTime<Utc>,
    /// The writer.
    pub author_id: UserId,
    /// Group the post is filed under, cleared when the group is deleted.
    pub group_id: Option<GroupId>,
    /// Path of the attached image relative to the media root.
    pub image: Option<String>,
}

/// A post joined with what a page needs to show it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, FromRow)]
pub struct PostView {
    /// Primary key.
    pub id: PostId,
    /// Body text.
    pub text: String,
    /// Publication time.
    pub pub_date: DateTime<Utc>,
    /// Attached image, relative to the media root.
    pub image: Option<String>,
    /// The writer.
    pub author_id: UserId,
    /// The writer's username.
    pub author_username: String,
    /// Group the post is filed under.
    pub group_id: Option<GroupId>,
    /// Slug of that group.
    pub group_slug: Option<String>,
    /// Title of that group.
    pub group_title: Option<String>,
    /// Comments on the post.
    pub comments_count: i64,
}

/// Input for [`Store::create_post`](crate::Store::create_post).
#[derive(Clone, Debug)]
pub struct NewPost {
    /// The writer.
    pub author: UserId,
    /// Body text, trimmed before validation.
    pub text: String,
    /// Optional group.
    pub group: Option<GroupId>,
    /// Stored image path relative to the media root.
    pub image: Option<String>,
}

/// Input for [`Store::update_post`](crate::Store::update_post).
///
/// `image` replaces the current attachment when set and keeps it otherwise.
#[derive(Clone, Debug)]
pub struct PostChanges {
    /// New body text.
    pub text: String,
    /// New group, `None` detaches the post.
    pub group: Option<GroupId>,
    /// Replacement image.
    pub image: Option<String>,
}

/// A comment row as stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, FromRow)]
pub struct Comment {
    /// Primary key.
    pub id: CommentId,
    /// The commented post.
    pub post_id: PostId,
    /// The commenter.
    pub author_id: UserId,
    /// Comment body.
    pub text: String,
    /// Creation time, set on insert.
    pub created: DateTime<Utc>,
}

/// A comment joined with its author's username.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, FromRow)]
pub struct CommentView {
    /// Primary key.
    pub id: CommentId,
    /// The commented post.
    pub post_id: PostId,
    /// The commenter.
    pub author_id: UserId,
    /// The commenter's username.
    pub author_username: String,
    /// Comment body.
    pub text: String,
    /// Creation time.
    pub created: DateTime<Utc>,
}

/// Input for [`Store::add_comment`](crate::Store::add_comment).
#[derive(Clone, Debug)]
pub struct NewComment {
    /// Post being commented on.
    pub post: PostId,
    /// The commenter.
    pub author: UserId,
    /// Comment body, trimmed before validation.
    pub text: String,
}
