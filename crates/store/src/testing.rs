use crate::{Group, NewGroup, NewPost, NewUser, Post, Store, User};

pub(crate) async fn new_store() -> Store {
    Store::in_memory().await.unwrap()
}

pub(crate) async fn user(store: &Store, username: &str) -> User {
    store
        .create_user(NewUser {
            username: username.into(),
            password_hash: String::new(),
        })
        .await
        .unwrap()
}

pub(crate) async fn group(store: &Store, slug: &str) -> Group {
    store
        .create_group(NewGroup {
            title: format!("Group {slug}"),
            slug: slug.into(),
            description: Some("group description".into()),
        })
        .await
        .unwrap()
}

pub(crate) async fn post(store: &Store, author: &User, text: &str, group: Option<&Group>) -> Post {
    store
        .create_post(NewPost {
            author: author.id,
            text: text.into(),
            group: group.map(|g| g.id),
            image: None,
        })
        .await
        .unwrap()
}
