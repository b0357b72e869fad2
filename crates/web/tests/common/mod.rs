#![allow(dead_code, unreachable_pub)]

use std::path::PathBuf;
use std::time::Duration;

use salvo::prelude::*;
use salvo::test::{ResponseExt, TestClient};
use uuid::Uuid;
use yatube_store::{Group, NewGroup, NewPost, NewUser, Post, Store, User, UserId};
use yatube_web::views::accounts::hash_password;
use yatube_web::{AppState, Identity, router, service};

pub const BASE: &str = "http://127.0.0.1:5800";

/// Header naming the user a test request acts as.
pub const USER_HEADER: &str = "x-user-id";

pub const PASSWORD: &str = "s3cret-pass";

/// Identity read from [`USER_HEADER`].
#[derive(Clone, Copy, Debug)]
pub struct HeaderIdentity;

impl Identity for HeaderIdentity {
    fn current_user(&self, req: &Request, _depot: &Depot) -> Option<UserId> {
        req.header::<i64>(USER_HEADER).map(UserId)
    }
}

/// A service wired like production, minus the session.
pub struct TestApp {
    pub state: AppState,
    pub service: Service,
    pub media_root: PathBuf,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_router(|state| router(state, HeaderIdentity)).await
    }

    pub async fn with_router(build: impl FnOnce(AppState) -> Router) -> Self {
        let store = Store::in_memory().await.unwrap();
        let media_root = std::env::temp_dir().join(format!("yatube-test-{}", Uuid::new_v4()));
        let state = AppState::new(store, media_root.clone(), Duration::from_secs(20)).unwrap();
        let service = service(build(state.clone()), state.templates.clone());
        Self {
            state,
            service,
            media_root,
        }
    }

    pub fn store(&self) -> &Store {
        &self.state.store
    }

    pub async fn user(&self, username: &str) -> User {
        self.store()
            .create_user(NewUser {
                username: username.to_owned(),
                password_hash: hash_password(PASSWORD).unwrap(),
            })
            .await
            .unwrap()
    }

    pub async fn group(&self, slug: &str) -> Group {
        self.store()
            .create_group(NewGroup {
                title: format!("Group {slug}"),
                slug: slug.to_owned(),
                description: None,
            })
            .await
            .unwrap()
    }

    pub async fn post(&self, author: &User, text: &str, group: Option<&Group>) -> Post {
        self.store()
            .create_post(NewPost {
                author: author.id,
                text: text.to_owned(),
                group: group.map(|g| g.id),
                image: None,
            })
            .await
            .unwrap()
    }

    pub async fn get(&self, path: &str, as_user: Option<&User>) -> Response {
        with_user(TestClient::get(format!("{BASE}{path}")), as_user)
            .send(&self.service)
            .await
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)], as_user: Option<&User>) -> Response {
        with_user(TestClient::post(format!("{BASE}{path}")), as_user)
            .form(&form)
            .send(&self.service)
            .await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.media_root);
    }
}

fn with_user(builder: salvo::test::RequestBuilder, as_user: Option<&User>) -> salvo::test::RequestBuilder {
    match as_user {
        Some(user) => builder.add_header(USER_HEADER, user.id.0.to_string(), true),
        None => builder,
    }
}

pub async fn body(res: &mut Response) -> String {
    res.take_string().await.unwrap()
}

pub fn location(res: &Response) -> &str {
    res.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Number of posts rendered on a feed page.
pub fn post_count(html: &str) -> usize {
    html.matches("<article class=\"post\"").count()
}
