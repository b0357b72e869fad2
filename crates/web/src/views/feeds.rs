use salvo::prelude::*;

use super::{page_request, username_param};
use crate::error::AppError;
use crate::identity::Viewer;
use crate::state::AppState;
use crate::templates;

/// `GET /`: every post, newest first. Served through the page cache.
#[handler]
pub async fn index(req: &mut Request, depot: &mut Depot) -> Result<Text<String>, AppError> {
    let state = AppState::from_depot(depot)?;
    let page = state.store.list_all(page_request(req)).await?;

    let mut ctx = templates::context(&Viewer::from_depot(depot));
    ctx.insert("page", &page);
    templates::render(&state.templates, "index.html", &ctx)
}

/// `GET /group/{slug}/`
#[handler]
pub async fn group_posts(req: &mut Request, depot: &mut Depot) -> Result<Text<String>, AppError> {
    let state = AppState::from_depot(depot)?;
    let slug = req.param::<String>("slug").ok_or(AppError::NotFound("group"))?;
    let feed = state.store.list_by_group(&slug, page_request(req)).await?;

    let mut ctx = templates::context(&Viewer::from_depot(depot));
    ctx.insert("group", &feed.group);
    ctx.insert("page", &feed.page);
    templates::render(&state.templates, "group.html", &ctx)
}

/// `GET /{username}/`: the author's posts with follow state and counters.
#[handler]
pub async fn profile(req: &mut Request, depot: &mut Depot) -> Result<Text<String>, AppError> {
    let state = AppState::from_depot(depot)?;
    let viewer = Viewer::from_depot(depot);
    let username = username_param(req)?;
    let feed = state
        .store
        .list_by_author(&username, viewer.id(), page_request(req))
        .await?;

    let mut ctx = templates::context(&viewer);
    ctx.insert("author", &feed.author);
    ctx.insert("page", &feed.page);
    ctx.insert("posts_count", &feed.posts_count);
    ctx.insert("following", &feed.following);
    ctx.insert("followers_count", &feed.followers_count);
    ctx.insert("following_count", &feed.following_count);
    templates::render(&state.templates, "profile.html", &ctx)
}

/// `GET /follow/`: posts by the authors the viewer follows. Requires login.
#[handler]
pub async fn follow_index(req: &mut Request, depot: &mut Depot) -> Result<Text<String>, AppError> {
    let state = AppState::from_depot(depot)?;
    let viewer = Viewer::from_depot(depot);
    let page = state.store.list_followed_feed(viewer.id(), page_request(req)).await?;

    let mut ctx = templates::context(&viewer);
    ctx.insert("page", &page);
    templates::render(&state.templates, "follow.html", &ctx)
}
