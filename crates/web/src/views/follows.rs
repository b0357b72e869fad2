use salvo::prelude::*;
use yatube_store::FollowOutcome;

use super::username_param;
use crate::access;
use crate::error::AppError;
use crate::identity::Viewer;
use crate::state::AppState;
use crate::urls;

/// `POST /{username}/follow/`
#[handler]
pub async fn profile_follow(req: &mut Request, depot: &mut Depot, res: &mut Response) -> Result<(), AppError> {
    let state = AppState::from_depot(depot)?;
    let Some(viewer) = Viewer::from_depot(depot).id() else {
        urls::redirect(res, &access::login_url(req.uri().path()));
        return Ok(());
    };
    let author = state.store.user_by_username(&username_param(req)?).await?;
    match state.store.follow(viewer, author.id).await? {
        FollowOutcome::Created => tracing::info!(%viewer, author = %author.username, "followed"),
        FollowOutcome::AlreadyFollowing => {}
        FollowOutcome::SelfFollow => tracing::debug!(%viewer, "ignored attempt to follow self"),
    }
    urls::redirect(res, &urls::profile(&author.username));
    Ok(())
}

/// `POST /{username}/unfollow/`
#[handler]
pub async fn profile_unfollow(req: &mut Request, depot: &mut Depot, res: &mut Response) -> Result<(), AppError> {
    let state = AppState::from_depot(depot)?;
    let Some(viewer) = Viewer::from_depot(depot).id() else {
        urls::redirect(res, &access::login_url(req.uri().path()));
        return Ok(());
    };
    let author = state.store.user_by_username(&username_param(req)?).await?;
    if state.store.unfollow(viewer, author.id).await? {
        tracing::info!(%viewer, author = %author.username, "unfollowed");
    }
    urls::redirect(res, &urls::profile(&author.username));
    Ok(())
}
