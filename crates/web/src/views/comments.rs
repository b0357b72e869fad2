use salvo::prelude::*;
use yatube_store::{CommentId, NewComment, StoreError};

use super::{post_id_param, username_param};
use crate::access::{self, is_owner};
use crate::error::AppError;
use crate::identity::Viewer;
use crate::state::AppState;
use crate::urls;

/// `POST /{username}/{post_id}/comment`: blank comments are dropped silently.
#[handler]
pub async fn add_comment(req: &mut Request, depot: &mut Depot, res: &mut Response) -> Result<(), AppError> {
    let state = AppState::from_depot(depot)?.clone();
    let viewer = Viewer::from_depot(depot);
    let Some(author) = viewer.id() else {
        urls::redirect(res, &access::login_url(req.uri().path()));
        return Ok(());
    };
    let post = state.store.post_view(&username_param(req)?, post_id_param(req)?).await?;
    let text = req.form::<String>("text").await.unwrap_or_default();

    match state
        .store
        .add_comment(NewComment {
            post: post.id,
            author,
            text,
        })
        .await
    {
        Ok(comment) => tracing::debug!(comment = %comment.id, post = %post.id, "comment added"),
        Err(StoreError::Validation(errors)) => tracing::debug!(%errors, "comment rejected"),
        Err(e) => return Err(e.into()),
    }
    urls::redirect(res, &urls::post(&post.author_username, post.id));
    Ok(())
}

/// `POST /{username}/{post_id}/comment_del/{comment_id}`
#[handler]
pub async fn delete_comment(req: &mut Request, depot: &mut Depot, res: &mut Response) -> Result<(), AppError> {
    let state = AppState::from_depot(depot)?;
    let viewer = Viewer::from_depot(depot);
    let post = state.store.post_view(&username_param(req)?, post_id_param(req)?).await?;
    let comment_id = req
        .param::<i64>("comment_id")
        .map(CommentId)
        .ok_or(AppError::NotFound("comment"))?;
    let comment = state.store.comment_of_post(post.id, comment_id).await?;

    if is_owner(&viewer, comment.author_id) {
        state.store.delete_comment(comment.id).await?;
        tracing::debug!(comment = %comment.id, "comment deleted");
    } else {
        tracing::warn!(comment = %comment.id, "not the author of the comment");
    }
    urls::redirect(res, &urls::post(&post.author_username, post.id));
    Ok(())
}
