use std::path::{Path, PathBuf};

use salvo::prelude::*;
use uuid::Uuid;
use yatube_store::{
    FieldErrors, GroupId, NewPost, Post, PostChanges, PostView, StoreError, UserId, image_extension, messages,
};

use super::{post_id_param, username_param};
use crate::access::{self, is_owner};
use crate::error::AppError;
use crate::identity::Viewer;
use crate::state::AppState;
use crate::{templates, urls};

/// Uploaded images land in this directory below the media root.
const UPLOAD_DIR: &str = "posts";

/// `GET /{username}/{post_id}/`: one post with its comments.
#[handler]
pub async fn post_view(req: &mut Request, depot: &mut Depot) -> Result<Text<String>, AppError> {
    let state = AppState::from_depot(depot)?;
    let post = state.store.post_view(&username_param(req)?, post_id_param(req)?).await?;
    let comments = state.store.comments_for_post(post.id).await?;
    let posts_count = state.store.count_posts_by(post.author_id).await?;

    let mut ctx = templates::context(&Viewer::from_depot(depot));
    ctx.insert("post", &post);
    ctx.insert("comments", &comments);
    ctx.insert("posts_count", &posts_count);
    templates::render(&state.templates, "post.html", &ctx)
}

/// `GET /new/`
#[handler]
pub async fn new_post_form(depot: &mut Depot) -> Result<Text<String>, AppError> {
    let state = AppState::from_depot(depot)?;
    let form = FormPage {
        action: "/new/".to_owned(),
        ..FormPage::default()
    };
    render_form(state, &Viewer::from_depot(depot), &form).await
}

/// `POST /new/`: publishes a post and redirects to the index.
#[handler]
pub async fn create_post(req: &mut Request, depot: &mut Depot, res: &mut Response) -> Result<(), AppError> {
    let state = AppState::from_depot(depot)?.clone();
    let viewer = Viewer::from_depot(depot);
    let Some(author) = viewer.id() else {
        urls::redirect(res, &access::login_url(req.uri().path()));
        return Ok(());
    };
    let form = PostForm::read(req).await?;

    match save(&state, Target::New(author), &form).await? {
        Ok(post) => {
            tracing::info!(post = %post.id, author = %viewer_name(&viewer), "post published");
            urls::redirect(res, urls::INDEX);
        }
        Err(errors) => {
            let page = FormPage {
                action: "/new/".to_owned(),
                text: form.text,
                selected_group: form.group.as_deref().and_then(|g| g.parse().ok()).map(GroupId),
                errors,
                ..FormPage::default()
            };
            res.render(render_form(&state, &viewer, &page).await?);
        }
    }
    Ok(())
}

/// `GET /{username}/{post_id}/edit/`: owners get the form, everyone else the post page.
#[handler]
pub async fn edit_post_form(req: &mut Request, depot: &mut Depot, res: &mut Response) -> Result<(), AppError> {
    let state = AppState::from_depot(depot)?;
    let viewer = Viewer::from_depot(depot);
    let post = state.store.post_view(&username_param(req)?, post_id_param(req)?).await?;
    if !is_owner(&viewer, post.author_id) {
        deny(res, &viewer, &post);
        return Ok(());
    }
    let page = FormPage::editing(&post);
    res.render(render_form(state, &viewer, &page).await?);
    Ok(())
}

/// `POST /{username}/{post_id}/edit/`
#[handler]
pub async fn update_post(req: &mut Request, depot: &mut Depot, res: &mut Response) -> Result<(), AppError> {
    let state = AppState::from_depot(depot)?.clone();
    let viewer = Viewer::from_depot(depot);
    let post = state.store.post_view(&username_param(req)?, post_id_param(req)?).await?;
    if !is_owner(&viewer, post.author_id) {
        deny(res, &viewer, &post);
        return Ok(());
    }
    let form = PostForm::read(req).await?;

    match save(&state, Target::Existing(&post), &form).await? {
        Ok(updated) => {
            tracing::info!(post = %updated.id, "post edited");
            urls::redirect(res, &urls::post(&post.author_username, post.id));
        }
        Err(errors) => {
            let page = FormPage {
                text: form.text,
                selected_group: form.group.as_deref().and_then(|g| g.parse().ok()).map(GroupId),
                errors,
                ..FormPage::editing(&post)
            };
            res.render(render_form(&state, &viewer, &page).await?);
        }
    }
    Ok(())
}

/// `POST /{username}/{post_id}/post_del/`
#[handler]
pub async fn delete_post(req: &mut Request, depot: &mut Depot, res: &mut Response) -> Result<(), AppError> {
    let state = AppState::from_depot(depot)?;
    let viewer = Viewer::from_depot(depot);
    let post = state.store.post_view(&username_param(req)?, post_id_param(req)?).await?;
    if !is_owner(&viewer, post.author_id) {
        deny(res, &viewer, &post);
        return Ok(());
    }
    state.store.delete_post(post.id).await?;
    tracing::info!(post = %post.id, "post deleted");
    urls::redirect(res, urls::INDEX);
    Ok(())
}

fn deny(res: &mut Response, viewer: &Viewer, post: &PostView) {
    tracing::warn!(post = %post.id, viewer = %viewer_name(viewer), "not the author of the post");
    urls::redirect(res, &urls::post(&post.author_username, post.id));
}

fn viewer_name(viewer: &Viewer) -> &str {
    viewer.as_user().map_or("anonymous", |u| u.username.as_str())
}

/// Raw post form fields.
#[derive(Debug)]
struct PostForm {
    text: String,
    group: Option<String>,
    image: Option<Upload>,
}

#[derive(Debug)]
struct Upload {
    file_name: String,
    path: PathBuf,
}

impl PostForm {
    async fn read(req: &mut Request) -> Result<Self, AppError> {
        let form = req.form_data().await?;
        let text = form.fields.get("text").cloned().unwrap_or_default();
        let group = form
            .fields
            .get("group")
            .map(|g| g.trim().to_owned())
            .filter(|g| !g.is_empty());
        // Browsers submit an empty part when no file was picked.
        let image = form.files.get("image").and_then(|file| {
            let file_name = file.name()?.trim();
            (!file_name.is_empty() && file.size() > 0).then(|| Upload {
                file_name: file_name.to_owned(),
                path: file.path().clone(),
            })
        });
        Ok(Self { text, group, image })
    }
}

enum Target<'a> {
    New(UserId),
    Existing(&'a PostView),
}

/// Validates the form and writes it. Field errors come back in the inner `Err`.
async fn save(state: &AppState, target: Target<'_>, form: &PostForm) -> Result<Result<Post, FieldErrors>, AppError> {
    let mut errors = FieldErrors::new();
    let group = match form.group.as_deref().map(str::parse::<i64>) {
        None => None,
        Some(Ok(id)) => Some(GroupId(id)),
        Some(Err(_)) => {
            errors.add("group", messages::UNKNOWN_GROUP);
            None
        }
    };
    let image = match &form.image {
        None => None,
        Some(upload) => match image_extension(&upload.file_name) {
            Some(ext) => Some((upload, ext)),
            None => {
                errors.add("image", messages::INVALID_IMAGE);
                None
            }
        },
    };
    if !errors.is_empty() {
        // Report text and group problems alongside the form ones.
        errors.merge(state.store.check_post(&form.text, group).await?);
        return Ok(Err(errors));
    }

    let stored = match image {
        Some((upload, ext)) => Some(store_upload(state.media_root(), &upload.path, ext).await?),
        None => None,
    };
    let saved = match target {
        Target::New(author) => {
            state
                .store
                .create_post(NewPost {
                    author,
                    text: form.text.clone(),
                    group,
                    image: stored.clone(),
                })
                .await
        }
        Target::Existing(post) => {
            state
                .store
                .update_post(
                    post.id,
                    PostChanges {
                        text: form.text.clone(),
                        group,
                        image: stored.clone(),
                    },
                )
                .await
        }
    };
    let saved = match saved {
        Ok(post) => return Ok(Ok(post)),
        Err(e) => e,
    };
    if let Some(path) = &stored {
        discard_upload(state.media_root(), path).await;
    }
    match saved {
        StoreError::Validation(errors) => Ok(Err(errors)),
        e => Err(e.into()),
    }
}

/// Copies an upload below the media root and returns its media-relative path.
async fn store_upload(media_root: &Path, source: &Path, ext: &str) -> Result<String, AppError> {
    let dir = media_root.join(UPLOAD_DIR);
    tokio::fs::create_dir_all(&dir).await?;
    let file_name = format!("{}.{ext}", Uuid::new_v4());
    tokio::fs::copy(source, dir.join(&file_name)).await?;
    tracing::debug!(file = %file_name, "image stored");
    Ok(format!("{UPLOAD_DIR}/{file_name}"))
}

async fn discard_upload(media_root: &Path, relative: &str) {
    if let Err(e) = tokio::fs::remove_file(media_root.join(relative)).await {
        tracing::warn!(error = %e, file = relative, "failed to remove rejected upload");
    }
}

/// What the post form shows.
#[derive(Debug, Default)]
struct FormPage {
    action: String,
    editing: bool,
    text: String,
    selected_group: Option<GroupId>,
    current_image: Option<String>,
    errors: FieldErrors,
}

impl FormPage {
    fn editing(post: &PostView) -> Self {
        Self {
            action: format!("{}edit/", urls::post(&post.author_username, post.id)),
            editing: true,
            text: post.text.clone(),
            selected_group: post.group_id,
            current_image: post.image.clone(),
            errors: FieldErrors::new(),
        }
    }
}

async fn render_form(state: &AppState, viewer: &Viewer, page: &FormPage) -> Result<Text<String>, AppError> {
    let groups = state.store.list_groups().await?;
    let mut ctx = templates::context(viewer);
    ctx.insert("action", &page.action);
    ctx.insert("editing", &page.editing);
    ctx.insert("text", &page.text);
    ctx.insert("groups", &groups);
    ctx.insert("selected_group", &page.selected_group);
    ctx.insert("current_image", &page.current_image);
    ctx.insert("text_errors", page.errors.get("text"));
    ctx.insert("group_errors", page.errors.get("group"));
    ctx.insert("image_errors", page.errors.get("image"));
    templates::render(&state.templates, "post_form.html", &ctx)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use yatube_store::Store;

    use super::*;

    async fn state_with_closed_store() -> AppState {
        let store = Store::in_memory().await.unwrap();
        store.pool().close().await;
        let media_root = std::env::temp_dir().join(format!("yatube-posts-{}", Uuid::new_v4()));
        AppState::new(store, media_root, Duration::from_secs(20)).unwrap()
    }

    #[tokio::test]
    async fn test_failed_save_removes_stored_upload() {
        let state = state_with_closed_store().await;
        tokio::fs::create_dir_all(state.media_root()).await.unwrap();
        let source = state.media_root().join("upload.tmp");
        tokio::fs::write(&source, b"GIF89a").await.unwrap();
        let form = PostForm {
            text: "with a picture".to_owned(),
            group: None,
            image: Some(Upload {
                file_name: "cat.gif".to_owned(),
                path: source,
            }),
        };

        let result = save(&state, Target::New(UserId(1)), &form).await;
        assert!(matches!(result, Err(AppError::Store(_))));

        let mut entries = tokio::fs::read_dir(state.media_root().join(UPLOAD_DIR)).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
        tokio::fs::remove_dir_all(state.media_root()).await.unwrap();
    }
}
