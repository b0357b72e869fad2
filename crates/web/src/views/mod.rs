//! Request handlers, one module per area of the site.

pub mod about;
pub mod accounts;
pub mod comments;
pub mod errors;
pub mod feeds;
pub mod follows;
pub mod posts;

use salvo::Request;
use yatube_store::{PageRequest, PostId};

use crate::error::AppError;

/// The `?page=` query parameter.
fn page_request(req: &Request) -> PageRequest {
    PageRequest::parse(req.query::<String>("page").as_deref())
}

fn username_param(req: &Request) -> Result<String, AppError> {
    req.param::<String>("username").ok_or(AppError::NotFound("user"))
}

fn post_id_param(req: &Request) -> Result<PostId, AppError> {
    req.param::<i64>("post_id").map(PostId).ok_or(AppError::NotFound("post"))
}
