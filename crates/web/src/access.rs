use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use salvo::prelude::*;

use crate::identity::Viewer;
use crate::urls;

/// Characters escaped in the `next` parameter. Path separators stay readable.
const NEXT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'/').remove(b'-').remove(b'_').remove(b'.').remove(b'~');

pub const LOGIN_PATH: &str = "/auth/login/";

/// Login page URL that returns to `path` afterwards.
#[must_use]
pub fn login_url(path: &str) -> String {
    format!("{LOGIN_PATH}?next={}", utf8_percent_encode(path, NEXT))
}

/// Accepts only local absolute paths as redirect targets, falling back to `/`.
#[must_use]
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => path,
        _ => "/",
    }
}

/// Redirects anonymous viewers to the login page.
#[handler]
pub async fn require_login(req: &mut Request, depot: &mut Depot, res: &mut Response, ctrl: &mut FlowCtrl) {
    if Viewer::from_depot(depot).is_authenticated() {
        return;
    }
    let target = login_url(req.uri().path());
    tracing::debug!(path = %req.uri().path(), "login required");
    urls::redirect(res, &target);
    ctrl.skip_rest();
}

/// Whether `viewer` may modify something written by `author`.
///
/// Callers answer a failed check with a redirect to the post page.
#[must_use]
pub fn is_owner(viewer: &Viewer, author: yatube_store::UserId) -> bool {
    viewer.is(author)
}
