//! Canonical paths of the pages mutations redirect to.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use salvo::http::StatusCode;
use salvo::prelude::*;
use yatube_store::PostId;

const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'@')
    .remove(b'+');

pub const INDEX: &str = "/";

#[must_use]
pub fn profile(username: &str) -> String {
    format!("/{}/", utf8_percent_encode(username, SEGMENT))
}

#[must_use]
pub fn post(username: &str, id: PostId) -> String {
    format!("/{}/{id}/", utf8_percent_encode(username, SEGMENT))
}

/// Answers with `302 Found` to `target`, or to the index when `target` is not a valid URI.
pub fn redirect(res: &mut Response, target: &str) {
    match Redirect::with_status_code(StatusCode::FOUND, target) {
        Ok(redirect) => res.render(redirect),
        Err(e) => {
            tracing::warn!(error = %e, target, "invalid redirect target");
            res.render(Redirect::found(INDEX));
        }
    }
}
