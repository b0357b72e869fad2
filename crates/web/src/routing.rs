//! URL layout of the site.

use std::sync::Arc;

use salvo::affix_state;
use salvo::catcher::Catcher;
use salvo::logging::Logger;
use salvo::prelude::*;
use salvo::serve_static::StaticDir;
use tera::Tera;
use yatube_page_cache::{FixedIssuer, MethodSkipper, PageCache};

use crate::access::require_login;
use crate::identity::{Authenticate, Identity, Viewer};
use crate::state::AppState;
use crate::views::errors::ErrorPage;
use crate::views::{about, accounts, comments, errors, feeds, follows, posts};

/// Cache key of the rendered index page.
pub const INDEX_CACHE_KEY: &str = "index_page";

/// Builds the application router.
///
/// Static prefixes come first so that `{username}` only catches what is left.
pub fn router<I: Identity>(state: AppState, identity: I) -> Router {
    let media = StaticDir::new([state.media_root().to_path_buf()]);
    // Only anonymous GETs share the cached index, pages rendered for a viewer carry their name.
    let index_cache = PageCache::new(state.page_cache.clone(), FixedIssuer::new(INDEX_CACHE_KEY)).skipper((
        MethodSkipper::new().skip_all().skip_get(false),
        |_req: &mut Request, depot: &Depot| Viewer::from_depot(depot).is_authenticated(),
    ));
    let authenticate = Authenticate::new(identity, state.store.clone());

    Router::new()
        .hoop(affix_state::inject(state))
        .hoop(authenticate)
        .push(Router::new().hoop(index_cache).get(feeds::index))
        .push(
            Router::with_path("about")
                .push(Router::with_path("author").get(about::author))
                .push(Router::with_path("tech").get(about::tech)),
        )
        .push(
            Router::with_path("auth")
                .push(Router::with_path("login").get(accounts::login_form).post(accounts::login))
                .push(Router::with_path("signup").get(accounts::signup_form).post(accounts::signup))
                .push(Router::with_path("logout").get(accounts::logout)),
        )
        .push(
            Router::with_path("new")
                .hoop(require_login)
                .get(posts::new_post_form)
                .post(posts::create_post),
        )
        .push(Router::with_path("follow").hoop(require_login).get(feeds::follow_index))
        .push(Router::with_path("group/{slug}").get(feeds::group_posts))
        .push(Router::with_path("404").get(errors::page_not_found))
        .push(Router::with_path("500").get(errors::server_error))
        .push(Router::with_path("media/{**path}").get(media))
        .push(
            Router::with_path("{username}")
                .get(feeds::profile)
                .push(Router::with_path("follow").hoop(require_login).post(follows::profile_follow))
                .push(Router::with_path("unfollow").hoop(require_login).post(follows::profile_unfollow))
                .push(
                    Router::with_path("{post_id:num}")
                        .get(posts::post_view)
                        .push(
                            Router::with_path("edit")
                                .hoop(require_login)
                                .get(posts::edit_post_form)
                                .post(posts::update_post),
                        )
                        .push(Router::with_path("post_del").hoop(require_login).post(posts::delete_post))
                        .push(Router::with_path("comment").hoop(require_login).post(comments::add_comment))
                        .push(
                            Router::with_path("comment_del/{comment_id:num}")
                                .hoop(require_login)
                                .post(comments::delete_comment),
                        ),
                ),
        )
}

/// Wraps `router` with request logging and the site's error pages.
pub fn service(router: Router, templates: Arc<Tera>) -> Service {
    Service::new(router)
        .hoop(Logger::default())
        .catcher(Catcher::default().hoop(ErrorPage::new(templates)))
}
