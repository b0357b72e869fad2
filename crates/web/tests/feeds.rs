mod common;

use salvo::http::StatusCode;
use yatube_page_cache::CacheStore;

use common::{TestApp, body, location, post_count};

#[tokio::test]
async fn test_group_page_paginates_by_ten() {
    let app = TestApp::new().await;
    let leo = app.user("leo").await;
    let cats = app.group("cats").await;
    let dogs = app.group("dogs").await;
    for i in 0..13 {
        app.post(&leo, &format!("cat post {i}"), Some(&cats)).await;
    }
    app.post(&leo, "a dog post", Some(&dogs)).await;

    let mut res = app.get("/group/cats/", None).await;
    assert_eq!(res.status_code, Some(StatusCode::OK));
    let html = body(&mut res).await;
    assert_eq!(post_count(&html), 10);
    assert!(html.contains("cat post 12"));
    assert!(!html.contains("a dog post"));

    let html = body(&mut app.get("/group/cats/?page=2", None).await).await;
    assert_eq!(post_count(&html), 3);
    assert!(html.contains("cat post 0"));

    // Out of range pages clamp to the last one.
    let html = body(&mut app.get("/group/cats/?page=99", None).await).await;
    assert_eq!(post_count(&html), 3);
}

#[tokio::test]
async fn test_unknown_group_renders_not_found_page() {
    let app = TestApp::new().await;
    let mut res = app.get("/group/missing/", None).await;
    assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    assert!(body(&mut res).await.contains("Page not found"));

    let mut res = app.get("/no/such/page/at/all/", None).await;
    assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    assert!(body(&mut res).await.contains("Page not found"));
}

#[tokio::test]
async fn test_profile_lists_author_posts_with_counters() {
    let app = TestApp::new().await;
    let leo = app.user("leo").await;
    let ann = app.user("ann").await;
    for i in 0..13 {
        app.post(&leo, &format!("leo post {i}"), None).await;
    }
    app.post(&ann, "ann post", None).await;
    app.store().follow(ann.id, leo.id).await.unwrap();

    let html = body(&mut app.get("/leo/", Some(&ann)).await).await;
    assert_eq!(post_count(&html), 10);
    assert!(html.contains(r#"<span class="posts-count">13</span>"#));
    assert!(html.contains(r#"<span class="followers-count">1</span>"#));
    assert!(html.contains(r#"class="unfollow""#));
    assert!(!html.contains("ann post"));

    let html = body(&mut app.get("/leo/?page=2", None).await).await;
    assert_eq!(post_count(&html), 3);
    assert!(!html.contains(r#"class="follow""#));

    let res = app.get("/nobody/", None).await;
    assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn test_follow_feed_shows_followed_authors_only() {
    let app = TestApp::new().await;
    let leo = app.user("leo").await;
    let ann = app.user("ann").await;
    let bob = app.user("bob").await;
    app.post(&leo, "news from leo", None).await;

    let res = app.post_form("/leo/follow/", &[], Some(&ann)).await;
    assert_eq!(res.status_code, Some(StatusCode::FOUND));
    assert_eq!(location(&res), "/leo/");
    assert!(app.store().is_following(Some(ann.id), leo.id).await.unwrap());

    let html = body(&mut app.get("/follow/", Some(&ann)).await).await;
    assert!(html.contains("news from leo"));

    let html = body(&mut app.get("/follow/", Some(&bob)).await).await;
    assert_eq!(post_count(&html), 0);
    assert!(html.contains("No posts yet."));

    app.post_form("/leo/unfollow/", &[], Some(&ann)).await;
    let html = body(&mut app.get("/follow/", Some(&ann)).await).await;
    assert_eq!(post_count(&html), 0);
}

#[tokio::test]
async fn test_following_yourself_is_ignored() {
    let app = TestApp::new().await;
    let leo = app.user("leo").await;

    let res = app.post_form("/leo/follow/", &[], Some(&leo)).await;
    assert_eq!(location(&res), "/leo/");
    assert_eq!(app.store().follower_count(leo.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_follow_routes_require_login() {
    let app = TestApp::new().await;
    app.user("leo").await;

    let res = app.get("/follow/", None).await;
    assert_eq!(res.status_code, Some(StatusCode::FOUND));
    assert_eq!(location(&res), "/auth/login/?next=/follow/");

    let res = app.post_form("/leo/follow/", &[], None).await;
    assert_eq!(location(&res), "/auth/login/?next=/leo/follow/");
}

#[tokio::test]
async fn test_index_is_served_from_cache_until_cleared() {
    let app = TestApp::new().await;
    let leo = app.user("leo").await;
    app.post(&leo, "first post", None).await;

    let before = body(&mut app.get("/", None).await).await;
    assert!(before.contains("first post"));

    app.post(&leo, "second post", None).await;
    let cached = body(&mut app.get("/", None).await).await;
    assert_eq!(cached, before);

    app.state.page_cache.clear().await;
    let fresh = body(&mut app.get("/", None).await).await;
    assert_ne!(fresh, before);
    assert!(fresh.contains("second post"));
}

#[tokio::test]
async fn test_about_pages() {
    let app = TestApp::new().await;
    for path in ["/about/author/", "/about/tech/"] {
        let res = app.get(path, None).await;
        assert_eq!(res.status_code, Some(StatusCode::OK), "{path}");
    }
    let mut res = app.get("/500/", None).await;
    assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert!(body(&mut res).await.contains("<html"));
}

#[tokio::test]
async fn test_index_rendered_for_a_viewer_is_not_shared() {
    let app = TestApp::new().await;
    let leo = app.user("leo").await;

    let html = body(&mut app.get("/", Some(&leo)).await).await;
    assert!(html.contains("/auth/logout/"));
    let html = body(&mut app.get("/", None).await).await;
    assert!(!html.contains("/auth/logout/"));
}

#[tokio::test]
async fn test_deleted_post_leaves_follow_feed() {
    let app = TestApp::new().await;
    let leo = app.user("leo").await;
    let ann = app.user("ann").await;
    let post = app.post(&leo, "soon gone", None).await;
    app.store().follow(ann.id, leo.id).await.unwrap();

    let html = body(&mut app.get("/follow/", Some(&ann)).await).await;
    assert_eq!(post_count(&html), 1);

    let res = app.post_form(&format!("/leo/{}/post_del/", post.id), &[], Some(&leo)).await;
    assert_eq!(location(&res), "/");

    let html = body(&mut app.get("/follow/", Some(&ann)).await).await;
    assert_eq!(post_count(&html), 0);
    assert!(!html.contains("soon gone"));
}
