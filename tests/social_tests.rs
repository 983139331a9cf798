mod common;

use axum::http::StatusCode;
use common::{create_post, register, send, spawn_app};
use serde_json::json;

#[tokio::test]
async fn test_follow_is_idempotent() {
    let app = spawn_app().await;
    let alice = register(&app, "Alice", "alice@example.com").await;
    let bob = register(&app, "Bob", "bob@example.com").await;
    let follow_uri = format!("/api/users/{}/follow", bob.username);

    for _ in 0..2 {
        let response = send(&app, "POST", &follow_uri, Some(&alice.cookie), None).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["data"]["following"], true);
        assert_eq!(response.body["data"]["followers_count"], 1);
    }

    let response = send(
        &app,
        "GET",
        &format!("/api/users/{}", bob.username),
        Some(&alice.cookie),
        None,
    )
    .await;
    assert_eq!(response.body["data"]["followers_count"], 1);
    assert_eq!(response.body["data"]["is_following"], true);

    let response = send(
        &app,
        "GET",
        &format!("/api/users/{}/followers", bob.username),
        None,
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    let users = response.body["data"]["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["username"], alice.username.as_str());

    for _ in 0..2 {
        let response = send(&app, "DELETE", &follow_uri, Some(&alice.cookie), None).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["data"]["following"], false);
        assert_eq!(response.body["data"]["followers_count"], 0);
    }
}

#[tokio::test]
async fn test_follow_rejects_self_and_unknown() {
    let app = spawn_app().await;
    let alice = register(&app, "Alice", "alice@example.com").await;

    let response = send(
        &app,
        "POST",
        &format!("/api/users/{}/follow", alice.username),
        Some(&alice.cookie),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        "POST",
        "/api/users/ghost/follow",
        Some(&alice.cookie),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_post_requires_own_key() {
    let app = spawn_app().await;
    let alice = register(&app, "Alice", "alice@example.com").await;

    let response = send(
        &app,
        "POST",
        "/api/posts",
        Some(&alice.cookie),
        Some(json!({ "caption": "stolen", "image_key": "posts/4242/photo.jpg" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = send(
        &app,
        "POST",
        "/api/posts",
        Some(&alice.cookie),
        Some(json!({ "caption": "no image" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        "POST",
        "/api/posts",
        Some(&alice.cookie),
        Some(json!({
            "caption": "x".repeat(2201),
            "image_key": format!("posts/{}/photo.jpg", alice.id),
        })),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        "POST",
        "/api/posts",
        Some(&alice.cookie),
        Some(json!({
            "caption": "  sunset  ",
            "image_key": format!("posts/{}/photo.jpg", alice.id),
        })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    let post = &response.body["data"];
    assert_eq!(post["caption"], "sunset");
    assert_eq!(post["author"]["id"].as_i64(), Some(alice.id));
    assert_eq!(post["likes_count"], 0);
    assert_eq!(post["liked"], false);
    assert_eq!(post["comments_count"], 0);
    assert!(post["image_url"].as_str().unwrap().contains("photo.jpg"));
}

#[tokio::test]
async fn test_only_owner_edits_and_deletes() {
    let app = spawn_app().await;
    let alice = register(&app, "Alice", "alice@example.com").await;
    let bob = register(&app, "Bob", "bob@example.com").await;
    let post_id = create_post(&app, &alice, "original").await;
    let uri = format!("/api/posts/{post_id}");

    let response = send(
        &app,
        "PUT",
        &uri,
        Some(&bob.cookie),
        Some(json!({ "caption": "hijacked" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = send(&app, "DELETE", &uri, Some(&bob.cookie), None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = send(
        &app,
        "PUT",
        &uri,
        Some(&alice.cookie),
        Some(json!({ "caption": "edited" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["caption"], "edited");

    let response = send(&app, "DELETE", &uri, Some(&alice.cookie), None).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = send(&app, "GET", &uri, None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_like_toggle() {
    let app = spawn_app().await;
    let alice = register(&app, "Alice", "alice@example.com").await;
    let bob = register(&app, "Bob", "bob@example.com").await;
    let post_id = create_post(&app, &alice, "like me").await;
    let like_uri = format!("/api/posts/{post_id}/like");

    let response = send(&app, "POST", &like_uri, Some(&bob.cookie), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["liked"], true);
    assert_eq!(response.body["data"]["likes_count"], 1);

    let response = send(
        &app,
        "GET",
        &format!("/api/posts/{post_id}"),
        Some(&bob.cookie),
        None,
    )
    .await;
    assert_eq!(response.body["data"]["liked"], true);
    assert_eq!(response.body["data"]["likes_count"], 1);

    let response = send(
        &app,
        "GET",
        &format!("/api/posts/{post_id}/likes"),
        None,
        None,
    )
    .await;
    let users = response.body["data"]["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["id"].as_i64(), Some(bob.id));

    let response = send(&app, "POST", &like_uri, Some(&bob.cookie), None).await;
    assert_eq!(response.body["data"]["liked"], false);
    assert_eq!(response.body["data"]["likes_count"], 0);

    let response = send(&app, "POST", "/api/posts/9999/like", Some(&bob.cookie), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_comment_permissions() {
    let app = spawn_app().await;
    let alice = register(&app, "Alice", "alice@example.com").await;
    let bob = register(&app, "Bob", "bob@example.com").await;
    let carol = register(&app, "Carol", "carol@example.com").await;
    let post_id = create_post(&app, &alice, "discuss").await;
    let comments_uri = format!("/api/posts/{post_id}/comments");

    let response = send(
        &app,
        "POST",
        &comments_uri,
        Some(&bob.cookie),
        Some(json!({ "text": "   " })),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let mut ids = Vec::new();
    for text in ["first", "second"] {
        let response = send(
            &app,
            "POST",
            &comments_uri,
            Some(&bob.cookie),
            Some(json!({ "text": text })),
        )
        .await;
        assert_eq!(response.status, StatusCode::OK);
        ids.push(response.body["data"]["id"].as_i64().unwrap());
    }

    let response = send(&app, "GET", &comments_uri, None, None).await;
    let comments = response.body["data"].as_array().unwrap();
    assert_eq!(comments[0]["text"], "first");
    assert_eq!(comments[1]["text"], "second");
    assert_eq!(comments[0]["author"]["id"].as_i64(), Some(bob.id));

    let response = send(
        &app,
        "DELETE",
        &format!("{comments_uri}/{}", ids[0]),
        Some(&carol.cookie),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    // Comment author
    let response = send(
        &app,
        "DELETE",
        &format!("{comments_uri}/{}", ids[0]),
        Some(&bob.cookie),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);

    // Post owner
    let response = send(
        &app,
        "DELETE",
        &format!("{comments_uri}/{}", ids[1]),
        Some(&alice.cookie),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);

    let other_post = create_post(&app, &alice, "elsewhere").await;
    let response = send(
        &app,
        "POST",
        &format!("/api/posts/{other_post}/comments"),
        Some(&bob.cookie),
        Some(json!({ "text": "misplaced" })),
    )
    .await;
    let misplaced = response.body["data"]["id"].as_i64().unwrap();

    let response = send(
        &app,
        "DELETE",
        &format!("{comments_uri}/{misplaced}"),
        Some(&bob.cookie),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = send(&app, "GET", &format!("/api/posts/{post_id}"), None, None).await;
    assert_eq!(response.body["data"]["comments_count"], 0);
    assert!(response.body["data"]["comments"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_feed_contents_and_paging() {
    let app = spawn_app().await;
    let alice = register(&app, "Alice", "alice@example.com").await;
    let bob = register(&app, "Bob", "bob@example.com").await;
    let carol = register(&app, "Carol", "carol@example.com").await;

    let own = create_post(&app, &alice, "mine").await;
    let followed_old = create_post(&app, &bob, "bob one").await;
    create_post(&app, &carol, "stranger").await;
    let followed_new = create_post(&app, &bob, "bob two").await;

    let response = send(
        &app,
        "POST",
        &format!("/api/users/{}/follow", bob.username),
        Some(&alice.cookie),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = send(&app, "GET", "/api/feed", Some(&alice.cookie), None).await;
    assert_eq!(response.status, StatusCode::OK);
    let ids: Vec<i64> = response.body["data"]["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![followed_new, followed_old, own]);
    assert_eq!(response.body["data"]["page"], 1);
    assert_eq!(response.body["data"]["limit"], 10);
    assert_eq!(response.body["data"]["has_more"], false);

    let response = send(
        &app,
        "GET",
        "/api/feed?page=1&limit=2",
        Some(&alice.cookie),
        None,
    )
    .await;
    assert_eq!(response.body["data"]["posts"].as_array().unwrap().len(), 2);
    assert_eq!(response.body["data"]["has_more"], true);

    let response = send(
        &app,
        "GET",
        "/api/feed?page=2&limit=2",
        Some(&alice.cookie),
        None,
    )
    .await;
    let posts = response.body["data"]["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["id"].as_i64(), Some(own));
    assert_eq!(response.body["data"]["has_more"], false);

    for query in ["page=0", "limit=0", "limit=51"] {
        let response = send(
            &app,
            "GET",
            &format!("/api/feed?{query}"),
            Some(&alice.cookie),
            None,
        )
        .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{query}");
    }
}

#[tokio::test]
async fn test_explore_and_user_posts() {
    let app = spawn_app().await;
    let alice = register(&app, "Alice", "alice@example.com").await;
    let bob = register(&app, "Bob", "bob@example.com").await;
    create_post(&app, &alice, "a").await;
    let latest = create_post(&app, &bob, "b").await;

    let response = send(&app, "GET", "/api/posts", None, None).await;
    let posts = response.body["data"]["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0]["id"].as_i64(), Some(latest));

    let response = send(
        &app,
        "GET",
        &format!("/api/users/{}/posts", alice.username),
        None,
        None,
    )
    .await;
    let posts = response.body["data"]["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["author"]["username"], alice.username.as_str());

    let response = send(
        &app,
        "GET",
        &format!("/api/users/{}", alice.username),
        None,
        None,
    )
    .await;
    assert_eq!(response.body["data"]["posts_count"], 1);
}
