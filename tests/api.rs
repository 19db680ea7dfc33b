use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Duration;
use serde_json::{json, Value};
use tower::ServiceExt;

use social_feed::{app, auth::jwt::TokenService, db, state::AppState};

const SECRET: &str = "integration_secret";

async fn setup() -> Router {
    let pool = db::connect("sqlite::memory:", 1).await.expect("pool");
    db::init_db(&pool).await.expect("schema");
    app(AppState::new(
        pool,
        TokenService::new(SECRET, Duration::minutes(30)),
    ))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn register(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/register",
        None,
        Some(json!({ "email": email, "password": "correct horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register {}: {}", email, body);
    body["access_token"].as_str().unwrap().to_string()
}

async fn user_id(app: &Router, viewer_token: &str, email: &str) -> i64 {
    let (_, users) = send(app, Method::GET, "/users", Some(viewer_token), None).await;
    users
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["email"] == email)
        .and_then(|u| u["id"].as_i64())
        .unwrap()
}

#[tokio::test]
async fn test_landing_page() {
    let app = setup().await;
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));
}

#[tokio::test]
async fn test_register_login_and_duplicate() {
    let app = setup().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/register",
        None,
        Some(json!({ "email": "ada@example.com", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["email"], "ada@example.com");

    let tokens = TokenService::new(SECRET, Duration::minutes(30));
    let claims = tokens.validate(body["access_token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.sub, "ada@example.com");

    let (status, body) = send(
        &app,
        Method::POST,
        "/register",
        None,
        Some(json!({ "email": "ada@example.com", "password": "other" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already registered");

    let (status, body) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["access_token"].as_str().unwrap().to_string();

    let (status, _) = send(&app, Method::GET, "/posts", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (wrong_status, wrong_body) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "nope" })),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "pw" })),
    )
    .await;
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn test_auth_gate() {
    let app = setup().await;

    let (status, _) = send(&app, Method::GET, "/posts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/notifications", Some("not.a.token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Signed with the right key but for an account that was never created
    let ghost = TokenService::new(SECRET, Duration::minutes(30))
        .issue("ghost@example.com")
        .unwrap();
    let (status, body) = send(&app, Method::GET, "/users", Some(&ghost), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    // Expired token
    register(&app, "ada@example.com").await;
    let expired = TokenService::new(SECRET, Duration::minutes(30))
        .issue_at("ada@example.com", chrono::Utc::now() - Duration::minutes(31))
        .unwrap();
    let (status, _) = send(&app, Method::GET, "/users", Some(&expired), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_post_follow_notify_flow() {
    let app = setup().await;
    let author = register(&app, "author@example.com").await;
    let fan = register(&app, "fan@example.com").await;
    let lurker = register(&app, "lurker@example.com").await;

    let author_id = user_id(&app, &fan, "author@example.com").await;
    let (status, body) = send(&app, Method::POST, &format!("/follow/{}", author_id), Some(&fan), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User followed successfully");

    let (_, users) = send(&app, Method::GET, "/users", Some(&fan), None).await;
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 2);
    for user in users {
        let expected = user["email"] == "author@example.com";
        assert_eq!(user["is_following"], expected);
    }

    let content = "A fairly long announcement that certainly runs past the preview limit";
    let (status, post) = send(&app, Method::POST, "/posts", Some(&author), Some(json!({ "content": content }))).await;
    assert_eq!(status, StatusCode::OK);
    let slug = post["slug"].as_str().unwrap().to_string();
    assert!(slug.starts_with("a-fairly-long-announcement-that-"));

    let (status, fetched) = send(&app, Method::GET, &format!("/post/{}", slug), Some(&lurker), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["author"], "author@example.com");
    assert_eq!(fetched["content"], content);

    let (_, count) = send(&app, Method::GET, "/notifications/count", Some(&fan), None).await;
    assert_eq!(count["count"], 1);
    let (_, count) = send(&app, Method::GET, "/notifications/count", Some(&lurker), None).await;
    assert_eq!(count["count"], 0);

    let (status, first) = send(&app, Method::GET, "/notifications", Some(&fan), None).await;
    assert_eq!(status, StatusCode::OK);
    let first = first.as_array().unwrap().clone();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0]["post_slug"], slug.as_str());
    assert_eq!(first[0]["author_email"], "author@example.com");
    let expected_preview: String = content.chars().take(50).collect::<String>() + "...";
    assert_eq!(first[0]["post_preview"], expected_preview.as_str());

    let (_, count) = send(&app, Method::GET, "/notifications/count", Some(&fan), None).await;
    assert_eq!(count["count"], 0);

    let (_, second) = send(&app, Method::GET, "/notifications", Some(&fan), None).await;
    assert_eq!(second.as_array().unwrap(), &first);

    // After unfollowing, new posts no longer notify
    let (status, _) = send(&app, Method::DELETE, &format!("/unfollow/{}", author_id), Some(&fan), None).await;
    assert_eq!(status, StatusCode::OK);
    send(&app, Method::POST, "/posts", Some(&author), Some(json!({ "content": "again" }))).await;
    let (_, count) = send(&app, Method::GET, "/notifications/count", Some(&fan), None).await;
    assert_eq!(count["count"], 0);
}

#[tokio::test]
async fn test_follow_errors() {
    let app = setup().await;
    let a = register(&app, "a@example.com").await;
    let b = register(&app, "b@example.com").await;
    let a_id = user_id(&app, &b, "a@example.com").await;
    let b_id = user_id(&app, &a, "b@example.com").await;

    let (status, body) = send(&app, Method::POST, &format!("/follow/{}", a_id), Some(&a), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cannot follow yourself");

    let (status, _) = send(&app, Method::POST, &format!("/follow/{}", b_id), Some(&a), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, Method::POST, &format!("/follow/{}", b_id), Some(&a), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Already following this user");

    let (status, body) = send(&app, Method::DELETE, &format!("/unfollow/{}", a_id), Some(&b), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Not following this user");

    let (status, _) = send(&app, Method::POST, "/follow/9999", Some(&a), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_posts_validation_and_lookup() {
    let app = setup().await;
    let token = register(&app, "ada@example.com").await;

    let (status, body) = send(&app, Method::POST, "/posts", Some(&token), Some(json!({ "content": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");

    let (status, body) = send(&app, Method::GET, "/post/missing-00000000", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Post not found");

    for i in 0..22 {
        let (status, _) = send(
            &app,
            Method::POST,
            "/posts",
            Some(&token),
            Some(json!({ "content": format!("entry {}", i) })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, posts) = send(&app, Method::GET, "/posts", Some(&token), None).await;
    let posts = posts.as_array().unwrap();
    assert_eq!(posts.len(), 20);
    assert_eq!(posts[0]["content"], "entry 21");
    assert_eq!(posts[19]["content"], "entry 2");
    assert!(posts.iter().all(|p| p["author"] == "ada@example.com"));
}
