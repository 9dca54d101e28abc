use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use bbgraph_api::auth::create_token;
use bbgraph_api::routes::router;
use bbgraph_api::{AppStateInner, ForumContext, RoleAuthorizer, build_schema};
use bbgraph_db::Database;
use bbgraph_types::settings::ForumSettings;

const SECRET: &str = "test-secret";

fn app() -> Router {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let forum = ForumContext::new(db, Arc::new(RoleAuthorizer), ForumSettings::default());
    router(Arc::new(AppStateInner {
        schema: build_schema(forum.clone()),
        forum,
        jwt_secret: SECRET.into(),
    }))
}

fn post_json(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(serde_json::to_vec(&body).unwrap())).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register(app: &Router, username: &str) -> Value {
    let response = app
        .clone()
        .oneshot(post_json("/auth/register", json!({ "username": username, "password": "correct horse" }), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn first_registration_is_keymaster() {
    let app = app();
    let first = register(&app, "admin").await;
    let second = register(&app, "alice").await;

    assert_eq!(first["role"], "keymaster");
    assert_eq!(second["role"], "participant");
    assert!(second["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn registration_validates_input() {
    let app = app();
    register(&app, "alice").await;

    let taken = app
        .clone()
        .oneshot(post_json("/auth/register", json!({ "username": "alice", "password": "another pass" }), None))
        .await
        .unwrap();
    assert_eq!(taken.status(), StatusCode::CONFLICT);

    let short = app
        .clone()
        .oneshot(post_json("/auth/register", json!({ "username": "bob", "password": "short" }), None))
        .await
        .unwrap();
    assert_eq!(short.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_checks_password() {
    let app = app();
    let registered = register(&app, "alice").await;

    let ok = app
        .clone()
        .oneshot(post_json("/auth/login", json!({ "username": "alice", "password": "correct horse" }), None))
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    let body = body_json(ok).await;
    assert_eq!(body["user_id"], registered["user_id"]);
    assert_eq!(body["username"], "alice");

    let wrong = app
        .clone()
        .oneshot(post_json("/auth/login", json!({ "username": "alice", "password": "battery staple" }), None))
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn graphql_resolves_the_bearer_token() {
    let app = app();
    let registered = register(&app, "alice").await;
    let token = registered["token"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(post_json("/graphql", json!({ "query": "{ viewer { username role } }" }), Some(token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["viewer"], json!({ "username": "alice", "role": "Keymaster" }));
}

#[tokio::test]
async fn graphql_without_token_is_a_visitor() {
    let app = app();
    let response = app
        .oneshot(post_json("/graphql", json!({ "query": "{ viewer { username } }" }), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["viewer"], Value::Null);
}

#[tokio::test]
async fn bad_credentials_are_rejected() {
    let app = app();

    let garbage = app
        .clone()
        .oneshot(post_json("/graphql", json!({ "query": "{ viewer { username } }" }), Some("not-a-jwt")))
        .await
        .unwrap();
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);

    let basic = Request::builder()
        .method("POST")
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, "Basic YWxpY2U6cHc=")
        .body(Body::from(r#"{"query":"{ viewer { username } }"}"#))
        .unwrap();
    assert_eq!(app.clone().oneshot(basic).await.unwrap().status(), StatusCode::UNAUTHORIZED);

    // well-formed token for an account that does not exist
    let orphan = create_token(SECRET, 4242, "ghost").unwrap();
    let response = app
        .oneshot(post_json("/graphql", json!({ "query": "{ viewer { username } }" }), Some(&orphan)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn playground_is_served() {
    let response = app()
        .oneshot(Request::builder().uri("/graphql").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(String::from_utf8_lossy(&bytes).contains("graphiql"));
}
