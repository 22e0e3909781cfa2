//! Integration tests for the HTTP routes

mod common;

use axum::body::Body;
use http::{Method, StatusCode};

use crate::common::{RecordingMailer, COLLECTION, SEEDED_VIEW};

#[tokio::test]
async fn test_view() {
    let app = common::setup_test_app().await;

    for (uri, expected) in [
        ("/db", SEEDED_VIEW),
        ("/db/", SEEDED_VIEW),
        ("/db/must", "have\n  been\n    like\n"),
        ("/db/answer", "42"),
        ("/db//must///have", "been\n  like\n"),
    ] {
        let (status, body) = app.get(uri, Some(COLLECTION)).await;
        assert_eq!(status, StatusCode::OK, "uri {}", uri);
        assert_eq!(body, expected, "uri {}", uri);
    }
}

#[tokio::test]
async fn test_view_failures() {
    let app = common::setup_test_app().await;

    let (status, body) = app.get("/db/invalid", Some(COLLECTION)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "cannot view node");

    let (status, body) = app.get("/db", Some("invalid token")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "cannot view node");

    let (status, body) = app.get("/db", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "empty Authorization header");
}

#[tokio::test]
async fn test_bearer_prefix() {
    let app = common::setup_test_app().await;

    let (status, body) = app.get("/db/answer", Some("Bearer public")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "42");
}

#[tokio::test]
async fn test_put() {
    let app = common::setup_test_app().await;

    let (status, body) = app
        .call(Method::POST, "/db/new", Some(COLLECTION), "data")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, format!("{}new\n", SEEDED_VIEW));

    let (_, body) = app.get("/db/new", Some(COLLECTION)).await;
    assert_eq!(body, "data");

    // percent-encoded names are decoded into plain segments
    let (status, _) = app
        .call(
            Method::POST,
            "/db/prequel/It's%20over%20Anakin!",
            Some(COLLECTION),
            "I have the highground!",
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get("/db/prequel", Some(COLLECTION)).await;
    assert_eq!(body, "It's over Anakin!\n");
}

#[tokio::test]
async fn test_put_failures() {
    let app = common::setup_test_app().await;

    let (status, body) = app
        .call(Method::POST, "/db/must", Some(COLLECTION), "some more data")
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, "cannot create node");

    let (status, body) = app
        .call(Method::POST, "/db/some/path", Some("invalid token"), "content")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "cannot create node");

    let (status, _) = app
        .call(Method::POST, "/db/shared/x", Some(COLLECTION), "content")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(Method::POST, "/db", Some(COLLECTION), "content")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.get("/db", Some(COLLECTION)).await;
    assert_eq!(body, SEEDED_VIEW);
}

#[tokio::test]
async fn test_put_over_body_limit() {
    let app = common::setup_test_app().await;

    let (status, _) = app
        .call(Method::POST, "/db/big", Some(COLLECTION), vec![0u8; 4096])
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    let (status, _) = app.get("/db/big", Some(COLLECTION)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete() {
    let app = common::setup_test_app().await;

    let (status, body) = app
        .call(Method::DELETE, "/db/must/have", Some(COLLECTION), Body::empty())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Neo\nanswer\nme\n  and\nmust\n");

    let (status, body) = app
        .call(Method::DELETE, "/db/must/have", Some(COLLECTION), Body::empty())
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "cannot delete node");

    let (status, _) = app
        .call(Method::DELETE, "/db", Some(COLLECTION), Body::empty())
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_share_and_read() {
    let app = common::setup_test_app().await;

    let (status, token) = app.get("/share/must", Some(COLLECTION)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(token.len(), 32);

    let (status, body) = app.get(&format!("/shared/{}", token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "have\n  been\n    like\n");

    let (_, body) = app
        .get(&format!("/shared/{}/have/been/like", token), None)
        .await;
    assert_eq!(body, "the wind");

    let (_, body) = app.get("/db", Some(COLLECTION)).await;
    assert_eq!(
        body,
        format!(
            "{}shared\n  {}\n    have\n      been\n        like\n",
            SEEDED_VIEW, token
        )
    );
}

#[tokio::test]
async fn test_share_root_reproduces_listing() {
    let app = common::setup_test_app().await;

    let (_, token) = app.get("/share", Some(COLLECTION)).await;
    let (_, body) = app.get(&format!("/shared/{}/", token), None).await;
    assert_eq!(body, SEEDED_VIEW);
}

#[tokio::test]
async fn test_share_failures() {
    let app = common::setup_test_app().await;

    let (status, body) = app.get("/share/answer", Some(COLLECTION)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "cannot share node");

    let (status, _) = app.get("/share/must", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.get("/shared/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "cannot view node");
}

#[tokio::test]
async fn test_delete_shared() {
    let app = common::setup_test_app().await;

    let (_, token) = app.get("/share/me", Some(COLLECTION)).await;
    let uri = format!("/shared/{}", token);

    let (status, _) = app.call(Method::DELETE, &uri, None, Body::empty()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // the share block is gone from the source view
    let (_, body) = app.get("/db", Some(COLLECTION)).await;
    assert_eq!(body, SEEDED_VIEW);

    let (status, _) = app.call(Method::DELETE, &uri, None, Body::empty()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_shared_refuses_private_collection() {
    let app = common::setup_test_app().await;

    let (status, _) = app
        .call(
            Method::DELETE,
            &format!("/shared/{}", COLLECTION),
            None,
            Body::empty(),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert!(app.state.store().exists(COLLECTION).await.unwrap());
    let (status, body) = app.get("/db", Some(COLLECTION)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, SEEDED_VIEW);
}

#[tokio::test]
async fn test_register() {
    let app = common::setup_test_app().await;

    let (status, body) = app
        .call(
            Method::POST,
            "/register",
            None,
            r#"{"email": "neo@matrix.io"}"#,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, "registration successful. check email");

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    let (recipient, token) = &sent[0];
    assert_eq!(recipient, "neo@matrix.io");
    assert_eq!(token.len(), 128);

    // the mailed token opens an empty collection
    let (status, body) = app.get("/db", Some(token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "");
}

#[tokio::test]
async fn test_register_whitelist() {
    let app = common::setup_app_with(
        RecordingMailer::default(),
        vec!["neo@matrix.io".to_string()],
    )
    .await;

    let (status, body) = app
        .call(
            Method::POST,
            "/register",
            None,
            r#"{"email": "smith@matrix.io"}"#,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, "current email is not whitelisted");
    assert!(app.mailer.sent().is_empty());

    let (status, _) = app
        .call(
            Method::POST,
            "/register",
            None,
            r#"{"email": "neo@matrix.io"}"#,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_register_failures() {
    let app = common::setup_app_with(RecordingMailer::failing(), vec![]).await;

    let (status, body) = app
        .call(
            Method::POST,
            "/register",
            None,
            r#"{"email": "neo@matrix.io"}"#,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, "cannot send email with token");

    let (status, body) = app
        .call(Method::POST, "/register", None, "not json")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "invalid request body");
}

#[tokio::test]
async fn test_static_routes() {
    let app = common::setup_test_app().await;

    let (status, body) = app.get("/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Hello from DBFS");

    let (_, body) = app.get("/help", None).await;
    assert!(body.starts_with("request examples:"));

    let (_, body) = app.get("/examples", None).await;
    assert!(body.contains("/register"));

    let (status, body) = app.get("/nowhere", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "not found");
}

#[tokio::test]
async fn test_health() {
    let app = common::setup_test_app().await;

    let (status, _) = app.get("/_status/livez", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get("/_status/readyz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("ok"));
}
