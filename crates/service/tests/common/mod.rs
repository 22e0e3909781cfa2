//! Shared test utilities for HTTP integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::Router;
use http::{Method, Request, StatusCode};
use tower::ServiceExt;

use common::prelude::{Database, NodePath};
use service::{Mailer, MailerError, ServiceState};

pub const COLLECTION: &str = "public";
pub const SEEDED_VIEW: &str = "Neo\nanswer\nme\n  and\nmust\n  have\n    been\n      like\n";

/// Remembers every message instead of sending it.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, recipient: &str, body: &str) -> Result<(), MailerError> {
        if self.fail {
            return Err(MailerError::HttpStatus(
                http::StatusCode::UNAUTHORIZED,
                "forbidden".to_string(),
            ));
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), body.to_string()));
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: ServiceState,
    pub mailer: Arc<RecordingMailer>,
}

/// An in-memory service with a `public` collection holding the
/// Neo/answer/me/must fixture.
pub async fn setup_test_app() -> TestApp {
    setup_app_with(RecordingMailer::default(), vec![]).await
}

pub async fn setup_app_with(mailer: RecordingMailer, whitelist: Vec<String>) -> TestApp {
    let db = Database::in_memory().await.unwrap();
    let mailer = Arc::new(mailer);
    let state = ServiceState::new(db, mailer.clone(), whitelist);

    state.store().create(COLLECTION).await.unwrap();
    for (path, content) in [
        ("Neo", "Wake up"),
        ("answer", "42"),
        ("me/and", "you"),
        ("must/have/been/like", "the wind"),
    ] {
        state
            .store()
            .put(COLLECTION, &NodePath::parse(path), content.as_bytes())
            .await
            .unwrap();
    }

    let router = service::http::router(state.clone(), 1024);
    TestApp {
        router,
        state,
        mailer,
    }
}

impl TestApp {
    /// Send one request through the router and collect the response.
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: impl Into<Body>,
    ) -> (StatusCode, String) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(http::header::AUTHORIZATION, token);
        }
        let request = request.body(body.into()).unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, String) {
        self.call(Method::GET, uri, token, Body::empty()).await
    }
}
