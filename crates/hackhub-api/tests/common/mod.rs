#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use hackhub_api::auth::{AppState, AppStateInner};
use hackhub_db::Database;

pub const SIGNUP_CREDITS: i64 = 100;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let state: AppState = Arc::new(AppStateInner {
            db: Database::open_in_memory().expect("in-memory db"),
            jwt_secret: "test-secret-with-enough-entropy".to_string(),
            token_ttl_days: 1,
            signup_credits: SIGNUP_CREDITS,
        });
        Self {
            router: hackhub_api::router(state.clone()),
            state,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        // axum's own extractor rejections are plain text
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Register an account and return (token, user id).
    pub async fn signup(&self, email: &str, role: &str) -> (String, String) {
        let (status, body) = self
            .post(
                "/auth/register",
                None,
                json!({
                    "email": email,
                    "name": "Test User",
                    "password": "correct horse battery",
                    "role": role,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    /// Create a hackathon as `token` and return its id.
    pub async fn create_hackathon(&self, token: &str, body: Value) -> String {
        let (status, created) = self.post("/hackathon/create", Some(token), body).await;
        assert_eq!(status, StatusCode::CREATED, "{created}");
        created["id"].as_str().unwrap().to_string()
    }
}

/// A valid create-hackathon body starting in `start_in_days`.
pub fn hackathon_body(title: &str, start_in_days: i64, entry_fee: i64) -> Value {
    let start = Utc::now() + Duration::days(start_in_days);
    json!({
        "title": title,
        "description": "Build something in a weekend",
        "location": "Online",
        "start_date": start.to_rfc3339(),
        "end_date": (start + Duration::days(2)).to_rfc3339(),
        "registration_deadline": (start - Duration::hours(12)).to_rfc3339(),
        "team_size": { "min": 1, "max": 3 },
        "tags": ["rust", "web"],
        "entry_fee": entry_fee,
        "prize_pool": "$2,000",
    })
}

pub fn members(n: usize) -> Value {
    Value::Array(
        (0..n)
            .map(|i| json!({ "name": format!("Member {i}"), "email": format!("m{i}@example.com") }))
            .collect(),
    )
}
