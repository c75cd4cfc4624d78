#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::{Value, json};
use uuid::Uuid;
use wiremock::MockServer;

use hackhub_client::{ApiClient, Session, SessionStore};
use hackhub_types::models::{Hackathon, HackathonStatus, Role, TeamSize, User};

pub fn user() -> User {
    User {
        id: Uuid::new_v4(),
        email: "ada@example.com".into(),
        name: "Ada".into(),
        role: Role::User,
        created_at: Utc::now(),
    }
}

pub fn auth_body(token: &str, user: &User) -> Value {
    json!({ "token": token, "user": user })
}

pub fn error_body(code: &str, message: &str) -> Value {
    json!({ "error": code, "message": message })
}

pub fn hackathon(team_size: TeamSize) -> Hackathon {
    let start = Utc::now() + Duration::days(7);
    Hackathon {
        id: Uuid::new_v4(),
        organizer_id: Uuid::new_v4(),
        title: "Rust Rumble".into(),
        description: String::new(),
        location: "Online".into(),
        start_date: start,
        end_date: start + Duration::days(2),
        registration_deadline: start - Duration::days(1),
        team_size,
        tags: vec!["rust".into()],
        entry_fee: 0,
        prize_pool: String::new(),
        interest_count: 0,
        status: HackathonStatus::Upcoming,
        created_at: Utc::now(),
    }
}

pub fn client(server: &MockServer, store: SessionStore) -> ApiClient {
    ApiClient::new(&server.uri(), Arc::new(store)).unwrap()
}

/// A client that is already signed in with `token`.
pub fn signed_in(server: &MockServer, token: &str) -> ApiClient {
    let store = SessionStore::in_memory();
    store
        .set_session(Session {
            token: token.to_string(),
            user: user(),
        })
        .unwrap();
    client(server, store)
}

pub fn signed_in_at(server: &MockServer, path: &Path, token: &str) -> ApiClient {
    let store = SessionStore::open(path).unwrap();
    store
        .set_session(Session {
            token: token.to_string(),
            user: user(),
        })
        .unwrap();
    client(server, store)
}
