mod common;

use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hackhub_client::{ClientError, SessionStore};
use hackhub_types::api::RegisterRequest;

use common::{auth_body, client, error_body, signed_in, signed_in_at, user};

#[tokio::test]
async fn login_persists_and_bootstrap_needs_no_request() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("session.json");
    let ada = user();

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({ "email": "ada@example.com", "password": "hunter2hunter2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("tok-1", &ada)))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, SessionStore::open(&file).unwrap());
    let signed_in_user = api.login(" ada@example.com ", "hunter2hunter2").await.unwrap();
    assert_eq!(signed_in_user, ada);
    assert_eq!(api.session().token().as_deref(), Some("tok-1"));

    // A fresh start trusts the stored pair without asking the server
    let restarted = client(&server, SessionStore::open(&file).unwrap());
    assert_eq!(restarted.current_user(), Some(ada));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn requests_carry_the_bearer_token() {
    let server = MockServer::start().await;
    let ada = user();
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", "Bearer tok-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&ada))
        .expect(1)
        .mount(&server)
        .await;

    let api = signed_in(&server, "tok-2");
    assert_eq!(api.me().await.unwrap(), ada);
    assert_eq!(api.current_user(), Some(ada));
}

#[tokio::test]
async fn first_unauthorized_answer_clears_the_session() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("session.json");

    Mock::given(method("GET"))
        .and(path("/register/me"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(error_body("UNAUTHORIZED", "Invalid or expired token")),
        )
        .mount(&server)
        .await;

    let api = signed_in_at(&server, &file, "stale");
    let err = api.my_registrations().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized(ref m) if m == "Invalid or expired token"));
    assert!(!api.session().is_authenticated());
    assert!(!SessionStore::open(&file).unwrap().is_authenticated());
}

#[tokio::test]
async fn registration_check_treats_401_as_not_registered() {
    let server = MockServer::start().await;
    let hackathon_id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path(format!("/register/check/{hackathon_id}")))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let api = signed_in(&server, "tok");
    let check = api.check_registration(hackathon_id).await.unwrap();
    assert!(!check.registered);
    assert_eq!(check.status, None);
    assert!(api.session().is_authenticated());
}

#[tokio::test]
async fn register_validates_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let api = client(&server, SessionStore::in_memory());
    let err = api
        .register(&RegisterRequest {
            email: "ada@example.com".into(),
            name: "Ada".into(),
            password: "short".into(),
            role: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
}

#[tokio::test]
async fn logout_forgets_the_session() {
    let server = MockServer::start().await;
    let api = signed_in(&server, "tok");
    api.logout().unwrap();
    assert!(api.current_user().is_none());
}
