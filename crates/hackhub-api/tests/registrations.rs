mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use common::{SIGNUP_CREDITS, TestApp, hackathon_body, members};

async fn balance(app: &TestApp, token: &str) -> i64 {
    let (_, credits) = app.get("/credits/me", Some(token)).await;
    credits["balance"].as_i64().unwrap()
}

fn registration(hackathon_id: &str, team: usize) -> Value {
    json!({
        "hackathon_id": hackathon_id,
        "team_name": "Ferris Wheelers",
        "team_members": members(team),
    })
}

#[tokio::test]
async fn register_charges_fee_and_shows_up_in_check() {
    let app = TestApp::new();
    let (org, _) = app.signup("org@example.com", "organizer").await;
    let (dev, dev_id) = app.signup("dev@example.com", "user").await;
    let id = app.create_hackathon(&org, hackathon_body("Rust Rumble", 7, 30)).await;

    let (status, check) = app.get(&format!("/register/check/{id}"), Some(&dev)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(check, json!({ "registered": false, "status": null }));

    let (status, reg) = app.post("/register/", Some(&dev), registration(&id, 2)).await;
    assert_eq!(status, StatusCode::CREATED, "{reg}");
    assert_eq!(reg["status"], "pending");
    assert_eq!(reg["user_id"], dev_id.as_str());
    assert_eq!(reg["team_members"].as_array().unwrap().len(), 2);
    assert_eq!(balance(&app, &dev).await, SIGNUP_CREDITS - 30);

    let (_, check) = app.get(&format!("/register/check/{id}"), Some(&dev)).await;
    assert_eq!(check, json!({ "registered": true, "status": "pending" }));

    let (_, mine) = app.get("/register/me", Some(&dev)).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let (status, _) = app.post("/register/", Some(&dev), registration(&id, 1)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(balance(&app, &dev).await, SIGNUP_CREDITS - 30);
}

#[tokio::test]
async fn register_rejections() {
    let app = TestApp::new();
    let (org, _) = app.signup("org@example.com", "organizer").await;
    let (dev, _) = app.signup("dev@example.com", "user").await;
    let open = app.create_hackathon(&org, hackathon_body("Open", 7, 0)).await;
    let started = app.create_hackathon(&org, hackathon_body("Started", -1, 0)).await;
    let pricey = app.create_hackathon(&org, hackathon_body("Pricey", 7, 500)).await;

    let (status, _) = app
        .post("/register/", Some(&dev), registration(&Uuid::new_v4().to_string(), 1))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.post("/register/", Some(&dev), registration(&started, 1)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Registration for this hackathon is closed");

    let (status, body) = app.post("/register/", Some(&dev), registration(&open, 4)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Team can have at most 3 member(s), got 4");

    let (status, _) = app.post("/register/", Some(&dev), registration(&open, 0)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.post("/register/", Some(&dev), registration(&pricey, 1)).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["error"], "INSUFFICIENT_CREDITS");
    assert_eq!(balance(&app, &dev).await, SIGNUP_CREDITS);

    let (_, check) = app.get(&format!("/register/check/{pricey}"), Some(&dev)).await;
    assert_eq!(check["registered"], false);
}

#[tokio::test]
async fn reject_refunds_once_and_approve_recharges() {
    let app = TestApp::new();
    let (org, _) = app.signup("org@example.com", "organizer").await;
    let (rival, _) = app.signup("rival@example.com", "organizer").await;
    let (dev, _) = app.signup("dev@example.com", "user").await;
    let id = app.create_hackathon(&org, hackathon_body("Rust Rumble", 7, 40)).await;

    let (_, reg) = app.post("/register/", Some(&dev), registration(&id, 1)).await;
    let status_uri = format!("/register/{}/status", reg["id"].as_str().unwrap());

    let (status, _) = app
        .get(&format!("/register/hackathon/{id}"), Some(&rival))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.put(&status_uri, Some(&rival), json!({ "status": "approved" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.put(&status_uri, Some(&dev), json!({ "status": "approved" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, list) = app.get(&format!("/register/hackathon/{id}"), Some(&org)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, rejected) = app
        .put(&status_uri, Some(&org), json!({ "status": "rejected" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rejected["status"], "rejected");
    assert_eq!(balance(&app, &dev).await, SIGNUP_CREDITS);

    app.put(&status_uri, Some(&org), json!({ "status": "rejected" })).await;
    assert_eq!(balance(&app, &dev).await, SIGNUP_CREDITS);

    let (status, approved) = app
        .put(&status_uri, Some(&org), json!({ "status": "approved" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");
    assert_eq!(balance(&app, &dev).await, SIGNUP_CREDITS - 40);

    let (_, check) = app.get(&format!("/register/check/{id}"), Some(&dev)).await;
    assert_eq!(check, json!({ "registered": true, "status": "approved" }));
}

#[tokio::test]
async fn unknown_status_is_rejected_by_the_body_parser() {
    let app = TestApp::new();
    let (org, _) = app.signup("org@example.com", "organizer").await;
    let (status, _) = app
        .put(
            &format!("/register/{}/status", Uuid::new_v4()),
            Some(&org),
            json!({ "status": "waitlisted" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn multi_line_names_are_rejected() {
    let app = TestApp::new();
    let (org, _) = app.signup("org@example.com", "organizer").await;
    let (dev, _) = app.signup("dev@example.com", "user").await;
    let id = app.create_hackathon(&org, hackathon_body("Rust Rumble", 7, 30)).await;

    let mut body = registration(&id, 1);
    body["team_name"] = json!("Ferris\nWheelers");
    let (status, err) = app.post("/register/", Some(&dev), body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        err["message"],
        "Team name cannot contain line breaks or control characters"
    );

    let mut body = registration(&id, 1);
    body["team_members"][0]["name"] = json!("Ada\r\nLovelace");
    let (status, _) = app.post("/register/", Some(&dev), body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/team/create", Some(&dev), json!({ "name": "Two\nLines" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(balance(&app, &dev).await, SIGNUP_CREDITS);
}
