use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{info, warn};

use hackhub_db::{Database, unless_duplicate};
use hackhub_types::api::{AuthResponse, Claims, LoginRequest, RegisterRequest};
use hackhub_types::models::User;

use crate::blocking;
use crate::error::{ApiError, ApiResult};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    /// Credits deposited into every new account.
    pub signup_credits: i64,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let email = req.email.trim().to_string();
    let name = req.name.trim().to_string();
    if !email.contains('@') {
        return Err(ApiError::Validation("A valid email address is required".into()));
    }
    if name.is_empty() {
        return Err(ApiError::Validation("Name is required".into()));
    }
    if req.password.len() < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters".into(),
        ));
    }
    let role = req.role.unwrap_or_default();
    let signup_credits = state.signup_credits;

    let user = blocking(&state, move |db| {
        if db.get_user_by_email(&email)?.is_some() {
            return Ok(None);
        }
        let password_hash = hash_password(&req.password)?;
        unless_duplicate(db.create_user(
            &email,
            &name,
            &password_hash,
            role,
            signup_credits,
        ))
    })
    .await?
    .ok_or_else(|| ApiError::Conflict("Email is already registered".into()))?;

    info!("Registered {} as {}", user.email, user.role);
    let token = create_token(&state, &user)?;
    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let email = req.email.trim().to_string();
    let record = blocking(&state, move |db| db.get_user_by_email(&email)).await?;

    // Same answer for unknown email and wrong password
    let invalid = || ApiError::Unauthorized("Invalid email or password".into());
    let record = record.ok_or_else(invalid)?;

    let parsed_hash = PasswordHash::new(&record.password_hash)
        .map_err(|e| anyhow::anyhow!("Stored password hash is malformed: {}", e))?;
    if Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        warn!("Failed login for {}", record.user.email);
        return Err(invalid());
    }

    let token = create_token(&state, &record.user)?;
    Ok(Json(AuthResponse {
        token,
        user: record.user,
    }))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<User>> {
    let user = blocking(&state, move |db| db.get_user(claims.sub))
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".into()))?;
    Ok(Json(user))
}

/// Argon2id hash in PHC string form.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

fn create_token(state: &AppStateInner, user: &User) -> ApiResult<String> {
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role,
        exp: (chrono::Utc::now() + chrono::Duration::days(state.token_ttl_days)).timestamp()
            as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.jwt_secret.as_bytes()),
    )
    .map_err(anyhow::Error::from)?;

    Ok(token)
}

