use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use hackhub_db::{ChargeOutcome, NewRegistration, unless_duplicate};
use hackhub_types::api::{
    Claims, CreateRegistrationRequest, RegistrationCheck, UpdateRegistrationStatusRequest,
};
use hackhub_types::models::HackathonRegistration;
use hackhub_types::validate;

use crate::auth::AppState;
use crate::blocking;
use crate::error::{ApiError, ApiResult};
use crate::hackathons::{find_hackathon, owned_hackathon};

pub async fn create_registration(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateRegistrationRequest>,
) -> ApiResult<impl IntoResponse> {
    let hackathon = find_hackathon(&state, req.hackathon_id).await?;
    if !hackathon.registration_open(Utc::now()) {
        return Err(ApiError::Validation(
            "Registration for this hackathon is closed".into(),
        ));
    }
    validate::team_size(&hackathon.team_size, req.team_members.len())
        .map_err(ApiError::Validation)?;
    validate::team_members(&req.team_members).map_err(ApiError::Validation)?;
    if let Some(team_name) = &req.team_name {
        validate::single_line("Team name", team_name).map_err(ApiError::Validation)?;
    }

    let new = NewRegistration {
        hackathon_id: hackathon.id,
        user_id: claims.sub,
        team_name: req
            .team_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        team_members: req.team_members,
    };
    let entry_fee = hackathon.entry_fee;

    let outcome = blocking(&state, move |db| {
        if db.registration_for(new.hackathon_id, new.user_id)?.is_some() {
            return Ok(None);
        }
        unless_duplicate(db.create_registration(&new, entry_fee))
    })
    .await?
    .ok_or_else(|| ApiError::Conflict("Already registered for this hackathon".into()))?;

    match outcome {
        ChargeOutcome::Charged(registration) => {
            info!(
                "User {} registered for hackathon {}",
                claims.sub, hackathon.id
            );
            Ok((StatusCode::CREATED, Json(registration)))
        }
        ChargeOutcome::InsufficientCredits { balance, required } => {
            warn!(
                "User {} cannot afford entry fee {} (balance {})",
                claims.sub, required, balance
            );
            Err(ApiError::InsufficientCredits { balance, required })
        }
    }
}

pub async fn my_registrations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<Vec<HackathonRegistration>>> {
    let registrations =
        blocking(&state, move |db| db.list_registrations_for_user(claims.sub)).await?;
    Ok(Json(registrations))
}

pub async fn hackathon_registrations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<HackathonRegistration>>> {
    owned_hackathon(&state, &claims, id).await?;
    let registrations =
        blocking(&state, move |db| db.list_registrations_for_hackathon(id)).await?;
    Ok(Json(registrations))
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRegistrationStatusRequest>,
) -> ApiResult<Json<HackathonRegistration>> {
    let registration = blocking(&state, move |db| db.get_registration(id))
        .await?
        .ok_or_else(|| ApiError::not_found("Registration"))?;
    let hackathon = owned_hackathon(&state, &claims, registration.hackathon_id).await?;

    let status = req.status;
    let entry_fee = hackathon.entry_fee;
    let outcome = blocking(&state, move |db| {
        db.update_registration_status(id, status, entry_fee)
    })
    .await?
    .ok_or_else(|| ApiError::not_found("Registration"))?;

    match outcome {
        ChargeOutcome::Charged(updated) => {
            info!("Registration {} is now {}", id, updated.status);
            Ok(Json(updated))
        }
        ChargeOutcome::InsufficientCredits { balance, required } => {
            Err(ApiError::InsufficientCredits { balance, required })
        }
    }
}

pub async fn check_registration(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(hackathon_id): Path<Uuid>,
) -> ApiResult<Json<RegistrationCheck>> {
    let registration =
        blocking(&state, move |db| db.registration_for(hackathon_id, claims.sub)).await?;
    Ok(Json(match registration {
        Some(r) => RegistrationCheck {
            registered: true,
            status: Some(r.status),
        },
        None => RegistrationCheck::NOT_REGISTERED,
    }))
}
