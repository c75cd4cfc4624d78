use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use hackhub_types::api::{
    Claims, CreateHackathonRequest, HackathonQuery, InterestResponse, UpdateHackathonRequest,
};
use hackhub_types::models::{Hackathon, TeamSize};

use crate::auth::AppState;
use crate::blocking;
use crate::error::{ApiError, ApiResult};
use crate::middleware::require_organizer;

pub async fn list_hackathons(
    State(state): State<AppState>,
    Query(query): Query<HackathonQuery>,
) -> ApiResult<Json<Vec<Hackathon>>> {
    let hackathons = blocking(&state, |db| db.list_hackathons()).await?;
    Ok(Json(
        hackathons.into_iter().filter(|h| query.matches(h)).collect(),
    ))
}

pub async fn get_hackathon(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Hackathon>> {
    Ok(Json(find_hackathon(&state, id).await?))
}

pub async fn create_hackathon(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(mut req): Json<CreateHackathonRequest>,
) -> ApiResult<impl IntoResponse> {
    require_organizer(&claims)?;
    req.title = req.title.trim().to_string();
    validate_hackathon(&HackathonFields {
        title: &req.title,
        start_date: req.start_date,
        end_date: req.end_date,
        registration_deadline: req.registration_deadline,
        team_size: req.team_size,
        entry_fee: req.entry_fee,
    })?;

    let hackathon = blocking(&state, move |db| db.create_hackathon(claims.sub, &req)).await?;
    info!("Hackathon created: {} ({})", hackathon.title, hackathon.id);
    Ok((StatusCode::CREATED, Json(hackathon)))
}

pub async fn update_hackathon(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateHackathonRequest>,
) -> ApiResult<Json<Hackathon>> {
    let mut hackathon = owned_hackathon(&state, &claims, id).await?;

    if let Some(title) = req.title {
        hackathon.title = title.trim().to_string();
    }
    if let Some(description) = req.description {
        hackathon.description = description;
    }
    if let Some(location) = req.location {
        hackathon.location = location;
    }
    if let Some(start_date) = req.start_date {
        hackathon.start_date = start_date;
    }
    if let Some(end_date) = req.end_date {
        hackathon.end_date = end_date;
    }
    if let Some(deadline) = req.registration_deadline {
        hackathon.registration_deadline = deadline;
    }
    if let Some(team_size) = req.team_size {
        hackathon.team_size = team_size;
    }
    if let Some(tags) = req.tags {
        hackathon.tags = tags;
    }
    if let Some(entry_fee) = req.entry_fee {
        hackathon.entry_fee = entry_fee;
    }
    if let Some(prize_pool) = req.prize_pool {
        hackathon.prize_pool = prize_pool;
    }
    validate_hackathon(&HackathonFields {
        title: &hackathon.title,
        start_date: hackathon.start_date,
        end_date: hackathon.end_date,
        registration_deadline: hackathon.registration_deadline,
        team_size: hackathon.team_size,
        entry_fee: hackathon.entry_fee,
    })?;

    let updated = blocking(&state, move |db| {
        db.save_hackathon(&hackathon)?;
        db.get_hackathon(hackathon.id)
    })
    .await?
    .ok_or_else(|| ApiError::not_found("Hackathon"))?;
    Ok(Json(updated))
}

pub async fn delete_hackathon(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    owned_hackathon(&state, &claims, id).await?;
    if !blocking(&state, move |db| db.delete_hackathon(id)).await? {
        return Err(ApiError::not_found("Hackathon"));
    }
    info!("Hackathon deleted: {}", id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_interest(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<InterestResponse>> {
    find_hackathon(&state, id).await?;
    let (interested, interest_count) =
        blocking(&state, move |db| db.toggle_interest(id, claims.sub)).await?;
    Ok(Json(InterestResponse {
        interested,
        interest_count,
    }))
}

pub(crate) async fn find_hackathon(state: &AppState, id: Uuid) -> ApiResult<Hackathon> {
    blocking(state, move |db| db.get_hackathon(id))
        .await?
        .ok_or_else(|| ApiError::not_found("Hackathon"))
}

/// The hackathon, if the caller is the organizer who created it.
pub(crate) async fn owned_hackathon(
    state: &AppState,
    claims: &Claims,
    id: Uuid,
) -> ApiResult<Hackathon> {
    require_organizer(claims)?;
    let hackathon = find_hackathon(state, id).await?;
    if hackathon.organizer_id != claims.sub {
        return Err(ApiError::Forbidden(
            "Only the organizer of this hackathon can do that".into(),
        ));
    }
    Ok(hackathon)
}

struct HackathonFields<'a> {
    title: &'a str,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    registration_deadline: DateTime<Utc>,
    team_size: TeamSize,
    entry_fee: i64,
}

fn validate_hackathon(fields: &HackathonFields<'_>) -> ApiResult<()> {
    if fields.title.is_empty() {
        return Err(ApiError::Validation("Title is required".into()));
    }
    if fields.start_date >= fields.end_date {
        return Err(ApiError::Validation(
            "start_date must be before end_date".into(),
        ));
    }
    if fields.registration_deadline > fields.end_date {
        return Err(ApiError::Validation(
            "registration_deadline cannot be after end_date".into(),
        ));
    }
    if !fields.team_size.is_valid() {
        return Err(ApiError::Validation(
            "team_size needs 1 <= min <= max".into(),
        ));
    }
    if fields.entry_fee < 0 {
        return Err(ApiError::Validation("entry_fee cannot be negative".into()));
    }
    Ok(())
}
