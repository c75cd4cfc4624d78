use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rand::Rng;
use tracing::info;
use uuid::Uuid;

use hackhub_db::unless_duplicate;
use hackhub_types::api::{AddMemberRequest, Claims, CreateTeamRequest, JoinTeamRequest, TeamSummary};
use hackhub_types::models::Team;
use hackhub_types::validate::{self, normalize_team_code};

use crate::auth::AppState;
use crate::blocking;
use crate::error::{ApiError, ApiResult};
use crate::hackathons::find_hackathon;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_LEN: usize = 6;
const CODE_ATTEMPTS: usize = 16;

pub async fn my_teams(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<Vec<Team>>> {
    let teams = blocking(&state, move |db| db.list_teams_for_user(claims.sub)).await?;
    Ok(Json(teams))
}

pub async fn get_team(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Team>> {
    let team = find_team(&state, id).await?;
    if !team.members.iter().any(|m| m.user_id == claims.sub) {
        return Err(ApiError::Forbidden("Not a member of this team".into()));
    }
    Ok(Json(team))
}

pub async fn create_team(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateTeamRequest>,
) -> ApiResult<impl IntoResponse> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::Validation("Team name is required".into()));
    }
    validate::single_line("Team name", &name).map_err(ApiError::Validation)?;
    if let Some(hackathon_id) = req.hackathon_id {
        find_hackathon(&state, hackathon_id).await?;
    }

    let team = blocking(&state, move |db| {
        for _ in 0..CODE_ATTEMPTS {
            let code = generate_code();
            if db.team_code_taken(&code)? {
                continue;
            }
            if let Some(team) =
                unless_duplicate(db.create_team(&name, &code, claims.sub, req.hackathon_id))?
            {
                return Ok(team);
            }
        }
        Err(anyhow::anyhow!(
            "No free team code after {} attempts",
            CODE_ATTEMPTS
        ))
    })
    .await?;

    info!("Team created: {} ({})", team.name, team.code);
    Ok((StatusCode::CREATED, Json(team)))
}

pub async fn delete_team(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let team = find_team(&state, id).await?;
    ensure_owner(&team, &claims)?;
    blocking(&state, move |db| db.delete_team(id)).await?;
    info!("Team deleted: {}", team.name);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_member(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<Json<Team>> {
    let team = find_team(&state, id).await?;
    ensure_owner(&team, &claims)?;

    let email = req.email.trim().to_string();
    let user = blocking(&state, move |db| db.get_user_by_email(&email))
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?
        .user;

    let user_id = user.id;
    if !blocking(&state, move |db| db.add_team_member(id, user_id)).await? {
        return Err(ApiError::Conflict(format!(
            "{} is already a member of {}",
            user.email, team.name
        )));
    }
    Ok(Json(find_team(&state, id).await?))
}

pub async fn team_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<TeamSummary>> {
    let team = find_team_by_code(&state, &code).await?;
    Ok(Json(TeamSummary {
        id: team.id,
        name: team.name,
        code: team.code,
        member_count: team.members.len() as u32,
    }))
}

pub async fn join_team(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<JoinTeamRequest>,
) -> ApiResult<Json<Team>> {
    let team = find_team_by_code(&state, &req.code).await?;
    let team_id = team.id;
    if !blocking(&state, move |db| db.add_team_member(team_id, claims.sub)).await? {
        return Err(ApiError::Conflict(format!(
            "Already a member of {}",
            team.name
        )));
    }
    info!("User {} joined team {}", claims.sub, team.name);
    Ok(Json(find_team(&state, team_id).await?))
}

async fn find_team(state: &AppState, id: Uuid) -> ApiResult<Team> {
    blocking(state, move |db| db.get_team(id))
        .await?
        .ok_or_else(|| ApiError::not_found("Team"))
}

async fn find_team_by_code(state: &AppState, code: &str) -> ApiResult<Team> {
    let code = normalize_team_code(code);
    blocking(state, move |db| db.team_by_code(&code))
        .await?
        .ok_or_else(|| ApiError::not_found("Team"))
}

fn ensure_owner(team: &Team, claims: &Claims) -> ApiResult<()> {
    if team.owner_id == claims.sub {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Only the team owner can do that".into(),
        ))
    }
}

fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}
