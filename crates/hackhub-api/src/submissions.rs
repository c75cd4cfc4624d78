use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

use hackhub_db::{NewSubmission, unless_duplicate};
use hackhub_types::api::{
    Claims, CreateSubmissionRequest, MAX_SCORE, ScoreRequest, UpdateSubmissionRequest,
};
use hackhub_types::models::ProjectSubmission;
use hackhub_types::validate;

use crate::auth::AppState;
use crate::blocking;
use crate::error::{ApiError, ApiResult};
use crate::hackathons::{find_hackathon, owned_hackathon};

pub async fn list_submissions(
    State(state): State<AppState>,
    Path(hackathon_id): Path<Uuid>,
) -> ApiResult<Json<Vec<ProjectSubmission>>> {
    find_hackathon(&state, hackathon_id).await?;
    let submissions = blocking(&state, move |db| db.list_submissions(hackathon_id)).await?;
    Ok(Json(submissions))
}

pub async fn create_submission(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(hackathon_id): Path<Uuid>,
    Json(req): Json<CreateSubmissionRequest>,
) -> ApiResult<impl IntoResponse> {
    find_hackathon(&state, hackathon_id).await?;
    let new = NewSubmission {
        hackathon_id,
        team_id: req.team_id,
        submitted_by: claims.sub,
        title: req.title.trim().to_string(),
        description: req.description,
        github_url: req.github_url.trim().to_string(),
        demo_url: req
            .demo_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty()),
    };
    validate_fields(&new.title, &new.github_url, new.demo_url.as_deref())?;
    ensure_open(&state, hackathon_id).await?;
    ensure_member(&state, new.team_id, claims.sub).await?;

    let submission = blocking(&state, move |db| {
        if db.submission_for_team(new.hackathon_id, new.team_id)?.is_some() {
            return Ok(None);
        }
        unless_duplicate(db.create_submission(&new))
    })
    .await?
    .ok_or_else(|| ApiError::Conflict("This team already submitted a project".into()))?;

    info!(
        "Submission {} for hackathon {} by team {}",
        submission.id, hackathon_id, submission.team_id
    );
    Ok((StatusCode::CREATED, Json(submission)))
}

pub async fn get_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProjectSubmission>> {
    Ok(Json(find_submission(&state, id).await?))
}

pub async fn update_submission(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateSubmissionRequest>,
) -> ApiResult<Json<ProjectSubmission>> {
    let mut submission = find_submission(&state, id).await?;
    ensure_open(&state, submission.hackathon_id).await?;
    ensure_member(&state, submission.team_id, claims.sub).await?;

    if let Some(title) = req.title {
        submission.title = title.trim().to_string();
    }
    if let Some(description) = req.description {
        submission.description = description;
    }
    if let Some(github_url) = req.github_url {
        submission.github_url = github_url.trim().to_string();
    }
    if let Some(demo_url) = req.demo_url {
        let demo_url = demo_url.trim();
        submission.demo_url = (!demo_url.is_empty()).then(|| demo_url.to_string());
    }
    validate_fields(
        &submission.title,
        &submission.github_url,
        submission.demo_url.as_deref(),
    )?;

    let saved = blocking(&state, move |db| db.save_submission(&submission)).await?;
    Ok(Json(saved))
}

pub async fn score_submission(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<ScoreRequest>,
) -> ApiResult<Json<ProjectSubmission>> {
    if req.score > MAX_SCORE {
        return Err(ApiError::Validation(format!(
            "Score must be between 0 and {}",
            MAX_SCORE
        )));
    }
    let submission = find_submission(&state, id).await?;
    let hackathon_id = submission.hackathon_id;
    owned_hackathon(&state, &claims, hackathon_id).await?;
    if blocking(&state, move |db| db.winners_finalized(hackathon_id)).await? {
        return Err(ApiError::Conflict("Winners are already finalized".into()));
    }

    let score = req.score;
    let scored = blocking(&state, move |db| db.set_submission_score(id, score))
        .await?
        .ok_or_else(|| ApiError::not_found("Submission"))?;
    info!("Submission {} scored {}", id, score);
    Ok(Json(scored))
}

pub async fn finalize_submissions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(hackathon_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    owned_hackathon(&state, &claims, hackathon_id).await?;
    blocking(&state, move |db| db.close_submissions(hackathon_id)).await?;
    info!("Submissions closed for hackathon {}", hackathon_id);
    Ok(StatusCode::NO_CONTENT)
}

async fn find_submission(state: &AppState, id: Uuid) -> ApiResult<ProjectSubmission> {
    blocking(state, move |db| db.get_submission(id))
        .await?
        .ok_or_else(|| ApiError::not_found("Submission"))
}

async fn ensure_open(state: &AppState, hackathon_id: Uuid) -> ApiResult<()> {
    if blocking(state, move |db| db.submissions_closed(hackathon_id)).await? {
        return Err(ApiError::Conflict(
            "Submissions are closed for this hackathon".into(),
        ));
    }
    Ok(())
}

async fn ensure_member(state: &AppState, team_id: Uuid, user_id: Uuid) -> ApiResult<()> {
    if !blocking(state, move |db| db.is_team_member(team_id, user_id)).await? {
        return Err(ApiError::Forbidden("Not a member of this team".into()));
    }
    Ok(())
}

fn validate_fields(title: &str, github_url: &str, demo_url: Option<&str>) -> ApiResult<()> {
    if title.is_empty() {
        return Err(ApiError::Validation("Project title is required".into()));
    }
    validate::project_url("github_url", github_url).map_err(ApiError::Validation)?;
    if let Some(demo_url) = demo_url {
        validate::project_url("demo_url", demo_url).map_err(ApiError::Validation)?;
    }
    Ok(())
}
