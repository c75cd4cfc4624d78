use axum::{
    Extension, Json,
    extract::{Path, State},
};
use tracing::info;
use uuid::Uuid;

use hackhub_db::FinalizeOutcome;
use hackhub_types::api::Claims;
use hackhub_types::models::Winner;

use crate::auth::AppState;
use crate::blocking;
use crate::error::{ApiError, ApiResult};
use crate::hackathons::{find_hackathon, owned_hackathon};

pub async fn list_winners(
    State(state): State<AppState>,
    Path(hackathon_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Winner>>> {
    find_hackathon(&state, hackathon_id).await?;
    let winners = blocking(&state, move |db| db.list_winners(hackathon_id)).await?;
    Ok(Json(winners))
}

pub async fn finalize_winners(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(hackathon_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Winner>>> {
    let hackathon = owned_hackathon(&state, &claims, hackathon_id).await?;

    match blocking(&state, move |db| db.finalize_winners(hackathon_id)).await? {
        FinalizeOutcome::Finalized(winners) => {
            info!(
                "Winners finalized for {}: {}",
                hackathon.title,
                winners
                    .iter()
                    .map(|w| format!("#{} {}", w.position, w.team_name))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            Ok(Json(winners))
        }
        FinalizeOutcome::AlreadyFinalized => Err(ApiError::Conflict(
            "Winners are already finalized".into(),
        )),
        FinalizeOutcome::NoScoredSubmissions => Err(ApiError::Validation(
            "No scored submissions to rank".into(),
        )),
    }
}
