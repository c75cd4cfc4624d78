use axum::{Extension, Json, extract::State};

use hackhub_types::api::{Claims, UserAnalytics};

use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiResult;

pub async fn my_analytics(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<UserAnalytics>> {
    let analytics = blocking(&state, move |db| db.user_analytics(claims.sub)).await?;
    Ok(Json(analytics))
}
