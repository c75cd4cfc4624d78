use axum::{Extension, Json, extract::State};
use tracing::{info, warn};

use hackhub_db::DepositOutcome;
use hackhub_types::api::{Claims, CreditSummary, DepositRequest};

use crate::auth::AppState;
use crate::blocking;
use crate::error::{ApiError, ApiResult};

pub async fn my_credits(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<CreditSummary>> {
    let summary = blocking(&state, move |db| db.credit_summary(claims.sub)).await?;
    Ok(Json(summary))
}

pub async fn deposit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<DepositRequest>,
) -> ApiResult<Json<CreditSummary>> {
    if req.amount <= 0 {
        return Err(ApiError::Validation("Deposit amount must be positive".into()));
    }
    let user_id = claims.sub;
    let amount = req.amount;

    match blocking(&state, move |db| {
        db.deposit_credits(user_id, amount, "Credit top-up")
    })
    .await?
    {
        DepositOutcome::Deposited(summary) => {
            info!("User {} deposited {} credits", user_id, amount);
            Ok(Json(summary))
        }
        DepositOutcome::LimitExceeded { balance, limit } => {
            warn!(
                "User {} deposit of {} refused (balance {}, limit {})",
                user_id, amount, balance, limit
            );
            Err(ApiError::Validation(format!(
                "Deposit would take the balance past the {} credit limit",
                limit
            )))
        }
    }
}
