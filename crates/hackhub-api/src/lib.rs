pub mod analytics;
pub mod auth;
pub mod credits;
pub mod error;
pub mod hackathons;
pub mod middleware;
pub mod registrations;
pub mod submissions;
pub mod teams;
pub mod winners;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use tracing::error;

use hackhub_db::Database;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::require_auth;

/// All REST routes. Browsing hackathons and signing in are public; the rest
/// needs a bearer token.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/hackathon/all", get(hackathons::list_hackathons))
        .route("/hackathon/view/{id}", get(hackathons::get_hackathon));

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        // Hackathons
        .route("/hackathon/create", post(hackathons::create_hackathon))
        .route(
            "/hackathon/{id}",
            put(hackathons::update_hackathon).delete(hackathons::delete_hackathon),
        )
        .route("/hackathon/interest/{id}", post(hackathons::toggle_interest))
        // Registrations
        .route("/register/", post(registrations::create_registration))
        .route("/register/me", get(registrations::my_registrations))
        .route("/register/hackathon/{id}", get(registrations::hackathon_registrations))
        .route("/register/{id}/status", put(registrations::update_status))
        .route("/register/check/{id}", get(registrations::check_registration))
        // Submissions
        .route(
            "/submissions/hackathons/{id}",
            get(submissions::list_submissions).post(submissions::create_submission),
        )
        .route(
            "/submissions/hackathons/{id}/finalize",
            post(submissions::finalize_submissions),
        )
        .route(
            "/submissions/{id}",
            get(submissions::get_submission).put(submissions::update_submission),
        )
        .route("/submissions/{id}/score", put(submissions::score_submission))
        // Teams
        .route("/team/my-teams", get(teams::my_teams))
        .route("/team/create", post(teams::create_team))
        .route("/team/join", post(teams::join_team))
        .route("/team/code/{code}", get(teams::team_by_code))
        .route("/team/{id}", get(teams::get_team).delete(teams::delete_team))
        .route("/team/{id}/members", post(teams::add_member))
        // Winners
        .route("/winners/hackathons/{id}", get(winners::list_winners))
        .route("/winners/hackathons/{id}/finalize", post(winners::finalize_winners))
        // Users & credits
        .route("/users/analytics/me", get(analytics::my_analytics))
        .route("/credits/me", get(credits::my_credits))
        .route("/credits/deposit", post(credits::deposit))
        .layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Run a blocking DB closure off the async runtime.
pub(crate) async fn blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow::anyhow!("blocking task failed"))
        })?
        .map_err(ApiError::from)
}
