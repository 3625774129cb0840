use axum::{extract::State, http::StatusCode, response::Json, routing::post, Router};
use axum_extra::extract::WithRejection;

use super::routes::AppState;
use crate::errors::AppError;
use crate::models::Credentials;

pub fn routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// `200 true` for valid credentials of an active user, `400 false` otherwise
#[tracing::instrument(skip(state, credentials))]
async fn login(
    State(state): State<AppState>,
    WithRejection(Json(credentials), _): WithRejection<Json<Credentials>, AppError>,
) -> Result<(StatusCode, Json<bool>), AppError> {
    if !state.login_limiter.check_rate_limit(&credentials.username) {
        tracing::warn!("Too many login attempts for {}", credentials.username);
        return Err(AppError::RateLimited);
    }

    let valid = state.auth_service.login(&credentials).await?;
    let status = if valid {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };

    Ok((status, Json(valid)))
}
