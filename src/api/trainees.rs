use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch, post, put},
    Extension, Router,
};
use axum_extra::extract::WithRejection;

use super::routes::AppState;
use crate::auth::AuthenticatedUser;
use crate::errors::AppError;
use crate::models::{ActivationQuery, ChangePassword, CreateTrainee, Credentials, TraineeProfile, UpdateTrainee};

/// Registration
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/trainees", post(create_trainee))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/trainees", get(list_trainees).put(update_trainee))
        .route("/trainees/password", put(change_password))
        .route(
            "/trainees/:username",
            get(get_trainee).delete(delete_trainee),
        )
}

/// Reachable with the credentials of a deactivated owner
pub fn activation_routes() -> Router<AppState> {
    Router::new().route("/trainees/:username/activation", patch(set_activation))
}

#[tracing::instrument(skip(state, request))]
async fn create_trainee(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<CreateTrainee>, AppError>,
) -> Result<(StatusCode, Json<Credentials>), AppError> {
    let credentials = state.trainee_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(credentials)))
}

#[tracing::instrument(skip(state))]
async fn list_trainees(State(state): State<AppState>) -> Result<Json<Vec<TraineeProfile>>, AppError> {
    let profiles = state.trainee_service.list_profiles().await?;
    Ok(Json(profiles))
}

#[tracing::instrument(skip(state))]
async fn get_trainee(
    State(state): State<AppState>,
    WithRejection(Path(username), _): WithRejection<Path<String>, AppError>,
) -> Result<Json<TraineeProfile>, AppError> {
    let profile = state.trainee_service.get_profile(&username).await?;
    Ok(Json(profile))
}

#[tracing::instrument(skip(state, caller, request))]
async fn update_trainee(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateTrainee>, AppError>,
) -> Result<Json<TraineeProfile>, AppError> {
    let profile = state.trainee_service.update(&caller, request).await?;
    Ok(Json(profile))
}

#[tracing::instrument(skip(state, caller, request))]
async fn change_password(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    WithRejection(Json(request), _): WithRejection<Json<ChangePassword>, AppError>,
) -> Result<Json<bool>, AppError> {
    state.trainee_service.change_password(&caller, request).await?;
    Ok(Json(true))
}

#[tracing::instrument(skip(state, caller))]
async fn set_activation(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    WithRejection(Path(username), _): WithRejection<Path<String>, AppError>,
    WithRejection(Query(query), _): WithRejection<Query<ActivationQuery>, AppError>,
) -> Result<Json<bool>, AppError> {
    state
        .trainee_service
        .set_active(&caller, &username, query.is_active)
        .await?;
    Ok(Json(true))
}

#[tracing::instrument(skip(state, caller))]
async fn delete_trainee(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    WithRejection(Path(username), _): WithRejection<Path<String>, AppError>,
) -> Result<Json<bool>, AppError> {
    state.trainee_service.delete(&caller, &username).await?;
    Ok(Json(true))
}
