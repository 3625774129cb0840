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
use crate::models::{
    ActivationQuery, AssignTrainers, ChangePassword, CreateTrainer, Credentials, TrainerProfile,
    TrainerSummary, UpdateTrainer,
};

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/trainers", post(create_trainer))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/trainers", get(list_trainers).put(update_trainer))
        .route("/trainers/password", put(change_password))
        .route(
            "/trainers/not-assigned/:trainee_username",
            get(not_assigned_trainers),
        )
        .route("/trainers/trainee/:trainee_username", put(assign_trainers))
        .route(
            "/trainers/:username",
            get(get_trainer).delete(delete_trainer),
        )
}

/// Reachable with the credentials of a deactivated owner
pub fn activation_routes() -> Router<AppState> {
    Router::new().route("/trainers/:username/activation", patch(set_activation))
}

#[tracing::instrument(skip(state, request))]
async fn create_trainer(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<CreateTrainer>, AppError>,
) -> Result<(StatusCode, Json<Credentials>), AppError> {
    let credentials = state.trainer_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(credentials)))
}

#[tracing::instrument(skip(state))]
async fn list_trainers(State(state): State<AppState>) -> Result<Json<Vec<TrainerProfile>>, AppError> {
    let profiles = state.trainer_service.list_profiles().await?;
    Ok(Json(profiles))
}

#[tracing::instrument(skip(state))]
async fn get_trainer(
    State(state): State<AppState>,
    WithRejection(Path(username), _): WithRejection<Path<String>, AppError>,
) -> Result<Json<TrainerProfile>, AppError> {
    let profile = state.trainer_service.get_profile(&username).await?;
    Ok(Json(profile))
}

#[tracing::instrument(skip(state, caller, request))]
async fn update_trainer(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateTrainer>, AppError>,
) -> Result<Json<TrainerProfile>, AppError> {
    let profile = state.trainer_service.update(&caller, request).await?;
    Ok(Json(profile))
}

#[tracing::instrument(skip(state, caller, request))]
async fn change_password(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    WithRejection(Json(request), _): WithRejection<Json<ChangePassword>, AppError>,
) -> Result<Json<bool>, AppError> {
    state.trainer_service.change_password(&caller, request).await?;
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
        .trainer_service
        .set_active(&caller, &username, query.is_active)
        .await?;
    Ok(Json(true))
}

#[tracing::instrument(skip(state, caller))]
async fn delete_trainer(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    WithRejection(Path(username), _): WithRejection<Path<String>, AppError>,
) -> Result<Json<bool>, AppError> {
    state.trainer_service.delete(&caller, &username).await?;
    Ok(Json(true))
}

/// Active trainers the trainee has no link to yet
#[tracing::instrument(skip(state))]
async fn not_assigned_trainers(
    State(state): State<AppState>,
    WithRejection(Path(trainee_username), _): WithRejection<Path<String>, AppError>,
) -> Result<Json<Vec<TrainerSummary>>, AppError> {
    let trainers = state.trainer_service.not_assigned(&trainee_username).await?;
    Ok(Json(trainers))
}

#[tracing::instrument(skip(state, caller, request))]
async fn assign_trainers(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    WithRejection(Path(trainee_username), _): WithRejection<Path<String>, AppError>,
    WithRejection(Json(request), _): WithRejection<Json<AssignTrainers>, AppError>,
) -> Result<Json<Vec<TrainerSummary>>, AppError> {
    let trainers = state
        .trainer_service
        .assign_trainers(&caller, &trainee_username, request)
        .await?;
    Ok(Json(trainers))
}
