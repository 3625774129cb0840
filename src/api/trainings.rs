use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use super::routes::AppState;
use crate::auth::AuthenticatedUser;
use crate::errors::AppError;
use crate::models::{
    CreateTraining, TraineeTrainingsQuery, TrainerTrainingsQuery, Training, TrainingType,
    UpdateTraining,
};

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/trainings/types", get(training_types))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/trainings", post(create_training).get(list_trainings))
        .route(
            "/trainings/:id",
            get(get_training).put(update_training).delete(delete_training),
        )
        .route("/trainings/trainee/:username", get(trainee_trainings))
        .route("/trainings/trainer/:username", get(trainer_trainings))
}

#[tracing::instrument(skip(state, caller, request))]
async fn create_training(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    WithRejection(Json(request), _): WithRejection<Json<CreateTraining>, AppError>,
) -> Result<(StatusCode, Json<bool>), AppError> {
    state.training_service.create(&caller, request).await?;
    Ok((StatusCode::CREATED, Json(true)))
}

#[tracing::instrument(skip(state))]
async fn list_trainings(State(state): State<AppState>) -> Result<Json<Vec<Training>>, AppError> {
    Ok(Json(state.training_service.list().await?))
}

#[tracing::instrument(skip(state))]
async fn get_training(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<Json<Training>, AppError> {
    Ok(Json(state.training_service.get(id).await?))
}

#[tracing::instrument(skip(state, caller, request))]
async fn update_training(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateTraining>, AppError>,
) -> Result<Json<Training>, AppError> {
    let training = state.training_service.update(&caller, id, request).await?;
    Ok(Json(training))
}

#[tracing::instrument(skip(state, caller))]
async fn delete_training(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<Json<bool>, AppError> {
    state.training_service.delete(&caller, id).await?;
    Ok(Json(true))
}

/// Trainee's trainings, narrowed by period, trainer and training type
#[tracing::instrument(skip(state))]
async fn trainee_trainings(
    State(state): State<AppState>,
    WithRejection(Path(username), _): WithRejection<Path<String>, AppError>,
    WithRejection(Query(query), _): WithRejection<Query<TraineeTrainingsQuery>, AppError>,
) -> Result<Json<Vec<Training>>, AppError> {
    let trainings = state
        .training_service
        .trainee_trainings(&username, query.into())
        .await?;
    Ok(Json(trainings))
}

/// Trainer's trainings, narrowed by period and trainee
#[tracing::instrument(skip(state))]
async fn trainer_trainings(
    State(state): State<AppState>,
    WithRejection(Path(username), _): WithRejection<Path<String>, AppError>,
    WithRejection(Query(query), _): WithRejection<Query<TrainerTrainingsQuery>, AppError>,
) -> Result<Json<Vec<Training>>, AppError> {
    let trainings = state
        .training_service
        .trainer_trainings(&username, query.into())
        .await?;
    Ok(Json(trainings))
}

async fn training_types(State(state): State<AppState>) -> Result<Json<Vec<TrainingType>>, AppError> {
    Ok(Json(state.training_service.training_types().await?))
}
