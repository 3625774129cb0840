use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::errors::AppError;
use crate::models::{
    validate_create_training, validate_update_training, CreateTraining, NewTraining, Training,
    TrainingFilter, TrainingType, UpdateTraining,
};
use crate::repositories::{Repositories, TraineeRepository, TrainerRepository, TrainingRepository};

#[derive(Clone)]
pub struct TrainingService {
    trainings: Arc<dyn TrainingRepository>,
    trainees: Arc<dyn TraineeRepository>,
    trainers: Arc<dyn TrainerRepository>,
}

impl TrainingService {
    pub fn new(repositories: &Repositories) -> Self {
        Self {
            trainings: repositories.trainings.clone(),
            trainees: repositories.trainees.clone(),
            trainers: repositories.trainers.clone(),
        }
    }

    /// Records a training between a trainee and a trainer and links the two.
    /// Only one of the participants may create it.
    pub async fn create(&self, caller: &AuthenticatedUser, request: CreateTraining) -> Result<Training, AppError> {
        validate_create_training(&request).map_err(AppError::validation)?;

        if caller.username != request.trainee_username && caller.username != request.trainer_username {
            return Err(AppError::Forbidden);
        }

        let trainee = self
            .trainees
            .find_by_username(&request.trainee_username)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Trainee '{}'", request.trainee_username)))?;
        let trainer = self
            .trainers
            .find_by_username(&request.trainer_username)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Trainer '{}'", request.trainer_username)))?;
        let training_type = self
            .trainings
            .find_training_type(request.training_type_name)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Training type {}", request.training_type_name)))?;

        let training = self
            .trainings
            .create(NewTraining {
                trainee_id: trainee.id,
                trainer_id: trainer.id,
                training_name: training_type.training_type_name.to_string(),
                training_type,
                training_date: request.training_date,
                training_duration: request.training_duration,
            })
            .await?;

        info!(
            "Training {} created for {} with {}",
            training.id, training.trainee_username, training.trainer_username
        );
        Ok(training)
    }

    pub async fn get(&self, id: Uuid) -> Result<Training, AppError> {
        self.trainings
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Training {id}")))
    }

    pub async fn list(&self) -> Result<Vec<Training>, AppError> {
        self.trainings.find_all().await
    }

    pub async fn update(
        &self,
        caller: &AuthenticatedUser,
        id: Uuid,
        request: UpdateTraining,
    ) -> Result<Training, AppError> {
        validate_update_training(&request).map_err(AppError::validation)?;

        let mut training = self.get(id).await?;
        if !training.involves(&caller.username) {
            return Err(AppError::Forbidden);
        }

        if let Some(date) = request.training_date {
            training.training_date = date;
        }
        if let Some(duration) = request.training_duration {
            training.training_duration = duration;
        }

        let training = self.trainings.update(&training).await?;
        info!("Training {} updated", training.id);
        Ok(training)
    }

    pub async fn delete(&self, caller: &AuthenticatedUser, id: Uuid) -> Result<(), AppError> {
        let training = self.get(id).await?;
        if !training.involves(&caller.username) {
            return Err(AppError::Forbidden);
        }

        if !self.trainings.delete(&training).await? {
            warn!("Training {} disappeared before delete", id);
            return Err(AppError::not_found(format!("Training {id}")));
        }

        info!("Training {} deleted", id);
        Ok(())
    }

    pub async fn trainee_trainings(&self, username: &str, filter: TrainingFilter) -> Result<Vec<Training>, AppError> {
        if self.trainees.find_by_username(username).await?.is_none() {
            return Err(AppError::not_found(format!("Trainee '{username}'")));
        }
        self.trainings.find_trainee_trainings(username, &filter).await
    }

    pub async fn trainer_trainings(&self, username: &str, filter: TrainingFilter) -> Result<Vec<Training>, AppError> {
        if self.trainers.find_by_username(username).await?.is_none() {
            return Err(AppError::not_found(format!("Trainer '{username}'")));
        }
        self.trainings.find_trainer_trainings(username, &filter).await
    }

    pub async fn training_types(&self) -> Result<Vec<TrainingType>, AppError> {
        self.trainings.find_all_training_types().await
    }
}
