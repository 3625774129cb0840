use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::trainee::{Trainee, TraineeSummary};
use super::training_type::{TrainingType, TrainingTypeName};
use super::user::{NewUser, User};

#[derive(Debug, Clone)]
pub struct Trainer {
    pub id: Uuid,
    pub user: User,
    pub specialization: TrainingType,
}

impl Trainer {
    pub fn username(&self) -> &str {
        &self.user.username
    }
}

#[derive(Debug, Clone)]
pub struct NewTrainer {
    pub user: NewUser,
    pub specialization: TrainingType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrainer {
    pub first_name: String,
    pub last_name: String,
    pub specialization: TrainingTypeName,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTrainer {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub specialization: TrainingTypeName,
    pub is_active: bool,
}

/// Trainer as returned by the API, with the trainees assigned to them
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainerProfile {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub specialization: TrainingTypeName,
    pub is_active: bool,
    pub trainees: Vec<TraineeSummary>,
}

impl TrainerProfile {
    pub fn new(trainer: &Trainer, trainees: &[Trainee]) -> Self {
        Self {
            username: trainer.user.username.clone(),
            first_name: trainer.user.first_name.clone(),
            last_name: trainer.user.last_name.clone(),
            specialization: trainer.specialization.training_type_name,
            is_active: trainer.user.is_active,
            trainees: trainees.iter().map(TraineeSummary::from).collect(),
        }
    }
}

/// Trainer as embedded in a trainee profile or an assignment listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainerSummary {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub specialization: TrainingTypeName,
}

impl From<&Trainer> for TrainerSummary {
    fn from(trainer: &Trainer) -> Self {
        Self {
            username: trainer.user.username.clone(),
            first_name: trainer.user.first_name.clone(),
            last_name: trainer.user.last_name.clone(),
            specialization: trainer.specialization.training_type_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignTrainers {
    pub trainer_usernames: Vec<String>,
}
