use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::training_type::{TrainingType, TrainingTypeName};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Training {
    pub id: Uuid,
    #[serde(skip)]
    pub trainee_id: Uuid,
    #[serde(skip)]
    pub trainer_id: Uuid,
    pub trainee_username: String,
    pub trainer_username: String,
    pub training_name: String,
    pub training_type: TrainingTypeName,
    pub training_date: NaiveDate,
    pub training_duration: i32,
}

impl Training {
    pub fn involves(&self, username: &str) -> bool {
        self.trainee_username == username || self.trainer_username == username
    }
}

#[derive(Debug, Clone)]
pub struct NewTraining {
    pub trainee_id: Uuid,
    pub trainer_id: Uuid,
    pub training_name: String,
    pub training_type: TrainingType,
    pub training_date: NaiveDate,
    pub training_duration: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTraining {
    pub trainee_username: String,
    pub trainer_username: String,
    pub training_type_name: TrainingTypeName,
    pub training_date: NaiveDate,
    pub training_duration: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTraining {
    pub training_date: Option<NaiveDate>,
    pub training_duration: Option<i32>,
}

/// Optional criteria narrowing a trainee's or trainer's training list.
/// Date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingFilter {
    pub period_from: Option<NaiveDate>,
    pub period_to: Option<NaiveDate>,
    /// Username of the other party: the trainer for trainee lists, the trainee for trainer lists
    pub counterpart_username: Option<String>,
    pub training_type: Option<TrainingTypeName>,
}

impl TrainingFilter {
    pub fn matches(&self, training: &Training, counterpart_username: &str) -> bool {
        if let Some(from) = self.period_from {
            if training.training_date < from {
                return false;
            }
        }
        if let Some(to) = self.period_to {
            if training.training_date > to {
                return false;
            }
        }
        if let Some(name) = &self.counterpart_username {
            if name != counterpart_username {
                return false;
            }
        }
        if let Some(training_type) = self.training_type {
            if training.training_type != training_type {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraineeTrainingsQuery {
    pub period_from: Option<NaiveDate>,
    pub period_to: Option<NaiveDate>,
    pub trainer_name: Option<String>,
    pub training_type: Option<TrainingTypeName>,
}

impl From<TraineeTrainingsQuery> for TrainingFilter {
    fn from(query: TraineeTrainingsQuery) -> Self {
        Self {
            period_from: query.period_from,
            period_to: query.period_to,
            counterpart_username: query.trainer_name,
            training_type: query.training_type,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainerTrainingsQuery {
    pub period_from: Option<NaiveDate>,
    pub period_to: Option<NaiveDate>,
    pub trainee_name: Option<String>,
}

impl From<TrainerTrainingsQuery> for TrainingFilter {
    fn from(query: TrainerTrainingsQuery) -> Self {
        Self {
            period_from: query.period_from,
            period_to: query.period_to,
            counterpart_username: query.trainee_name,
            training_type: None,
        }
    }
}
