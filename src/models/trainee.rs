use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::trainer::{Trainer, TrainerSummary};
use super::user::{NewUser, User};

#[derive(Debug, Clone)]
pub struct Trainee {
    pub id: Uuid,
    pub user: User,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
}

impl Trainee {
    pub fn username(&self) -> &str {
        &self.user.username
    }
}

#[derive(Debug, Clone)]
pub struct NewTrainee {
    pub user: NewUser,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrainee {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTrainee {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub is_active: bool,
}

/// Trainee as returned by the API, with the trainers assigned to them
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraineeProfile {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub is_active: bool,
    pub trainers: Vec<TrainerSummary>,
}

impl TraineeProfile {
    pub fn new(trainee: &Trainee, trainers: &[Trainer]) -> Self {
        Self {
            username: trainee.user.username.clone(),
            first_name: trainee.user.first_name.clone(),
            last_name: trainee.user.last_name.clone(),
            date_of_birth: trainee.date_of_birth,
            address: trainee.address.clone(),
            is_active: trainee.user.is_active,
            trainers: trainers.iter().map(TrainerSummary::from).collect(),
        }
    }
}

/// Trainee as embedded in a trainer profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraineeSummary {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&Trainee> for TraineeSummary {
    fn from(trainee: &Trainee) -> Self {
        Self {
            username: trainee.user.username.clone(),
            first_name: trainee.user.first_name.clone(),
            last_name: trainee.user.last_name.clone(),
        }
    }
}
