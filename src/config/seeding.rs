use anyhow::Result;
use chrono::{Duration, Utc};

use crate::auth::AuthenticatedUser;
use crate::models::{CreateTrainee, CreateTrainer, CreateTraining, Credentials, TrainingTypeName};
use crate::services::{TraineeService, TrainerService, TrainingService};

/// Loads a small demo data set through the regular services
pub struct DatabaseSeeder {
    trainees: TraineeService,
    trainers: TrainerService,
    trainings: TrainingService,
    log_credentials: bool,
}

impl DatabaseSeeder {
    pub fn new(trainees: TraineeService, trainers: TrainerService, trainings: TrainingService) -> Self {
        Self {
            trainees,
            trainers,
            trainings,
            log_credentials: false,
        }
    }

    /// Emits the generated demo passwords at debug level
    pub fn log_credentials(mut self, enabled: bool) -> Self {
        self.log_credentials = enabled;
        self
    }

    pub async fn seed_all(&self) -> Result<()> {
        if !self.trainees.list_profiles().await?.is_empty() {
            tracing::info!("Existing trainees found, skipping demo data");
            return Ok(());
        }

        tracing::info!("Starting database seeding...");

        let trainee = self
            .trainees
            .create(CreateTrainee {
                first_name: "Jane".to_string(),
                last_name: "Roe".to_string(),
                date_of_birth: chrono::NaiveDate::from_ymd_opt(1994, 3, 21),
                address: Some("1 Demo Street".to_string()),
            })
            .await?;
        self.report("trainee", &trainee);

        let strength_trainer = self
            .trainers
            .create(CreateTrainer {
                first_name: "Joe".to_string(),
                last_name: "Johnson".to_string(),
                specialization: TrainingTypeName::Strength,
            })
            .await?;
        self.report("trainer", &strength_trainer);

        let yoga_trainer = self
            .trainers
            .create(CreateTrainer {
                first_name: "Ann".to_string(),
                last_name: "Lee".to_string(),
                specialization: TrainingTypeName::Yoga,
            })
            .await?;
        self.report("trainer", &yoga_trainer);

        let caller = AuthenticatedUser {
            user_id: uuid::Uuid::nil(),
            username: trainee.username.clone(),
        };
        self.trainings
            .create(
                &caller,
                CreateTraining {
                    trainee_username: trainee.username.clone(),
                    trainer_username: strength_trainer.username.clone(),
                    training_type_name: TrainingTypeName::Strength,
                    training_date: (Utc::now() + Duration::days(1)).date_naive(),
                    training_duration: 60,
                },
            )
            .await?;

        tracing::info!("Database seeding completed!");
        Ok(())
    }

    fn report(&self, role: &str, credentials: &Credentials) {
        tracing::info!(username = %credentials.username, "Created demo {}", role);
        if self.log_credentials {
            tracing::debug!(username = %credentials.username, password = %credentials.password, "Demo {} credentials", role);
        }
    }
}
