use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::{AuthService, AuthenticatedUser, CredentialsGenerator};
use crate::errors::AppError;
use crate::models::{
    validate_create_trainer, validate_update_trainer, AssignTrainers, ChangePassword, CreateTrainer,
    Credentials, NewTrainer, NewUser, Trainee, Trainer, TrainerProfile, TrainerSummary, TrainingType,
    TrainingTypeName, UpdateTrainer,
};
use crate::repositories::{
    Repositories, TraineeRepository, TrainerRepository, TrainingRepository, UserRepository,
};

#[derive(Clone)]
pub struct TrainerService {
    trainers: Arc<dyn TrainerRepository>,
    trainees: Arc<dyn TraineeRepository>,
    trainings: Arc<dyn TrainingRepository>,
    users: Arc<dyn UserRepository>,
    credentials: CredentialsGenerator,
    auth: AuthService,
}

impl TrainerService {
    pub fn new(repositories: &Repositories, auth: AuthService) -> Self {
        let credentials =
            CredentialsGenerator::new(repositories.users.clone(), auth.hasher().policy().clone());

        Self {
            trainers: repositories.trainers.clone(),
            trainees: repositories.trainees.clone(),
            trainings: repositories.trainings.clone(),
            users: repositories.users.clone(),
            credentials,
            auth,
        }
    }

    pub async fn create(&self, request: CreateTrainer) -> Result<Credentials, AppError> {
        validate_create_trainer(&request).map_err(AppError::validation)?;

        let specialization = self.training_type(request.specialization).await?;
        let password = self.credentials.generate_password();
        let password_hash = self.auth.hasher().hash_password(&password)?;

        let trainer = self
            .credentials
            .with_unique_username(&request.first_name, &request.last_name, |username| {
                self.trainers.create(NewTrainer {
                    user: NewUser {
                        first_name: request.first_name.trim().to_string(),
                        last_name: request.last_name.trim().to_string(),
                        username,
                        password_hash: password_hash.clone(),
                    },
                    specialization: specialization.clone(),
                })
            })
            .await?;

        info!("Trainer {} created", trainer.username());
        Ok(Credentials {
            username: trainer.user.username,
            password,
        })
    }

    pub async fn get_profile(&self, username: &str) -> Result<TrainerProfile, AppError> {
        let trainer = self.find(username).await?;
        let trainees = self.trainers.find_trainees(trainer.id).await?;
        Ok(TrainerProfile::new(&trainer, &trainees))
    }

    pub async fn list_profiles(&self) -> Result<Vec<TrainerProfile>, AppError> {
        let trainers = self.trainers.find_all().await?;

        let mut profiles = Vec::with_capacity(trainers.len());
        for trainer in &trainers {
            let trainees = self.trainers.find_trainees(trainer.id).await?;
            profiles.push(TrainerProfile::new(trainer, &trainees));
        }
        Ok(profiles)
    }

    pub async fn update(&self, caller: &AuthenticatedUser, request: UpdateTrainer) -> Result<TrainerProfile, AppError> {
        validate_update_trainer(&request).map_err(AppError::validation)?;
        caller.ensure_is(&request.username)?;

        let mut trainer = self.find(&request.username).await?;
        if trainer.specialization.training_type_name != request.specialization {
            trainer.specialization = self.training_type(request.specialization).await?;
        }
        trainer.user.first_name = request.first_name.trim().to_string();
        trainer.user.last_name = request.last_name.trim().to_string();
        trainer.user.is_active = request.is_active;

        let trainer = self.trainers.update(&trainer).await?;
        let trainees = self.trainers.find_trainees(trainer.id).await?;

        info!("Trainer {} updated", trainer.username());
        Ok(TrainerProfile::new(&trainer, &trainees))
    }

    pub async fn change_password(&self, caller: &AuthenticatedUser, request: ChangePassword) -> Result<(), AppError> {
        caller.ensure_is(&request.username)?;
        self.find(&request.username).await?;
        self.auth.change_password(caller, &request).await
    }

    pub async fn set_active(&self, caller: &AuthenticatedUser, username: &str, is_active: bool) -> Result<(), AppError> {
        caller.ensure_is(username)?;
        self.find(username).await?;

        self.users.set_active(username, is_active).await?;
        info!("Trainer {} active = {}", username, is_active);
        Ok(())
    }

    pub async fn delete(&self, caller: &AuthenticatedUser, username: &str) -> Result<(), AppError> {
        caller.ensure_is(username)?;

        if !self.trainers.delete_by_username(username).await? {
            return Err(AppError::not_found(format!("Trainer '{username}'")));
        }

        info!("Trainer {} deleted", username);
        Ok(())
    }

    /// Active trainers the trainee is not yet linked to
    pub async fn not_assigned(&self, trainee_username: &str) -> Result<Vec<TrainerSummary>, AppError> {
        let trainee = self.find_trainee(trainee_username).await?;
        let trainers = self.trainers.find_not_assigned(trainee.id).await?;
        Ok(trainers.iter().map(TrainerSummary::from).collect())
    }

    /// Links the listed trainers to the trainee and returns the trainee's
    /// complete trainer list. Usernames that match no trainer are skipped.
    pub async fn assign_trainers(
        &self,
        caller: &AuthenticatedUser,
        trainee_username: &str,
        request: AssignTrainers,
    ) -> Result<Vec<TrainerSummary>, AppError> {
        caller.ensure_is(trainee_username)?;
        let trainee = self.find_trainee(trainee_username).await?;

        let found = self
            .trainers
            .find_by_usernames(&request.trainer_usernames)
            .await?;
        for username in &request.trainer_usernames {
            if !found.iter().any(|t| t.username() == username) {
                warn!("Trainer {} not found, skipping assignment", username);
            }
        }

        let ids: Vec<_> = found.iter().map(|t| t.id).collect();
        self.trainees.add_trainers(trainee.id, &ids).await?;

        let trainers = self.trainees.find_trainers(trainee.id).await?;
        info!("Trainee {} now has {} trainer(s)", trainee_username, trainers.len());
        Ok(trainers.iter().map(TrainerSummary::from).collect())
    }

    async fn find(&self, username: &str) -> Result<Trainer, AppError> {
        self.trainers
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Trainer '{username}'")))
    }

    async fn find_trainee(&self, username: &str) -> Result<Trainee, AppError> {
        self.trainees
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Trainee '{username}'")))
    }

    async fn training_type(&self, name: TrainingTypeName) -> Result<TrainingType, AppError> {
        self.trainings
            .find_training_type(name)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Training type {name}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::PasswordHasher;
    use crate::models::CreateTrainee;
    use crate::services::TraineeService;
    use assert_matches::assert_matches;
    use uuid::Uuid;

    struct Fixture {
        trainers: TrainerService,
        trainees: TraineeService,
    }

    fn fixture() -> Fixture {
        let repositories = Repositories::in_memory();
        let auth = AuthService::new(repositories.users.clone(), PasswordHasher::new(4));
        Fixture {
            trainers: TrainerService::new(&repositories, auth.clone()),
            trainees: TraineeService::new(&repositories, auth),
        }
    }

    fn caller(username: &str) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: Uuid::new_v4(),
            username: username.to_string(),
        }
    }

    fn trainer(first: &str, last: &str, specialization: TrainingTypeName) -> CreateTrainer {
        CreateTrainer {
            first_name: first.to_string(),
            last_name: last.to_string(),
            specialization,
        }
    }

    async fn add_trainee(fixture: &Fixture) -> String {
        fixture
            .trainees
            .create(CreateTrainee {
                first_name: "Jane".to_string(),
                last_name: "Roe".to_string(),
                date_of_birth: None,
                address: None,
            })
            .await
            .unwrap()
            .username
    }

    #[tokio::test]
    async fn test_create_and_fetch_profile() {
        let fixture = fixture();

        let credentials = fixture
            .trainers
            .create(trainer("Joe", "Johnson", TrainingTypeName::Strength))
            .await
            .unwrap();
        assert_eq!(credentials.username, "Joe.Johnson");

        let profile = fixture.trainers.get_profile("Joe.Johnson").await.unwrap();
        assert_eq!(profile.specialization, TrainingTypeName::Strength);
        assert!(profile.is_active);
        assert!(profile.trainees.is_empty());
    }

    #[tokio::test]
    async fn test_update_changes_specialization() {
        let fixture = fixture();
        fixture
            .trainers
            .create(trainer("Joe", "Johnson", TrainingTypeName::Strength))
            .await
            .unwrap();

        let profile = fixture
            .trainers
            .update(
                &caller("Joe.Johnson"),
                UpdateTrainer {
                    username: "Joe.Johnson".to_string(),
                    first_name: "Joseph".to_string(),
                    last_name: "Johnson".to_string(),
                    specialization: TrainingTypeName::Yoga,
                    is_active: true,
                },
            )
            .await
            .unwrap();

        assert_eq!(profile.first_name, "Joseph");
        assert_eq!(profile.specialization, TrainingTypeName::Yoga);
    }

    #[tokio::test]
    async fn test_assign_trainers_skips_unknown_usernames() {
        let fixture = fixture();
        let trainee = add_trainee(&fixture).await;
        fixture
            .trainers
            .create(trainer("Joe", "Johnson", TrainingTypeName::Yoga))
            .await
            .unwrap();
        fixture
            .trainers
            .create(trainer("Ann", "Lee", TrainingTypeName::Zumba))
            .await
            .unwrap();

        let assigned = fixture
            .trainers
            .assign_trainers(
                &caller(&trainee),
                &trainee,
                AssignTrainers {
                    trainer_usernames: vec!["Joe.Johnson".to_string(), "Ghost.Trainer".to_string()],
                },
            )
            .await
            .unwrap();
        let names: Vec<_> = assigned.iter().map(|t| t.username.as_str()).collect();
        assert_eq!(names, vec!["Joe.Johnson"]);

        let free: Vec<_> = fixture
            .trainers
            .not_assigned(&trainee)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.username)
            .collect();
        assert_eq!(free, vec!["Ann.Lee"]);

        let profile = fixture.trainers.get_profile("Joe.Johnson").await.unwrap();
        assert_eq!(profile.trainees.len(), 1);
    }

    #[tokio::test]
    async fn test_assign_trainers_requires_trainee_owner() {
        let fixture = fixture();
        let trainee = add_trainee(&fixture).await;

        let result = fixture
            .trainers
            .assign_trainers(
                &caller("Joe.Johnson"),
                &trainee,
                AssignTrainers {
                    trainer_usernames: vec![],
                },
            )
            .await;
        assert_matches!(result, Err(AppError::Forbidden));
    }

    #[tokio::test]
    async fn test_not_assigned_for_unknown_trainee() {
        let fixture = fixture();
        assert_matches!(
            fixture.trainers.not_assigned("Nobody.Here").await,
            Err(AppError::NotFound(_))
        );
    }

    #[tokio::test]
    async fn test_inactive_trainers_are_not_offered() {
        let fixture = fixture();
        let trainee = add_trainee(&fixture).await;
        fixture
            .trainers
            .create(trainer("Joe", "Johnson", TrainingTypeName::Yoga))
            .await
            .unwrap();

        fixture
            .trainers
            .set_active(&caller("Joe.Johnson"), "Joe.Johnson", false)
            .await
            .unwrap();

        assert!(fixture.trainers.not_assigned(&trainee).await.unwrap().is_empty());
    }
}
