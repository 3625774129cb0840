use std::sync::Arc;

use tracing::info;

use crate::auth::{AuthService, AuthenticatedUser, CredentialsGenerator};
use crate::errors::AppError;
use crate::models::{
    validate_create_trainee, validate_update_trainee, ChangePassword, CreateTrainee, Credentials,
    NewTrainee, NewUser, Trainee, TraineeProfile, UpdateTrainee,
};
use crate::repositories::{Repositories, TraineeRepository, UserRepository};

#[derive(Clone)]
pub struct TraineeService {
    trainees: Arc<dyn TraineeRepository>,
    users: Arc<dyn UserRepository>,
    credentials: CredentialsGenerator,
    auth: AuthService,
}

impl TraineeService {
    pub fn new(repositories: &Repositories, auth: AuthService) -> Self {
        let credentials =
            CredentialsGenerator::new(repositories.users.clone(), auth.hasher().policy().clone());

        Self {
            trainees: repositories.trainees.clone(),
            users: repositories.users.clone(),
            credentials,
            auth,
        }
    }

    /// Registers a trainee and returns the generated credentials.
    /// The plain password is only ever returned here.
    pub async fn create(&self, request: CreateTrainee) -> Result<Credentials, AppError> {
        validate_create_trainee(&request).map_err(AppError::validation)?;

        let password = self.credentials.generate_password();
        let password_hash = self.auth.hasher().hash_password(&password)?;

        let trainee = self
            .credentials
            .with_unique_username(&request.first_name, &request.last_name, |username| {
                self.trainees.create(NewTrainee {
                    user: NewUser {
                        first_name: request.first_name.trim().to_string(),
                        last_name: request.last_name.trim().to_string(),
                        username,
                        password_hash: password_hash.clone(),
                    },
                    date_of_birth: request.date_of_birth,
                    address: request.address.clone(),
                })
            })
            .await?;

        info!("Trainee {} created", trainee.username());
        Ok(Credentials {
            username: trainee.user.username,
            password,
        })
    }

    pub async fn get_profile(&self, username: &str) -> Result<TraineeProfile, AppError> {
        let trainee = self.find(username).await?;
        let trainers = self.trainees.find_trainers(trainee.id).await?;
        Ok(TraineeProfile::new(&trainee, &trainers))
    }

    pub async fn list_profiles(&self) -> Result<Vec<TraineeProfile>, AppError> {
        let trainees = self.trainees.find_all().await?;

        let mut profiles = Vec::with_capacity(trainees.len());
        for trainee in &trainees {
            let trainers = self.trainees.find_trainers(trainee.id).await?;
            profiles.push(TraineeProfile::new(trainee, &trainers));
        }
        Ok(profiles)
    }

    pub async fn update(&self, caller: &AuthenticatedUser, request: UpdateTrainee) -> Result<TraineeProfile, AppError> {
        validate_update_trainee(&request).map_err(AppError::validation)?;
        caller.ensure_is(&request.username)?;

        let mut trainee = self.find(&request.username).await?;
        trainee.user.first_name = request.first_name.trim().to_string();
        trainee.user.last_name = request.last_name.trim().to_string();
        trainee.user.is_active = request.is_active;
        trainee.date_of_birth = request.date_of_birth;
        trainee.address = request.address;

        let trainee = self.trainees.update(&trainee).await?;
        let trainers = self.trainees.find_trainers(trainee.id).await?;

        info!("Trainee {} updated", trainee.username());
        Ok(TraineeProfile::new(&trainee, &trainers))
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
        info!("Trainee {} active = {}", username, is_active);
        Ok(())
    }

    /// Deletes the trainee together with their trainings and trainer links
    pub async fn delete(&self, caller: &AuthenticatedUser, username: &str) -> Result<(), AppError> {
        caller.ensure_is(username)?;

        if !self.trainees.delete_by_username(username).await? {
            return Err(AppError::not_found(format!("Trainee '{username}'")));
        }

        info!("Trainee {} deleted", username);
        Ok(())
    }

    async fn find(&self, username: &str) -> Result<Trainee, AppError> {
        self.trainees
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Trainee '{username}'")))
    }
}
