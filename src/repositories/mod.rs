// Data access: one trait per aggregate, backed by Postgres or by memory

pub mod user_repository;
pub mod trainee_repository;
pub mod trainer_repository;
pub mod training_repository;
pub mod memory;

pub use user_repository::{PgUserRepository, UserRepository};
pub use trainee_repository::{PgTraineeRepository, TraineeRepository};
pub use trainer_repository::{PgTrainerRepository, TrainerRepository};
pub use training_repository::{PgTrainingRepository, TrainingRepository};
pub use memory::InMemoryStore;

use std::sync::Arc;

use sqlx::PgPool;

/// The full set of repositories the services are wired with
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub trainees: Arc<dyn TraineeRepository>,
    pub trainers: Arc<dyn TrainerRepository>,
    pub trainings: Arc<dyn TrainingRepository>,
}

impl Repositories {
    pub fn postgres(db: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(db.clone())),
            trainees: Arc::new(PgTraineeRepository::new(db.clone())),
            trainers: Arc::new(PgTrainerRepository::new(db.clone())),
            trainings: Arc::new(PgTrainingRepository::new(db)),
        }
    }

    /// All four repositories sharing one in-memory store
    pub fn in_memory() -> Self {
        let store = InMemoryStore::new();
        Self {
            users: Arc::new(store.clone()),
            trainees: Arc::new(store.clone()),
            trainers: Arc::new(store.clone()),
            trainings: Arc::new(store),
        }
    }
}
