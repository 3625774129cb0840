// Business logic services

pub mod trainee_service;
pub mod trainer_service;
pub mod training_service;

pub use trainee_service::TraineeService;
pub use trainer_service::TrainerService;
pub use training_service::TrainingService;
