// Domain records, request/response bodies and input validation

pub mod user;
pub mod training_type;
pub mod trainee;
pub mod trainer;
pub mod training;
pub mod validation;

pub use user::*;
pub use training_type::*;
pub use trainee::*;
pub use trainer::*;
pub use training::*;
pub use validation::*;
