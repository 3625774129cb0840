// API routes and handlers

pub mod health;
pub mod login;
pub mod routes;
pub mod trainees;
pub mod trainers;
pub mod trainings;

pub use routes::{create_routes, AppState};
