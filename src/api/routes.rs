use axum::{middleware, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::health::health_check;
use super::{login, trainees, trainers, trainings};
use crate::auth::{
    activation_auth_middleware, basic_auth_middleware, cors_layer, frame_options_layer, security_headers_layer, AuthService,
    PasswordHasher, RateLimiter,
};
use crate::config::AppConfig;
use crate::repositories::Repositories;
use crate::services::{TraineeService, TrainerService, TrainingService};

/// Services shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub trainee_service: TraineeService,
    pub trainer_service: TrainerService,
    pub training_service: TrainingService,
    pub login_limiter: RateLimiter,
}

impl AppState {
    pub fn new(repositories: &Repositories, config: &AppConfig) -> Self {
        let auth_service = AuthService::new(
            repositories.users.clone(),
            PasswordHasher::new(config.bcrypt_cost),
        );

        Self {
            trainee_service: TraineeService::new(repositories, auth_service.clone()),
            trainer_service: TrainerService::new(repositories, auth_service.clone()),
            training_service: TrainingService::new(repositories),
            login_limiter: RateLimiter::new(config.login_rate_limit, config.login_rate_window),
            auth_service,
        }
    }
}

pub fn create_routes(state: AppState) -> Router {
    let protected = Router::new()
        .merge(trainees::protected_routes())
        .merge(trainers::protected_routes())
        .merge(trainings::protected_routes())
        .route_layer(middleware::from_fn_with_state(
            state.auth_service.clone(),
            basic_auth_middleware,
        ));

    let activation = Router::new()
        .merge(trainees::activation_routes())
        .merge(trainers::activation_routes())
        .route_layer(middleware::from_fn_with_state(
            state.auth_service.clone(),
            activation_auth_middleware,
        ));

    let public = Router::new()
        .merge(login::routes())
        .merge(trainees::public_routes())
        .merge(trainers::public_routes())
        .merge(trainings::public_routes());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", public.merge(protected).merge(activation))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security_headers_layer())
                .layer(frame_options_layer())
                .layer(cors_layer()),
        )
}
