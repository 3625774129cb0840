// Shared helpers for the HTTP-level tests: an in-memory app and request shortcuts

#![allow(dead_code)]

pub mod postgres;

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    Router,
};
use axum_extra::headers::{Authorization, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use gym_crm::api::{create_routes, AppState};
use gym_crm::config::{AppConfig, StorageBackend};
use gym_crm::models::Credentials;
use gym_crm::repositories::Repositories;

pub const LOGIN_RATE_LIMIT: usize = 3;

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let config = AppConfig {
            storage_backend: StorageBackend::Memory,
            bcrypt_cost: 4,
            login_rate_limit: LOGIN_RATE_LIMIT,
            ..AppConfig::default()
        };
        let repositories = Repositories::in_memory();

        Self {
            router: create_routes(AppState::new(&repositories, &config)),
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        credentials: Option<&Credentials>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(credentials) = credentials {
            builder = builder.header(
                header::AUTHORIZATION,
                basic_auth(&credentials.username, &credentials.password),
            );
        }

        let request = match body {
            Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, credentials: &Credentials) -> TestResponse {
        self.request(Method::GET, uri, Some(credentials), None).await
    }

    pub async fn register_trainee(&self, first_name: &str, last_name: &str) -> Credentials {
        let response = self
            .request(
                Method::POST,
                "/api/trainees",
                None,
                Some(json!({
                    "firstName": first_name,
                    "lastName": last_name,
                    "dateOfBirth": "1995-04-12",
                    "address": "12 Main St"
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        serde_json::from_value(response.body).unwrap()
    }

    pub async fn register_trainer(&self, first_name: &str, last_name: &str, specialization: &str) -> Credentials {
        let response = self
            .request(
                Method::POST,
                "/api/trainers",
                None,
                Some(json!({
                    "firstName": first_name,
                    "lastName": last_name,
                    "specialization": specialization
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        serde_json::from_value(response.body).unwrap()
    }

    /// Creates a training as the trainee and expects `201 true`
    pub async fn add_training(
        &self,
        trainee: &Credentials,
        trainer_username: &str,
        training_type: &str,
        date: &str,
        duration: i32,
    ) {
        let response = self
            .request(
                Method::POST,
                "/api/trainings",
                Some(trainee),
                Some(json!({
                    "traineeUsername": trainee.username,
                    "trainerUsername": trainer_username,
                    "trainingTypeName": training_type,
                    "trainingDate": date,
                    "trainingDuration": duration
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        assert_eq!(response.body, json!(true));
    }
}

pub fn basic_auth(username: &str, password: &str) -> HeaderValue {
    let mut values = Vec::new();
    Authorization::basic(username, password).encode(&mut values);
    values.pop().unwrap()
}

pub fn credentials(username: &str, password: &str) -> Credentials {
    Credentials {
        username: username.to_string(),
        password: password.to_string(),
    }
}
