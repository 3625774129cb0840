use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::{header::HeaderName, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Basic, Authorization},
    TypedHeader,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::auth::AuthService;
use crate::errors::AppError;

/// Basic authentication middleware.
///
/// Puts the `AuthenticatedUser` into the request extensions on success.
pub async fn basic_auth_middleware(
    State(auth_service): State<AuthService>,
    credentials: Option<TypedHeader<Authorization<Basic>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(basic)) = credentials.ok_or(AppError::Unauthorized)?;

    let user = auth_service
        .authenticate(basic.username(), basic.password())
        .await?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Basic authentication for the activation toggle. Deactivated accounts are
/// let through so their owner can turn them back on.
pub async fn activation_auth_middleware(
    State(auth_service): State<AuthService>,
    credentials: Option<TypedHeader<Authorization<Basic>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(basic)) = credentials.ok_or(AppError::Unauthorized)?;

    let user = auth_service
        .authenticate_allowing_inactive(basic.username(), basic.password())
        .await?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// CORS configuration for the API
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any)
}

pub fn security_headers_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    )
}

pub fn frame_options_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    )
}

#[derive(Debug)]
struct Attempts {
    by_key: HashMap<String, Vec<Instant>>,
    last_sweep: Instant,
}

/// Sliding-window attempt counter keyed by an arbitrary string (the login username)
#[derive(Debug, Clone)]
pub struct RateLimiter {
    attempts: Arc<Mutex<Attempts>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            attempts: Arc::new(Mutex::new(Attempts {
                by_key: HashMap::new(),
                last_sweep: Instant::now(),
            })),
            max_requests,
            window,
        }
    }

    /// Records an attempt; `false` once the key has used up its window
    pub fn check_rate_limit(&self, key: &str) -> bool {
        let mut attempts = match self.attempts.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let now = Instant::now();

        // Drop keys with no attempt left in the window, at most once per window
        if now.duration_since(attempts.last_sweep) >= self.window {
            let window = self.window;
            attempts
                .by_key
                .retain(|_, times| times.iter().any(|&time| now.duration_since(time) < window));
            attempts.last_sweep = now;
        }

        let entry = attempts.by_key.entry(key.to_string()).or_default();
        entry.retain(|&time| now.duration_since(time) < self.window);

        if entry.len() >= self.max_requests {
            return false;
        }

        entry.push(now);
        true
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        match self.attempts.lock() {
            Ok(guard) => guard.by_key.len(),
            Err(poisoned) => poisoned.into_inner().by_key.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));

        assert!(limiter.check_rate_limit("Jane.Roe"));
        assert!(limiter.check_rate_limit("Jane.Roe"));
        assert!(limiter.check_rate_limit("Jane.Roe"));

        // 4th attempt should fail
        assert!(!limiter.check_rate_limit("Jane.Roe"));

        // Other usernames have their own window
        assert!(limiter.check_rate_limit("Joe.Johnson"));
    }

    #[test]
    fn test_rate_limiter_window_expires() {
        let limiter = RateLimiter::new(1, Duration::from_millis(20));

        assert!(limiter.check_rate_limit("Jane.Roe"));
        assert!(!limiter.check_rate_limit("Jane.Roe"));

        std::thread::sleep(Duration::from_millis(30));
        assert!(limiter.check_rate_limit("Jane.Roe"));
    }

    #[test]
    fn test_rate_limiter_evicts_expired_keys() {
        let limiter = RateLimiter::new(3, Duration::from_millis(20));

        for username in ["random.1", "random.2", "random.3"] {
            assert!(limiter.check_rate_limit(username));
        }
        assert_eq!(limiter.tracked_keys(), 3);

        std::thread::sleep(Duration::from_millis(30));
        assert!(limiter.check_rate_limit("Jane.Roe"));
        assert_eq!(limiter.tracked_keys(), 1);
    }
}
