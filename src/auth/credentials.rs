use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use rand::{distributions::Alphanumeric, Rng};
use regex::Regex;
use tracing::warn;

use crate::auth::password::{validate_password_strength, PasswordPolicy};
use crate::errors::AppError;
use crate::repositories::UserRepository;

pub const GENERATED_PASSWORD_LENGTH: usize = 10;

/// A registration that loses a username race is retried once with a fresh name
const USERNAME_ATTEMPTS: usize = 2;

/// Produces login credentials for newly registered trainees and trainers
#[derive(Clone)]
pub struct CredentialsGenerator {
    users: Arc<dyn UserRepository>,
    policy: PasswordPolicy,
}

impl CredentialsGenerator {
    pub fn new(users: Arc<dyn UserRepository>, policy: PasswordPolicy) -> Self {
        Self { users, policy }
    }

    /// `First.Last`, or `First.LastN` when that name (or numbered variants of
    /// it) already exists. N starts at the number of existing matches plus one
    /// and moves up past any suffix that is still taken.
    pub async fn generate_username(&self, first_name: &str, last_name: &str) -> Result<String, AppError> {
        let base = format!("{}.{}", username_part(first_name), username_part(last_name));

        let pattern = Regex::new(&format!(r"^{}\d*$", regex::escape(&base)))
            .map_err(|e| AppError::Internal(e.into()))?;

        let existing = self.users.find_usernames_starting_with(&base).await?;
        let taken: HashSet<&str> = existing
            .iter()
            .map(String::as_str)
            .filter(|username| pattern.is_match(username))
            .collect();

        if taken.is_empty() {
            return Ok(base);
        }

        let mut suffix = taken.len() + 1;
        while taken.contains(format!("{base}{suffix}").as_str()) {
            suffix += 1;
        }

        Ok(format!("{base}{suffix}"))
    }

    /// Generates a username and hands it to `create`. When `create` reports a
    /// conflict (another registration took the name in between), a new
    /// username is generated and `create` runs again.
    pub async fn with_unique_username<T, F, Fut>(
        &self,
        first_name: &str,
        last_name: &str,
        create: F,
    ) -> Result<T, AppError>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let mut attempt = 1;
        loop {
            let username = self.generate_username(first_name, last_name).await?;
            match create(username.clone()).await {
                Err(AppError::Conflict(_)) if attempt < USERNAME_ATTEMPTS => {
                    warn!("Username {} was taken concurrently, retrying", username);
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    pub fn generate_password(&self) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let candidate: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(GENERATED_PASSWORD_LENGTH)
                .map(char::from)
                .collect();

            if validate_password_strength(&candidate, &self.policy).is_ok() {
                return candidate;
            }
        }
    }
}

/// Name with all whitespace removed, so `Mary Ann` contributes `MaryAnn`
fn username_part(name: &str) -> String {
    name.split_whitespace().collect()
}
