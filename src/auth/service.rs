use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::password::PasswordHasher;
use crate::errors::AppError;
use crate::models::{ChangePassword, Credentials, User};
use crate::repositories::UserRepository;

/// Identity attached to a request once basic authentication succeeds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
}

impl AuthenticatedUser {
    /// Fails with `Forbidden` unless the caller is `username`
    pub fn ensure_is(&self, username: &str) -> Result<(), AppError> {
        if self.username == username {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, hasher: PasswordHasher) -> Self {
        Self { users, hasher }
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    /// Checks a username/password pair. Unknown users, wrong passwords and
    /// deactivated accounts all fail the same way.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<AuthenticatedUser, AppError> {
        let user = self.verify_credentials(username, password).await?;

        if !user.is_active {
            warn!("Rejected login for inactive user {}", username);
            return Err(AppError::Unauthorized);
        }

        Ok(AuthenticatedUser {
            user_id: user.id,
            username: user.username,
        })
    }

    /// Like `authenticate`, but also accepts deactivated accounts. Only the
    /// activation toggle uses it, so an owner can switch their account back on.
    pub async fn authenticate_allowing_inactive(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, AppError> {
        let user = self.verify_credentials(username, password).await?;

        Ok(AuthenticatedUser {
            user_id: user.id,
            username: user.username,
        })
    }

    async fn verify_credentials(&self, username: &str, password: &str) -> Result<User, AppError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !self.hasher.verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    /// `true` for valid credentials of an active user
    pub async fn login(&self, credentials: &Credentials) -> Result<bool, AppError> {
        match self
            .authenticate(&credentials.username, &credentials.password)
            .await
        {
            Ok(user) => {
                info!("User {} logged in", user.username);
                Ok(true)
            }
            Err(AppError::Unauthorized) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Replaces the caller's password after checking the old one
    pub async fn change_password(&self, caller: &AuthenticatedUser, request: &ChangePassword) -> Result<(), AppError> {
        caller.ensure_is(&request.username)?;

        let user = self
            .users
            .find_by_username(&request.username)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User '{}'", request.username)))?;

        if !self.hasher.verify_password(&request.old_password, &user.password_hash)? {
            return Err(AppError::validation("Old password is incorrect"));
        }

        let password_hash = self.hasher.hash_password(&request.new_password)?;
        self.users
            .update_password(&request.username, &password_hash)
            .await?;

        info!("Password changed for {}", request.username);
        Ok(())
    }
}
