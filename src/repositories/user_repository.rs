use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::User;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// All usernames beginning with `prefix`, used to pick a free username
    async fn find_usernames_starting_with(&self, prefix: &str) -> Result<Vec<String>, AppError>;

    async fn update_password(&self, username: &str, password_hash: &str) -> Result<bool, AppError>;

    async fn set_active(&self, username: &str, is_active: bool) -> Result<bool, AppError>;
}

/// Column list shared by every query that loads a user, optionally joined
pub(crate) const USER_COLUMNS: &str =
    "u.id AS user_id, u.first_name, u.last_name, u.username, u.password_hash, u.is_active, u.created_at, u.updated_at";

/// User columns as they come back from a join
#[derive(Debug, FromRow)]
pub(crate) struct UserColumns {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserColumns> for User {
    fn from(row: UserColumns) -> Self {
        User {
            id: row.user_id,
            first_name: row.first_name,
            last_name: row.last_name,
            username: row.username,
            password_hash: row.password_hash,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Escapes LIKE wildcards so a username prefix matches literally
pub(crate) fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserColumns>(&format!(
            "SELECT {USER_COLUMNS} FROM users u WHERE u.username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_usernames_starting_with(&self, prefix: &str) -> Result<Vec<String>, AppError> {
        let usernames = sqlx::query_scalar::<_, String>(
            "SELECT username FROM users WHERE username LIKE $1 ESCAPE '\\'",
        )
        .bind(format!("{}%", escape_like(prefix)))
        .fetch_all(&self.db)
        .await?;

        Ok(usernames)
    }

    async fn update_password(&self, username: &str, password_hash: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = $3 WHERE username = $1",
        )
        .bind(username)
        .bind(password_hash)
        .bind(Utc::now())
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_active(&self, username: &str, is_active: bool) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE users SET is_active = $2, updated_at = $3 WHERE username = $1",
        )
        .bind(username)
        .bind(is_active)
        .bind(Utc::now())
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
