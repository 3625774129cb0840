use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::trainer_repository::{trainer_select, TrainerRow};
use super::user_repository::{UserColumns, USER_COLUMNS};
use crate::errors::AppError;
use crate::models::{NewTrainee, Trainee, Trainer};

#[async_trait]
pub trait TraineeRepository: Send + Sync {
    /// Inserts the user account and the trainee profile together
    async fn create(&self, trainee: NewTrainee) -> Result<Trainee, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Trainee>, AppError>;

    async fn find_all(&self) -> Result<Vec<Trainee>, AppError>;

    /// Persists profile fields and the linked user's names and activation flag
    async fn update(&self, trainee: &Trainee) -> Result<Trainee, AppError>;

    /// Removes the trainee, their user account, trainings and trainer links
    async fn delete_by_username(&self, username: &str) -> Result<bool, AppError>;

    async fn find_trainers(&self, trainee_id: Uuid) -> Result<Vec<Trainer>, AppError>;

    /// Links trainers to the trainee; existing links are kept
    async fn add_trainers(&self, trainee_id: Uuid, trainer_ids: &[Uuid]) -> Result<(), AppError>;
}

pub(crate) fn trainee_select() -> String {
    format!(
        "SELECT t.id, t.date_of_birth, t.address, {USER_COLUMNS} \
         FROM trainees t JOIN users u ON u.id = t.user_id"
    )
}

#[derive(Debug, FromRow)]
pub(crate) struct TraineeRow {
    pub id: Uuid,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    #[sqlx(flatten)]
    pub user: UserColumns,
}

impl From<TraineeRow> for Trainee {
    fn from(row: TraineeRow) -> Self {
        Trainee {
            id: row.id,
            user: row.user.into(),
            date_of_birth: row.date_of_birth,
            address: row.address,
        }
    }
}

#[derive(Clone)]
pub struct PgTraineeRepository {
    db: PgPool,
}

impl PgTraineeRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TraineeRepository for PgTraineeRepository {
    async fn create(&self, trainee: NewTrainee) -> Result<Trainee, AppError> {
        let user = trainee.user.into_user(Utc::now());
        let trainee = Trainee {
            id: Uuid::new_v4(),
            user,
            date_of_birth: trainee.date_of_birth,
            address: trainee.address,
        };

        let mut tx = self.db.begin().await?;

        sqlx::query(
            "INSERT INTO users (id, first_name, last_name, username, password_hash, is_active, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7)",
        )
        .bind(trainee.user.id)
        .bind(&trainee.user.first_name)
        .bind(&trainee.user.last_name)
        .bind(&trainee.user.username)
        .bind(&trainee.user.password_hash)
        .bind(trainee.user.is_active)
        .bind(trainee.user.created_at)
        .execute(&mut *tx)
        .await
        .map_err(AppError::from_db)?;

        sqlx::query(
            "INSERT INTO trainees (id, user_id, date_of_birth, address) VALUES ($1, $2, $3, $4)",
        )
        .bind(trainee.id)
        .bind(trainee.user.id)
        .bind(trainee.date_of_birth)
        .bind(&trainee.address)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(trainee)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Trainee>, AppError> {
        let row = sqlx::query_as::<_, TraineeRow>(&format!("{} WHERE u.username = $1", trainee_select()))
            .bind(username)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.map(Trainee::from))
    }

    async fn find_all(&self) -> Result<Vec<Trainee>, AppError> {
        let rows = sqlx::query_as::<_, TraineeRow>(&format!("{} ORDER BY u.username", trainee_select()))
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Trainee::from).collect())
    }

    async fn update(&self, trainee: &Trainee) -> Result<Trainee, AppError> {
        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        sqlx::query(
            "UPDATE users SET first_name = $2, last_name = $3, is_active = $4, updated_at = $5 WHERE id = $1",
        )
        .bind(trainee.user.id)
        .bind(&trainee.user.first_name)
        .bind(&trainee.user.last_name)
        .bind(trainee.user.is_active)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE trainees SET date_of_birth = $2, address = $3 WHERE id = $1")
            .bind(trainee.id)
            .bind(trainee.date_of_birth)
            .bind(&trainee.address)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let mut updated = trainee.clone();
        updated.user.updated_at = now;
        Ok(updated)
    }

    async fn delete_by_username(&self, username: &str) -> Result<bool, AppError> {
        // Trainee rows, links and trainings cascade from the user row
        let result = sqlx::query(
            "DELETE FROM users u USING trainees t WHERE t.user_id = u.id AND u.username = $1",
        )
        .bind(username)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_trainers(&self, trainee_id: Uuid) -> Result<Vec<Trainer>, AppError> {
        let rows = sqlx::query_as::<_, TrainerRow>(&format!(
            "{} JOIN trainee_trainers link ON link.trainer_id = tr.id \
             WHERE link.trainee_id = $1 ORDER BY u.username",
            trainer_select()
        ))
        .bind(trainee_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Trainer::try_from).collect()
    }

    async fn add_trainers(&self, trainee_id: Uuid, trainer_ids: &[Uuid]) -> Result<(), AppError> {
        if trainer_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            "INSERT INTO trainee_trainers (trainee_id, trainer_id)
             SELECT $1, UNNEST($2::uuid[])
             ON CONFLICT DO NOTHING",
        )
        .bind(trainee_id)
        .bind(trainer_ids)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}
