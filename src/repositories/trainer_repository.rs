use async_trait::async_trait;
use chrono::Utc;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::trainee_repository::{trainee_select, TraineeRow};
use super::user_repository::{UserColumns, USER_COLUMNS};
use crate::errors::AppError;
use crate::models::{NewTrainer, Trainee, Trainer, TrainingType};

#[async_trait]
pub trait TrainerRepository: Send + Sync {
    /// Inserts the user account and the trainer profile together
    async fn create(&self, trainer: NewTrainer) -> Result<Trainer, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Trainer>, AppError>;

    async fn find_by_usernames(&self, usernames: &[String]) -> Result<Vec<Trainer>, AppError>;

    async fn find_all(&self) -> Result<Vec<Trainer>, AppError>;

    /// Persists the specialization and the linked user's names and activation flag
    async fn update(&self, trainer: &Trainer) -> Result<Trainer, AppError>;

    /// Removes the trainer, their user account, trainings and trainee links
    async fn delete_by_username(&self, username: &str) -> Result<bool, AppError>;

    async fn find_trainees(&self, trainer_id: Uuid) -> Result<Vec<Trainee>, AppError>;

    /// Active trainers with no link to the given trainee
    async fn find_not_assigned(&self, trainee_id: Uuid) -> Result<Vec<Trainer>, AppError>;
}

pub(crate) fn trainer_select() -> String {
    format!(
        "SELECT tr.id, tt.id AS specialization_id, tt.name AS specialization_name, {USER_COLUMNS} \
         FROM trainers tr \
         JOIN users u ON u.id = tr.user_id \
         JOIN training_types tt ON tt.id = tr.specialization_id"
    )
}

#[derive(Debug, FromRow)]
pub(crate) struct TrainerRow {
    pub id: Uuid,
    pub specialization_id: i32,
    pub specialization_name: String,
    #[sqlx(flatten)]
    pub user: UserColumns,
}

impl TryFrom<TrainerRow> for Trainer {
    type Error = AppError;

    fn try_from(row: TrainerRow) -> Result<Self, Self::Error> {
        let training_type_name = row
            .specialization_name
            .parse()
            .map_err(|e| AppError::Internal(anyhow::Error::new(e)))?;

        Ok(Trainer {
            id: row.id,
            user: row.user.into(),
            specialization: TrainingType {
                id: row.specialization_id,
                training_type_name,
            },
        })
    }
}

#[derive(Clone)]
pub struct PgTrainerRepository {
    db: PgPool,
}

impl PgTrainerRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn fetch_trainers(&self, sql: &str, bind: Option<Uuid>) -> Result<Vec<Trainer>, AppError> {
        let mut query = sqlx::query_as::<_, TrainerRow>(sql);
        if let Some(id) = bind {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.db).await?;

        rows.into_iter().map(Trainer::try_from).collect()
    }
}

#[async_trait]
impl TrainerRepository for PgTrainerRepository {
    async fn create(&self, trainer: NewTrainer) -> Result<Trainer, AppError> {
        let trainer = Trainer {
            id: Uuid::new_v4(),
            user: trainer.user.into_user(Utc::now()),
            specialization: trainer.specialization,
        };

        let mut tx = self.db.begin().await?;

        sqlx::query(
            "INSERT INTO users (id, first_name, last_name, username, password_hash, is_active, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7)",
        )
        .bind(trainer.user.id)
        .bind(&trainer.user.first_name)
        .bind(&trainer.user.last_name)
        .bind(&trainer.user.username)
        .bind(&trainer.user.password_hash)
        .bind(trainer.user.is_active)
        .bind(trainer.user.created_at)
        .execute(&mut *tx)
        .await
        .map_err(AppError::from_db)?;

        sqlx::query("INSERT INTO trainers (id, user_id, specialization_id) VALUES ($1, $2, $3)")
            .bind(trainer.id)
            .bind(trainer.user.id)
            .bind(trainer.specialization.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(trainer)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Trainer>, AppError> {
        let row = sqlx::query_as::<_, TrainerRow>(&format!("{} WHERE u.username = $1", trainer_select()))
            .bind(username)
            .fetch_optional(&self.db)
            .await?;

        row.map(Trainer::try_from).transpose()
    }

    async fn find_by_usernames(&self, usernames: &[String]) -> Result<Vec<Trainer>, AppError> {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, TrainerRow>(&format!(
            "{} WHERE u.username = ANY($1) ORDER BY u.username",
            trainer_select()
        ))
        .bind(usernames)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Trainer::try_from).collect()
    }

    async fn find_all(&self) -> Result<Vec<Trainer>, AppError> {
        self.fetch_trainers(&format!("{} ORDER BY u.username", trainer_select()), None)
            .await
    }

    async fn update(&self, trainer: &Trainer) -> Result<Trainer, AppError> {
        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        sqlx::query(
            "UPDATE users SET first_name = $2, last_name = $3, is_active = $4, updated_at = $5 WHERE id = $1",
        )
        .bind(trainer.user.id)
        .bind(&trainer.user.first_name)
        .bind(&trainer.user.last_name)
        .bind(trainer.user.is_active)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE trainers SET specialization_id = $2 WHERE id = $1")
            .bind(trainer.id)
            .bind(trainer.specialization.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let mut updated = trainer.clone();
        updated.user.updated_at = now;
        Ok(updated)
    }

    async fn delete_by_username(&self, username: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM users u USING trainers tr WHERE tr.user_id = u.id AND u.username = $1",
        )
        .bind(username)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_trainees(&self, trainer_id: Uuid) -> Result<Vec<Trainee>, AppError> {
        let rows = sqlx::query_as::<_, TraineeRow>(&format!(
            "{} JOIN trainee_trainers link ON link.trainee_id = t.id \
             WHERE link.trainer_id = $1 ORDER BY u.username",
            trainee_select()
        ))
        .bind(trainer_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Trainee::from).collect())
    }

    async fn find_not_assigned(&self, trainee_id: Uuid) -> Result<Vec<Trainer>, AppError> {
        let sql = format!(
            "{} WHERE u.is_active \
             AND NOT EXISTS (SELECT 1 FROM trainee_trainers link \
                             WHERE link.trainer_id = tr.id AND link.trainee_id = $1) \
             ORDER BY u.username",
            trainer_select()
        );

        self.fetch_trainers(&sql, Some(trainee_id)).await
    }
}
