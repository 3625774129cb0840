use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{NewTraining, Training, TrainingFilter, TrainingType, TrainingTypeName};

#[async_trait]
pub trait TrainingRepository: Send + Sync {
    /// Stores the training and links its trainee and trainer
    async fn create(&self, training: NewTraining) -> Result<Training, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Training>, AppError>;

    async fn find_all(&self) -> Result<Vec<Training>, AppError>;

    /// Persists date and duration
    async fn update(&self, training: &Training) -> Result<Training, AppError>;

    /// Removes the training, and the trainee/trainer link once no training
    /// between the pair remains
    async fn delete(&self, training: &Training) -> Result<bool, AppError>;

    async fn find_trainee_trainings(
        &self,
        trainee_username: &str,
        filter: &TrainingFilter,
    ) -> Result<Vec<Training>, AppError>;

    async fn find_trainer_trainings(
        &self,
        trainer_username: &str,
        filter: &TrainingFilter,
    ) -> Result<Vec<Training>, AppError>;

    async fn find_training_type(&self, name: TrainingTypeName) -> Result<Option<TrainingType>, AppError>;

    async fn find_all_training_types(&self) -> Result<Vec<TrainingType>, AppError>;
}

const TRAINING_SELECT: &str = "SELECT tg.id, tg.trainee_id, tg.trainer_id, \
     ue.username AS trainee_username, ur.username AS trainer_username, \
     tg.training_name, tt.name AS training_type_name, tg.training_date, tg.training_duration \
     FROM trainings tg \
     JOIN trainees te ON te.id = tg.trainee_id \
     JOIN users ue ON ue.id = te.user_id \
     JOIN trainers tr ON tr.id = tg.trainer_id \
     JOIN users ur ON ur.id = tr.user_id \
     JOIN training_types tt ON tt.id = tg.training_type_id";

const TRAINING_ORDER: &str = " ORDER BY tg.training_date, tg.created_at";

#[derive(Debug, FromRow)]
struct TrainingRow {
    id: Uuid,
    trainee_id: Uuid,
    trainer_id: Uuid,
    trainee_username: String,
    trainer_username: String,
    training_name: String,
    training_type_name: String,
    training_date: NaiveDate,
    training_duration: i32,
}

impl TryFrom<TrainingRow> for Training {
    type Error = AppError;

    fn try_from(row: TrainingRow) -> Result<Self, Self::Error> {
        let training_type = parse_type_name(&row.training_type_name)?;

        Ok(Training {
            id: row.id,
            trainee_id: row.trainee_id,
            trainer_id: row.trainer_id,
            trainee_username: row.trainee_username,
            trainer_username: row.trainer_username,
            training_name: row.training_name,
            training_type,
            training_date: row.training_date,
            training_duration: row.training_duration,
        })
    }
}

#[derive(Debug, FromRow)]
struct TrainingTypeRow {
    id: i32,
    name: String,
}

impl TryFrom<TrainingTypeRow> for TrainingType {
    type Error = AppError;

    fn try_from(row: TrainingTypeRow) -> Result<Self, Self::Error> {
        Ok(TrainingType {
            id: row.id,
            training_type_name: parse_type_name(&row.name)?,
        })
    }
}

fn parse_type_name(name: &str) -> Result<TrainingTypeName, AppError> {
    name.parse()
        .map_err(|e| AppError::Internal(anyhow::Error::new(e)))
}

/// Appends the optional filter criteria; `counterpart_column` is the
/// username column of the other party
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &TrainingFilter, counterpart_column: &str) {
    if let Some(from) = filter.period_from {
        builder.push(" AND tg.training_date >= ").push_bind(from);
    }
    if let Some(to) = filter.period_to {
        builder.push(" AND tg.training_date <= ").push_bind(to);
    }
    if let Some(name) = &filter.counterpart_username {
        builder
            .push(format!(" AND {counterpart_column} = "))
            .push_bind(name.clone());
    }
    if let Some(training_type) = filter.training_type {
        builder.push(" AND tt.name = ").push_bind(training_type.as_str());
    }
}

#[derive(Clone)]
pub struct PgTrainingRepository {
    db: PgPool,
}

impl PgTrainingRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn find_filtered(
        &self,
        owner_column: &str,
        owner_username: &str,
        counterpart_column: &str,
        filter: &TrainingFilter,
    ) -> Result<Vec<Training>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(TRAINING_SELECT);
        builder
            .push(format!(" WHERE {owner_column} = "))
            .push_bind(owner_username.to_string());
        push_filter(&mut builder, filter, counterpart_column);
        builder.push(TRAINING_ORDER);

        let rows = builder
            .build_query_as::<TrainingRow>()
            .fetch_all(&self.db)
            .await?;

        rows.into_iter().map(Training::try_from).collect()
    }
}

#[async_trait]
impl TrainingRepository for PgTrainingRepository {
    async fn create(&self, training: NewTraining) -> Result<Training, AppError> {
        let id = Uuid::new_v4();
        let mut tx = self.db.begin().await?;

        sqlx::query(
            "INSERT INTO trainings (id, trainee_id, trainer_id, training_name, training_type_id, training_date, training_duration)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(id)
        .bind(training.trainee_id)
        .bind(training.trainer_id)
        .bind(&training.training_name)
        .bind(training.training_type.id)
        .bind(training.training_date)
        .bind(training.training_duration)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO trainee_trainers (trainee_id, trainer_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(training.trainee_id)
        .bind(training.trainer_id)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, TrainingRow>(&format!("{TRAINING_SELECT} WHERE tg.id = $1"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Training::try_from(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Training>, AppError> {
        let row = sqlx::query_as::<_, TrainingRow>(&format!("{TRAINING_SELECT} WHERE tg.id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        row.map(Training::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Training>, AppError> {
        let rows = sqlx::query_as::<_, TrainingRow>(&format!("{TRAINING_SELECT}{TRAINING_ORDER}"))
            .fetch_all(&self.db)
            .await?;

        rows.into_iter().map(Training::try_from).collect()
    }

    async fn update(&self, training: &Training) -> Result<Training, AppError> {
        sqlx::query("UPDATE trainings SET training_date = $2, training_duration = $3 WHERE id = $1")
            .bind(training.id)
            .bind(training.training_date)
            .bind(training.training_duration)
            .execute(&self.db)
            .await?;

        Ok(training.clone())
    }

    async fn delete(&self, training: &Training) -> Result<bool, AppError> {
        let mut tx = self.db.begin().await?;

        let result = sqlx::query("DELETE FROM trainings WHERE id = $1")
            .bind(training.id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            "DELETE FROM trainee_trainers
             WHERE trainee_id = $1 AND trainer_id = $2
               AND NOT EXISTS (SELECT 1 FROM trainings WHERE trainee_id = $1 AND trainer_id = $2)",
        )
        .bind(training.trainee_id)
        .bind(training.trainer_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(true)
    }

    async fn find_trainee_trainings(
        &self,
        trainee_username: &str,
        filter: &TrainingFilter,
    ) -> Result<Vec<Training>, AppError> {
        self.find_filtered("ue.username", trainee_username, "ur.username", filter)
            .await
    }

    async fn find_trainer_trainings(
        &self,
        trainer_username: &str,
        filter: &TrainingFilter,
    ) -> Result<Vec<Training>, AppError> {
        self.find_filtered("ur.username", trainer_username, "ue.username", filter)
            .await
    }

    async fn find_training_type(&self, name: TrainingTypeName) -> Result<Option<TrainingType>, AppError> {
        let row = sqlx::query_as::<_, TrainingTypeRow>("SELECT id, name FROM training_types WHERE name = $1")
            .bind(name.as_str())
            .fetch_optional(&self.db)
            .await?;

        row.map(TrainingType::try_from).transpose()
    }

    async fn find_all_training_types(&self) -> Result<Vec<TrainingType>, AppError> {
        let rows = sqlx::query_as::<_, TrainingTypeRow>("SELECT id, name FROM training_types ORDER BY id")
            .fetch_all(&self.db)
            .await?;

        rows.into_iter().map(TrainingType::try_from).collect()
    }
}
