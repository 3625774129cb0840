use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{TraineeRepository, TrainerRepository, TrainingRepository, UserRepository};
use crate::errors::AppError;
use crate::models::{
    NewTrainee, NewTrainer, NewTraining, Trainee, Trainer, Training, TrainingFilter, TrainingType,
    TrainingTypeName, User,
};

#[derive(Debug, Clone)]
struct TraineeRecord {
    user_id: Uuid,
    date_of_birth: Option<chrono::NaiveDate>,
    address: Option<String>,
}

#[derive(Debug, Clone)]
struct TrainerRecord {
    user_id: Uuid,
    specialization: TrainingType,
}

#[derive(Debug)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    trainees: HashMap<Uuid, TraineeRecord>,
    trainers: HashMap<Uuid, TrainerRecord>,
    /// (trainee id, trainer id)
    links: BTreeSet<(Uuid, Uuid)>,
    trainings: Vec<Training>,
    training_types: Vec<TrainingType>,
}

impl MemoryState {
    fn new() -> Self {
        let training_types = TrainingTypeName::ALL
            .into_iter()
            .zip(1..)
            .map(|(training_type_name, id)| TrainingType { id, training_type_name })
            .collect();

        Self {
            users: HashMap::new(),
            trainees: HashMap::new(),
            trainers: HashMap::new(),
            links: BTreeSet::new(),
            trainings: Vec::new(),
            training_types,
        }
    }

    fn user_by_username(&self, username: &str) -> Option<&User> {
        self.users.values().find(|u| u.username == username)
    }

    fn user_by_username_mut(&mut self, username: &str) -> Option<&mut User> {
        self.users.values_mut().find(|u| u.username == username)
    }

    fn insert_user(&mut self, user: User) -> Result<(), AppError> {
        if self.user_by_username(&user.username).is_some() {
            return Err(AppError::Conflict(format!(
                "username '{}' is already taken",
                user.username
            )));
        }
        self.users.insert(user.id, user);
        Ok(())
    }

    fn trainee(&self, id: Uuid) -> Option<Trainee> {
        let record = self.trainees.get(&id)?;
        let user = self.users.get(&record.user_id)?;
        Some(Trainee {
            id,
            user: user.clone(),
            date_of_birth: record.date_of_birth,
            address: record.address.clone(),
        })
    }

    fn trainer(&self, id: Uuid) -> Option<Trainer> {
        let record = self.trainers.get(&id)?;
        let user = self.users.get(&record.user_id)?;
        Some(Trainer {
            id,
            user: user.clone(),
            specialization: record.specialization.clone(),
        })
    }

    fn trainee_id_by_username(&self, username: &str) -> Option<Uuid> {
        let user_id = self.user_by_username(username)?.id;
        self.trainees
            .iter()
            .find(|(_, record)| record.user_id == user_id)
            .map(|(id, _)| *id)
    }

    fn trainer_id_by_username(&self, username: &str) -> Option<Uuid> {
        let user_id = self.user_by_username(username)?.id;
        self.trainers
            .iter()
            .find(|(_, record)| record.user_id == user_id)
            .map(|(id, _)| *id)
    }

    fn all_trainees(&self) -> Vec<Trainee> {
        let mut trainees: Vec<Trainee> = self.trainees.keys().filter_map(|id| self.trainee(*id)).collect();
        trainees.sort_by(|a, b| a.user.username.cmp(&b.user.username));
        trainees
    }

    fn all_trainers(&self) -> Vec<Trainer> {
        let mut trainers: Vec<Trainer> = self.trainers.keys().filter_map(|id| self.trainer(*id)).collect();
        trainers.sort_by(|a, b| a.user.username.cmp(&b.user.username));
        trainers
    }

    fn update_user(&mut self, user: &User) -> Option<User> {
        let stored = self.users.get_mut(&user.id)?;
        stored.first_name = user.first_name.clone();
        stored.last_name = user.last_name.clone();
        stored.is_active = user.is_active;
        stored.updated_at = Utc::now();
        Some(stored.clone())
    }

    /// Training order is by date, then insertion
    fn sorted_trainings<'a>(&self, trainings: impl Iterator<Item = &'a Training>) -> Vec<Training> {
        let mut result: Vec<Training> = trainings.cloned().collect();
        result.sort_by_key(|t| t.training_date);
        result
    }
}

/// Process-local storage implementing every repository trait.
///
/// Clones share state, so one store can back all four repositories.
#[derive(Clone)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MemoryState::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let state = self.state.read().await;
        Ok(state.user_by_username(username).cloned())
    }

    async fn find_usernames_starting_with(&self, prefix: &str) -> Result<Vec<String>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .filter(|u| u.username.starts_with(prefix))
            .map(|u| u.username.clone())
            .collect())
    }

    async fn update_password(&self, username: &str, password_hash: &str) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        Ok(match state.user_by_username_mut(username) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn set_active(&self, username: &str, is_active: bool) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        Ok(match state.user_by_username_mut(username) {
            Some(user) => {
                user.is_active = is_active;
                user.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }
}

#[async_trait]
impl TraineeRepository for InMemoryStore {
    async fn create(&self, trainee: NewTrainee) -> Result<Trainee, AppError> {
        let mut state = self.state.write().await;

        let user = trainee.user.into_user(Utc::now());
        let user_id = user.id;
        state.insert_user(user)?;

        let id = Uuid::new_v4();
        state.trainees.insert(
            id,
            TraineeRecord {
                user_id,
                date_of_birth: trainee.date_of_birth,
                address: trainee.address,
            },
        );

        state
            .trainee(id)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("trainee {id} vanished after insert")))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Trainee>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .trainee_id_by_username(username)
            .and_then(|id| state.trainee(id)))
    }

    async fn find_all(&self) -> Result<Vec<Trainee>, AppError> {
        Ok(self.state.read().await.all_trainees())
    }

    async fn update(&self, trainee: &Trainee) -> Result<Trainee, AppError> {
        let mut state = self.state.write().await;

        let record = state
            .trainees
            .get_mut(&trainee.id)
            .ok_or_else(|| AppError::not_found("Trainee"))?;
        record.date_of_birth = trainee.date_of_birth;
        record.address = trainee.address.clone();

        let user = state
            .update_user(&trainee.user)
            .ok_or_else(|| AppError::not_found("User"))?;

        Ok(Trainee {
            user,
            ..trainee.clone()
        })
    }

    async fn delete_by_username(&self, username: &str) -> Result<bool, AppError> {
        let mut state = self.state.write().await;

        let Some(id) = state.trainee_id_by_username(username) else {
            return Ok(false);
        };
        if let Some(record) = state.trainees.remove(&id) {
            state.users.remove(&record.user_id);
        }
        state.links.retain(|(trainee_id, _)| *trainee_id != id);
        state.trainings.retain(|t| t.trainee_id != id);

        Ok(true)
    }

    async fn find_trainers(&self, trainee_id: Uuid) -> Result<Vec<Trainer>, AppError> {
        let state = self.state.read().await;
        let mut trainers: Vec<Trainer> = state
            .links
            .iter()
            .filter(|(linked_trainee, _)| *linked_trainee == trainee_id)
            .filter_map(|(_, trainer_id)| state.trainer(*trainer_id))
            .collect();
        trainers.sort_by(|a, b| a.user.username.cmp(&b.user.username));
        Ok(trainers)
    }

    async fn add_trainers(&self, trainee_id: Uuid, trainer_ids: &[Uuid]) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        for trainer_id in trainer_ids {
            if state.trainers.contains_key(trainer_id) {
                state.links.insert((trainee_id, *trainer_id));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TrainerRepository for InMemoryStore {
    async fn create(&self, trainer: NewTrainer) -> Result<Trainer, AppError> {
        let mut state = self.state.write().await;

        let user = trainer.user.into_user(Utc::now());
        let user_id = user.id;
        state.insert_user(user)?;

        let id = Uuid::new_v4();
        state.trainers.insert(
            id,
            TrainerRecord {
                user_id,
                specialization: trainer.specialization,
            },
        );

        state
            .trainer(id)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("trainer {id} vanished after insert")))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Trainer>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .trainer_id_by_username(username)
            .and_then(|id| state.trainer(id)))
    }

    async fn find_by_usernames(&self, usernames: &[String]) -> Result<Vec<Trainer>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .all_trainers()
            .into_iter()
            .filter(|t| usernames.contains(&t.user.username))
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<Trainer>, AppError> {
        Ok(self.state.read().await.all_trainers())
    }

    async fn update(&self, trainer: &Trainer) -> Result<Trainer, AppError> {
        let mut state = self.state.write().await;

        let record = state
            .trainers
            .get_mut(&trainer.id)
            .ok_or_else(|| AppError::not_found("Trainer"))?;
        record.specialization = trainer.specialization.clone();

        let user = state
            .update_user(&trainer.user)
            .ok_or_else(|| AppError::not_found("User"))?;

        Ok(Trainer {
            user,
            ..trainer.clone()
        })
    }

    async fn delete_by_username(&self, username: &str) -> Result<bool, AppError> {
        let mut state = self.state.write().await;

        let Some(id) = state.trainer_id_by_username(username) else {
            return Ok(false);
        };
        if let Some(record) = state.trainers.remove(&id) {
            state.users.remove(&record.user_id);
        }
        state.links.retain(|(_, trainer_id)| *trainer_id != id);
        state.trainings.retain(|t| t.trainer_id != id);

        Ok(true)
    }

    async fn find_trainees(&self, trainer_id: Uuid) -> Result<Vec<Trainee>, AppError> {
        let state = self.state.read().await;
        let mut trainees: Vec<Trainee> = state
            .links
            .iter()
            .filter(|(_, linked_trainer)| *linked_trainer == trainer_id)
            .filter_map(|(trainee_id, _)| state.trainee(*trainee_id))
            .collect();
        trainees.sort_by(|a, b| a.user.username.cmp(&b.user.username));
        Ok(trainees)
    }

    async fn find_not_assigned(&self, trainee_id: Uuid) -> Result<Vec<Trainer>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .all_trainers()
            .into_iter()
            .filter(|t| t.user.is_active && !state.links.contains(&(trainee_id, t.id)))
            .collect())
    }
}

#[async_trait]
impl TrainingRepository for InMemoryStore {
    async fn create(&self, training: NewTraining) -> Result<Training, AppError> {
        let mut state = self.state.write().await;

        let trainee = state
            .trainee(training.trainee_id)
            .ok_or_else(|| AppError::not_found("Trainee"))?;
        let trainer = state
            .trainer(training.trainer_id)
            .ok_or_else(|| AppError::not_found("Trainer"))?;

        let created = Training {
            id: Uuid::new_v4(),
            trainee_id: trainee.id,
            trainer_id: trainer.id,
            trainee_username: trainee.user.username,
            trainer_username: trainer.user.username,
            training_name: training.training_name,
            training_type: training.training_type.training_type_name,
            training_date: training.training_date,
            training_duration: training.training_duration,
        };

        state.links.insert((trainee.id, trainer.id));
        state.trainings.push(created.clone());

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Training>, AppError> {
        let state = self.state.read().await;
        Ok(state.trainings.iter().find(|t| t.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Training>, AppError> {
        let state = self.state.read().await;
        Ok(state.sorted_trainings(state.trainings.iter()))
    }

    async fn update(&self, training: &Training) -> Result<Training, AppError> {
        let mut state = self.state.write().await;

        let stored = state
            .trainings
            .iter_mut()
            .find(|t| t.id == training.id)
            .ok_or_else(|| AppError::not_found("Training"))?;
        stored.training_date = training.training_date;
        stored.training_duration = training.training_duration;

        Ok(stored.clone())
    }

    async fn delete(&self, training: &Training) -> Result<bool, AppError> {
        let mut state = self.state.write().await;

        let before = state.trainings.len();
        state.trainings.retain(|t| t.id != training.id);
        if state.trainings.len() == before {
            return Ok(false);
        }

        let pair_has_trainings = state
            .trainings
            .iter()
            .any(|t| t.trainee_id == training.trainee_id && t.trainer_id == training.trainer_id);
        if !pair_has_trainings {
            state.links.remove(&(training.trainee_id, training.trainer_id));
        }

        Ok(true)
    }

    async fn find_trainee_trainings(
        &self,
        trainee_username: &str,
        filter: &TrainingFilter,
    ) -> Result<Vec<Training>, AppError> {
        let state = self.state.read().await;
        Ok(state.sorted_trainings(state.trainings.iter().filter(|t| {
            t.trainee_username == trainee_username && filter.matches(t, &t.trainer_username)
        })))
    }

    async fn find_trainer_trainings(
        &self,
        trainer_username: &str,
        filter: &TrainingFilter,
    ) -> Result<Vec<Training>, AppError> {
        let state = self.state.read().await;
        Ok(state.sorted_trainings(state.trainings.iter().filter(|t| {
            t.trainer_username == trainer_username && filter.matches(t, &t.trainee_username)
        })))
    }

    async fn find_training_type(&self, name: TrainingTypeName) -> Result<Option<TrainingType>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .training_types
            .iter()
            .find(|t| t.training_type_name == name)
            .cloned())
    }

    async fn find_all_training_types(&self) -> Result<Vec<TrainingType>, AppError> {
        Ok(self.state.read().await.training_types.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    fn new_user(first: &str, last: &str) -> NewUser {
        NewUser {
            first_name: first.to_string(),
            last_name: last.to_string(),
            username: format!("{first}.{last}"),
            password_hash: "hash".to_string(),
        }
    }

    async fn seed(store: &InMemoryStore) -> (Trainee, Trainer) {
        let trainee = TraineeRepository::create(
            store,
            NewTrainee {
                user: new_user("Jane", "Roe"),
                date_of_birth: None,
                address: None,
            },
        )
        .await
        .unwrap();

        let specialization = store
            .find_training_type(TrainingTypeName::Yoga)
            .await
            .unwrap()
            .unwrap();
        let trainer = TrainerRepository::create(
            store,
            NewTrainer {
                user: new_user("Joe", "Johnson"),
                specialization,
            },
        )
        .await
        .unwrap();

        (trainee, trainer)
    }

    async fn add_training(store: &InMemoryStore, trainee: &Trainee, trainer: &Trainer, day: u32) -> Training {
        TrainingRepository::create(
            store,
            NewTraining {
                trainee_id: trainee.id,
                trainer_id: trainer.id,
                training_name: "YOGA".to_string(),
                training_type: trainer.specialization.clone(),
                training_date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
                training_duration: 45,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let store = InMemoryStore::new();
        seed(&store).await;

        let result = TraineeRepository::create(
            &store,
            NewTrainee {
                user: new_user("Jane", "Roe"),
                date_of_birth: None,
                address: None,
            },
        )
        .await;

        assert_matches!(result, Err(AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_training_links_pair_and_last_delete_unlinks() {
        let store = InMemoryStore::new();
        let (trainee, trainer) = seed(&store).await;

        let first = add_training(&store, &trainee, &trainer, 1).await;
        let second = add_training(&store, &trainee, &trainer, 2).await;
        assert_eq!(store.find_trainers(trainee.id).await.unwrap().len(), 1);

        assert!(TrainingRepository::delete(&store, &first).await.unwrap());
        assert_eq!(store.find_trainers(trainee.id).await.unwrap().len(), 1);

        assert!(TrainingRepository::delete(&store, &second).await.unwrap());
        assert!(store.find_trainers(trainee.id).await.unwrap().is_empty());
        assert!(!TrainingRepository::delete(&store, &second).await.unwrap());
    }

    #[tokio::test]
    async fn test_deleting_trainee_cascades() {
        let store = InMemoryStore::new();
        let (trainee, trainer) = seed(&store).await;
        add_training(&store, &trainee, &trainer, 1).await;

        assert!(TraineeRepository::delete_by_username(&store, "Jane.Roe").await.unwrap());

        assert!(UserRepository::find_by_username(&store, "Jane.Roe").await.unwrap().is_none());
        assert!(TrainingRepository::find_all(&store).await.unwrap().is_empty());
        assert!(store.find_trainees(trainer.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_not_assigned_skips_linked_and_inactive() {
        let store = InMemoryStore::new();
        let (trainee, trainer) = seed(&store).await;

        let specialization = store
            .find_training_type(TrainingTypeName::Zumba)
            .await
            .unwrap()
            .unwrap();
        TrainerRepository::create(
            &store,
            NewTrainer {
                user: new_user("Ann", "Lee"),
                specialization,
            },
        )
        .await
        .unwrap();

        let names: Vec<String> = store
            .find_not_assigned(trainee.id)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.user.username)
            .collect();
        assert_eq!(names, vec!["Ann.Lee", "Joe.Johnson"]);

        store.add_trainers(trainee.id, &[trainer.id]).await.unwrap();
        store.set_active("Ann.Lee", false).await.unwrap();
        assert!(store.find_not_assigned(trainee.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_trainee_trainings_sorted_and_filtered() {
        let store = InMemoryStore::new();
        let (trainee, trainer) = seed(&store).await;
        add_training(&store, &trainee, &trainer, 9).await;
        add_training(&store, &trainee, &trainer, 3).await;

        let all = store
            .find_trainee_trainings("Jane.Roe", &TrainingFilter::default())
            .await
            .unwrap();
        let days: Vec<NaiveDate> = all.iter().map(|t| t.training_date).collect();
        assert_eq!(
            days,
            vec![
                NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
                NaiveDate::from_ymd_opt(2024, 5, 9).unwrap()
            ]
        );

        let filter = TrainingFilter {
            period_from: NaiveDate::from_ymd_opt(2024, 5, 4),
            counterpart_username: Some("Joe.Johnson".to_string()),
            ..Default::default()
        };
        assert_eq!(store.find_trainee_trainings("Jane.Roe", &filter).await.unwrap().len(), 1);
        assert!(store
            .find_trainer_trainings("Joe.Johnson", &TrainingFilter {
                counterpart_username: Some("Someone.Else".to_string()),
                ..Default::default()
            })
            .await
            .unwrap()
            .is_empty());
    }
}
