use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Utc};

use super::trainee::{CreateTrainee, UpdateTrainee};
use super::trainer::{CreateTrainer, UpdateTrainer};
use super::training::{CreateTraining, UpdateTraining};

const MAX_NAME_LENGTH: usize = 100;
const MAX_ADDRESS_LENGTH: usize = 255;
const MAX_TRAINING_DURATION: i32 = 24 * 60;

/// First/last name validation
pub fn validate_name(name: &str, field_name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("{} cannot be empty", field_name));
    }

    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(anyhow!(
            "{} cannot be longer than {} characters",
            field_name,
            MAX_NAME_LENGTH
        ));
    }

    // Names become part of the username, so keep them free of separators
    if !trimmed
        .chars()
        .all(|c| c.is_alphabetic() || c == '-' || c == '\'' || c == ' ')
    {
        return Err(anyhow!("{} contains invalid characters", field_name));
    }

    Ok(())
}

pub fn validate_username(username: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(anyhow!("Username cannot be empty"));
    }
    Ok(())
}

pub fn validate_date_of_birth(date_of_birth: NaiveDate) -> Result<()> {
    let today = Utc::now().date_naive();
    if date_of_birth > today {
        return Err(anyhow!("Date of birth cannot be in the future"));
    }

    let earliest = NaiveDate::from_ymd_opt(1900, 1, 1).ok_or_else(|| anyhow!("Invalid date"))?;
    if date_of_birth < earliest {
        return Err(anyhow!("Date of birth must be after 1900-01-01"));
    }

    Ok(())
}

pub fn validate_address(address: &str) -> Result<()> {
    if address.chars().count() > MAX_ADDRESS_LENGTH {
        return Err(anyhow!(
            "Address cannot be longer than {} characters",
            MAX_ADDRESS_LENGTH
        ));
    }
    Ok(())
}

/// Training duration in minutes
pub fn validate_training_duration(duration: i32) -> Result<()> {
    if duration < 1 || duration > MAX_TRAINING_DURATION {
        return Err(anyhow!(
            "Training duration must be between 1 and {} minutes",
            MAX_TRAINING_DURATION
        ));
    }
    Ok(())
}

pub fn validate_create_trainee(request: &CreateTrainee) -> Result<()> {
    validate_name(&request.first_name, "First name")?;
    validate_name(&request.last_name, "Last name")?;
    if let Some(date_of_birth) = request.date_of_birth {
        validate_date_of_birth(date_of_birth)?;
    }
    if let Some(address) = &request.address {
        validate_address(address)?;
    }
    Ok(())
}

pub fn validate_update_trainee(request: &UpdateTrainee) -> Result<()> {
    validate_username(&request.username)?;
    validate_name(&request.first_name, "First name")?;
    validate_name(&request.last_name, "Last name")?;
    if let Some(date_of_birth) = request.date_of_birth {
        validate_date_of_birth(date_of_birth)?;
    }
    if let Some(address) = &request.address {
        validate_address(address)?;
    }
    Ok(())
}

pub fn validate_create_trainer(request: &CreateTrainer) -> Result<()> {
    validate_name(&request.first_name, "First name")?;
    validate_name(&request.last_name, "Last name")
}

pub fn validate_update_trainer(request: &UpdateTrainer) -> Result<()> {
    validate_username(&request.username)?;
    validate_name(&request.first_name, "First name")?;
    validate_name(&request.last_name, "Last name")
}

pub fn validate_create_training(request: &CreateTraining) -> Result<()> {
    validate_username(&request.trainee_username)?;
    validate_username(&request.trainer_username)?;
    validate_training_duration(request.training_duration)
}

pub fn validate_update_training(request: &UpdateTraining) -> Result<()> {
    if request.training_date.is_none() && request.training_duration.is_none() {
        return Err(anyhow!("Nothing to update"));
    }
    if let Some(duration) = request.training_duration {
        validate_training_duration(duration)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_validation() {
        assert!(validate_name("John", "First name").is_ok());
        assert!(validate_name("Mary-Jane", "First name").is_ok());
        assert!(validate_name("O'Neil", "Last name").is_ok());
        assert!(validate_name("", "First name").is_err());
        assert!(validate_name("   ", "First name").is_err());
        assert!(validate_name("John.Doe", "First name").is_err());
        assert!(validate_name("J0hn", "First name").is_err());
        assert!(validate_name(&"a".repeat(101), "First name").is_err());
    }

    #[test]
    fn test_date_of_birth_validation() {
        assert!(validate_date_of_birth(NaiveDate::from_ymd_opt(1990, 5, 17).unwrap()).is_ok());
        assert!(validate_date_of_birth(NaiveDate::from_ymd_opt(1850, 1, 1).unwrap()).is_err());

        let tomorrow = Utc::now().date_naive() + chrono::Duration::days(1);
        assert!(validate_date_of_birth(tomorrow).is_err());
    }

    #[test]
    fn test_training_duration_validation() {
        assert!(validate_training_duration(30).is_ok());
        assert!(validate_training_duration(0).is_err());
        assert!(validate_training_duration(-5).is_err());
        assert!(validate_training_duration(24 * 60 + 1).is_err());
    }

    #[test]
    fn test_update_training_requires_a_field() {
        assert!(validate_update_training(&UpdateTraining::default()).is_err());
        assert!(validate_update_training(&UpdateTraining {
            training_date: None,
            training_duration: Some(45),
        })
        .is_ok());
    }
}
