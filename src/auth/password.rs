use bcrypt::{hash, verify, DEFAULT_COST};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password must be at least 8 characters long")]
    TooShort,
    #[error("Password must be no more than 128 characters long")]
    TooLong,
    #[error("Password must contain at least one letter")]
    NoLetter,
    #[error("Password must contain at least one number")]
    NoNumber,
    #[error("Failed to hash password")]
    HashingFailed,
    #[error("Failed to verify password")]
    VerificationFailed,
}

impl PasswordError {
    /// True when the password itself was rejected, as opposed to a bcrypt failure
    pub fn is_policy_violation(&self) -> bool {
        !matches!(
            self,
            PasswordError::HashingFailed | PasswordError::VerificationFailed
        )
    }
}

/// Password strength requirements
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
    pub require_letter: bool,
    pub require_number: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            require_letter: true,
            require_number: true,
        }
    }
}

/// Validate password strength according to policy
pub fn validate_password_strength(password: &str, policy: &PasswordPolicy) -> Result<(), PasswordError> {
    if password.len() < policy.min_length {
        return Err(PasswordError::TooShort);
    }

    if password.len() > policy.max_length {
        return Err(PasswordError::TooLong);
    }

    if policy.require_letter && !password.chars().any(|c| c.is_alphabetic()) {
        return Err(PasswordError::NoLetter);
    }

    if policy.require_number && !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordError::NoNumber);
    }

    Ok(())
}

/// bcrypt hashing with a configurable work factor
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
    policy: PasswordPolicy,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self {
            cost,
            policy: PasswordPolicy::default(),
        }
    }

    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    /// Hash a password after checking it against the policy
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        validate_password_strength(password, &self.policy)?;

        hash(password, self.cost).map_err(|_| PasswordError::HashingFailed)
    }

    /// Verify a password against its hash
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        verify(password, hash).map_err(|_| PasswordError::VerificationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_validation() {
        let policy = PasswordPolicy::default();

        assert_eq!(
            validate_password_strength("short1", &policy),
            Err(PasswordError::TooShort)
        );
        assert_eq!(
            validate_password_strength(&"a1".repeat(65), &policy),
            Err(PasswordError::TooLong)
        );
        assert_eq!(
            validate_password_strength("1234567890", &policy),
            Err(PasswordError::NoLetter)
        );
        assert_eq!(
            validate_password_strength("abcdefghij", &policy),
            Err(PasswordError::NoNumber)
        );
        assert!(validate_password_strength("abcde12345", &policy).is_ok());
    }

    #[test]
    fn test_password_hashing() {
        let hasher = PasswordHasher::new(4);
        let hash = hasher.hash_password("TestPassword123").unwrap();

        assert!(hasher.verify_password("TestPassword123", &hash).unwrap());
        assert!(!hasher.verify_password("WrongPassword1", &hash).unwrap());
    }

    #[test]
    fn test_weak_password_is_not_hashed() {
        let hasher = PasswordHasher::new(4);
        assert_eq!(hasher.hash_password("weak"), Err(PasswordError::TooShort));
    }

    #[test]
    fn test_policy_violation_classification() {
        assert!(PasswordError::NoNumber.is_policy_violation());
        assert!(!PasswordError::HashingFailed.is_policy_violation());
    }
}
