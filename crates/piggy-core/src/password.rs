//! Password policy and strength scoring.
//!
//! Used by front-ends before register, reset, and change-password requests.
//! The remote API remains the authority; nothing here runs at login.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Local password requirements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_letter: bool,
    pub require_number: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_letter: true,
            require_number: true,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordPolicyViolation {
    #[error("Password must be at least {min_length} characters long")]
    TooShort { min_length: usize },

    #[error("Password must contain at least one letter")]
    MissingLetter,

    #[error("Password must contain at least one number")]
    MissingNumber,

    #[error("Passwords do not match")]
    ConfirmationMismatch,
}

impl PasswordPolicy {
    /// Checks `password` against the policy, reporting the first violation.
    pub fn validate(&self, password: &str) -> Result<(), PasswordPolicyViolation> {
        if password.chars().count() < self.min_length {
            return Err(PasswordPolicyViolation::TooShort {
                min_length: self.min_length,
            });
        }
        if self.require_letter && !password.chars().any(|c| c.is_ascii_alphabetic()) {
            return Err(PasswordPolicyViolation::MissingLetter);
        }
        if self.require_number && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(PasswordPolicyViolation::MissingNumber);
        }
        Ok(())
    }

    /// Validates `password` and checks that `confirmation` matches it.
    pub fn validate_with_confirmation(
        &self,
        password: &str,
        confirmation: &str,
    ) -> Result<(), PasswordPolicyViolation> {
        if password != confirmation {
            return Err(PasswordPolicyViolation::ConfirmationMismatch);
        }
        self.validate(password)
    }

    /// Scores `password` on a 0-5 scale.
    ///
    /// One point each for: meeting the minimum length, a lowercase letter, an
    /// uppercase letter, a digit, and any other character.
    pub fn strength(&self, password: &str) -> PasswordStrength {
        let checks = [
            password.chars().count() >= self.min_length,
            password.chars().any(|c| c.is_ascii_lowercase()),
            password.chars().any(|c| c.is_ascii_uppercase()),
            password.chars().any(|c| c.is_ascii_digit()),
            password.chars().any(|c| !c.is_ascii_alphanumeric()),
        ];
        let score = checks.iter().filter(|passed| **passed).count() as u8;
        PasswordStrength { score }
    }
}

/// Strength score of a password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PasswordStrength {
    pub score: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrengthLevel {
    Empty,
    Weak,
    Medium,
    Strong,
}

impl PasswordStrength {
    pub const MAX_SCORE: u8 = 5;

    pub fn level(&self) -> StrengthLevel {
        match self.score {
            0 => StrengthLevel::Empty,
            1..=2 => StrengthLevel::Weak,
            3 => StrengthLevel::Medium,
            _ => StrengthLevel::Strong,
        }
    }

    /// Score as a percentage of the maximum, for strength bars.
    pub fn percent(&self) -> u8 {
        self.score * 100 / Self::MAX_SCORE
    }
}

impl std::fmt::Display for StrengthLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            StrengthLevel::Empty => "empty",
            StrengthLevel::Weak => "weak",
            StrengthLevel::Medium => "medium",
            StrengthLevel::Strong => "strong",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_accepts_letters_and_numbers() {
        let policy = PasswordPolicy::default();
        assert_eq!(policy.validate("piggybank1"), Ok(()));
    }

    #[test]
    fn test_policy_violations() {
        let policy = PasswordPolicy::default();
        assert_eq!(
            policy.validate("abc1"),
            Err(PasswordPolicyViolation::TooShort { min_length: 8 })
        );
        assert_eq!(
            policy.validate("12345678"),
            Err(PasswordPolicyViolation::MissingLetter)
        );
        assert_eq!(
            policy.validate("abcdefgh"),
            Err(PasswordPolicyViolation::MissingNumber)
        );
    }

    #[test]
    fn test_confirmation_mismatch_is_reported_first() {
        let policy = PasswordPolicy::default();
        assert_eq!(
            policy.validate_with_confirmation("short", "other"),
            Err(PasswordPolicyViolation::ConfirmationMismatch)
        );
    }

    #[test]
    fn test_strength_levels() {
        let policy = PasswordPolicy::default();
        assert_eq!(policy.strength("").level(), StrengthLevel::Empty);
        assert_eq!(policy.strength("abc").level(), StrengthLevel::Weak);
        // length + lower + digit
        assert_eq!(policy.strength("abcdefg1").level(), StrengthLevel::Medium);
        let strongest = policy.strength("Abcdefg1!");
        assert_eq!(strongest.score, 5);
        assert_eq!(strongest.level(), StrengthLevel::Strong);
        assert_eq!(strongest.percent(), 100);
    }
}
