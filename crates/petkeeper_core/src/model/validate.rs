//! Input validation for the presentation boundary.
//!
//! # Responsibility
//! - Reject blank names and negative ages before they reach repositories.
//! - Normalize name whitespace so lookups by name see one canonical form.
//!
//! # Invariants
//! - Repositories trust their inputs; callers validate first.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Validation failure for pet or owner form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    BlankPetName,
    BlankOwnerName,
    NegativeAge(i64),
    /// Age does not fit the stored integer range.
    AgeOutOfRange(i64),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankPetName => write!(f, "Pet name cannot be empty"),
            Self::BlankOwnerName => write!(f, "Owner name cannot be empty"),
            Self::NegativeAge(age) => write!(f, "Age cannot be negative: {age}"),
            Self::AgeOutOfRange(age) => write!(f, "Age is out of range: {age}"),
        }
    }
}

impl Error for ValidationError {}

/// Validated pet form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetInput {
    pub name: String,
    pub age: u32,
}

/// Validates pet name and age as entered in a form.
pub fn validate_pet_input(name: &str, age: i64) -> Result<PetInput, ValidationError> {
    let name = normalize_name(name);
    if name.is_empty() {
        return Err(ValidationError::BlankPetName);
    }
    if age < 0 {
        return Err(ValidationError::NegativeAge(age));
    }
    let age = u32::try_from(age).map_err(|_| ValidationError::AgeOutOfRange(age))?;
    Ok(PetInput { name, age })
}

/// Validates an owner name and returns its normalized form.
pub fn validate_owner_name(name: &str) -> Result<String, ValidationError> {
    let name = normalize_name(name);
    if name.is_empty() {
        return Err(ValidationError::BlankOwnerName);
    }
    Ok(name)
}

/// Trims and collapses inner whitespace runs to one space.
pub fn normalize_name(value: &str) -> String {
    WHITESPACE_RE.replace_all(value.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::{normalize_name, validate_owner_name, validate_pet_input, ValidationError};

    #[test]
    fn pet_input_rejects_blank_name_and_negative_age() {
        assert_eq!(
            validate_pet_input("   ", 2),
            Err(ValidationError::BlankPetName)
        );
        assert_eq!(
            validate_pet_input("Rex", -1),
            Err(ValidationError::NegativeAge(-1))
        );
        assert_eq!(
            validate_pet_input("Rex", i64::from(u32::MAX) + 1),
            Err(ValidationError::AgeOutOfRange(i64::from(u32::MAX) + 1))
        );
    }

    #[test]
    fn pet_input_accepts_zero_age() {
        let input = validate_pet_input(" Rex ", 0).expect("zero age is valid");
        assert_eq!(input.name, "Rex");
        assert_eq!(input.age, 0);
    }

    #[test]
    fn owner_name_is_normalized() {
        assert_eq!(validate_owner_name("  Mary \t Ann ").unwrap(), "Mary Ann");
        assert!(validate_owner_name("\n").is_err());
        assert_eq!(normalize_name("a  b"), "a b");
    }
}
