//! Validation of incoming DTOs.
//!
//! Implement [`Validatable`] on create/update DTOs. The router runs
//! `validate` before handing the DTO to the mapper and answers
//! `422 Unprocessable Entity` when it fails.
//!
//! ```rust,ignore
//! use crudlayer::validation::{Validatable, ValidationError, validators};
//!
//! impl Validatable for CreateFooDto {
//!     fn validate(&self) -> Result<(), Vec<ValidationError>> {
//!         validators::collect([
//!             validators::validate_required("foo", &self.foo),
//!             validators::validate_range("bar", self.bar, Some(0), None),
//!         ])
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// A single failed field check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Types that can check themselves before being mapped.
///
/// The default implementation accepts everything, so DTOs without rules
/// only need an empty `impl Validatable for MyDto {}`.
pub trait Validatable {
    /// # Errors
    ///
    /// Returns every failed check.
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Ok(())
    }
}

/// Helper validators for common patterns
pub mod validators {
    use super::ValidationError;
    use std::fmt;

    /// Turns individual check results into a single outcome.
    ///
    /// # Errors
    ///
    /// Returns all errors when at least one check failed.
    pub fn collect(
        checks: impl IntoIterator<Item = Result<(), ValidationError>>,
    ) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<ValidationError> = checks.into_iter().filter_map(Result::err).collect();
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// # Errors
    ///
    /// Fails when the character count is outside `min..=max`.
    pub fn validate_length(
        field: &str,
        value: &str,
        min: Option<usize>,
        max: Option<usize>,
    ) -> Result<(), ValidationError> {
        let len = value.chars().count();

        if let Some(min_len) = min.filter(|m| len < *m) {
            return Err(ValidationError::new(
                field,
                format!("Must be at least {min_len} characters"),
            ));
        }

        if let Some(max_len) = max.filter(|m| len > *m) {
            return Err(ValidationError::new(
                field,
                format!("Must be at most {max_len} characters"),
            ));
        }

        Ok(())
    }

    /// # Errors
    ///
    /// Fails when `value` is outside `min..=max`.
    pub fn validate_range<T: PartialOrd + fmt::Display>(
        field: &str,
        value: T,
        min: Option<T>,
        max: Option<T>,
    ) -> Result<(), ValidationError> {
        if let Some(min_val) = min.filter(|m| value < *m) {
            return Err(ValidationError::new(field, format!("Must be at least {min_val}")));
        }

        if let Some(max_val) = max.filter(|m| value > *m) {
            return Err(ValidationError::new(field, format!("Must be at most {max_val}")));
        }

        Ok(())
    }

    /// # Errors
    ///
    /// Fails on empty or whitespace-only values.
    pub fn validate_required(field: &str, value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new(field, "This field is required"));
        }
        Ok(())
    }
}
