use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::validation::ValidationError;

/// Failure reported by a [`CrudRepository`](crate::CrudRepository).
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated.
    #[error("duplicate entry: {0}")]
    Duplicate(String),

    #[error(transparent)]
    Database(DbErr),

    #[error("{0}")]
    Other(String),
}

impl StoreError {
    /// Classifies a database error.
    ///
    /// Unique-constraint violations become [`StoreError::Duplicate`]. Drivers
    /// that sea-orm cannot classify are matched on their message instead.
    #[must_use]
    pub fn from_db_err(err: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            return Self::Duplicate(detail);
        }
        let message = err.to_string();
        if is_duplicate_message(&message) {
            return Self::Duplicate(message);
        }
        Self::Database(err)
    }

    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        Self::from_db_err(err)
    }
}

fn is_duplicate_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("duplicate") || lower.contains("unique")
}

/// Errors produced by [`CrudService`](crate::CrudService) and the HTTP layer.
///
/// Only [`CrudError::NotFound`], [`CrudError::AlreadyExists`],
/// [`CrudError::InvalidInput`] and [`CrudError::Validation`] carry messages
/// meant for clients. The rest are reported as opaque internal errors.
#[derive(Debug, Error)]
pub enum CrudError {
    #[error("{type_name} with id {id} is not found.")]
    NotFound { type_name: String, id: String },

    #[error("{type_name} with {data} already exists.")]
    AlreadyExists { type_name: String, data: String },

    /// A conditional update matched no row although the entity had just been read.
    #[error("Cannot update {type_name} {id}, entity version wasn't {expected_version}!")]
    ConcurrencyInvariantViolation {
        type_name: String,
        id: String,
        expected_version: i32,
    },

    #[error("{0}")]
    InvalidInput(String),

    #[error("Validation failed: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))]
    Validation(Vec<ValidationError>),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CrudError {
    pub fn not_found(type_name: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            type_name: type_name.into(),
            id: id.to_string(),
        }
    }

    pub fn already_exists(type_name: impl Into<String>, data: &impl std::fmt::Debug) -> Self {
        Self::AlreadyExists {
            type_name: type_name.into(),
            data: format!("{data:?}"),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Whether this error is an expected outcome a client can act on.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::AlreadyExists { .. }
                | Self::InvalidInput(_)
                | Self::Validation(_)
        )
    }
}

impl From<DbErr> for CrudError {
    fn from(err: DbErr) -> Self {
        Self::Store(StoreError::from_db_err(err))
    }
}
