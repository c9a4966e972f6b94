use platform_api::ApiError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::validation::NAME_TAKEN;

pub type EmployeeResult<T> = Result<T, EmployeeError>;

#[derive(Debug, Error)]
pub enum EmployeeError {
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("employee {0} not found")]
    NotFound(i64),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl EmployeeError {
    /// The unique index on `(company_id, name)` can still fire when two saves
    /// race past the validation lookup; report it like the lookup would.
    pub(crate) fn from_write(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                EmployeeError::Validation(vec![NAME_TAKEN.to_string()])
            }
            _ => EmployeeError::Database(err),
        }
    }
}

impl From<EmployeeError> for ApiError {
    fn from(value: EmployeeError) -> Self {
        match value {
            EmployeeError::Validation(errors) => ApiError::Validation(errors),
            EmployeeError::NotFound(_) => ApiError::not_found("Employee"),
            EmployeeError::Database(err) => ApiError::internal(anyhow::Error::new(err)),
        }
    }
}
