use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ModelError {
    /// Unique-index violations become `Conflict(message)`, everything else `Db`.
    pub fn from_db(err: DbErr, conflict_message: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => ModelError::Conflict(conflict_message.to_string()),
            _ => ModelError::Db(err.to_string()),
        }
    }
}

impl From<DbErr> for ModelError {
    fn from(err: DbErr) -> Self {
        ModelError::Db(err.to_string())
    }
}
