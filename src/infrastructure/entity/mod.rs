pub mod conferences;
pub mod profiles;

use std::fmt::Display;

use sea_orm::{DbErr, SqlErr};

use crate::domain::error::RepositoryError;

/// Unique-key violations mean another transaction stored the row first
pub fn map_db_err(err: DbErr) -> RepositoryError {
    classify(err.sql_err(), err)
}

fn classify(sql_err: Option<SqlErr>, err: DbErr) -> RepositoryError {
    match sql_err {
        Some(SqlErr::UniqueConstraintViolation(_)) => RepositoryError::Conflict,
        _ => RepositoryError::DatabaseError(err.to_string()),
    }
}

pub(crate) fn corrupt(e: impl Display) -> RepositoryError {
    RepositoryError::DatabaseError(format!("corrupt row: {e}"))
}
