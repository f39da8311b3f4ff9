use study_core::model::{ExamScope, Goal, GoalId, SessionId, StudySession, UserId};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Maps driver errors, turning primary-key collisions into `Conflict`.
pub(crate) fn write_err(e: sqlx::Error) -> StorageError {
    match e.as_database_error() {
        Some(db) if db.is_unique_violation() => StorageError::Conflict,
        _ => StorageError::Connection(e.to_string()),
    }
}

pub(crate) fn conn_err(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn u8_from_i64(field: &'static str, v: i64) -> Result<u8, StorageError> {
    u8::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn user_id_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<UserId, StorageError> {
    UserId::new(row.try_get::<String, _>("user_id").map_err(ser)?).map_err(ser)
}

fn scope_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<ExamScope, StorageError> {
    ExamScope::new(
        row.try_get::<String, _>("provider").map_err(ser)?,
        row.try_get::<String, _>("exam").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_goal_row(row: &sqlx::sqlite::SqliteRow) -> Result<Goal, StorageError> {
    let id: GoalId = row
        .try_get::<String, _>("id")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;

    Goal::from_persisted(
        id,
        user_id_from_row(row)?,
        row.try_get("title").map_err(ser)?,
        row.try_get("description").map_err(ser)?,
        scope_from_row(row)?,
        u8_from_i64(
            "target_score",
            row.try_get::<i64, _>("target_score").map_err(ser)?,
        )?,
        u8_from_i64(
            "current_score",
            row.try_get::<i64, _>("current_score").map_err(ser)?,
        )?,
        row.try_get("target_date").map_err(ser)?,
        row.try_get("is_completed").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
        row.try_get("updated_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_session_row(row: &sqlx::sqlite::SqliteRow) -> Result<StudySession, StorageError> {
    let id: SessionId = row
        .try_get::<String, _>("id")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;

    StudySession::from_persisted(
        id,
        user_id_from_row(row)?,
        scope_from_row(row)?,
        u32_from_i64(
            "total_questions",
            row.try_get::<i64, _>("total_questions").map_err(ser)?,
        )?,
        u32_from_i64(
            "answered_questions",
            row.try_get::<i64, _>("answered_questions").map_err(ser)?,
        )?,
        u32_from_i64(
            "correct_answers",
            row.try_get::<i64, _>("correct_answers").map_err(ser)?,
        )?,
        row.try_get("started_at").map_err(ser)?,
        row.try_get("completed_at").map_err(ser)?,
    )
    .map_err(ser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_scores_are_rejected() {
        assert!(u8_from_i64("target_score", 300).is_err());
        assert!(u8_from_i64("target_score", -1).is_err());
        assert_eq!(u8_from_i64("target_score", 80).unwrap(), 80);
    }
}
