use study_core::model::{SessionId, StudySession, UserId};

use super::SqliteRepository;
use super::mapping::{conn_err, map_session_row, write_err};
use crate::repository::{SessionReader, SessionRepository, StorageError};

const SESSION_COLUMNS: &str = r"
    id, user_id, provider, exam,
    total_questions, answered_questions, correct_answers,
    started_at, completed_at
";

#[async_trait::async_trait]
impl SessionReader for SqliteRepository {
    async fn list_user_sessions(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<StudySession>, StorageError> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM study_sessions WHERE user_id = ?1 \
             ORDER BY started_at DESC, rowid DESC LIMIT ?2"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.as_str())
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(conn_err)?;

        rows.iter().map(map_session_row).collect()
    }
}

#[async_trait::async_trait]
impl SessionRepository for SqliteRepository {
    async fn insert_session(&self, session: &StudySession) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO study_sessions (
                    id, user_id, provider, exam,
                    total_questions, answered_questions, correct_answers,
                    started_at, completed_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ",
        )
        .bind(session.id().to_string())
        .bind(session.user_id().as_str())
        .bind(session.scope().provider())
        .bind(session.scope().exam())
        .bind(i64::from(session.total_questions()))
        .bind(i64::from(session.answered_questions()))
        .bind(i64::from(session.correct_answers()))
        .bind(session.started_at())
        .bind(session.completed_at())
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        Ok(())
    }

    async fn get_session(
        &self,
        id: SessionId,
        user_id: &UserId,
    ) -> Result<Option<StudySession>, StorageError> {
        let sql =
            format!("SELECT {SESSION_COLUMNS} FROM study_sessions WHERE id = ?1 AND user_id = ?2");
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .bind(user_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn_err)?;

        row.as_ref().map(map_session_row).transpose()
    }

    async fn update_session(&self, session: &StudySession) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
                UPDATE study_sessions SET
                    answered_questions = ?3,
                    correct_answers = ?4,
                    completed_at = ?5
                WHERE id = ?1 AND user_id = ?2
            ",
        )
        .bind(session.id().to_string())
        .bind(session.user_id().as_str())
        .bind(i64::from(session.answered_questions()))
        .bind(i64::from(session.correct_answers()))
        .bind(session.completed_at())
        .execute(&self.pool)
        .await
        .map_err(conn_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
