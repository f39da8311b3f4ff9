use study_core::model::{ExamScope, Goal, GoalId, UserId};

use super::SqliteRepository;
use super::mapping::{conn_err, map_goal_row, write_err};
use crate::repository::{GoalRepository, StorageError};

const GOAL_COLUMNS: &str = r"
    id, user_id, title, description, provider, exam,
    target_score, current_score, target_date, is_completed,
    created_at, updated_at
";

#[async_trait::async_trait]
impl GoalRepository for SqliteRepository {
    async fn create_goal(&self, goal: &Goal) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO goals (
                    id, user_id, title, description, provider, exam,
                    target_score, current_score, target_date, is_completed,
                    created_at, updated_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ",
        )
        .bind(goal.id().to_string())
        .bind(goal.user_id().as_str())
        .bind(goal.title())
        .bind(goal.description())
        .bind(goal.scope().provider())
        .bind(goal.scope().exam())
        .bind(i64::from(goal.target_score()))
        .bind(i64::from(goal.current_score()))
        .bind(goal.target_date())
        .bind(goal.is_completed())
        .bind(goal.created_at())
        .bind(goal.updated_at())
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        Ok(())
    }

    async fn list_goals_by_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<Goal>, StorageError> {
        let sql = format!(
            "SELECT {GOAL_COLUMNS} FROM goals WHERE user_id = ?1 \
             ORDER BY created_at DESC, rowid DESC LIMIT ?2"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.as_str())
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(conn_err)?;

        rows.iter().map(map_goal_row).collect()
    }

    async fn list_open_goals_in_scope(
        &self,
        user_id: &UserId,
        scope: &ExamScope,
    ) -> Result<Vec<Goal>, StorageError> {
        let sql = format!(
            "SELECT {GOAL_COLUMNS} FROM goals \
             WHERE user_id = ?1 AND provider = ?2 AND exam = ?3 AND is_completed = 0 \
             ORDER BY created_at DESC, rowid DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.as_str())
            .bind(scope.provider())
            .bind(scope.exam())
            .fetch_all(&self.pool)
            .await
            .map_err(conn_err)?;

        rows.iter().map(map_goal_row).collect()
    }

    async fn find_goal(&self, id: GoalId, user_id: &UserId) -> Result<Option<Goal>, StorageError> {
        let sql = format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = ?1 AND user_id = ?2");
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .bind(user_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn_err)?;

        row.as_ref().map(map_goal_row).transpose()
    }

    async fn update_goal(&self, goal: &Goal) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
                UPDATE goals SET
                    title = ?3,
                    description = ?4,
                    provider = ?5,
                    exam = ?6,
                    target_score = ?7,
                    current_score = ?8,
                    target_date = ?9,
                    is_completed = ?10,
                    updated_at = ?11
                WHERE id = ?1 AND user_id = ?2
            ",
        )
        .bind(goal.id().to_string())
        .bind(goal.user_id().as_str())
        .bind(goal.title())
        .bind(goal.description())
        .bind(goal.scope().provider())
        .bind(goal.scope().exam())
        .bind(i64::from(goal.target_score()))
        .bind(i64::from(goal.current_score()))
        .bind(goal.target_date())
        .bind(goal.is_completed())
        .bind(goal.updated_at())
        .execute(&self.pool)
        .await
        .map_err(conn_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn delete_goal(&self, id: GoalId, user_id: &UserId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM goals WHERE id = ?1 AND user_id = ?2")
            .bind(id.to_string())
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(conn_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
