use std::sync::Arc;

use serde::Serialize;
use storage::repository::{GoalRepository, StorageError};
use study_core::model::{ExamScope, Goal, GoalDraft, GoalId, GoalUpdate, UserId};
use study_core::progress::ProgressReport;
use tracing::{debug, info, warn};

use crate::Clock;
use crate::error::GoalServiceError;
use crate::scoring::ScoreCalculator;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_GOAL_LIMIT: u32 = 20;

/// A page of goals with counts over that page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalList {
    pub goals: Vec<Goal>,
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

impl GoalList {
    fn from_goals(goals: Vec<Goal>) -> Self {
        let completed = goals.iter().filter(|g| g.is_completed()).count();
        Self {
            total: goals.len(),
            active: goals.len() - completed,
            completed,
            goals,
        }
    }
}

/// Result of refreshing one goal during a progress fan-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum GoalRefreshStatus {
    Updated { completed: bool },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalRefreshOutcome {
    pub goal_id: GoalId,
    #[serde(flatten)]
    pub status: GoalRefreshStatus,
}

/// Per-goal report of a best-effort progress refresh.
///
/// Goals are written one by one with no transaction, so some may fail while
/// others succeed. Re-running the refresh is safe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRefresh {
    #[serde(flatten)]
    pub scope: ExamScope,
    pub current_score: u8,
    pub outcomes: Vec<GoalRefreshOutcome>,
}

impl ProgressRefresh {
    #[must_use]
    pub fn updated(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, GoalRefreshStatus::Updated { .. }))
            .count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.updated()
    }
}

/// Goal lifecycle plus progress evaluation.
#[derive(Clone)]
pub struct GoalService {
    clock: Clock,
    goals: Arc<dyn GoalRepository>,
    scores: ScoreCalculator,
}

impl GoalService {
    #[must_use]
    pub fn new(clock: Clock, goals: Arc<dyn GoalRepository>, scores: ScoreCalculator) -> Self {
        Self {
            clock,
            goals,
            scores,
        }
    }

    /// Validate and persist a new goal with a zero score.
    ///
    /// # Errors
    ///
    /// Returns `GoalServiceError::Goal` for validation failures.
    /// Returns `GoalServiceError::Storage` if persistence fails.
    pub async fn create_goal(
        &self,
        user_id: &UserId,
        draft: GoalDraft,
    ) -> Result<Goal, GoalServiceError> {
        let goal = Goal::new(GoalId::generate(), user_id.clone(), draft, self.clock.now())?;
        self.goals.create_goal(&goal).await?;
        debug!(goal_id = %goal.id(), user_id = %user_id, "goal created");
        Ok(goal)
    }

    /// List up to `limit` of the user's goals, newest first.
    ///
    /// # Errors
    ///
    /// Returns `GoalServiceError::InvalidLimit` for a zero limit.
    /// Returns `GoalServiceError::Storage` if repository access fails.
    pub async fn list_goals(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<GoalList, GoalServiceError> {
        if limit == 0 {
            return Err(GoalServiceError::InvalidLimit);
        }
        let goals = self.goals.list_goals_by_user(user_id, limit).await?;
        Ok(GoalList::from_goals(goals))
    }

    /// Fetch one goal owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `GoalServiceError::Storage` if repository access fails.
    pub async fn get_goal(
        &self,
        goal_id: GoalId,
        user_id: &UserId,
    ) -> Result<Option<Goal>, GoalServiceError> {
        Ok(self.goals.find_goal(goal_id, user_id).await?)
    }

    /// Build a progress report for one goal.
    ///
    /// Uses the stored score; session history only feeds the practice-count
    /// rule and degrades to empty if unavailable.
    ///
    /// # Errors
    ///
    /// Returns `GoalServiceError::Storage` if the goal cannot be read.
    pub async fn get_goal_progress(
        &self,
        goal_id: GoalId,
        user_id: &UserId,
    ) -> Result<Option<ProgressReport>, GoalServiceError> {
        let Some(goal) = self.goals.find_goal(goal_id, user_id).await? else {
            return Ok(None);
        };
        let stats = self.scores.exam_stats(user_id, goal.scope()).await;
        Ok(Some(ProgressReport::evaluate(
            &goal,
            &stats,
            self.clock.today(),
        )))
    }

    /// Merge `update` into a goal.
    ///
    /// Without an explicit `current_score` the score is recomputed for the
    /// goal's (possibly updated) scope. Returns `None` if the goal does not
    /// exist for this user, including when it vanishes before the write.
    ///
    /// # Errors
    ///
    /// Returns `GoalServiceError::Goal` for validation failures.
    /// Returns `GoalServiceError::Storage` if repository access fails.
    pub async fn update_goal(
        &self,
        goal_id: GoalId,
        user_id: &UserId,
        mut update: GoalUpdate,
    ) -> Result<Option<Goal>, GoalServiceError> {
        let Some(mut goal) = self.goals.find_goal(goal_id, user_id).await? else {
            return Ok(None);
        };

        let scope = goal.scope_after(&update)?;
        if update.current_score.is_none() {
            let score = self.scores.calculate_current_score(user_id, &scope).await;
            update.current_score = Some(score);
        }
        goal.apply_update(update, self.clock.now())?;

        match self.goals.update_goal(&goal).await {
            Ok(()) => Ok(Some(goal)),
            Err(StorageError::NotFound) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Delete a goal. Returns `false` if it does not exist for this user.
    ///
    /// # Errors
    ///
    /// Returns `GoalServiceError::Storage` if repository access fails.
    pub async fn delete_goal(
        &self,
        goal_id: GoalId,
        user_id: &UserId,
    ) -> Result<bool, GoalServiceError> {
        match self.goals.delete_goal(goal_id, user_id).await {
            Ok(()) => Ok(true),
            Err(StorageError::NotFound) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Re-score every incomplete goal of the user in `scope`, however many
    /// goals the user has.
    ///
    /// The score is computed once and written to each goal in listing order.
    /// Individual write failures are reported per goal and do not stop the
    /// remaining writes.
    ///
    /// # Errors
    ///
    /// Returns `GoalServiceError::Storage` only if the goals cannot be listed.
    pub async fn update_goal_progress(
        &self,
        user_id: &UserId,
        scope: &ExamScope,
    ) -> Result<ProgressRefresh, GoalServiceError> {
        let candidates = self.goals.list_open_goals_in_scope(user_id, scope).await?;

        let current_score = self.scores.calculate_current_score(user_id, scope).await;
        let now = self.clock.now();

        let mut outcomes = Vec::with_capacity(candidates.len());
        for mut goal in candidates {
            goal.record_score(current_score, now);
            let status = match self.goals.update_goal(&goal).await {
                Ok(()) => {
                    debug!(goal_id = %goal.id(), completed = goal.is_completed(), "goal progress updated");
                    GoalRefreshStatus::Updated {
                        completed: goal.is_completed(),
                    }
                }
                Err(err) => {
                    warn!(goal_id = %goal.id(), error = %err, "goal progress update failed");
                    GoalRefreshStatus::Failed {
                        error: err.to_string(),
                    }
                }
            };
            outcomes.push(GoalRefreshOutcome {
                goal_id: goal.id(),
                status,
            });
        }

        let refresh = ProgressRefresh {
            scope: scope.clone(),
            current_score,
            outcomes,
        };
        info!(
            user_id = %user_id,
            scope = %scope,
            score = current_score,
            updated = refresh.updated(),
            failed = refresh.failed(),
            "goal progress refreshed"
        );
        Ok(refresh)
    }
}
