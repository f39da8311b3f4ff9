use std::sync::Arc;

use storage::repository::SessionReader;
use study_core::model::{ExamScope, StudySession, UserId};
use study_core::progress::{ExamStats, SCORE_WINDOW};
use tracing::warn;

/// Derives a user's current score for one provider/exam from recent sessions.
///
/// Session-store failures never reach the caller: they are logged and the
/// result degrades to an empty history (score 0).
#[derive(Clone)]
pub struct ScoreCalculator {
    sessions: Arc<dyn SessionReader>,
    window: u32,
}

impl ScoreCalculator {
    #[must_use]
    pub fn new(sessions: Arc<dyn SessionReader>) -> Self {
        Self {
            sessions,
            window: SCORE_WINDOW,
        }
    }

    /// Override how many recent sessions are considered.
    #[must_use]
    pub fn with_window(mut self, window: u32) -> Self {
        self.window = window;
        self
    }

    /// Counts over the user's recent completed sessions in `scope`.
    pub async fn exam_stats(&self, user_id: &UserId, scope: &ExamScope) -> ExamStats {
        match self.sessions.list_user_sessions(user_id, self.window).await {
            Ok(sessions) => {
                let summaries: Vec<_> = sessions.iter().map(StudySession::summary).collect();
                ExamStats::collect(scope, &summaries)
            }
            Err(err) => {
                warn!(
                    user_id = %user_id,
                    scope = %scope,
                    error = %err,
                    "session history unavailable, scoring as empty"
                );
                ExamStats::default()
            }
        }
    }

    /// Accuracy percentage over the user's recent completed sessions in `scope`.
    pub async fn calculate_current_score(&self, user_id: &UserId, scope: &ExamScope) -> u8 {
        self.exam_stats(user_id, scope).await.score()
    }
}
