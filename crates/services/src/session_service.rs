use std::sync::Arc;

use serde::{Deserialize, Serialize};
use storage::repository::{SessionRepository, StorageError};
use study_core::model::{ExamScope, SessionId, StudySession, UserId};
use tracing::{debug, warn};

use crate::Clock;
use crate::error::SessionServiceError;
use crate::goal_service::{GoalService, ProgressRefresh};

/// Request body for starting a study session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    pub provider: String,
    pub exam: String,
    pub total_questions: u32,
}

/// A completed session plus the goal refresh it triggered.
///
/// `progress` is `None` when the refresh could not list goals; completion
/// itself still succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSession {
    pub session: StudySession,
    pub progress: Option<ProgressRefresh>,
}

/// Records study sessions and feeds completions into goal progress.
#[derive(Clone)]
pub struct SessionService {
    clock: Clock,
    sessions: Arc<dyn SessionRepository>,
    goals: GoalService,
}

impl SessionService {
    #[must_use]
    pub fn new(clock: Clock, sessions: Arc<dyn SessionRepository>, goals: GoalService) -> Self {
        Self {
            clock,
            sessions,
            goals,
        }
    }

    /// Start a new, unanswered session.
    ///
    /// # Errors
    ///
    /// Returns `SessionServiceError::Scope` or `SessionServiceError::Session`
    /// for invalid input, `SessionServiceError::Storage` if the insert fails.
    pub async fn start_session(
        &self,
        user_id: &UserId,
        request: NewSession,
    ) -> Result<StudySession, SessionServiceError> {
        let scope = ExamScope::new(request.provider, request.exam)?;
        let session = StudySession::start(
            SessionId::generate(),
            user_id.clone(),
            scope,
            request.total_questions,
            self.clock.now(),
        )?;
        self.sessions.insert_session(&session).await?;
        debug!(session_id = %session.id(), user_id = %user_id, "study session started");
        Ok(session)
    }

    /// Count one answer. Returns `None` if the session is unknown for this user.
    ///
    /// # Errors
    ///
    /// Returns `SessionServiceError::Session` if the session is already
    /// completed or fully answered, `SessionServiceError::Storage` on
    /// repository failure.
    pub async fn record_answer(
        &self,
        session_id: SessionId,
        user_id: &UserId,
        correct: bool,
    ) -> Result<Option<StudySession>, SessionServiceError> {
        let Some(mut session) = self.sessions.get_session(session_id, user_id).await? else {
            return Ok(None);
        };
        session.record_answer(correct)?;
        self.save(session).await
    }

    /// Complete a session, then refresh the user's goals for its scope.
    ///
    /// # Errors
    ///
    /// Returns `SessionServiceError::Session` if the session is already
    /// completed, `SessionServiceError::Storage` if it cannot be saved.
    pub async fn complete_session(
        &self,
        session_id: SessionId,
        user_id: &UserId,
    ) -> Result<Option<CompletedSession>, SessionServiceError> {
        let Some(mut session) = self.sessions.get_session(session_id, user_id).await? else {
            return Ok(None);
        };
        session.complete(self.clock.now())?;
        let Some(session) = self.save(session).await? else {
            return Ok(None);
        };

        let progress = match self
            .goals
            .update_goal_progress(user_id, session.scope())
            .await
        {
            Ok(refresh) => Some(refresh),
            Err(err) => {
                warn!(
                    session_id = %session.id(),
                    scope = %session.scope(),
                    error = %err,
                    "goal refresh after session completion failed"
                );
                None
            }
        };

        Ok(Some(CompletedSession { session, progress }))
    }

    /// # Errors
    ///
    /// Returns `SessionServiceError::Storage` if repository access fails.
    pub async fn get_session(
        &self,
        session_id: SessionId,
        user_id: &UserId,
    ) -> Result<Option<StudySession>, SessionServiceError> {
        Ok(self.sessions.get_session(session_id, user_id).await?)
    }

    /// List the user's sessions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `SessionServiceError::InvalidLimit` for a zero limit,
    /// `SessionServiceError::Storage` if repository access fails.
    pub async fn list_sessions(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<StudySession>, SessionServiceError> {
        if limit == 0 {
            return Err(SessionServiceError::InvalidLimit);
        }
        Ok(self.sessions.list_user_sessions(user_id, limit).await?)
    }

    async fn save(
        &self,
        session: StudySession,
    ) -> Result<Option<StudySession>, SessionServiceError> {
        match self.sessions.update_session(&session).await {
            Ok(()) => Ok(Some(session)),
            Err(StorageError::NotFound) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
