use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::ids::{SessionId, UserId};
use crate::model::scope::ExamScope;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StudySessionError {
    #[error("a session needs at least one question")]
    NoQuestions,

    #[error("session already completed")]
    AlreadyCompleted,

    #[error("all {total} questions have already been answered")]
    AllAnswered { total: u32 },

    #[error("counts are inconsistent: {correct} correct, {answered} answered, {total} total")]
    CountMismatch { total: u32, answered: u32, correct: u32 },

    #[error("completed_at is before started_at")]
    InvalidTimeRange,
}

/// One study attempt against a provider/exam question pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    #[serde(rename = "sessionId")]
    id: SessionId,
    user_id: UserId,
    #[serde(flatten)]
    scope: ExamScope,
    total_questions: u32,
    answered_questions: u32,
    correct_answers: u32,
    completed: bool,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl StudySession {
    /// Starts a new, empty session.
    ///
    /// # Errors
    ///
    /// Returns `StudySessionError::NoQuestions` if `total_questions` is zero.
    pub fn start(
        id: SessionId,
        user_id: UserId,
        scope: ExamScope,
        total_questions: u32,
        now: DateTime<Utc>,
    ) -> Result<Self, StudySessionError> {
        if total_questions == 0 {
            return Err(StudySessionError::NoQuestions);
        }
        Ok(Self {
            id,
            user_id,
            scope,
            total_questions,
            answered_questions: 0,
            correct_answers: 0,
            completed: false,
            started_at: now,
            completed_at: None,
        })
    }

    /// Rehydrate a session from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `StudySessionError` if counts or timestamps are inconsistent.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: SessionId,
        user_id: UserId,
        scope: ExamScope,
        total_questions: u32,
        answered_questions: u32,
        correct_answers: u32,
        started_at: DateTime<Utc>,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Self, StudySessionError> {
        if total_questions == 0 {
            return Err(StudySessionError::NoQuestions);
        }
        if correct_answers > answered_questions || answered_questions > total_questions {
            return Err(StudySessionError::CountMismatch {
                total: total_questions,
                answered: answered_questions,
                correct: correct_answers,
            });
        }
        if completed_at.is_some_and(|at| at < started_at) {
            return Err(StudySessionError::InvalidTimeRange);
        }

        Ok(Self {
            id,
            user_id,
            scope,
            total_questions,
            answered_questions,
            correct_answers,
            completed: completed_at.is_some(),
            started_at,
            completed_at,
        })
    }

    /// Records one answered question.
    ///
    /// # Errors
    ///
    /// Returns `StudySessionError::AlreadyCompleted` once the session is closed,
    /// or `StudySessionError::AllAnswered` when no questions remain.
    pub fn record_answer(&mut self, correct: bool) -> Result<(), StudySessionError> {
        if self.completed {
            return Err(StudySessionError::AlreadyCompleted);
        }
        if self.answered_questions >= self.total_questions {
            return Err(StudySessionError::AllAnswered {
                total: self.total_questions,
            });
        }
        self.answered_questions += 1;
        if correct {
            self.correct_answers += 1;
        }
        Ok(())
    }

    /// Closes the session. Unanswered questions simply do not count.
    ///
    /// # Errors
    ///
    /// Returns `StudySessionError::AlreadyCompleted` if called twice, or
    /// `StudySessionError::InvalidTimeRange` if `now` precedes the start.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), StudySessionError> {
        if self.completed {
            return Err(StudySessionError::AlreadyCompleted);
        }
        if now < self.started_at {
            return Err(StudySessionError::InvalidTimeRange);
        }
        self.completed = true;
        self.completed_at = Some(now);
        Ok(())
    }

    /// Read-only projection consumed by scoring and analytics.
    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            scope: self.scope.clone(),
            completed: self.completed,
            answered_questions: self.answered_questions,
            correct_answers: self.correct_answers,
            duration_secs: self
                .completed_at
                .map(|end| (end - self.started_at).num_seconds().max(0)),
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    #[must_use]
    pub fn scope(&self) -> &ExamScope {
        &self.scope
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn answered_questions(&self) -> u32 {
        self.answered_questions
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }
}

/// Per-session counts used by scoring and analytics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub scope: ExamScope,
    pub completed: bool,
    pub answered_questions: u32,
    pub correct_answers: u32,
    pub duration_secs: Option<i64>,
}

impl SessionSummary {
    /// Convenience constructor for a completed summary without timing data.
    #[must_use]
    pub fn completed(scope: ExamScope, answered_questions: u32, correct_answers: u32) -> Self {
        Self {
            scope,
            completed: true,
            answered_questions,
            correct_answers,
            duration_secs: None,
        }
    }
}
