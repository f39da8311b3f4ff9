use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{GoalId, UserId};
use crate::model::scope::{ExamScope, ScopeError};

/// Upper bound for any score expressed as a percentage.
pub const MAX_SCORE: u8 = 100;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GoalError {
    #[error("goal title cannot be empty")]
    EmptyTitle,

    #[error("target score must be between 0 and 100, got {0}")]
    TargetScoreOutOfRange(u8),

    #[error("current score must be between 0 and 100, got {0}")]
    CurrentScoreOutOfRange(u8),

    #[error(transparent)]
    Scope(#[from] ScopeError),

    #[error("updated_at is before created_at")]
    InvalidTimeRange,
}

//
// ─── REQUESTS ──────────────────────────────────────────────────────────────────
//

/// Caller-supplied fields for a new goal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub provider: String,
    pub exam: String,
    pub target_score: u8,
    pub target_date: NaiveDate,
}

/// Partial update for an existing goal. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoalUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub provider: Option<String>,
    pub exam: Option<String>,
    pub target_score: Option<u8>,
    pub current_score: Option<u8>,
    pub target_date: Option<NaiveDate>,
    pub is_completed: Option<bool>,
}

impl GoalUpdate {
    #[must_use]
    pub fn with_current_score(mut self, score: u8) -> Self {
        self.current_score = Some(score);
        self
    }
}

//
// ─── GOAL ──────────────────────────────────────────────────────────────────────
//

/// A user's target score for one provider/exam pair, with a deadline.
///
/// `is_completed` latches: once set it is never cleared by a later score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    #[serde(rename = "goalId")]
    id: GoalId,
    user_id: UserId,
    title: String,
    description: Option<String>,
    #[serde(flatten)]
    scope: ExamScope,
    target_score: u8,
    current_score: u8,
    target_date: NaiveDate,
    is_completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn validated_title(title: &str) -> Result<String, GoalError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(GoalError::EmptyTitle);
    }
    Ok(title.to_owned())
}

fn validated_target(score: u8) -> Result<u8, GoalError> {
    if score > MAX_SCORE {
        return Err(GoalError::TargetScoreOutOfRange(score));
    }
    Ok(score)
}

fn validated_current(score: u8) -> Result<u8, GoalError> {
    if score > MAX_SCORE {
        return Err(GoalError::CurrentScoreOutOfRange(score));
    }
    Ok(score)
}

fn normalized_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_owned())
        .filter(|d| !d.is_empty())
}

impl Goal {
    /// Creates a fresh, incomplete goal with a zero score.
    ///
    /// # Errors
    ///
    /// Returns `GoalError` if the title is blank, the scope is invalid, or the
    /// target score exceeds 100.
    pub fn new(
        id: GoalId,
        user_id: UserId,
        draft: GoalDraft,
        now: DateTime<Utc>,
    ) -> Result<Self, GoalError> {
        let title = validated_title(&draft.title)?;
        let scope = ExamScope::new(draft.provider, draft.exam)?;
        let target_score = validated_target(draft.target_score)?;

        Ok(Self {
            id,
            user_id,
            title,
            description: normalized_description(draft.description),
            scope,
            target_score,
            current_score: 0,
            target_date: draft.target_date,
            is_completed: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rehydrates a goal from storage.
    ///
    /// # Errors
    ///
    /// Returns `GoalError` if persisted values violate goal invariants.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: GoalId,
        user_id: UserId,
        title: String,
        description: Option<String>,
        scope: ExamScope,
        target_score: u8,
        current_score: u8,
        target_date: NaiveDate,
        is_completed: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, GoalError> {
        if updated_at < created_at {
            return Err(GoalError::InvalidTimeRange);
        }
        Ok(Self {
            id,
            user_id,
            title: validated_title(&title)?,
            description,
            scope,
            target_score: validated_target(target_score)?,
            current_score: validated_current(current_score)?,
            target_date,
            is_completed,
            created_at,
            updated_at,
        })
    }

    /// Scope this goal would track after `update` is applied.
    ///
    /// # Errors
    ///
    /// Returns `GoalError::Scope` if the update blanks the provider or exam.
    pub fn scope_after(&self, update: &GoalUpdate) -> Result<ExamScope, GoalError> {
        if update.provider.is_none() && update.exam.is_none() {
            return Ok(self.scope.clone());
        }
        let provider = update
            .provider
            .clone()
            .unwrap_or_else(|| self.scope.provider().to_owned());
        let exam = update
            .exam
            .clone()
            .unwrap_or_else(|| self.scope.exam().to_owned());
        Ok(ExamScope::new(provider, exam)?)
    }

    /// Merges `update` into this goal.
    ///
    /// Every field is validated before anything changes. After the merge the
    /// goal is forced complete when `current_score >= target_score`.
    ///
    /// # Errors
    ///
    /// Returns `GoalError` if any supplied field is invalid; the goal is left
    /// untouched in that case.
    pub fn apply_update(&mut self, update: GoalUpdate, now: DateTime<Utc>) -> Result<(), GoalError> {
        let scope = self.scope_after(&update)?;
        let title = update.title.as_deref().map(validated_title).transpose()?;
        let target_score = update.target_score.map(validated_target).transpose()?;
        let current_score = update.current_score.map(validated_current).transpose()?;

        self.scope = scope;
        if let Some(title) = title {
            self.title = title;
        }
        if update.description.is_some() {
            self.description = normalized_description(update.description);
        }
        if let Some(target) = target_score {
            self.target_score = target;
        }
        if let Some(current) = current_score {
            self.current_score = current;
        }
        if let Some(date) = update.target_date {
            self.target_date = date;
        }
        if let Some(done) = update.is_completed {
            self.is_completed = done;
        }
        self.latch_completion();
        self.updated_at = now;
        Ok(())
    }

    /// Stores a freshly computed score, completing the goal if it reaches target.
    pub fn record_score(&mut self, score: u8, now: DateTime<Utc>) {
        self.current_score = score.min(MAX_SCORE);
        self.latch_completion();
        self.updated_at = now;
    }

    fn latch_completion(&mut self) {
        if self.current_score >= self.target_score {
            self.is_completed = true;
        }
    }

    #[must_use]
    pub fn id(&self) -> GoalId {
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
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn scope(&self) -> &ExamScope {
        &self.scope
    }

    #[must_use]
    pub fn target_score(&self) -> u8 {
        self.target_score
    }

    #[must_use]
    pub fn current_score(&self) -> u8 {
        self.current_score
    }

    #[must_use]
    pub fn target_date(&self) -> NaiveDate {
        self.target_date
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
