mod goal;
mod ids;
mod scope;
mod session;

pub use ids::{GoalId, ParseIdError, SessionId, UserId};
pub use scope::{ExamScope, ScopeError};

pub use goal::{Goal, GoalDraft, GoalError, GoalUpdate, MAX_SCORE};
pub use session::{SessionSummary, StudySession, StudySessionError};
