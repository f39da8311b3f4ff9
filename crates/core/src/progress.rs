//! Pure arithmetic behind goal scoring and progress reports.
//!
//! Nothing in here touches storage or the clock; callers pass in counts and
//! dates so the rules can be exercised directly.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::model::{ExamScope, GoalId, MAX_SCORE, SessionSummary};

/// Number of recent sessions considered when scoring a goal.
pub const SCORE_WINDOW: u32 = 50;

/// Completion percentage at or above which a goal counts as on track.
pub const ON_TRACK_PERCENTAGE: u8 = 50;
/// Days remaining above which a goal counts as on track regardless of score.
pub const ON_TRACK_DAYS: i64 = 30;

const BEHIND_PERCENTAGE: u8 = 25;
const BEHIND_DAYS: i64 = 30;
const MIN_PRACTICE_SESSIONS: u32 = 5;
const DEADLINE_DAYS: i64 = 7;
const NEARLY_THERE_PERCENTAGE: u8 = 90;

/// `round(100 * part / whole)`, or 0 when `whole` is 0. Capped at 100.
#[must_use]
pub fn rounded_percentage(part: u64, whole: u64) -> u8 {
    if whole == 0 {
        return 0;
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = (part as f64 * 100.0 / whole as f64).round();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let pct = ratio.min(f64::from(MAX_SCORE)) as u8;
    pct
}

/// Totals over the completed sessions of one scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamStats {
    pub completed_sessions: u32,
    pub answered_questions: u64,
    pub correct_answers: u64,
}

impl ExamStats {
    /// Folds the completed sessions that match `scope`.
    pub fn collect<'a>(
        scope: &ExamScope,
        sessions: impl IntoIterator<Item = &'a SessionSummary>,
    ) -> Self {
        sessions
            .into_iter()
            .filter(|s| s.completed && &s.scope == scope)
            .fold(Self::default(), |mut acc, s| {
                acc.completed_sessions = acc.completed_sessions.saturating_add(1);
                acc.answered_questions += u64::from(s.answered_questions);
                acc.correct_answers += u64::from(s.correct_answers);
                acc
            })
    }

    /// Current score for the scope: overall accuracy across its sessions.
    #[must_use]
    pub fn score(&self) -> u8 {
        if self.completed_sessions == 0 {
            return 0;
        }
        rounded_percentage(self.correct_answers, self.answered_questions)
    }
}

/// How far `current` is towards `target`, clamped to `[0, 100]`.
#[must_use]
pub fn completion_percentage(current: u8, target: u8) -> u8 {
    if target == 0 {
        return 0;
    }
    rounded_percentage(u64::from(current), u64::from(target))
}

/// Whole days from `today` until `target`, never negative.
#[must_use]
pub fn days_remaining(target: NaiveDate, today: NaiveDate) -> i64 {
    (target - today).num_days().max(0)
}

/// Coarse pace signal. Not a forecast: a goal is "on track" when it is at
/// least half done or more than a month away.
#[must_use]
pub fn is_on_track(percentage: u8, days_remaining: i64) -> bool {
    percentage >= ON_TRACK_PERCENTAGE || days_remaining > ON_TRACK_DAYS
}

/// Hint attached to a progress report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    BehindSchedule,
    MorePractice,
    DeadlineApproaching,
    NearlyThere,
    KeepGoing,
}

impl Recommendation {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Recommendation::BehindSchedule => {
                "You're behind schedule. Consider increasing study time or moving your target date."
            }
            Recommendation::MorePractice => {
                "Complete more practice sessions to get a reliable picture of your progress."
            }
            Recommendation::DeadlineApproaching => {
                "Your deadline is approaching. Focus on reviewing your weakest topics."
            }
            Recommendation::NearlyThere => {
                "You're close to achieving your goal. Keep up the great work!"
            }
            Recommendation::KeepGoing => {
                "Keep up the consistent study schedule to reach your goal."
            }
        }
    }
}

impl Serialize for Recommendation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.message())
    }
}

/// Every rule that matches, in rule order. Never empty.
#[must_use]
pub fn recommendations(
    percentage: u8,
    days_remaining: i64,
    completed_sessions: u32,
) -> Vec<Recommendation> {
    let mut out = Vec::new();
    if percentage < BEHIND_PERCENTAGE && days_remaining < BEHIND_DAYS {
        out.push(Recommendation::BehindSchedule);
    }
    if completed_sessions < MIN_PRACTICE_SESSIONS {
        out.push(Recommendation::MorePractice);
    }
    if days_remaining < DEADLINE_DAYS {
        out.push(Recommendation::DeadlineApproaching);
    }
    if percentage >= NEARLY_THERE_PERCENTAGE {
        out.push(Recommendation::NearlyThere);
    }
    if out.is_empty() {
        out.push(Recommendation::KeepGoing);
    }
    out
}

/// Human-facing snapshot of a goal's progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub goal_id: GoalId,
    pub current_score: u8,
    pub target_score: u8,
    pub percentage: u8,
    pub time_remaining: i64,
    pub on_track: bool,
    pub is_completed: bool,
    pub completed_sessions: u32,
    pub recommendations: Vec<Recommendation>,
}

impl ProgressReport {
    /// Evaluates the report for a goal against `today`.
    #[must_use]
    pub fn evaluate(goal: &crate::model::Goal, stats: &ExamStats, today: NaiveDate) -> Self {
        let percentage = completion_percentage(goal.current_score(), goal.target_score());
        let time_remaining = days_remaining(goal.target_date(), today);
        Self {
            goal_id: goal.id(),
            current_score: goal.current_score(),
            target_score: goal.target_score(),
            percentage,
            time_remaining,
            on_track: is_on_track(percentage, time_remaining),
            is_completed: goal.is_completed(),
            completed_sessions: stats.completed_sessions,
            recommendations: recommendations(percentage, time_remaining, stats.completed_sessions),
        }
    }
}
