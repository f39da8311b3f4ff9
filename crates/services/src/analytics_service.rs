use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use storage::repository::SessionReader;
use study_core::model::{ExamScope, SessionSummary, StudySession, UserId};
use study_core::progress::{ExamStats, rounded_percentage};

use crate::error::AnalyticsError;

/// Number of recent sessions the analytics view covers.
pub const ANALYTICS_WINDOW: u32 = 100;

/// Performance on one provider/exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamPerformance {
    #[serde(flatten)]
    pub scope: ExamScope,
    #[serde(flatten)]
    pub stats: ExamStats,
    pub accuracy: u8,
}

/// Study totals across a user's recent sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnalytics {
    pub total_sessions: usize,
    pub completed_sessions: usize,
    pub answered_questions: u64,
    pub correct_answers: u64,
    pub accuracy: u8,
    pub study_minutes: i64,
    pub exams: Vec<ExamPerformance>,
}

impl UserAnalytics {
    /// Aggregate over session summaries. Totals count completed sessions only.
    #[must_use]
    pub fn from_summaries(summaries: &[SessionSummary]) -> Self {
        let completed: Vec<&SessionSummary> = summaries.iter().filter(|s| s.completed).collect();

        let scopes: BTreeSet<&ExamScope> = completed.iter().map(|s| &s.scope).collect();
        let by_scope: Vec<(&ExamScope, ExamStats)> = scopes
            .into_iter()
            .map(|scope| (scope, ExamStats::collect(scope, completed.iter().copied())))
            .collect();
        let study_secs: i64 = completed.iter().filter_map(|s| s.duration_secs).sum();

        let answered_questions: u64 = by_scope.iter().map(|(_, s)| s.answered_questions).sum();
        let correct_answers: u64 = by_scope.iter().map(|(_, s)| s.correct_answers).sum();
        let exams = by_scope
            .into_iter()
            .map(|(scope, stats)| ExamPerformance {
                scope: scope.clone(),
                accuracy: stats.score(),
                stats,
            })
            .collect();

        Self {
            total_sessions: summaries.len(),
            completed_sessions: completed.len(),
            answered_questions,
            correct_answers,
            accuracy: rounded_percentage(correct_answers, answered_questions),
            study_minutes: study_secs / 60,
            exams,
        }
    }
}

#[derive(Clone)]
pub struct AnalyticsService {
    sessions: Arc<dyn SessionReader>,
}

impl AnalyticsService {
    #[must_use]
    pub fn new(sessions: Arc<dyn SessionReader>) -> Self {
        Self { sessions }
    }

    /// Summarise the user's most recent sessions.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Storage` if sessions cannot be read.
    pub async fn user_analytics(&self, user_id: &UserId) -> Result<UserAnalytics, AnalyticsError> {
        let sessions = self
            .sessions
            .list_user_sessions(user_id, ANALYTICS_WINDOW)
            .await?;
        let summaries: Vec<_> = sessions.iter().map(StudySession::summary).collect();
        Ok(UserAnalytics::from_summaries(&summaries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;
    use storage::repository::{InMemoryRepository, SessionRepository};
    use study_core::model::SessionId;
    use study_core::time::fixed_now;

    fn scope(provider: &str, exam: &str) -> ExamScope {
        ExamScope::new(provider, exam).unwrap()
    }

    #[test]
    fn empty_history_is_all_zero() {
        let analytics = UserAnalytics::from_summaries(&[]);
        assert_eq!(analytics.total_sessions, 0);
        assert_eq!(analytics.accuracy, 0);
        assert!(analytics.exams.is_empty());
    }

    #[test]
    fn groups_completed_sessions_by_scope_in_order() {
        let mut open = SessionSummary::completed(scope("aws", "saa"), 10, 10);
        open.completed = false;
        let summaries = vec![
            SessionSummary::completed(scope("gcp", "ace"), 10, 5),
            SessionSummary::completed(scope("aws", "saa"), 10, 8),
            SessionSummary::completed(scope("aws", "dva"), 20, 19),
            SessionSummary::completed(scope("aws", "saa"), 10, 6),
            open,
        ];

        let analytics = UserAnalytics::from_summaries(&summaries);
        assert_eq!(analytics.total_sessions, 5);
        assert_eq!(analytics.completed_sessions, 4);
        assert_eq!(analytics.answered_questions, 50);
        assert_eq!(analytics.correct_answers, 38);
        assert_eq!(analytics.accuracy, 76);

        let order: Vec<String> = analytics.exams.iter().map(|e| e.scope.to_string()).collect();
        assert_eq!(order, vec!["aws/dva", "aws/saa", "gcp/ace"]);
        let saa = &analytics.exams[1];
        assert_eq!(saa.stats.completed_sessions, 2);
        assert_eq!(saa.accuracy, 70);
    }

    #[test]
    fn per_exam_stats_agree_with_scoring() {
        let saa = scope("aws", "saa");
        let summaries = vec![
            SessionSummary::completed(saa.clone(), 12, 9),
            SessionSummary::completed(scope("aws", "dva"), 10, 2),
            SessionSummary::completed(saa.clone(), 8, 8),
        ];

        let analytics = UserAnalytics::from_summaries(&summaries);
        let expected = ExamStats::collect(&saa, &summaries);
        let performance = analytics
            .exams
            .iter()
            .find(|e| e.scope == saa)
            .unwrap();
        assert_eq!(performance.stats, expected);
        assert_eq!(performance.accuracy, expected.score());
    }

    #[tokio::test]
    async fn study_minutes_come_from_completed_sessions() {
        let repo = InMemoryRepository::new();
        let user = UserId::new("alice").unwrap();
        for minutes in [25, 35] {
            let mut session = StudySession::start(
                SessionId::generate(),
                user.clone(),
                scope("aws", "saa"),
                4,
                fixed_now(),
            )
            .unwrap();
            session.record_answer(true).unwrap();
            session.complete(fixed_now() + Duration::minutes(minutes)).unwrap();
            repo.insert_session(&session).await.unwrap();
        }
        let open = StudySession::start(
            SessionId::generate(),
            user.clone(),
            scope("aws", "saa"),
            4,
            fixed_now(),
        )
        .unwrap();
        repo.insert_session(&open).await.unwrap();

        let analytics = AnalyticsService::new(Arc::new(repo))
            .user_analytics(&user)
            .await
            .unwrap();
        assert_eq!(analytics.total_sessions, 3);
        assert_eq!(analytics.completed_sessions, 2);
        assert_eq!(analytics.study_minutes, 60);
        assert_eq!(analytics.accuracy, 100);
    }
}
