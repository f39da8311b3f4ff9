#![forbid(unsafe_code)]

pub mod analytics_service;
pub mod app_services;
pub mod error;
pub mod goal_service;
pub mod scoring;
pub mod session_service;

pub use study_core::Clock;

pub use analytics_service::{ANALYTICS_WINDOW, AnalyticsService, ExamPerformance, UserAnalytics};
pub use app_services::AppServices;
pub use error::{AnalyticsError, AppServicesError, GoalServiceError, SessionServiceError};
pub use goal_service::{
    DEFAULT_GOAL_LIMIT, GoalList, GoalRefreshOutcome, GoalRefreshStatus, GoalService,
    ProgressRefresh,
};
pub use scoring::ScoreCalculator;
pub use session_service::{CompletedSession, NewSession, SessionService};
