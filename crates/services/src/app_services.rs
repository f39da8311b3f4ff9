use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::analytics_service::AnalyticsService;
use crate::error::AppServicesError;
use crate::goal_service::GoalService;
use crate::scoring::ScoreCalculator;
use crate::session_service::SessionService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    goals: Arc<GoalService>,
    sessions: Arc<SessionService>,
    analytics: Arc<AnalyticsService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database cannot be opened or migrated.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock))
    }

    /// Build services backed by a fresh in-memory store.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), clock)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock) -> Self {
        let scores = ScoreCalculator::new(Arc::clone(&storage.session_reader));
        let goals = GoalService::new(clock, Arc::clone(&storage.goals), scores);
        let sessions = SessionService::new(clock, Arc::clone(&storage.sessions), goals.clone());
        let analytics = AnalyticsService::new(Arc::clone(&storage.session_reader));

        Self {
            goals: Arc::new(goals),
            sessions: Arc::new(sessions),
            analytics: Arc::new(analytics),
        }
    }

    #[must_use]
    pub fn goals(&self) -> Arc<GoalService> {
        Arc::clone(&self.goals)
    }

    #[must_use]
    pub fn sessions(&self) -> Arc<SessionService> {
        Arc::clone(&self.sessions)
    }

    #[must_use]
    pub fn analytics(&self) -> Arc<AnalyticsService> {
        Arc::clone(&self.analytics)
    }
}
