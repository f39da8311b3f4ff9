use async_trait::async_trait;
use study_core::model::{ExamScope, Goal, GoalId, SessionId, StudySession, UserId};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Read-only, newest-first access to a user's study sessions.
#[async_trait]
pub trait SessionReader: Send + Sync {
    /// List up to `limit` of the user's sessions, most recently started first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if sessions cannot be read.
    async fn list_user_sessions(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<StudySession>, StorageError>;
}

/// Full session persistence used by the session workflow.
#[async_trait]
pub trait SessionRepository: SessionReader {
    /// Insert a new session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id is already taken.
    async fn insert_session(&self, session: &StudySession) -> Result<(), StorageError>;

    /// Fetch a session owned by `user_id`.
    ///
    /// Returns `Ok(None)` when the session is absent or owned by someone else.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn get_session(
        &self,
        id: SessionId,
        user_id: &UserId,
    ) -> Result<Option<StudySession>, StorageError>;

    /// Overwrite an existing session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the session no longer exists.
    async fn update_session(&self, session: &StudySession) -> Result<(), StorageError>;
}

/// Repository contract for goals. Every lookup is scoped to the owner.
#[async_trait]
pub trait GoalRepository: Send + Sync {
    /// Insert a new goal.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id is already taken.
    async fn create_goal(&self, goal: &Goal) -> Result<(), StorageError>;

    /// List up to `limit` of the user's goals, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn list_goals_by_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<Goal>, StorageError>;

    /// Every incomplete goal of the user in `scope`, newest first. Unbounded.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn list_open_goals_in_scope(
        &self,
        user_id: &UserId,
        scope: &ExamScope,
    ) -> Result<Vec<Goal>, StorageError>;

    /// Fetch a goal by id and owner.
    ///
    /// Returns `Ok(None)` when the goal is absent or owned by someone else.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn find_goal(&self, id: GoalId, user_id: &UserId) -> Result<Option<Goal>, StorageError>;

    /// Overwrite an existing goal.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no goal with this id and owner exists.
    async fn update_goal(&self, goal: &Goal) -> Result<(), StorageError>;

    /// Delete a goal.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no goal with this id and owner exists.
    async fn delete_goal(&self, id: GoalId, user_id: &UserId) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Records are kept in insertion order; listings walk them newest first.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    goals: Arc<Mutex<Vec<Goal>>>,
    sessions: Arc<Mutex<Vec<StudySession>>>,
}

fn lock<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    m.lock().map_err(|e| StorageError::Connection(e.to_string()))
}

fn limit_usize(limit: u32) -> usize {
    usize::try_from(limit).unwrap_or(usize::MAX)
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GoalRepository for InMemoryRepository {
    async fn create_goal(&self, goal: &Goal) -> Result<(), StorageError> {
        let mut guard = lock(&self.goals)?;
        if guard.iter().any(|g| g.id() == goal.id()) {
            return Err(StorageError::Conflict);
        }
        guard.push(goal.clone());
        Ok(())
    }

    async fn list_goals_by_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<Goal>, StorageError> {
        let guard = lock(&self.goals)?;
        Ok(guard
            .iter()
            .rev()
            .filter(|g| g.is_owned_by(user_id))
            .take(limit_usize(limit))
            .cloned()
            .collect())
    }

    async fn list_open_goals_in_scope(
        &self,
        user_id: &UserId,
        scope: &ExamScope,
    ) -> Result<Vec<Goal>, StorageError> {
        let guard = lock(&self.goals)?;
        Ok(guard
            .iter()
            .rev()
            .filter(|g| g.is_owned_by(user_id) && !g.is_completed() && g.scope() == scope)
            .cloned()
            .collect())
    }

    async fn find_goal(&self, id: GoalId, user_id: &UserId) -> Result<Option<Goal>, StorageError> {
        let guard = lock(&self.goals)?;
        Ok(guard
            .iter()
            .find(|g| g.id() == id && g.is_owned_by(user_id))
            .cloned())
    }

    async fn update_goal(&self, goal: &Goal) -> Result<(), StorageError> {
        let mut guard = lock(&self.goals)?;
        let slot = guard
            .iter_mut()
            .find(|g| g.id() == goal.id() && g.is_owned_by(goal.user_id()))
            .ok_or(StorageError::NotFound)?;
        *slot = goal.clone();
        Ok(())
    }

    async fn delete_goal(&self, id: GoalId, user_id: &UserId) -> Result<(), StorageError> {
        let mut guard = lock(&self.goals)?;
        let idx = guard
            .iter()
            .position(|g| g.id() == id && g.is_owned_by(user_id))
            .ok_or(StorageError::NotFound)?;
        guard.remove(idx);
        Ok(())
    }
}

#[async_trait]
impl SessionReader for InMemoryRepository {
    async fn list_user_sessions(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<StudySession>, StorageError> {
        let guard = lock(&self.sessions)?;
        Ok(guard
            .iter()
            .rev()
            .filter(|s| s.is_owned_by(user_id))
            .take(limit_usize(limit))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SessionRepository for InMemoryRepository {
    async fn insert_session(&self, session: &StudySession) -> Result<(), StorageError> {
        let mut guard = lock(&self.sessions)?;
        if guard.iter().any(|s| s.id() == session.id()) {
            return Err(StorageError::Conflict);
        }
        guard.push(session.clone());
        Ok(())
    }

    async fn get_session(
        &self,
        id: SessionId,
        user_id: &UserId,
    ) -> Result<Option<StudySession>, StorageError> {
        let guard = lock(&self.sessions)?;
        Ok(guard
            .iter()
            .find(|s| s.id() == id && s.is_owned_by(user_id))
            .cloned())
    }

    async fn update_session(&self, session: &StudySession) -> Result<(), StorageError> {
        let mut guard = lock(&self.sessions)?;
        let slot = guard
            .iter_mut()
            .find(|s| s.id() == session.id() && s.is_owned_by(session.user_id()))
            .ok_or(StorageError::NotFound)?;
        *slot = session.clone();
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub goals: Arc<dyn GoalRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub session_reader: Arc<dyn SessionReader>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::in_memory_with(InMemoryRepository::new())
    }

    /// Wrap an existing in-memory repository so tests can inspect it afterwards.
    #[must_use]
    pub fn in_memory_with(repo: InMemoryRepository) -> Self {
        let goals: Arc<dyn GoalRepository> = Arc::new(repo.clone());
        let sessions: Arc<dyn SessionRepository> = Arc::new(repo.clone());
        let session_reader: Arc<dyn SessionReader> = Arc::new(repo);
        Self {
            goals,
            sessions,
            session_reader,
        }
    }
}
