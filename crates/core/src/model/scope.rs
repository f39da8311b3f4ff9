use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScopeError {
    #[error("provider cannot be empty")]
    EmptyProvider,

    #[error("exam cannot be empty")]
    EmptyExam,
}

/// Certification provider and exam pair that partitions sessions and goals.
///
/// Both parts are trimmed on construction and compared by exact equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawScope")]
pub struct ExamScope {
    provider: String,
    exam: String,
}

#[derive(Deserialize)]
struct RawScope {
    provider: String,
    exam: String,
}

impl TryFrom<RawScope> for ExamScope {
    type Error = ScopeError;

    fn try_from(raw: RawScope) -> Result<Self, Self::Error> {
        Self::new(raw.provider, raw.exam)
    }
}

impl ExamScope {
    /// Creates a validated scope.
    ///
    /// # Errors
    ///
    /// Returns `ScopeError` if either component is blank.
    pub fn new(provider: impl Into<String>, exam: impl Into<String>) -> Result<Self, ScopeError> {
        let provider = provider.into().trim().to_owned();
        if provider.is_empty() {
            return Err(ScopeError::EmptyProvider);
        }
        let exam = exam.into().trim().to_owned();
        if exam.is_empty() {
            return Err(ScopeError::EmptyExam);
        }
        Ok(Self { provider, exam })
    }

    #[must_use]
    pub fn provider(&self) -> &str {
        &self.provider
    }

    #[must_use]
    pub fn exam(&self) -> &str {
        &self.exam
    }
}

impl fmt::Display for ExamScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.exam)
    }
}
