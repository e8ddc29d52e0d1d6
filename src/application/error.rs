use thiserror::Error;

use crate::application::pagination::PaginationError;
use crate::application::repos::RepoError;
use crate::cache::CacheError;
use crate::config::LoadError;
use crate::infra::error::InfraError;

/// Umbrella error for callers that drive the services end to end. Each layer
/// keeps its own error enum; this is the one they converge on at the edge.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error("cache backend unavailable: {0}")]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// True when the failure names a missing row rather than a fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::Repo(RepoError::NotFound))
    }

    /// True when the caller supplied something unusable and retrying the same
    /// input cannot succeed.
    pub fn is_invalid_request(&self) -> bool {
        matches!(
            self,
            AppError::Pagination(_)
                | AppError::Repo(RepoError::InvalidInput(_) | RepoError::Pagination(_))
        )
    }
}
