use thiserror::Error;

use crate::{adapter::error::AdapterError, domain::moves::InvalidMove, remote::error::RemoteError};

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("not signed in to the streaming service")]
    Unauthenticated,

    #[error("playlist {0} is not owned by the signed-in user")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("streaming service error: {0}")]
    Upstream(#[from] RemoteError),

    #[error("unexpected playlist listing: {0}")]
    IncompletePage(String),

    #[error(transparent)]
    Validation(#[from] InvalidMove),

    #[error("unexpected record from streaming service: {0}")]
    MissingField(#[from] AdapterError),

    /// Moves before the rejected one stay applied on the remote.
    #[error("move {} of {total} rejected after {applied} applied: {source}", .applied + 1)]
    MovesInterrupted {
        applied: usize,
        total: usize,
        source: RemoteError,
    },
}

impl LibraryError {
    /// Classifies a failed remote call made on behalf of `what`.
    pub fn from_remote(err: RemoteError, what: &str) -> Self {
        match err.status() {
            Some(401) => LibraryError::Unauthenticated,
            Some(404) => LibraryError::NotFound(what.to_string()),
            _ => LibraryError::Upstream(err),
        }
    }
}
