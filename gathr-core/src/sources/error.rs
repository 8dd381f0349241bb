//! Errors raised by feed collaborators.

use thiserror::Error;

/// Errors returned by feed collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The collaborator could not answer.
    ///
    /// Backends map their own failures (connection loss, timeouts, query
    /// errors) onto this variant with a human-readable message.
    #[error("{collaborator} unavailable: {message}")]
    Unavailable {
        /// Name of the failing collaborator.
        collaborator: &'static str,
        /// Backend-specific description.
        message: String,
    },
    /// A required entity does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of entity looked up.
        entity: &'static str,
        /// Identifier looked up.
        id: u64,
    },
}

impl SourceError {
    /// Shorthand for [`SourceError::Unavailable`].
    #[must_use]
    pub fn unavailable(collaborator: &'static str, message: impl Into<String>) -> Self {
        Self::Unavailable {
            collaborator,
            message: message.into(),
        }
    }
}
