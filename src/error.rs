// Error handling for the smart map core.

use crate::attr::Attr;

pub type ResolveResult<T> = Result<T, ResolveError>;

/// Errors surfaced by the facade and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// A resolver failed while the engine was executing a plan for
    /// `attribute`. The underlying failure is carried as the source.
    #[error("resolution of {attribute} failed")]
    Resolution {
        attribute: Attr,
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Wrong type at an API boundary.
    #[error("type mismatch in {operation}: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: String,
        actual: String,
        operation: String,
    },

    /// Environment configuration rejected at construction time.
    #[error("invalid environment configuration: {0}")]
    InvalidConfig(String),

    /// Failure inside an engine implementation.
    #[error("engine error: {0}")]
    Engine(String),

    #[error("json conversion failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl ResolveError {
    /// Wrap an engine failure with the attribute whose resolution triggered it.
    pub fn resolution_of(attribute: Attr, cause: ResolveError) -> Self {
        ResolveError::Resolution {
            attribute,
            cause: Box::new(cause),
        }
    }
}
