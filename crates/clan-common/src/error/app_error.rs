//! Application error types
//!
//! Unified error handling above the domain layer: configuration, I/O, and
//! external-service failures that are not themselves domain concepts.

use clan_core::DomainError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // External service errors
    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Request timed out after {0} attempts")]
    RetriesExhausted(u32),

    // Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Internal errors
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    /// Whether retrying the operation later could succeed
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ExternalService(_) | Self::RetriesExhausted(_))
            || matches!(self, Self::Domain(e) if e.is_external())
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(AppError::ExternalService("503".into()).is_transient());
        assert!(AppError::RetriesExhausted(6).is_transient());
        assert!(AppError::Domain(DomainError::External("timeout".into())).is_transient());
        assert!(!AppError::Config("missing var".into()).is_transient());
    }

    #[test]
    fn test_domain_error_is_transparent() {
        let err = AppError::from(DomainError::MemberNotFound("Alice".into()));
        assert_eq!(err.to_string(), "Member not found: Alice");
    }
}
