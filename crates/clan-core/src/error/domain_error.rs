//! Domain errors - error types for the domain layer

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Member not found: {0}")]
    MemberNotFound(String),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid discord id: {0}")]
    InvalidDiscordId(String),

    #[error("Invalid profile link: {0}")]
    InvalidProfileLink(String),

    #[error("Unknown rank: {0}")]
    UnknownRank(String),

    #[error("Attribute not editable: {0}")]
    UneditableAttribute(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Name already tracked: {0}")]
    DuplicateName(String),

    #[error("Identity already tracked: {0}")]
    DuplicateIdentity(String),

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("Permission denied: {0} is a protected staff rank")]
    StaffRankProtected(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("External system unavailable: {0}")]
    External(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl DomainError {
    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::MemberNotFound(_))
    }

    /// Check if this is a validation error (rejected locally, no mutation)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidName(_)
                | Self::InvalidDiscordId(_)
                | Self::InvalidProfileLink(_)
                | Self::UnknownRank(_)
                | Self::UneditableAttribute(_)
                | Self::ValidationError(_)
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::DuplicateName(_) | Self::DuplicateIdentity(_))
    }

    /// Check if this came from an external system (fail softly and log)
    pub fn is_external(&self) -> bool {
        matches!(self, Self::External(_))
    }
}
