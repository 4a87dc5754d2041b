//! Error types for the onboarding flow.

use crate::onboarding::state::OnboardingStep;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Commit error: {0}")]
    Commit(#[from] CommitError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Reasons a commit of the onboarding draft can be refused or fail.
///
/// Every variant is recoverable: the draft is left untouched and the
/// completion flag stays unset.
#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    #[error("Terms have not been accepted")]
    TermsNotAccepted,

    #[error("Cannot commit from step {step}; the flow must be on the terms step")]
    NotAtTerms { step: OnboardingStep },

    #[error("Step {step} no longer passes validation")]
    Incomplete { step: OnboardingStep },

    #[error("Onboarding is already complete")]
    AlreadyCompleted,

    #[error("A commit is already in progress")]
    InProgress,

    #[error("Profile store failed: {0}")]
    Store(#[from] DatabaseError),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
