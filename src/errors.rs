//! Unified error types for the procurement desk.
//!
//! Every fallible operation in the crate returns [`Result`]. Errors that only
//! degrade a submission (a failed attachment upload after the parent record was
//! saved) are not errors at all: they are reported as warnings inside a
//! successful [`SubmissionOutcome`](crate::core::orchestrator::SubmissionOutcome).

use crate::core::validation::ErrorMap;
use thiserror::Error;

/// Local, pre-network refusals. The operation they guard is never attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardRejection {
    /// Adding the batch would push the staged attachment count past the cap.
    #[error("Maximum {max} documents allowed")]
    TooManyFiles {
        /// Configured attachment cap
        max: usize,
    },

    /// Every previously persisted attachment would be deleted, leaving none.
    #[error("Refusing to delete all {count} existing documents")]
    MassDeletion {
        /// Number of attachments that would have been deleted
        count: usize,
    },
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad or unreadable configuration
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Field-scoped validation failures; the draft was not submitted
    #[error("Validation failed for {} field(s)", .errors.len())]
    Validation {
        /// field name -> message
        errors: ErrorMap,
    },

    /// A local guard refused the operation
    #[error("{0}")]
    Guard(GuardRejection),

    /// The session was logged out (or never established)
    #[error("Session is no longer active")]
    SessionInvalidated,

    /// The backend answered with a non-2xx status
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Raw response body for debugging
        body: String,
    },

    /// The request itself failed (network, DNS, TLS, ...)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered 2xx but the body was not what we expected
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Description of the mismatch
        message: String,
    },

    /// A draft operation named a field the entity schema does not have
    #[error("Unknown field '{field}' for {entity}")]
    UnknownField {
        /// Entity label
        entity: String,
        /// Offending field name
        field: String,
    },

    /// A value could not be read as a decimal(15,2) amount
    #[error("Invalid amount: {input}")]
    InvalidAmount {
        /// Raw input
        input: String,
    },

    /// A value could not be read as a calendar date
    #[error("Invalid date '{input}', expected YYYY-MM-DD")]
    InvalidDate {
        /// Raw input
        input: String,
    },

    /// Attachment index outside the staged list
    #[error("No staged document at position {index}")]
    AttachmentIndex {
        /// Requested index
        index: usize,
    },

    /// The form or field does not accept edits (view-only forms, computed fields)
    #[error("{target} is read-only")]
    ReadOnly {
        /// What was being edited
        target: String,
    },

    /// A submission is already running on this orchestrator
    #[error("A submission is already in progress")]
    SubmissionInProgress,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl From<GuardRejection> for Error {
    fn from(value: GuardRejection) -> Self {
        Self::Guard(value)
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
