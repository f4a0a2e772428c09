//! Unified error types for the ledger core.

use thiserror::Error;

/// Every failure the crate can surface to a caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read, parsed, or validated
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// The backing store rejected or failed an operation
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No recurring template exists with this id
    #[error("Recurring template {id} not found")]
    TemplateNotFound {
        /// Requested template id
        id: i64,
    },

    /// No categorization rule exists with this id
    #[error("Categorization rule {id} not found")]
    RuleNotFound {
        /// Requested rule id
        id: i64,
    },

    /// Amounts are strictly positive minor units; the kind carries the sign
    #[error("Invalid amount: {amount} cents")]
    InvalidAmount {
        /// Offending amount in cents
        amount: i64,
    },

    /// Caller-supplied value failed validation
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// What was wrong with the input
        message: String,
    },
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
