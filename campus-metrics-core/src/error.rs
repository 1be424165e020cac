//! Error types for the enrichment pipeline.
//!
//! Only `SourceUnavailable` is expected during normal operation; the
//! pipeline facade recovers from it locally and degrades to an empty
//! result. Join mismatches and short inputs are not errors at all.

use thiserror::Error;

/// Main error type for campus metrics operations.
#[derive(Debug, Error)]
pub enum CampusMetricsError {
    /// A source table is missing or does not have the expected shape
    #[error("Source table '{table}' unavailable: {reason}")]
    SourceUnavailable { table: String, reason: String },

    /// Configuration or validation error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Outlier scoring could not be performed
    #[error("Anomaly detection failed: {context}")]
    Detection { context: String },

    /// I/O operation failed
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization or deserialization failed
    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results with CampusMetricsError
pub type Result<T> = std::result::Result<T, CampusMetricsError>;

impl CampusMetricsError {
    /// Creates a source-unavailable error for the named table
    pub fn source_unavailable(table: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a detection error
    pub fn detection(context: impl Into<String>) -> Self {
        Self::Detection {
            context: context.into(),
        }
    }

    /// Creates an I/O error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Creates a serialization error with context
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }

    /// Returns true if the error is recoverable by degrading to an empty result.
    ///
    /// Configuration errors are the only kind a caller must fix before
    /// retrying; everything else is a property of the source data.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Configuration { .. })
    }
}
