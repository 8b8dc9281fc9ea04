//! Unified error hierarchy for VitalRS
//!
//! Calculation errors (`InvalidRangeKey`, `InvalidGoal`) are caller bugs and
//! surface immediately. Repository failures and missing cycle data are
//! expected runtime conditions that screens render as an empty state.

use rust_decimal::Decimal;
use thiserror::Error;

/// Top-level error type for all VitalRS operations
#[derive(Debug, Error)]
pub enum VitalError {
    /// Range key outside `week`/`month`/`quarter`
    #[error("Invalid range key: {key}")]
    InvalidRangeKey { key: String },

    /// Goal that is zero or negative
    #[error("Invalid goal: {goal} (goal must be positive)")]
    InvalidGoal { goal: Decimal },

    /// No cycle record exists for the user
    #[error("Cycle data unavailable")]
    CycleDataUnavailable,

    /// Failure reported by the remote record store
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Data validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Record import errors
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the external record store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// Network failure talking to the store
    #[error("Network failure: {reason}")]
    Network { reason: String },

    /// Session rejected by the store
    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: String },

    /// Requested row does not exist
    #[error("Record not found: {table}.{key}")]
    NotFound { table: String, key: String },

    /// Store accepted the request but failed to persist or read
    #[error("Storage failure: {reason}")]
    Storage { reason: String },
}

/// Daily record import errors
#[derive(Debug, Error)]
pub enum ImportError {
    /// Underlying CSV reader failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A cell could not be parsed
    #[error("Invalid value in row {row}, column {column}: {value}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    /// Required column is absent from the header
    #[error("Missing required column: {column}")]
    MissingColumn { column: String },
}

/// Result type alias for VitalRS operations
pub type Result<T> = std::result::Result<T, VitalError>;

impl VitalError {
    /// True for conditions a screen should render as "no data" instead of failing
    pub fn is_no_data(&self) -> bool {
        matches!(
            self,
            VitalError::Repository(_) | VitalError::CycleDataUnavailable
        )
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            VitalError::CycleDataUnavailable => ErrorSeverity::Info,
            VitalError::Repository(RepositoryError::NotFound { .. }) => ErrorSeverity::Warning,
            VitalError::Repository(_) => ErrorSeverity::Warning,
            VitalError::Validation(_) | VitalError::Import(_) => ErrorSeverity::Warning,
            VitalError::InvalidRangeKey { .. } | VitalError::InvalidGoal { .. } => {
                ErrorSeverity::Critical
            }
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            VitalError::CycleDataUnavailable => {
                "Log the start of your last period to see cycle predictions.".to_string()
            }
            VitalError::Repository(RepositoryError::Network { .. }) => {
                "Unable to reach the server. Please check your connection.".to_string()
            }
            VitalError::Repository(RepositoryError::Unauthorized { .. }) => {
                "Your session has expired. Please sign in again.".to_string()
            }
            VitalError::Repository(_) => "Your health data could not be loaded.".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Caller bug requiring a code fix
    Critical,
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
    /// Informational message
    Info,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
            ErrorSeverity::Info => tracing::Level::INFO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_severity() {
        let err = VitalError::InvalidGoal { goal: dec!(0) };
        assert_eq!(err.severity(), ErrorSeverity::Critical);

        let err = VitalError::CycleDataUnavailable;
        assert_eq!(err.severity(), ErrorSeverity::Info);
    }

    #[test]
    fn test_no_data_classification() {
        let err = VitalError::Repository(RepositoryError::Network {
            reason: "timeout".to_string(),
        });
        assert!(err.is_no_data());

        assert!(VitalError::CycleDataUnavailable.is_no_data());
        assert!(!VitalError::InvalidRangeKey {
            key: "year".to_string()
        }
        .is_no_data());
    }

    #[test]
    fn test_user_messages() {
        let err = VitalError::Repository(RepositoryError::Unauthorized {
            reason: "jwt expired".to_string(),
        });
        assert!(err.user_message().contains("sign in"));

        let err = VitalError::InvalidRangeKey {
            key: "year".to_string(),
        };
        assert_eq!(err.user_message(), "Invalid range key: year");
    }
}
