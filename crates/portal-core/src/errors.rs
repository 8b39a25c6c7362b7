//! Unified error system for the portal
//!
//! A single error type shared across crates. Domain-specific failures that
//! frontends must distinguish (bad credentials, inaccessible project, missing
//! capability, empty batch) get their own variants; everything else is folded
//! into a handful of message-carrying kinds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error type for all portal operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum PortalError {
    /// Username/password pair did not match any known account.
    ///
    /// Deliberately carries no detail: the same error is produced whether the
    /// username or the password was wrong.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The principal's role cannot view the requested project
    #[error("Project not accessible: {project}")]
    ProjectNotAccessible {
        /// Identifier of the rejected project
        project: String,
    },

    /// The current session lacks the capability required for an action
    #[error("Forbidden: {action} is not permitted")]
    ForbiddenAction {
        /// Name of the refused action
        action: String,
    },

    /// A selective batch operation was invoked with an unusable selection
    #[error("Invalid batch selection: {message}")]
    InvalidBatchSelection {
        /// Why the selection was rejected
        message: String,
    },

    /// Invalid input
    #[error("Invalid: {message}")]
    Invalid {
        /// Error message describing the invalid input
        message: String,
    },

    /// Resource not found
    #[error("Not found: {message}")]
    NotFound {
        /// Error message describing what was not found
        message: String,
    },

    /// Configuration could not be loaded or failed validation
    #[error("Config error: {message}")]
    Config {
        /// Error message describing the configuration problem
        message: String,
    },

    /// Storage operation failed
    #[error("Storage error: {message}")]
    Storage {
        /// Error message describing the storage failure
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message describing the serialization failure
        message: String,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal error
        message: String,
    },
}

impl PortalError {
    /// Create a project-not-accessible error
    pub fn project_not_accessible(project: impl Into<String>) -> Self {
        Self::ProjectNotAccessible {
            project: project.into(),
        }
    }

    /// Create a forbidden-action error
    pub fn forbidden(action: impl Into<String>) -> Self {
        Self::ForbiddenAction {
            action: action.into(),
        }
    }

    /// Create an invalid-batch-selection error
    pub fn invalid_batch(message: impl Into<String>) -> Self {
        Self::InvalidBatchSelection {
            message: message.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Classify this error for frontend treatment.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidCredentials | Self::Invalid { .. } => ErrorCategory::Input,
            Self::InvalidBatchSelection { .. } => ErrorCategory::Input,
            Self::ProjectNotAccessible { .. } | Self::ForbiddenAction { .. } => {
                ErrorCategory::Capability
            }
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Config { .. } => ErrorCategory::Config,
            Self::Storage { .. } => ErrorCategory::Network,
            Self::Serialization { .. } | Self::Internal { .. } => ErrorCategory::Operation,
        }
    }
}

/// Standard Result type for portal operations
pub type Result<T> = std::result::Result<T, PortalError>;

impl From<serde_json::Error> for PortalError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<std::io::Error> for PortalError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::not_found(err.to_string()),
            _ => Self::storage(err.to_string()),
        }
    }
}

// ============================================================================
// Error Categories
// ============================================================================

/// High-level error categories for frontend error handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// User input validation errors (correctable by user)
    Input,
    /// Configuration errors (correctable by modifying settings)
    Config,
    /// Authorization errors (require a different role or project)
    Capability,
    /// Resource not found errors
    NotFound,
    /// Remote or storage errors (often transient)
    Network,
    /// General operation failures (catch-all)
    Operation,
}

impl ErrorCategory {
    /// Check if this error category is user-correctable.
    #[must_use]
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Self::Input | Self::Config)
    }

    /// Check if this error category is likely transient.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network)
    }

    /// Get a short label for this category.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Config => "Config",
            Self::Capability => "Permission",
            Self::NotFound => "Not Found",
            Self::Network => "Network",
            Self::Operation => "Operation",
        }
    }

    /// Get a hint for the user on how to resolve this category of error.
    #[must_use]
    pub fn resolution_hint(&self) -> &'static str {
        match self {
            Self::Input => "Check your input and try again",
            Self::Config => "Review your configuration settings",
            Self::Capability => "This action requires additional permissions",
            Self::NotFound => "The requested resource could not be found",
            Self::Network => "Your change is kept locally; retry when the store is reachable",
            Self::Operation => "An unexpected error occurred",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = PortalError::invalid("test message");
        assert!(matches!(err, PortalError::Invalid { .. }));
        assert_eq!(err.to_string(), "Invalid: test message");
    }

    #[test]
    fn test_invalid_credentials_message_has_no_detail() {
        let err = PortalError::InvalidCredentials;
        assert_eq!(err.to_string(), "Invalid username or password");
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = PortalError::from(io_err);
        assert!(matches!(err, PortalError::NotFound { .. }));
    }

    #[test]
    fn test_authorization_errors_are_capability_category() {
        assert_eq!(
            PortalError::forbidden("approve").category(),
            ErrorCategory::Capability
        );
        assert_eq!(
            PortalError::project_not_accessible("tvh").category(),
            ErrorCategory::Capability
        );
        assert!(PortalError::invalid_batch("empty")
            .category()
            .is_user_correctable());
    }

    #[test]
    fn test_storage_errors_are_transient() {
        assert!(PortalError::storage("offline").category().is_transient());
    }
}
