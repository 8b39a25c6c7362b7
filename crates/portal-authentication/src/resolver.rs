//! Credential resolver interface.

use crate::principal::Principal;
use async_trait::async_trait;
use portal_core::PortalError;

/// Authentication failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No account matches the pair. Identical for unknown user and wrong password.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The verification backend could not be consulted
    #[error("Authentication unavailable: {message}")]
    Unavailable {
        /// What went wrong
        message: String,
    },
}

impl From<AuthError> for PortalError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => PortalError::InvalidCredentials,
            AuthError::Unavailable { message } => PortalError::internal(message),
        }
    }
}

/// Verifies a username/password pair.
///
/// Implementations must not log or retain the password and must return
/// [`AuthError::InvalidCredentials`] for every mismatch, including empty input.
#[async_trait]
pub trait CredentialResolver: Send + Sync {
    /// Resolve the pair to a principal.
    async fn authenticate(&self, username: &str, password: &str) -> Result<Principal, AuthError>;
}
