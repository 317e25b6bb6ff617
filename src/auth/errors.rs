//! # Auth Errors

use thiserror::Error;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication failures
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // ==================
    // API Key Errors
    // ==================
    /// No API key on the request
    #[error("API key required")]
    MissingApiKey,

    /// API key not in the configured key ring
    #[error("Invalid API key")]
    InvalidApiKey,

    // ==================
    // Basic Auth Errors
    // ==================
    /// No `Authorization` header
    #[error("Authentication required")]
    AuthenticationRequired,

    /// `Authorization` header is not well-formed basic auth
    #[error("Malformed authorization header")]
    MalformedHeader,

    /// Unknown login or wrong password (deliberately indistinguishable)
    #[error("Invalid credentials")]
    InvalidCredentials,

    // ==================
    // Internal Errors
    // ==================
    /// Password hashing failed
    #[error("Internal error: password hashing failed")]
    HashingFailed,
}

impl AuthError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::MalformedHeader => 400,

            AuthError::MissingApiKey => 401,
            AuthError::InvalidApiKey => 401,
            AuthError::AuthenticationRequired => 401,
            AuthError::InvalidCredentials => 401,

            AuthError::HashingFailed => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}
