use thiserror::Error;

/// Errors raised by the identity service.
///
/// `Opaque` deliberately hides whether an account exists (used by the
/// password-reset flows).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Username {0} is already taken")]
    UsernameTaken(String),
    #[error("Email {0} is already registered")]
    EmailTaken(String),
    #[error("Phone number {0} is already registered")]
    PhoneTaken(String),
    #[error("Invalid or expired confirmation code")]
    InvalidToken,
    #[error("An error has occurred")]
    Opaque,
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for identity operations.
pub type Result<T> = std::result::Result<T, IdentityError>;

/// Maps an [`IdentityError`] to an HTTP status code.
pub fn identity_error_to_status_code(error: &IdentityError) -> u16 {
    match error {
        IdentityError::UsernameTaken(_)
        | IdentityError::EmailTaken(_)
        | IdentityError::PhoneTaken(_) => 409,
        IdentityError::InvalidToken => 400,
        IdentityError::Opaque => 400,
        IdentityError::Hashing(_) | IdentityError::Storage(_) => 500,
    }
}
