mod error;
mod types;

pub use error::{identity_error_to_status_code, IdentityError, Result};
pub use types::{
    ConfirmationOutcome, ForgotPasswordRequest, MessageOutcome, RegisterRequest,
    RegistrationOutcome, ResetPasswordRequest, User,
};
