//! Identity entities and request/response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{Entity, HasTenant};
use crate::serde::deserialize_optional_string;
use crate::tenant::TenantId;

/// An application user. Tenant-scoped.
///
/// Confirmation and reset tokens are stored alongside the account; they
/// are random values generated by the user manager, compared verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub password_hash: String,
    pub is_active: bool,
    pub email_confirmed: bool,
    pub phone_confirmed: bool,
    pub email_token: Option<String>,
    pub phone_token: Option<String>,
    pub reset_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for User {
    const TYPE_NAME: &'static str = "User";
    const TENANT_SCOPED: bool = true;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl HasTenant for User {
    fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}

/// Payload for `POST /api/identity/register`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub phone_number: Option<String>,
    pub password: String,
}

/// Payload for `POST /api/identity/forgot-password`.
#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Payload for `POST /api/identity/reset-password`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub token: String,
    pub password: String,
}

/// Successful registration: the new user's id plus user-facing messages.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationOutcome {
    pub user_id: Uuid,
    pub messages: Vec<String>,
}

/// Successful email/phone confirmation.
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmationOutcome {
    pub user_id: Uuid,
    pub message: String,
}

/// A bare user-facing message (password reset flows).
#[derive(Debug, Clone, Serialize)]
pub struct MessageOutcome {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_blank_phone_is_none() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"username":"jdoe","first_name":"Jane","last_name":"Doe",
                "email":"jane@example.com","phone_number":"  ","password":"hunter22"}"#,
        )
        .unwrap();

        assert_eq!(req.phone_number, None);
    }

    #[test]
    fn test_user_is_tenant_scoped() {
        assert!(User::TENANT_SCOPED);
        assert_eq!(User::TYPE_NAME, "User");
    }
}
