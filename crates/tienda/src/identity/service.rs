//! Identity flows: registration, confirmation, password reset.
//!
//! All user-facing strings go through the localizer with the caller's
//! locale; all mail is enqueued as background jobs. The tenant arrives
//! as an explicit parameter on every call.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use rand::distr::Alphanumeric;
use rand::Rng;
use url::Url;
use uuid::Uuid;

use tienda_core::cache::Cache;
use tienda_core::identity::{
    ConfirmationOutcome, ForgotPasswordRequest, IdentityError, MessageOutcome, RegisterRequest,
    RegistrationOutcome, ResetPasswordRequest, Result, User,
};
use tienda_core::tenant::TenantContext;

use super::mail::{MailQueue, MailRequest};
use super::manager::UserStore;
use crate::localization::JsonLocalizer;

const TOKEN_LEN: usize = 32;

fn generate_token() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Six digits, the shape a phone keypad expects.
fn generate_phone_code() -> String {
    format!("{:06}", rand::rng().random_range(0..1_000_000u32))
}

/// Tokens travel in URLs, so they are base64url-encoded without padding.
fn encode_code(token: &str) -> String {
    URL_SAFE_NO_PAD.encode(token.as_bytes())
}

fn decode_code(code: &str) -> Result<String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(code.as_bytes())
        .map_err(|_| IdentityError::InvalidToken)?;
    String::from_utf8(bytes).map_err(|_| IdentityError::InvalidToken)
}

pub struct IdentityService<U: UserStore, C: Cache> {
    users: U,
    localizer: Arc<JsonLocalizer<C>>,
    mail: MailQueue,
    /// When set, new accounts start inactive and must confirm their
    /// email address first.
    verification_required: bool,
}

impl<U: UserStore, C: Cache> IdentityService<U, C> {
    pub fn new(
        users: U,
        localizer: Arc<JsonLocalizer<C>>,
        mail: MailQueue,
        verification_required: bool,
    ) -> Self {
        Self {
            users,
            localizer,
            mail,
            verification_required,
        }
    }

    pub async fn register(
        &self,
        tenant: &TenantContext,
        request: RegisterRequest,
        locale: &str,
        origin: &Url,
    ) -> Result<RegistrationOutcome> {
        let tenant_id = &tenant.tenant_id;

        if self
            .users
            .find_by_username(tenant_id, &request.username)
            .await?
            .is_some()
        {
            return Err(IdentityError::UsernameTaken(request.username));
        }
        if self
            .users
            .find_by_email(tenant_id, &request.email)
            .await?
            .is_some()
        {
            return Err(IdentityError::EmailTaken(request.email));
        }
        if let Some(phone) = &request.phone_number {
            if self.users.find_by_phone(tenant_id, phone).await?.is_some() {
                return Err(IdentityError::PhoneTaken(phone.clone()));
            }
        }

        let password_hash = bcrypt::hash(&request.password, bcrypt::DEFAULT_COST)
            .map_err(|e| IdentityError::Hashing(e.to_string()))?;

        let now = Utc::now();
        let email_token = self.verification_required.then(generate_token);
        let phone_token = (self.verification_required && request.phone_number.is_some())
            .then(generate_phone_code);
        let user = User {
            id: Uuid::new_v4(),
            tenant_id: tenant_id.clone(),
            username: request.username.clone(),
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email.clone(),
            phone_number: request.phone_number,
            password_hash,
            is_active: !self.verification_required,
            email_confirmed: !self.verification_required,
            phone_confirmed: false,
            email_token: email_token.clone(),
            phone_token: phone_token.clone(),
            reset_token: None,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(&user).await?;

        let mut messages = vec![
            self.localizer
                .format(locale, "identity.registered", &[&request.username])
                .await,
        ];

        if let Some(token) = email_token {
            let confirm_url =
                confirmation_url(origin, tenant_id.as_str(), user.id, &encode_code(&token))?;
            self.mail.enqueue(MailRequest {
                to: request.email.clone(),
                subject: self
                    .localizer
                    .get(locale, "identity.confirm-email-subject")
                    .await,
                body: self
                    .localizer
                    .format(
                        locale,
                        "identity.confirm-email-body",
                        &[confirm_url.as_str()],
                    )
                    .await,
            });
            messages.push(
                self.localizer
                    .format(locale, "identity.check-email", &[&request.email])
                    .await,
            );
        }

        if let Some(code) = phone_token {
            // No SMS provider is wired up; the code rides the mail queue
            // like every other outbound notification.
            self.mail.enqueue(MailRequest {
                to: request.email.clone(),
                subject: self
                    .localizer
                    .get(locale, "identity.confirm-phone-subject")
                    .await,
                body: self
                    .localizer
                    .format(locale, "identity.confirm-phone-body", &[&code])
                    .await,
            });
            messages.push(self.localizer.get(locale, "identity.check-phone").await);
        }

        tracing::info!(user_id = %user.id, tenant = %tenant_id, "user registered");
        Ok(RegistrationOutcome {
            user_id: user.id,
            messages,
        })
    }

    pub async fn confirm_email(
        &self,
        tenant: &TenantContext,
        user_id: Uuid,
        code: &str,
        locale: &str,
    ) -> Result<ConfirmationOutcome> {
        let mut user = self
            .users
            .find_by_id(&tenant.tenant_id, user_id)
            .await?
            .ok_or(IdentityError::InvalidToken)?;

        let token = decode_code(code)?;
        if user.email_token.as_deref() != Some(token.as_str()) {
            return Err(IdentityError::InvalidToken);
        }

        user.email_confirmed = true;
        user.is_active = true;
        user.email_token = None;
        user.updated_at = Utc::now();
        self.users.update(&user).await?;

        let key = if user.phone_number.is_some() && !user.phone_confirmed {
            "identity.email-then-phone"
        } else {
            "identity.email-confirmed"
        };
        let message = self.localizer.format(locale, key, &[&user.email]).await;

        tracing::info!(%user_id, tenant = %tenant.tenant_id, "email confirmed");
        Ok(ConfirmationOutcome { user_id, message })
    }

    pub async fn confirm_phone_number(
        &self,
        tenant: &TenantContext,
        user_id: Uuid,
        code: &str,
        locale: &str,
    ) -> Result<ConfirmationOutcome> {
        let mut user = self
            .users
            .find_by_id(&tenant.tenant_id, user_id)
            .await?
            .ok_or(IdentityError::InvalidToken)?;

        if user.phone_token.as_deref() != Some(code) {
            return Err(IdentityError::InvalidToken);
        }

        user.phone_confirmed = true;
        user.phone_token = None;
        user.updated_at = Utc::now();
        self.users.update(&user).await?;

        let phone = user.phone_number.clone().unwrap_or_default();
        let message = self
            .localizer
            .format(locale, "identity.phone-confirmed", &[&phone])
            .await;

        tracing::info!(%user_id, tenant = %tenant.tenant_id, "phone confirmed");
        Ok(ConfirmationOutcome { user_id, message })
    }

    pub async fn forgot_password(
        &self,
        tenant: &TenantContext,
        request: ForgotPasswordRequest,
        locale: &str,
    ) -> Result<MessageOutcome> {
        // Opaque on unknown or unconfirmed email so the endpoint cannot be
        // used to probe which addresses have accounts.
        let mut user = self
            .users
            .find_by_email(&tenant.tenant_id, &request.email)
            .await?
            .filter(|u| u.email_confirmed)
            .ok_or(IdentityError::Opaque)?;

        let token = generate_token();
        user.reset_token = Some(token.clone());
        user.updated_at = Utc::now();
        self.users.update(&user).await?;

        self.mail.enqueue(MailRequest {
            to: user.email.clone(),
            subject: self
                .localizer
                .get(locale, "identity.reset-email-subject")
                .await,
            body: self
                .localizer
                .format(
                    locale,
                    "identity.reset-email-body",
                    &[&token, "/api/identity/reset-password"],
                )
                .await,
        });

        tracing::info!(user_id = %user.id, tenant = %tenant.tenant_id, "password reset requested");
        Ok(MessageOutcome {
            message: self.localizer.get(locale, "identity.reset-email-sent").await,
        })
    }

    pub async fn reset_password(
        &self,
        tenant: &TenantContext,
        request: ResetPasswordRequest,
        locale: &str,
    ) -> Result<MessageOutcome> {
        let mut user = self
            .users
            .find_by_email(&tenant.tenant_id, &request.email)
            .await?
            .ok_or(IdentityError::Opaque)?;

        if user.reset_token.as_deref() != Some(request.token.as_str()) {
            return Err(IdentityError::InvalidToken);
        }

        user.password_hash = bcrypt::hash(&request.password, bcrypt::DEFAULT_COST)
            .map_err(|e| IdentityError::Hashing(e.to_string()))?;
        user.reset_token = None;
        user.updated_at = Utc::now();
        self.users.update(&user).await?;

        tracing::info!(user_id = %user.id, tenant = %tenant.tenant_id, "password reset");
        Ok(MessageOutcome {
            message: self.localizer.get(locale, "identity.password-reset").await,
        })
    }
}

fn confirmation_url(origin: &Url, tenant: &str, user_id: Uuid, code: &str) -> Result<Url> {
    let mut url = origin
        .join("api/identity/confirm-email")
        .map_err(|_| IdentityError::Opaque)?;
    url.query_pairs_mut()
        .append_pair("tenant", tenant)
        .append_pair("userId", &user_id.to_string())
        .append_pair("code", code);
    Ok(url)
}
