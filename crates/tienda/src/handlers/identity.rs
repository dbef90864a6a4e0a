//! Identity endpoints: registration, confirmation, password reset.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use tienda_core::identity::{
    ConfirmationOutcome, ForgotPasswordRequest, MessageOutcome, RegisterRequest,
    RegistrationOutcome, ResetPasswordRequest,
};
use tienda_core::tenant::{TenantContext, TenantId};

use crate::context::RequestContext;
use crate::state::AppState;

use super::AppError;

const DEFAULT_LOCALE: &str = "en-US";

/// Query parameters of the mailed confirmation link.
///
/// The tenant rides in the query string here because the link is opened
/// from a mail client, which cannot set the tenant header.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmEmailParams {
    pub tenant: String,
    pub user_id: Uuid,
    pub code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPhoneParams {
    pub user_id: Uuid,
    pub code: String,
}

/// Register a new user (POST /api/identity/register).
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegistrationOutcome>), AppError> {
    let outcome = state
        .identity
        .register(&ctx.tenant, request, &ctx.locale, &state.public_url)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// Confirm an email address from the mailed link (GET /api/identity/confirm-email).
#[axum::debug_handler]
pub async fn confirm_email(
    State(state): State<AppState>,
    Query(params): Query<ConfirmEmailParams>,
) -> Result<Json<ConfirmationOutcome>, AppError> {
    let tenant = TenantContext {
        tenant_id: TenantId::new(params.tenant),
    };
    let outcome = state
        .identity
        .confirm_email(&tenant, params.user_id, &params.code, DEFAULT_LOCALE)
        .await?;
    Ok(Json(outcome))
}

/// Confirm a phone number (GET /api/identity/confirm-phone-number).
#[axum::debug_handler]
pub async fn confirm_phone_number(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(params): Query<ConfirmPhoneParams>,
) -> Result<Json<ConfirmationOutcome>, AppError> {
    let outcome = state
        .identity
        .confirm_phone_number(&ctx.tenant, params.user_id, &params.code, &ctx.locale)
        .await?;
    Ok(Json(outcome))
}

/// Request a password-reset mail (POST /api/identity/forgot-password).
#[axum::debug_handler]
pub async fn forgot_password(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageOutcome>, AppError> {
    let outcome = state
        .identity
        .forgot_password(&ctx.tenant, request, &ctx.locale)
        .await?;
    Ok(Json(outcome))
}

/// Reset a password with a mailed token (POST /api/identity/reset-password).
#[axum::debug_handler]
pub async fn reset_password(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<MessageOutcome>, AppError> {
    let outcome = state
        .identity
        .reset_password(&ctx.tenant, request, &ctx.locale)
        .await?;
    Ok(Json(outcome))
}
