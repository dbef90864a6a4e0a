//! Axum extractor for RequestContext.
//!
//! Every API route requires an `x-tenant-id` header; requests without
//! one are rejected with 400 before any handler runs.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, StatusCode},
};
use uuid::Uuid;

use tienda_core::tenant::{TenantContext, TenantId};

use super::types::{RequestContext, RequestId};

const TENANT_HEADER: &str = "x-tenant-id";
const DEFAULT_LOCALE: &str = "en-US";

fn extract_request_id(headers: &HeaderMap) -> RequestId {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .map(RequestId::from_uuid)
        .unwrap_or_else(RequestId::new)
}

fn extract_tenant(headers: &HeaderMap) -> Option<TenantId> {
    headers
        .get(TENANT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(TenantId::new)
}

/// First tag of the `accept-language` header, quality weights ignored.
fn extract_locale(headers: &HeaderMap) -> String {
    headers
        .get("accept-language")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.split(';').next().unwrap_or(s).trim().to_string())
        .filter(|s| !s.is_empty() && s != "*")
        .unwrap_or_else(|| DEFAULT_LOCALE.to_string())
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let tenant_id = extract_tenant(&parts.headers).ok_or((
            StatusCode::BAD_REQUEST,
            format!("Missing required header: {TENANT_HEADER}"),
        ))?;

        Ok(RequestContext {
            tenant: TenantContext { tenant_id },
            locale: extract_locale(&parts.headers),
            request_id: extract_request_id(&parts.headers),
        })
    }
}
