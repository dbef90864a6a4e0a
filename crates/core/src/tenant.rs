//! Tenant identity and the per-request tenant context.
//!
//! Every tenant-scoped operation takes the context as an explicit
//! parameter; there is no ambient/thread-local tenant state.

use serde::{Deserialize, Serialize};

/// A logical partition of data belonging to one customer/organization
/// within the shared store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TenantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Context carried with every tenant-scoped call.
///
/// Handlers build one per request from the `x-tenant-id` header and pass
/// it down to the repository and services.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub tenant_id: TenantId,
}

impl TenantContext {
    pub fn new(tenant: impl Into<String>) -> Self {
        Self {
            tenant_id: TenantId::new(tenant),
        }
    }
}
