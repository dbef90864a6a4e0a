//! Product catalog entity and its read projection.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{AuditStamp, Entity, HasTenant};
use crate::tenant::TenantId;

/// A catalog product. Tenant-scoped: every query against products is
/// filtered to the caller's tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub name: String,
    pub description: String,
    pub rate: f64,
    #[serde(flatten)]
    pub audit: AuditStamp,
}

impl Product {
    /// Creates a new product for the given tenant.
    pub fn new(
        tenant_id: TenantId,
        name: impl Into<String>,
        description: impl Into<String>,
        rate: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            name: name.into(),
            description: description.into(),
            rate,
            audit: AuditStamp::now(None),
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_actor(mut self, actor: Uuid) -> Self {
        self.audit.created_by = Some(actor);
        self.audit.updated_by = Some(actor);
        self
    }
}

impl Entity for Product {
    const TYPE_NAME: &'static str = "Product";
    const TENANT_SCOPED: bool = true;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl HasTenant for Product {
    fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}

/// Read-only projection of a [`Product`] shaped for external consumption.
///
/// Never persisted; produced by mapping from the entity and stored in the
/// cache as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub rate: f64,
}

impl From<Product> for ProductDetails {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            rate: product.rate,
        }
    }
}
