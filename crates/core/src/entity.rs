//! The persisted-entity contract.

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::tenant::TenantId;

/// A persisted record type.
///
/// Every entity has a stable type name (used for cache keys and error
/// messages) and a primary-key accessor. `TENANT_SCOPED` marks types whose
/// rows belong to a tenant partition; the invariant is that it is `true`
/// exactly for types that also implement [`HasTenant`].
pub trait Entity:
    Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Stable type name, e.g. `"Product"`.
    const TYPE_NAME: &'static str;

    /// Whether queries against this type must be tenant-filtered.
    const TENANT_SCOPED: bool = false;

    fn id(&self) -> Uuid;
}

/// An entity variant additionally carrying a tenant attribute.
pub trait HasTenant: Entity {
    fn tenant_id(&self) -> &TenantId;
}

/// Audit metadata carried on persisted entities.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AuditStamp {
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub created_by: Option<Uuid>,
    #[serde(default)]
    pub updated_by: Option<Uuid>,
}

impl AuditStamp {
    /// A fresh stamp for a newly created entity.
    pub fn now(actor: Option<Uuid>) -> Self {
        let ts = chrono::Utc::now();
        Self {
            created_at: ts,
            updated_at: ts,
            created_by: actor,
            updated_by: actor,
        }
    }

    /// Marks the entity as modified by `actor`.
    pub fn touch(&mut self, actor: Option<Uuid>) {
        self.updated_at = chrono::Utc::now();
        self.updated_by = actor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_stamp_now_sets_both_timestamps() {
        let actor = Uuid::new_v4();
        let stamp = AuditStamp::now(Some(actor));

        assert_eq!(stamp.created_at, stamp.updated_at);
        assert_eq!(stamp.created_by, Some(actor));
        assert_eq!(stamp.updated_by, Some(actor));
    }

    #[test]
    fn test_audit_stamp_touch_updates_modified_fields_only() {
        let creator = Uuid::new_v4();
        let editor = Uuid::new_v4();
        let mut stamp = AuditStamp::now(Some(creator));
        let created_at = stamp.created_at;

        stamp.touch(Some(editor));

        assert_eq!(stamp.created_at, created_at);
        assert_eq!(stamp.created_by, Some(creator));
        assert!(stamp.updated_at >= created_at);
        assert_eq!(stamp.updated_by, Some(editor));
    }
}
