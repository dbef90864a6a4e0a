//! Storage: the SQLite entity store and the cache-aside repository facade.
//!
//! [`EntityStore`] is the seam between the repository facade and the
//! concrete store. The production implementation is [`SqliteStore`];
//! tests substitute counting mocks to observe cache-aside behavior.

pub mod cached;
pub mod sqlite;

use async_trait::async_trait;
use uuid::Uuid;

use tienda_core::storage::Result;
use tienda_core::tenant::TenantId;

pub use cached::CachedRepository;
pub use sqlite::{SqliteStore, Table};

/// The literal token SQL authors embed where the caller's tenant id must
/// be bound. It is bound as a named parameter, never textually replaced.
pub const TENANT_PLACEHOLDER: &str = "@tenantId";

/// Named parameters for raw SQL (rusqlite `@name` style).
pub type SqlParams = Vec<(&'static str, rusqlite::types::Value)>;

/// Contract consumed by [`CachedRepository`].
///
/// `stage_*` mutate the store's pending change set (one logical unit of
/// work, not safe to share across concurrent callers); nothing touches
/// the database until [`EntityStore::save_changes`] commits all staged
/// operations in a single transaction.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// All rows, committed snapshot only.
    async fn list_untracked<E: Table>(&self) -> Result<Vec<E>>;

    /// All rows with the pending change set overlaid: staged inserts
    /// visible, staged deletes hidden, staged updates applied.
    async fn list_tracked<E: Table>(&self) -> Result<Vec<E>>;

    /// One page of rows in insertion order, committed snapshot only.
    async fn page<E: Table>(&self, offset: usize, limit: usize) -> Result<Vec<E>>;

    /// Lookup by primary key; consults the pending change set first,
    /// like an identity map.
    async fn find<E: Table>(&self, id: Uuid) -> Result<Option<E>>;

    /// True when the table has at least one committed row.
    async fn any<E: Table>(&self) -> Result<bool>;

    fn stage_insert<E: Table>(&self, entity: &E) -> Result<()>;

    fn stage_update<E: Table>(&self, entity: &E) -> Result<()>;

    fn stage_delete<E: Table>(&self, entity: &E) -> Result<()>;

    /// Commits all staged operations in one transaction and returns the
    /// affected row count. The pending set is drained only on success.
    async fn save_changes(&self) -> Result<usize>;

    /// Executes raw parameterized SQL. For `E::TENANT_SCOPED` types the
    /// SQL must contain [`TENANT_PLACEHOLDER`], which is bound to the
    /// caller's tenant id; its absence is an error.
    async fn query<E: Table>(
        &self,
        sql: &str,
        params: SqlParams,
        tenant: &TenantId,
    ) -> Result<Vec<E>>;
}
