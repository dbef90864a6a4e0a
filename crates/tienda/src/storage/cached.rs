//! Cache-aside repository facade.
//!
//! Wraps an [`EntityStore`] unit of work with read-through DTO caching:
//! - **DTO reads**: check cache first; on a hit refresh the TTL, on a miss
//!   fetch from the store, map, and populate the cache
//! - **Writes**: staged on the store; `remove` evicts the cached DTO
//!   eagerly, `update` leaves it in place unless invalidation is enabled

use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use tienda_core::cache::{deserialize_dto, entity_key, serialize_dto, Cache};
use tienda_core::storage::{PageRequest, RepositoryError, Result};
use tienda_core::tenant::TenantId;

use super::{EntityStore, SqlParams, Table};

/// Repository facade over one unit of work.
///
/// # Type Parameters
///
/// * `S` - The underlying entity store (unit of work)
/// * `C` - The cache implementation
pub struct CachedRepository<S, C>
where
    S: EntityStore,
    C: Cache,
{
    store: S,
    cache: Arc<C>,
    ttl: Duration,
    invalidate_on_update: bool,
}

impl<S, C> CachedRepository<S, C>
where
    S: EntityStore,
    C: Cache + 'static,
{
    pub fn new(store: S, cache: Arc<C>, ttl: Duration) -> Self {
        Self {
            store,
            cache,
            ttl,
            invalidate_on_update: false,
        }
    }

    /// Enables cached-DTO eviction on `update`. Off by default: an updated
    /// entity's cached DTO stays stale until its TTL expires.
    pub fn with_update_invalidation(mut self, enabled: bool) -> Self {
        self.invalidate_on_update = enabled;
        self
    }

    /// All entities matching `predicate`, filtered in memory.
    ///
    /// With `no_tracking` the committed snapshot is read as-is; otherwise
    /// the unit of work's staged changes are overlaid.
    pub async fn get_list<E, F>(&self, predicate: F, no_tracking: bool) -> Result<Vec<E>>
    where
        E: Table,
        F: Fn(&E) -> bool + Send,
    {
        let mut entities = if no_tracking {
            self.store.list_untracked::<E>().await?
        } else {
            self.store.list_tracked::<E>().await?
        };
        entities.retain(|e| predicate(e));
        Ok(entities)
    }

    /// The entity with the given id, or `NotFound`.
    pub async fn get_by_id<E: Table>(&self, id: Uuid) -> Result<E> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(E::TYPE_NAME, id))
    }

    /// Read-through DTO lookup.
    ///
    /// A cache hit re-arms the entry's TTL and never touches the store. On
    /// a miss the entity is fetched, mapped to `D`, cached, and returned.
    /// A hit that fails to deserialize is a hard error, not a miss: it
    /// means the cached shape diverged from `D`.
    pub async fn get_cached_dto_by_id<E, D>(&self, id: Uuid) -> Result<D>
    where
        E: Table,
        D: From<E> + Serialize + DeserializeOwned + Send,
    {
        let cache_key = entity_key(E::TYPE_NAME, id);

        match self.cache.get(&cache_key).await {
            Ok(Some(bytes)) => {
                tracing::trace!(entity = E::TYPE_NAME, %id, "cache hit");
                if let Err(err) = self.cache.refresh(&cache_key).await {
                    tracing::warn!(key = %cache_key, error = %err, "failed to refresh cache entry");
                }
                return deserialize_dto(&bytes)
                    .map_err(|e| RepositoryError::Serialization(e.to_string()));
            }
            Ok(None) => {
                tracing::trace!(entity = E::TYPE_NAME, %id, "cache miss");
            }
            Err(err) => {
                // Cache unavailable: fall through to the store.
                tracing::warn!(key = %cache_key, error = %err, "cache read failed");
            }
        }

        let entity: E = self
            .store
            .find(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(E::TYPE_NAME, id))?;
        let dto = D::from(entity);

        match serialize_dto(&dto) {
            Ok(bytes) => {
                if let Err(err) = self.cache.set(&cache_key, &bytes, Some(self.ttl)).await {
                    tracing::warn!(key = %cache_key, error = %err, "failed to cache dto");
                }
            }
            Err(err) => {
                tracing::warn!(key = %cache_key, error = %err, "failed to serialize dto");
            }
        }

        Ok(dto)
    }

    /// One page of the committed snapshot, insertion-ordered.
    ///
    /// Page numbers are 1-based; values below 1 clamp to the first page.
    pub async fn get_paginated_list<E: Table>(&self, page: &PageRequest) -> Result<Vec<E>> {
        self.store.page(page.offset(), page.limit()).await
    }

    /// Stages an insert and returns the entity's id. Nothing is persisted
    /// until [`CachedRepository::save_changes`].
    pub fn create<E: Table>(&self, entity: &E) -> Result<Uuid> {
        self.store.stage_insert(entity)?;
        Ok(entity.id())
    }

    /// True when the table has at least one committed row.
    pub async fn exists<E: Table>(&self) -> Result<bool> {
        self.store.any::<E>().await
    }

    /// True when any committed row matches `predicate`.
    pub async fn exists_matching<E, F>(&self, predicate: F) -> Result<bool>
    where
        E: Table,
        F: Fn(&E) -> bool + Send,
    {
        let rows = self.store.list_untracked::<E>().await?;
        Ok(rows.iter().any(predicate))
    }

    /// Stages a delete and eagerly evicts the entity's cached DTO, so a
    /// concurrent read between staging and commit cannot resurrect it.
    pub async fn remove<E: Table>(&self, entity: &E) -> Result<()> {
        self.store.stage_delete(entity)?;

        let cache_key = entity_key(E::TYPE_NAME, entity.id());
        if let Err(err) = self.cache.delete(&cache_key).await {
            tracing::warn!(key = %cache_key, error = %err, "failed to evict cached dto");
        }
        Ok(())
    }

    /// Full-replace update: the entity must exist, then the new state is
    /// staged. The cached DTO is left alone unless
    /// [`CachedRepository::with_update_invalidation`] enabled eviction.
    pub async fn update<E: Table>(&self, entity: &E) -> Result<()> {
        let id = entity.id();
        if self.store.find::<E>(id).await?.is_none() {
            return Err(RepositoryError::not_found(E::TYPE_NAME, id));
        }
        self.store.stage_update(entity)?;

        if self.invalidate_on_update {
            let cache_key = entity_key(E::TYPE_NAME, id);
            if let Err(err) = self.cache.delete(&cache_key).await {
                tracing::warn!(key = %cache_key, error = %err, "failed to evict cached dto");
            }
        }
        Ok(())
    }

    /// Raw parameterized SQL, tenant-scoped for tenant-owned types.
    pub async fn query<E: Table>(
        &self,
        sql: &str,
        params: SqlParams,
        tenant: &TenantId,
    ) -> Result<Vec<E>> {
        self.store.query(sql, params, tenant).await
    }

    /// First row of the query; `NotFound` when it returns nothing.
    pub async fn query_first_or_default<E: Table>(
        &self,
        sql: &str,
        params: SqlParams,
        tenant: &TenantId,
    ) -> Result<E> {
        let mut rows = self.store.query(sql, params, tenant).await?;
        if rows.is_empty() {
            return Err(RepositoryError::NotFound {
                entity_type: E::TYPE_NAME,
                id: "no row matched the query".to_string(),
            });
        }
        Ok(rows.remove(0))
    }

    /// Exactly one row; anything else is an `UnexpectedRowCount` error.
    pub async fn query_single<E: Table>(
        &self,
        sql: &str,
        params: SqlParams,
        tenant: &TenantId,
    ) -> Result<E> {
        let mut rows = self.store.query::<E>(sql, params, tenant).await?;
        match rows.len() {
            1 => Ok(rows.remove(0)),
            n => Err(RepositoryError::UnexpectedRowCount {
                entity_type: E::TYPE_NAME,
                expected: 1,
                actual: n,
            }),
        }
    }

    /// Commits every staged operation in one transaction.
    pub async fn save_changes(&self) -> Result<usize> {
        self.store.save_changes().await
    }
}
