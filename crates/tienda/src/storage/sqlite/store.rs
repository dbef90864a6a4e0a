//! SQLite-backed entity store with a staged change set.
//!
//! Reads go straight to the database; writes are staged in memory and
//! committed as one transaction by [`SqliteStore::save_changes`]. Each
//! HTTP request gets its own unit of work via
//! [`SqliteStore::unit_of_work`], sharing the underlying connection.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::types::Value;
use tokio_rusqlite::Connection;
use tracing::debug;
use uuid::Uuid;

use tienda_core::storage::{RepositoryError, Result};
use tienda_core::tenant::TenantId;

use super::error::{
    map_rusqlite_error_with_id, map_tokio_rusqlite_error, map_tokio_rusqlite_error_with_id,
    wrap_err,
};
use super::schema;
use super::table::Table;
use crate::storage::{EntityStore, SqlParams, TENANT_PLACEHOLDER};

#[derive(Debug, Clone, Copy, PartialEq)]
enum OpKind {
    Insert,
    Update,
    Delete,
}

/// One staged write, carrying everything needed to both execute it at
/// commit time and overlay it on tracked reads beforehand.
struct StagedOp {
    kind: OpKind,
    entity_type: &'static str,
    table: &'static str,
    columns: &'static [&'static str],
    id: Uuid,
    row: Vec<Value>,
    snapshot: serde_json::Value,
}

#[derive(Clone)]
pub struct SqliteStore {
    conn: Connection,
    pending: Arc<Mutex<Vec<StagedOp>>>,
}

impl SqliteStore {
    /// Opens (or creates) a database file and prepares the schema.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;
        let store = Self {
            conn,
            pending: Arc::new(Mutex::new(Vec::new())),
        };
        store.init_schema().await?;
        Ok(store)
    }

    /// Opens an in-memory database. Used by tests and ephemeral setups.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;
        let store = Self {
            conn,
            pending: Arc::new(Mutex::new(Vec::new())),
        };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        self.conn
            .call(|conn| conn.execute_batch(schema::CREATE_TABLES).map_err(wrap_err))
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Schema"))
    }

    /// A fresh unit of work over the same connection: empty pending set,
    /// shared committed state.
    pub fn unit_of_work(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            pending: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn pending(&self) -> Result<MutexGuard<'_, Vec<StagedOp>>> {
        self.pending
            .lock()
            .map_err(|_| RepositoryError::QueryFailed("pending change set lock poisoned".to_string()))
    }

    fn stage<E: Table>(&self, kind: OpKind, entity: &E) -> Result<()> {
        let snapshot = serde_json::to_value(entity)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        self.pending()?.push(StagedOp {
            kind,
            entity_type: E::TYPE_NAME,
            table: E::TABLE,
            columns: E::COLUMNS,
            id: entity.id(),
            row: entity.to_row(),
            snapshot,
        });
        Ok(())
    }

    fn from_snapshot<E: Table>(op: &StagedOp) -> Result<E> {
        serde_json::from_value(op.snapshot.clone())
            .map_err(|e| RepositoryError::Serialization(e.to_string()))
    }

    async fn select_all<E: Table>(&self, sql: String) -> Result<Vec<E>> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql).map_err(wrap_err)?;
                let rows = stmt.query_map([], E::from_row).map_err(wrap_err)?;
                rows.collect::<rusqlite::Result<Vec<E>>>().map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, E::TYPE_NAME))
    }
}

#[async_trait]
impl EntityStore for SqliteStore {
    async fn list_untracked<E: Table>(&self) -> Result<Vec<E>> {
        self.select_all(select_sql(E::TABLE, E::COLUMNS)).await
    }

    async fn list_tracked<E: Table>(&self) -> Result<Vec<E>> {
        let mut entities: Vec<E> = self.list_untracked().await?;

        // Overlay the pending change set in staging order.
        let pending = self.pending()?;
        for op in pending.iter().filter(|op| op.table == E::TABLE) {
            match op.kind {
                OpKind::Insert => entities.push(Self::from_snapshot(op)?),
                OpKind::Update => {
                    if let Some(slot) = entities.iter_mut().find(|e| e.id() == op.id) {
                        *slot = Self::from_snapshot(op)?;
                    }
                }
                OpKind::Delete => entities.retain(|e| e.id() != op.id),
            }
        }
        Ok(entities)
    }

    async fn page<E: Table>(&self, offset: usize, limit: usize) -> Result<Vec<E>> {
        let sql = format!(
            "{} LIMIT ?1 OFFSET ?2",
            select_sql(E::TABLE, E::COLUMNS)
        );
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql).map_err(wrap_err)?;
                let rows = stmt
                    .query_map([limit as i64, offset as i64], E::from_row)
                    .map_err(wrap_err)?;
                rows.collect::<rusqlite::Result<Vec<E>>>().map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, E::TYPE_NAME))
    }

    async fn find<E: Table>(&self, id: Uuid) -> Result<Option<E>> {
        // Pending ops first, newest wins, like an identity map.
        {
            let pending = self.pending()?;
            if let Some(op) = pending
                .iter()
                .rev()
                .find(|op| op.table == E::TABLE && op.id == id)
            {
                return match op.kind {
                    OpKind::Delete => Ok(None),
                    OpKind::Insert | OpKind::Update => Self::from_snapshot(op).map(Some),
                };
            }
        }

        let sql = format!(
            "{} WHERE id = ?1 LIMIT 1",
            select_sql(E::TABLE, E::COLUMNS)
        );
        let id_str = id.to_string();
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql).map_err(wrap_err)?;
                let mut rows = stmt
                    .query_map([id_str], E::from_row)
                    .map_err(wrap_err)?;
                rows.next().transpose().map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, E::TYPE_NAME, id.to_string()))
    }

    async fn any<E: Table>(&self) -> Result<bool> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {})", E::TABLE);
        self.conn
            .call(move |conn| {
                conn.query_row(&sql, [], |row| row.get::<_, bool>(0))
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, E::TYPE_NAME))
    }

    fn stage_insert<E: Table>(&self, entity: &E) -> Result<()> {
        self.stage(OpKind::Insert, entity)
    }

    fn stage_update<E: Table>(&self, entity: &E) -> Result<()> {
        self.stage(OpKind::Update, entity)
    }

    fn stage_delete<E: Table>(&self, entity: &E) -> Result<()> {
        self.stage(OpKind::Delete, entity)
    }

    async fn save_changes(&self) -> Result<usize> {
        // Snapshot the ops without draining; the pending set is cleared
        // only after the transaction commits.
        let ops: Vec<(&'static str, String, Vec<Value>, String)> = {
            let pending = self.pending()?;
            pending
                .iter()
                .map(|op| {
                    let sql = match op.kind {
                        OpKind::Insert => insert_sql(op.table, op.columns),
                        OpKind::Update => update_sql(op.table, op.columns),
                        OpKind::Delete => delete_sql(op.table),
                    };
                    let params = match op.kind {
                        OpKind::Delete => vec![Value::Text(op.id.to_string())],
                        _ => op.row.clone(),
                    };
                    (op.entity_type, sql, params, op.id.to_string())
                })
                .collect()
        };

        if ops.is_empty() {
            return Ok(0);
        }
        debug!(staged = ops.len(), "committing staged operations");

        let affected = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                let mut affected = 0;
                for (entity_type, sql, params, id) in &ops {
                    affected += tx
                        .execute(sql, rusqlite::params_from_iter(params.iter()))
                        .map_err(|e| {
                            tokio_rusqlite::Error::Other(Box::new(map_rusqlite_error_with_id(
                                &e,
                                *entity_type,
                                id,
                            )))
                        })?;
                }
                tx.commit().map_err(wrap_err)?;
                Ok(affected)
            })
            .await
            .map_err(|e| match e {
                tokio_rusqlite::Error::Other(boxed) => match boxed.downcast::<RepositoryError>() {
                    Ok(repo_err) => *repo_err,
                    Err(other) => RepositoryError::QueryFailed(other.to_string()),
                },
                other => map_tokio_rusqlite_error(other, "Transaction"),
            })?;

        self.pending()?.clear();
        Ok(affected)
    }

    async fn query<E: Table>(
        &self,
        sql: &str,
        params: SqlParams,
        tenant: &TenantId,
    ) -> Result<Vec<E>> {
        if E::TENANT_SCOPED && !sql.contains(TENANT_PLACEHOLDER) {
            return Err(RepositoryError::MissingTenantPlaceholder {
                entity_type: E::TYPE_NAME,
            });
        }

        let sql = sql.to_string();
        let tenant_value = Value::Text(tenant.as_str().to_string());
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql).map_err(wrap_err)?;

                // The tenant id is bound as a real named parameter; it is
                // never spliced into the SQL text.
                if let Some(idx) = stmt.parameter_index(TENANT_PLACEHOLDER).map_err(wrap_err)? {
                    stmt.raw_bind_parameter(idx, &tenant_value).map_err(wrap_err)?;
                }
                for (name, value) in &params {
                    if let Some(idx) = stmt.parameter_index(name).map_err(wrap_err)? {
                        stmt.raw_bind_parameter(idx, value).map_err(wrap_err)?;
                    }
                }

                let mut rows = stmt.raw_query();
                let mut entities = Vec::new();
                while let Some(row) = rows.next().map_err(wrap_err)? {
                    entities.push(E::from_row(row).map_err(wrap_err)?);
                }
                Ok(entities)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, E::TYPE_NAME))
    }
}

// ============================================================================
// SQL generation
// ============================================================================

fn select_sql(table: &str, columns: &[&str]) -> String {
    format!(
        "SELECT {} FROM {} ORDER BY rowid",
        columns.join(", "),
        table
    )
}

fn insert_sql(table: &str, columns: &[&str]) -> String {
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// Full-row update keyed on the first column (the primary key).
fn update_sql(table: &str, columns: &[&str]) -> String {
    let assignments: Vec<String> = columns
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, col)| format!("{} = ?{}", col, i + 1))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE {} = ?1",
        table,
        assignments.join(", "),
        columns[0]
    )
}

fn delete_sql(table: &str) -> String {
    format!("DELETE FROM {table} WHERE id = ?1")
}
