//! Per-entity SQLite row binding.
//!
//! [`Table`] extends the domain [`Entity`] contract with the metadata the
//! store needs to generate DML and convert rows. Conversions are pure
//! functions, testable in isolation without database access.

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::Row;
use uuid::Uuid;

use tienda_core::catalog::Product;
use tienda_core::entity::{AuditStamp, Entity};
use tienda_core::identity::User;
use tienda_core::tenant::TenantId;

/// An [`Entity`] that maps onto a SQLite table.
///
/// `COLUMNS` lists column names in declaration order with the primary key
/// first; [`Table::to_row`] must produce values in the same order.
pub trait Table: Entity {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    /// Binds the entity as one value per column, `COLUMNS` order.
    fn to_row(&self) -> Vec<Value>;

    /// Converts a row selected with `COLUMNS` order back to the entity.
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

impl Table for Product {
    const TABLE: &'static str = "products";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "tenant_id",
        "name",
        "description",
        "rate",
        "created_at",
        "updated_at",
        "created_by",
        "updated_by",
    ];

    fn to_row(&self) -> Vec<Value> {
        vec![
            Value::Text(self.id.to_string()),
            Value::Text(self.tenant_id.as_str().to_string()),
            Value::Text(self.name.clone()),
            Value::Text(self.description.clone()),
            Value::Real(self.rate),
            Value::Text(format_datetime(&self.audit.created_at)),
            Value::Text(format_datetime(&self.audit.updated_at)),
            optional_uuid(self.audit.created_by),
            optional_uuid(self.audit.updated_by),
        ]
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let id: String = row.get(0)?;
        let tenant_id: String = row.get(1)?;
        let name: String = row.get(2)?;
        let description: String = row.get(3)?;
        let rate: f64 = row.get(4)?;
        let created_at: String = row.get(5)?;
        let updated_at: String = row.get(6)?;
        let created_by: Option<String> = row.get(7)?;
        let updated_by: Option<String> = row.get(8)?;

        Ok(Product {
            id: parse_uuid(&id)?,
            tenant_id: TenantId::new(tenant_id),
            name,
            description,
            rate,
            audit: AuditStamp {
                created_at: parse_datetime(&created_at)?,
                updated_at: parse_datetime(&updated_at)?,
                created_by: parse_optional_uuid(created_by)?,
                updated_by: parse_optional_uuid(updated_by)?,
            },
        })
    }
}

impl Table for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "tenant_id",
        "username",
        "first_name",
        "last_name",
        "email",
        "phone_number",
        "password_hash",
        "is_active",
        "email_confirmed",
        "phone_confirmed",
        "email_token",
        "phone_token",
        "reset_token",
        "created_at",
        "updated_at",
    ];

    fn to_row(&self) -> Vec<Value> {
        vec![
            Value::Text(self.id.to_string()),
            Value::Text(self.tenant_id.as_str().to_string()),
            Value::Text(self.username.clone()),
            Value::Text(self.first_name.clone()),
            Value::Text(self.last_name.clone()),
            Value::Text(self.email.clone()),
            optional_text(self.phone_number.clone()),
            Value::Text(self.password_hash.clone()),
            Value::Integer(self.is_active as i64),
            Value::Integer(self.email_confirmed as i64),
            Value::Integer(self.phone_confirmed as i64),
            optional_text(self.email_token.clone()),
            optional_text(self.phone_token.clone()),
            optional_text(self.reset_token.clone()),
            Value::Text(format_datetime(&self.created_at)),
            Value::Text(format_datetime(&self.updated_at)),
        ]
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let id: String = row.get(0)?;
        let tenant_id: String = row.get(1)?;
        let username: String = row.get(2)?;
        let first_name: String = row.get(3)?;
        let last_name: String = row.get(4)?;
        let email: String = row.get(5)?;
        let phone_number: Option<String> = row.get(6)?;
        let password_hash: String = row.get(7)?;
        let is_active: bool = row.get(8)?;
        let email_confirmed: bool = row.get(9)?;
        let phone_confirmed: bool = row.get(10)?;
        let email_token: Option<String> = row.get(11)?;
        let phone_token: Option<String> = row.get(12)?;
        let reset_token: Option<String> = row.get(13)?;
        let created_at: String = row.get(14)?;
        let updated_at: String = row.get(15)?;

        Ok(User {
            id: parse_uuid(&id)?,
            tenant_id: TenantId::new(tenant_id),
            username,
            first_name,
            last_name,
            email,
            phone_number,
            password_hash,
            is_active,
            email_confirmed,
            phone_confirmed,
            email_token,
            phone_token,
            reset_token,
            created_at: parse_datetime(&created_at)?,
            updated_at: parse_datetime(&updated_at)?,
        })
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Parse a UUID from string.
fn parse_uuid(s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_optional_uuid(s: Option<String>) -> rusqlite::Result<Option<Uuid>> {
    s.as_deref().map(parse_uuid).transpose()
}

/// Parse a datetime from RFC 3339 string.
fn parse_datetime(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Format a DateTime<Utc> for SQLite storage (RFC 3339).
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn optional_text(s: Option<String>) -> Value {
    match s {
        Some(s) => Value::Text(s),
        None => Value::Null,
    }
}

fn optional_uuid(id: Option<Uuid>) -> Value {
    match id {
        Some(id) => Value::Text(id.to_string()),
        None => Value::Null,
    }
}
