//! SQLite schema definitions.
//!
//! All DDL used by the store lives here as pure data. Per-entity DML is
//! generated from [`super::Table`] metadata at staging time.

/// SQL statement to create all tables.
pub const CREATE_TABLES: &str = r#"
-- Catalog products (tenant-scoped)
CREATE TABLE IF NOT EXISTS products (
    id TEXT PRIMARY KEY,
    tenant_id TEXT NOT NULL,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    rate REAL NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    created_by TEXT,
    updated_by TEXT
);

-- Application users (tenant-scoped)
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    tenant_id TEXT NOT NULL,
    username TEXT NOT NULL,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone_number TEXT,
    password_hash TEXT NOT NULL,
    is_active INTEGER NOT NULL,
    email_confirmed INTEGER NOT NULL,
    phone_confirmed INTEGER NOT NULL,
    email_token TEXT,
    phone_token TEXT,
    reset_token TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Indexes for tenant-scoped lookups
CREATE INDEX IF NOT EXISTS idx_products_tenant ON products(tenant_id);
CREATE UNIQUE INDEX IF NOT EXISTS ux_users_tenant_username ON users(tenant_id, username);
CREATE UNIQUE INDEX IF NOT EXISTS ux_users_tenant_email ON users(tenant_id, email);
CREATE INDEX IF NOT EXISTS idx_users_tenant_phone ON users(tenant_id, phone_number);
"#;
