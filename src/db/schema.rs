//! SQL text for the key-value table and the provisioning queries.
//! PostgreSQL-only: relies on JSONB, advisory locks and server-side cursors.

/// Database every PostgreSQL cluster ships with; used to create the target.
pub const MAINTENANCE_DATABASE: &str = "postgres";

pub const ADVISORY_LOCK: &str = "SELECT pg_advisory_lock(hashtext($1))";
pub const ADVISORY_UNLOCK: &str = "SELECT pg_advisory_unlock(hashtext($1))";
pub const TABLE_LOCK: &str = "SELECT pg_advisory_xact_lock(hashtext($1))";
pub const DATABASE_EXISTS: &str = "SELECT 1 FROM pg_database WHERE datname = $1";

/// Quote `name` as a PostgreSQL identifier.
///
/// Embedded double quotes are doubled, so any string becomes exactly one
/// identifier and can never close the quoting early.
pub fn quote_ident(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push('"');
    for c in name.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
    out
}

pub fn create_database(database: &str) -> String {
    format!("CREATE DATABASE {}", quote_ident(database))
}

/// One row per key:
/// - `key` TEXT PRIMARY KEY (the only constraint storage enforces)
/// - `value` JSONB NOT NULL, the serialized payload
pub fn create_table(table: &str) -> String {
    format!(
        r#"CREATE TABLE IF NOT EXISTS {} (
    key TEXT PRIMARY KEY,
    value JSONB NOT NULL
)"#,
        quote_ident(table)
    )
}

/// Statements bound to one table, rendered once at construction.
#[derive(Debug, Clone)]
pub struct TableQueries {
    pub create: String,
    pub get: String,
    pub has: String,
    pub upsert: String,
    pub delete: String,
    pub scan: String,
}

impl TableQueries {
    pub fn new(table: &str) -> Self {
        let t = quote_ident(table);
        Self {
            create: create_table(table),
            get: format!("SELECT value::text FROM {t} WHERE key = $1"),
            has: format!("SELECT 1 FROM {t} WHERE key = $1 LIMIT 1"),
            upsert: format!(
                "INSERT INTO {t} (key, value) VALUES ($1, $2::jsonb) \
                 ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value"
            ),
            delete: format!("DELETE FROM {t} WHERE key = $1"),
            scan: format!("SELECT key, value::text FROM {t}"),
        }
    }
}
