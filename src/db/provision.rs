//! Idempotent provisioning of the target database and the key-value table.

use crate::db::descriptor::ConnectionDescriptor;
use crate::db::options::StorageOptions;
use crate::db::schema::{
    ADVISORY_LOCK, ADVISORY_UNLOCK, DATABASE_EXISTS, TABLE_LOCK, create_database,
};
use crate::error::StoreError;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, info, warn};

/// Create the descriptor's database unless it already exists.
///
/// Runs on a single-connection pool against the maintenance database. The
/// existence check and the `CREATE DATABASE` happen under a session advisory
/// lock keyed by the database name, so replicas starting together never race
/// on the creation.
pub async fn ensure_database(
    descriptor: &ConnectionDescriptor,
    options: &StorageOptions,
) -> Result<(), StoreError> {
    let database = descriptor.database();
    debug!(
        database,
        maintenance = %options.maintenance_database,
        "ensuring database exists"
    );

    let admin = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(options.acquire_timeout)
        .connect_with(descriptor.maintenance_options(&options.maintenance_database))
        .await?;

    let outcome = create_under_lock(&admin, database).await;
    admin.close().await;

    if outcome? {
        info!(database, "created database");
    } else {
        debug!(database, "database already present");
    }
    Ok(())
}

/// Returns whether this call created the database.
async fn create_under_lock(admin: &PgPool, database: &str) -> Result<bool, StoreError> {
    // Advisory locks are per session: lock, check and unlock must share one connection.
    let mut conn = admin.acquire().await?;

    sqlx::query(ADVISORY_LOCK)
        .bind(database)
        .execute(&mut *conn)
        .await?;

    let created = create_if_missing(&mut conn, database).await;

    let unlocked = sqlx::query(ADVISORY_UNLOCK)
        .bind(database)
        .execute(&mut *conn)
        .await;

    match (created, unlocked) {
        (Ok(created), Ok(_)) => Ok(created),
        (Ok(_), Err(e)) => Err(e.into()),
        (Err(e), Ok(_)) => Err(e),
        (Err(e), Err(unlock_err)) => {
            warn!(database, error = %unlock_err, "advisory unlock failed after provisioning error");
            Err(e)
        }
    }
}

async fn create_if_missing(conn: &mut PgConnection, database: &str) -> Result<bool, StoreError> {
    let exists = sqlx::query(DATABASE_EXISTS)
        .bind(database)
        .fetch_optional(&mut *conn)
        .await?
        .is_some();
    if exists {
        return Ok(false);
    }

    // Runs on the bare connection: CREATE DATABASE is rejected inside a
    // transaction block.
    let ddl = create_database(database);
    sqlx::query(&ddl).execute(&mut *conn).await?;
    Ok(true)
}

/// `CREATE TABLE IF NOT EXISTS` for the key-value table.
///
/// Concurrent `CREATE TABLE IF NOT EXISTS` on the same name can still trip
/// over the catalog's unique indexes, so creation runs under a
/// transaction-scoped advisory lock keyed by the table name.
pub async fn ensure_table(
    pool: &PgPool,
    table: &str,
    create_ddl: &str,
) -> Result<(), StoreError> {
    let mut tx = pool.begin().await?;
    sqlx::query(TABLE_LOCK).bind(table).execute(&mut *tx).await?;
    sqlx::query(create_ddl).execute(&mut *tx).await?;
    tx.commit().await?;
    debug!(table, "table ensured");
    Ok(())
}
