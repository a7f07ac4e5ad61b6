use crate::error::StoreError;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::debug;

const CURSOR_NAME: &str = "pgkv_entries";

/// A server-side cursor over `scan`, living in its own read transaction.
///
/// Dropping the cursor drops the transaction, which rolls back and closes
/// the cursor on the server; [`EntryCursor::close`] does the same eagerly.
pub struct EntryCursor {
    tx: Transaction<'static, Postgres>,
    fetch: String,
    batch_size: usize,
}

impl EntryCursor {
    pub async fn open(pool: &PgPool, scan: &str, batch_size: u32) -> Result<Self, StoreError> {
        let batch_size = batch_size.max(1);
        let mut tx = pool.begin().await?;
        let declare = format!("DECLARE {CURSOR_NAME} NO SCROLL CURSOR FOR {scan}");
        sqlx::query(&declare)
            .persistent(false)
            .execute(&mut *tx)
            .await?;
        debug!(batch_size, "opened entries cursor");

        Ok(Self {
            tx,
            fetch: format!("FETCH {batch_size} FROM {CURSOR_NAME}"),
            batch_size: batch_size as usize,
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Next batch of raw `(key, json text)` rows; shorter than the batch size
    /// only when the cursor is exhausted.
    pub async fn next_batch(&mut self) -> Result<Vec<(String, String)>, StoreError> {
        // Not cached: the statement only makes sense while this cursor exists.
        let rows = sqlx::query(&self.fetch)
            .persistent(false)
            .fetch_all(&mut *self.tx)
            .await?;
        rows.into_iter()
            .map(|row| -> Result<(String, String), StoreError> {
                Ok((row.try_get(0)?, row.try_get(1)?))
            })
            .collect()
    }

    pub async fn close(mut self) -> Result<(), StoreError> {
        sqlx::query(&format!("CLOSE {CURSOR_NAME}"))
            .persistent(false)
            .execute(&mut *self.tx)
            .await?;
        // Read-only scan: nothing to commit.
        self.tx.rollback().await?;
        debug!("closed entries cursor");
        Ok(())
    }
}
