// Scheduler snapshots: one snapshots row + one meta row per run.

use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::rows::SnapshotRecordRows;
use super::{CountScope, codec, count_owned, page, window};
use crate::error::StoreResult;
use crate::models::{Page, Pagination, Snapshot, TimeFilter};

#[derive(Clone)]
pub struct SnapshotStore {
    pool: SqlitePool,
    count_scope: CountScope,
}

impl SnapshotStore {
    pub(super) fn new(pool: SqlitePool, count_scope: CountScope) -> Self {
        Self { pool, count_scope }
    }

    /// Writes the snapshot and its meta in one transaction; nothing persists on error.
    #[instrument(
        skip(self, snapshot),
        fields(store = "snapshots", operation = "insert", scheduler_id = %snapshot.scheduler_id),
        err
    )]
    pub async fn insert(&self, snapshot: &Snapshot) -> StoreResult<()> {
        let rows = codec::encode_snapshot(snapshot)?;
        let mut tx = self.pool.begin().await?;

        let snapshot_id = sqlx::query(
            "INSERT INTO snapshots (scheduler_id, code, type, error, time) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&rows.snapshot.scheduler_id)
        .bind(&rows.snapshot.code)
        .bind(&rows.snapshot.type_)
        .bind(&rows.snapshot.error)
        .bind(rows.snapshot.time)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let meta_id = sqlx::query(
            "INSERT INTO meta (snapshot_id, start_time, end_time, value) VALUES ($1, $2, $3, $4)",
        )
        .bind(snapshot_id)
        .bind(rows.meta.start_time)
        .bind(rows.meta.end_time)
        .bind(rows.meta.value.as_deref())
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        sqlx::query("UPDATE snapshots SET meta_id = $1 WHERE id = $2")
            .bind(meta_id)
            .bind(snapshot_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!(snapshot_id, "snapshot stored");
        Ok(())
    }

    /// Snapshots of one scheduler inside the time window, oldest first.
    #[instrument(skip(self), fields(store = "snapshots", operation = "query"), err)]
    pub async fn query(
        &self,
        scheduler_id: &str,
        pagination: Option<&Pagination>,
        filter: Option<&TimeFilter>,
    ) -> StoreResult<Page<Snapshot>> {
        let window = window::resolve(filter)?;
        let total_count = count_owned(
            &self.pool,
            "snapshots",
            "scheduler_id",
            scheduler_id,
            &window,
            self.count_scope,
        )
        .await?;
        let bounds = page::resolve(total_count, pagination);

        let rows = sqlx::query(
            "SELECT s.scheduler_id, s.code, s.type, s.error, s.time,
                    m.start_time, m.end_time, m.value
             FROM snapshots s
             JOIN meta m ON m.id = s.meta_id
             WHERE s.scheduler_id = $1 AND s.time BETWEEN $2 AND $3
             ORDER BY s.time ASC, s.id ASC
             LIMIT $4 OFFSET $5",
        )
        .bind(scheduler_id)
        .bind(window.from_nanos())
        .bind(window.to_nanos())
        .bind(bounds.limit_i64())
        .bind(bounds.offset_i64())
        .fetch_all(&self.pool)
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            records.push(codec::decode_snapshot(SnapshotRecordRows::from_row(row)?)?);
        }
        debug!(returned = records.len(), total_count, "snapshots queried");
        Ok(Page {
            records,
            total_count,
        })
    }
}
