// Agent statistics: one stat_requests row plus owned cpu/memory/disk/net rows.
// Full and per-category reads share `fetch`; a Projection decides which parent
// columns are selected and which child tables are loaded.

use std::collections::HashMap;

use sqlx::sqlite::{Sqlite, SqliteConnection, SqliteRow};
use sqlx::{QueryBuilder, SqlitePool};
use tracing::{debug, instrument};

use super::rows::{
    CpuInfoRow, DiskInfoRow, MemoryInfoRow, MemoryRow, NetInfoRow, StatRequestRecordRows,
    StatRequestRow,
};
use super::{CountScope, codec, count_owned, page, window};
use crate::error::StoreResult;
use crate::models::{Category, Page, Pagination, StatisticsSample, TimeFilter};

/// Keeps `IN (...)` lists well below SQLite's bind parameter limit.
const MAX_IDS_PER_QUERY: usize = 500;

const CPU_SELECT: &str = "SELECT stat_request_id, position, load FROM cpu_info";
const DISK_SELECT: &str =
    "SELECT stat_request_id, position, name, total, free, used, used_percent FROM disk_info";
const NET_SELECT: &str = "SELECT stat_request_id, position, name, bytes_sent, bytes_recv, \
     packets_sent, packets_recv, err_in, err_out, drop_in, drop_out FROM net_info";
const MEMORY_SELECT: &str = "SELECT mi.stat_request_id, mi.mem_ref, mi.swap_ref, \
     mem.total AS mem_total, mem.used AS mem_used, mem.free AS mem_free, \
     mem.shared AS mem_shared, mem.used_percent AS mem_used_percent, \
     swap.total AS swap_total, swap.used AS swap_used, swap.free AS swap_free, \
     swap.shared AS swap_shared, swap.used_percent AS swap_used_percent \
     FROM memory_info mi \
     LEFT JOIN memory mem ON mem.id = mi.mem_ref \
     LEFT JOIN memory swap ON swap.id = mi.swap_ref";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Projection {
    All,
    Only(Category),
}

impl Projection {
    fn includes(self, category: Category) -> bool {
        match self {
            Projection::All => true,
            Projection::Only(c) => c == category,
        }
    }

    /// stat_requests columns to select: the full row, or time plus the category's flag.
    fn parent_columns(self) -> &'static str {
        match self {
            Projection::All => {
                "id, agent_id, agent_name, time, has_cpu_info, has_disk_info, has_net_info"
            }
            Projection::Only(Category::Cpu) => "id, time, has_cpu_info",
            Projection::Only(Category::Memory) => "id, time",
            Projection::Only(Category::Disk) => "id, time, has_disk_info",
            Projection::Only(Category::Network) => "id, time, has_net_info",
        }
    }
}

#[derive(Clone)]
pub struct StatisticsStore {
    pool: SqlitePool,
    count_scope: CountScope,
}

impl StatisticsStore {
    pub(super) fn new(pool: SqlitePool, count_scope: CountScope) -> Self {
        Self { pool, count_scope }
    }

    /// Writes the sample and every nested row in one transaction.
    #[instrument(
        skip(self, sample),
        fields(store = "statistics", operation = "insert", agent_id = %sample.agent_id),
        err
    )]
    pub async fn insert(&self, sample: &StatisticsSample) -> StoreResult<()> {
        let rows = codec::encode_sample(sample)?;
        let mut tx = self.pool.begin().await?;

        let request_id = sqlx::query(
            "INSERT INTO stat_requests (agent_id, agent_name, time, has_cpu_info, has_disk_info, has_net_info)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&rows.request.agent_id)
        .bind(&rows.request.agent_name)
        .bind(rows.request.time)
        .bind(rows.request.has_cpu_info)
        .bind(rows.request.has_disk_info)
        .bind(rows.request.has_net_info)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for cpu in &rows.cpu {
            sqlx::query("INSERT INTO cpu_info (stat_request_id, position, load) VALUES ($1, $2, $3)")
                .bind(request_id)
                .bind(cpu.position)
                .bind(cpu.load)
                .execute(&mut *tx)
                .await?;
        }

        if let Some(memory) = &rows.memory {
            let memory_info_id =
                sqlx::query("INSERT INTO memory_info (stat_request_id) VALUES ($1)")
                    .bind(request_id)
                    .execute(&mut *tx)
                    .await?
                    .last_insert_rowid();
            let mem_ref = match &memory.mem {
                Some(m) => Some(insert_memory(&mut tx, memory_info_id, m).await?),
                None => None,
            };
            let swap_ref = match &memory.swap {
                Some(m) => Some(insert_memory(&mut tx, memory_info_id, m).await?),
                None => None,
            };
            sqlx::query("UPDATE memory_info SET mem_ref = $1, swap_ref = $2 WHERE id = $3")
                .bind(mem_ref)
                .bind(swap_ref)
                .bind(memory_info_id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("UPDATE stat_requests SET memory_info_id = $1 WHERE id = $2")
                .bind(memory_info_id)
                .bind(request_id)
                .execute(&mut *tx)
                .await?;
        }

        for disk in &rows.disks {
            sqlx::query(
                "INSERT INTO disk_info (stat_request_id, position, name, total, free, used, used_percent)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(request_id)
            .bind(disk.position)
            .bind(&disk.name)
            .bind(disk.total)
            .bind(disk.free)
            .bind(disk.used)
            .bind(disk.used_percent)
            .execute(&mut *tx)
            .await?;
        }

        for net in &rows.nets {
            sqlx::query(
                "INSERT INTO net_info (stat_request_id, position, name, bytes_sent, bytes_recv,
                    packets_sent, packets_recv, err_in, err_out, drop_in, drop_out)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
            )
            .bind(request_id)
            .bind(net.position)
            .bind(&net.name)
            .bind(net.bytes_sent)
            .bind(net.bytes_recv)
            .bind(net.packets_sent)
            .bind(net.packets_recv)
            .bind(net.err_in)
            .bind(net.err_out)
            .bind(net.drop_in)
            .bind(net.drop_out)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(request_id, "statistics sample stored");
        Ok(())
    }

    /// Complete samples of one agent inside the time window, oldest first.
    #[instrument(skip(self), fields(store = "statistics", operation = "query_full"), err)]
    pub async fn query_full(
        &self,
        agent_id: &str,
        pagination: Option<&Pagination>,
        filter: Option<&TimeFilter>,
    ) -> StoreResult<Page<StatisticsSample>> {
        self.fetch(agent_id, pagination, filter, Projection::All)
            .await
    }

    /// Like `query_full`, but each sample carries only its time and `category`;
    /// the other categories and the agent identity are left empty.
    #[instrument(skip(self), fields(store = "statistics", operation = "query_category"), err)]
    pub async fn query_category(
        &self,
        agent_id: &str,
        pagination: Option<&Pagination>,
        filter: Option<&TimeFilter>,
        category: Category,
    ) -> StoreResult<Page<StatisticsSample>> {
        self.fetch(agent_id, pagination, filter, Projection::Only(category))
            .await
    }

    pub async fn query_cpu(
        &self,
        agent_id: &str,
        pagination: Option<&Pagination>,
        filter: Option<&TimeFilter>,
    ) -> StoreResult<Page<StatisticsSample>> {
        self.query_category(agent_id, pagination, filter, Category::Cpu)
            .await
    }

    pub async fn query_memory(
        &self,
        agent_id: &str,
        pagination: Option<&Pagination>,
        filter: Option<&TimeFilter>,
    ) -> StoreResult<Page<StatisticsSample>> {
        self.query_category(agent_id, pagination, filter, Category::Memory)
            .await
    }

    pub async fn query_disk(
        &self,
        agent_id: &str,
        pagination: Option<&Pagination>,
        filter: Option<&TimeFilter>,
    ) -> StoreResult<Page<StatisticsSample>> {
        self.query_category(agent_id, pagination, filter, Category::Disk)
            .await
    }

    pub async fn query_network(
        &self,
        agent_id: &str,
        pagination: Option<&Pagination>,
        filter: Option<&TimeFilter>,
    ) -> StoreResult<Page<StatisticsSample>> {
        self.query_category(agent_id, pagination, filter, Category::Network)
            .await
    }

    async fn fetch(
        &self,
        agent_id: &str,
        pagination: Option<&Pagination>,
        filter: Option<&TimeFilter>,
        projection: Projection,
    ) -> StoreResult<Page<StatisticsSample>> {
        let window = window::resolve(filter)?;
        let total_count = count_owned(
            &self.pool,
            "stat_requests",
            "agent_id",
            agent_id,
            &window,
            self.count_scope,
        )
        .await?;
        let bounds = page::resolve(total_count, pagination);

        let sql = format!(
            "SELECT {} FROM stat_requests
             WHERE agent_id = $1 AND time BETWEEN $2 AND $3
             ORDER BY time ASC, id ASC
             LIMIT $4 OFFSET $5",
            projection.parent_columns()
        );
        let rows = sqlx::query(&sql)
            .bind(agent_id)
            .bind(window.from_nanos())
            .bind(window.to_nanos())
            .bind(bounds.limit_i64())
            .bind(bounds.offset_i64())
            .fetch_all(&self.pool)
            .await?;
        let parents = rows
            .iter()
            .map(StatRequestRow::from_row)
            .collect::<Result<Vec<_>, _>>()?;
        let ids: Vec<i64> = parents.iter().map(|(id, _)| *id).collect();

        let mut cpu = if projection.includes(Category::Cpu) {
            self.load_children(
                CPU_SELECT,
                "stat_request_id",
                ", position",
                &ids,
                CpuInfoRow::from_row,
            )
            .await?
        } else {
            HashMap::new()
        };
        let mut memory = if projection.includes(Category::Memory) {
            self.load_children(
                MEMORY_SELECT,
                "mi.stat_request_id",
                "",
                &ids,
                MemoryInfoRow::from_row,
            )
            .await?
        } else {
            HashMap::new()
        };
        let mut disks = if projection.includes(Category::Disk) {
            self.load_children(
                DISK_SELECT,
                "stat_request_id",
                ", position",
                &ids,
                DiskInfoRow::from_row,
            )
            .await?
        } else {
            HashMap::new()
        };
        let mut nets = if projection.includes(Category::Network) {
            self.load_children(
                NET_SELECT,
                "stat_request_id",
                ", position",
                &ids,
                NetInfoRow::from_row,
            )
            .await?
        } else {
            HashMap::new()
        };

        let records: Vec<StatisticsSample> = parents
            .into_iter()
            .map(|(id, request)| {
                codec::decode_sample(StatRequestRecordRows {
                    request,
                    cpu: cpu.remove(&id).unwrap_or_default(),
                    memory: memory.remove(&id).and_then(|m| m.into_iter().next()),
                    disks: disks.remove(&id).unwrap_or_default(),
                    nets: nets.remove(&id).unwrap_or_default(),
                })
            })
            .collect();
        debug!(returned = records.len(), total_count, ?projection, "statistics queried");
        Ok(Page {
            records,
            total_count,
        })
    }

    /// Child rows for the given parents, grouped by parent id and kept in `ORDER BY` order.
    async fn load_children<T>(
        &self,
        select: &str,
        parent_column: &str,
        order_suffix: &str,
        ids: &[i64],
        read: fn(&SqliteRow) -> Result<(i64, T), sqlx::Error>,
    ) -> StoreResult<HashMap<i64, Vec<T>>> {
        let mut grouped: HashMap<i64, Vec<T>> = HashMap::new();
        for chunk in ids.chunks(MAX_IDS_PER_QUERY) {
            let mut qb = QueryBuilder::<Sqlite>::new(select);
            qb.push(format!(" WHERE {parent_column} IN ("));
            let mut separated = qb.separated(", ");
            for id in chunk {
                separated.push_bind(*id);
            }
            separated.push_unseparated(format!(") ORDER BY {parent_column}{order_suffix}"));

            let rows = qb.build().fetch_all(&self.pool).await?;
            for row in &rows {
                let (parent, item) = read(row)?;
                grouped.entry(parent).or_default().push(item);
            }
        }
        Ok(grouped)
    }
}

async fn insert_memory(
    conn: &mut SqliteConnection,
    memory_info_id: i64,
    m: &MemoryRow,
) -> StoreResult<i64> {
    let id = sqlx::query(
        "INSERT INTO memory (memory_info_id, total, used, free, shared, used_percent)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(memory_info_id)
    .bind(m.total)
    .bind(m.used)
    .bind(m.free)
    .bind(m.shared)
    .bind(m.used_percent)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();
    Ok(id)
}
