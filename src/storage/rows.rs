// Persisted row shapes, one struct per table, with explicit column mappings.
// Ids and foreign keys are assigned at insert time and are not part of these structs;
// readers of child tables return the parent id alongside the row.

use sqlx::sqlite::{Sqlite, SqliteRow};
use sqlx::{Decode, Row, Type};

#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRow {
    pub scheduler_id: String,
    pub code: String,
    pub type_: String,
    pub error: String,
    /// Copy of meta.start_time; the column windowing and ordering use.
    pub time: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetaRow {
    pub start_time: i64,
    pub end_time: Option<i64>,
    /// JSON text of the MetaValue.
    pub value: Option<String>,
}

/// A snapshot row with its meta row, as written and read in one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRecordRows {
    pub snapshot: SnapshotRow,
    pub meta: MetaRow,
}

impl SnapshotRecordRows {
    /// Expects the snapshot columns plus meta's `start_time`, `end_time`, `value`.
    pub fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            snapshot: SnapshotRow {
                scheduler_id: row.try_get("scheduler_id")?,
                code: row.try_get("code")?,
                type_: row.try_get("type")?,
                error: row.try_get("error")?,
                time: row.try_get("time")?,
            },
            meta: MetaRow {
                start_time: row.try_get("start_time")?,
                end_time: row.try_get("end_time")?,
                value: row.try_get("value")?,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatRequestRow {
    pub agent_id: String,
    pub agent_name: String,
    pub time: i64,
    pub has_cpu_info: bool,
    pub has_disk_info: bool,
    pub has_net_info: bool,
}

impl StatRequestRow {
    /// Returns `(id, row)`. Columns left out of a projected SELECT read as empty/false.
    pub fn from_row(row: &SqliteRow) -> Result<(i64, Self), sqlx::Error> {
        let id = row.try_get("id")?;
        Ok((
            id,
            Self {
                agent_id: optional(row, "agent_id")?.unwrap_or_default(),
                agent_name: optional(row, "agent_name")?.unwrap_or_default(),
                time: row.try_get("time")?,
                has_cpu_info: optional(row, "has_cpu_info")?.unwrap_or(false),
                has_disk_info: optional(row, "has_disk_info")?.unwrap_or(false),
                has_net_info: optional(row, "has_net_info")?.unwrap_or(false),
            },
        ))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CpuInfoRow {
    pub position: i64,
    pub load: Option<f64>,
}

impl CpuInfoRow {
    pub fn from_row(row: &SqliteRow) -> Result<(i64, Self), sqlx::Error> {
        Ok((
            row.try_get("stat_request_id")?,
            Self {
                position: row.try_get("position")?,
                load: row.try_get("load")?,
            },
        ))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRow {
    pub total: i64,
    pub used: i64,
    pub free: i64,
    pub shared: i64,
    pub used_percent: Option<f64>,
}

impl MemoryRow {
    /// Reads `{prefix}_total`, `{prefix}_used`, ... from a joined row.
    fn from_prefixed(row: &SqliteRow, prefix: &str) -> Result<Self, sqlx::Error> {
        Ok(Self {
            total: row.try_get(format!("{prefix}_total").as_str())?,
            used: row.try_get(format!("{prefix}_used").as_str())?,
            free: row.try_get(format!("{prefix}_free").as_str())?,
            shared: row.try_get(format!("{prefix}_shared").as_str())?,
            used_percent: row.try_get(format!("{prefix}_used_percent").as_str())?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryInfoRow {
    pub mem: Option<MemoryRow>,
    pub swap: Option<MemoryRow>,
}

impl MemoryInfoRow {
    /// Expects `stat_request_id`, `mem_ref`, `swap_ref` and the `mem_*` / `swap_*`
    /// columns of the two joined memory rows.
    pub fn from_row(row: &SqliteRow) -> Result<(i64, Self), sqlx::Error> {
        let mem_ref: Option<i64> = row.try_get("mem_ref")?;
        let swap_ref: Option<i64> = row.try_get("swap_ref")?;
        let mem = match mem_ref {
            Some(_) => Some(MemoryRow::from_prefixed(row, "mem")?),
            None => None,
        };
        let swap = match swap_ref {
            Some(_) => Some(MemoryRow::from_prefixed(row, "swap")?),
            None => None,
        };
        Ok((row.try_get("stat_request_id")?, Self { mem, swap }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiskInfoRow {
    pub position: i64,
    pub name: String,
    pub total: i64,
    pub free: i64,
    pub used: i64,
    pub used_percent: Option<f64>,
}

impl DiskInfoRow {
    pub fn from_row(row: &SqliteRow) -> Result<(i64, Self), sqlx::Error> {
        Ok((
            row.try_get("stat_request_id")?,
            Self {
                position: row.try_get("position")?,
                name: row.try_get("name")?,
                total: row.try_get("total")?,
                free: row.try_get("free")?,
                used: row.try_get("used")?,
                used_percent: row.try_get("used_percent")?,
            },
        ))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetInfoRow {
    pub position: i64,
    pub name: String,
    pub bytes_sent: i64,
    pub bytes_recv: i64,
    pub packets_sent: i64,
    pub packets_recv: i64,
    pub err_in: i64,
    pub err_out: i64,
    pub drop_in: i64,
    pub drop_out: i64,
}

impl NetInfoRow {
    pub fn from_row(row: &SqliteRow) -> Result<(i64, Self), sqlx::Error> {
        Ok((
            row.try_get("stat_request_id")?,
            Self {
                position: row.try_get("position")?,
                name: row.try_get("name")?,
                bytes_sent: row.try_get("bytes_sent")?,
                bytes_recv: row.try_get("bytes_recv")?,
                packets_sent: row.try_get("packets_sent")?,
                packets_recv: row.try_get("packets_recv")?,
                err_in: row.try_get("err_in")?,
                err_out: row.try_get("err_out")?,
                drop_in: row.try_get("drop_in")?,
                drop_out: row.try_get("drop_out")?,
            },
        ))
    }
}

/// A stat_requests row with everything it owns.
#[derive(Debug, Clone, PartialEq)]
pub struct StatRequestRecordRows {
    pub request: StatRequestRow,
    pub cpu: Vec<CpuInfoRow>,
    pub memory: Option<MemoryInfoRow>,
    pub disks: Vec<DiskInfoRow>,
    pub nets: Vec<NetInfoRow>,
}

fn optional<'r, T>(row: &'r SqliteRow, column: &str) -> Result<Option<T>, sqlx::Error>
where
    T: Decode<'r, Sqlite> + Type<Sqlite>,
{
    match row.try_get(column) {
        Ok(v) => Ok(Some(v)),
        Err(sqlx::Error::ColumnNotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}
