// Table definitions. Times are INTEGER nanoseconds since the epoch; u64 counters are
// stored as their i64 bit pattern. NULL in a REAL column is NaN. Nested rows cascade
// with their parent.

use sqlx::SqlitePool;

const TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS snapshots (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        scheduler_id TEXT NOT NULL CHECK (scheduler_id <> ''),
        code TEXT NOT NULL,
        type TEXT NOT NULL,
        error TEXT NOT NULL,
        time INTEGER NOT NULL,
        meta_id INTEGER
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS meta (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        snapshot_id INTEGER NOT NULL REFERENCES snapshots(id) ON DELETE CASCADE,
        start_time INTEGER NOT NULL,
        end_time INTEGER,
        value TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS stat_requests (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        agent_id TEXT NOT NULL CHECK (agent_id <> ''),
        agent_name TEXT NOT NULL,
        time INTEGER NOT NULL,
        memory_info_id INTEGER,
        has_cpu_info INTEGER NOT NULL DEFAULT 0,
        has_disk_info INTEGER NOT NULL DEFAULT 0,
        has_net_info INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS cpu_info (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        stat_request_id INTEGER NOT NULL REFERENCES stat_requests(id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        load REAL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS memory_info (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        stat_request_id INTEGER NOT NULL REFERENCES stat_requests(id) ON DELETE CASCADE,
        mem_ref INTEGER,
        swap_ref INTEGER
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS memory (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        memory_info_id INTEGER NOT NULL REFERENCES memory_info(id) ON DELETE CASCADE,
        total INTEGER NOT NULL,
        used INTEGER NOT NULL,
        free INTEGER NOT NULL,
        shared INTEGER NOT NULL,
        used_percent REAL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS disk_info (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        stat_request_id INTEGER NOT NULL REFERENCES stat_requests(id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        name TEXT NOT NULL,
        total INTEGER NOT NULL,
        free INTEGER NOT NULL,
        used INTEGER NOT NULL,
        used_percent REAL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS net_info (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        stat_request_id INTEGER NOT NULL REFERENCES stat_requests(id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        name TEXT NOT NULL,
        bytes_sent INTEGER NOT NULL,
        bytes_recv INTEGER NOT NULL,
        packets_sent INTEGER NOT NULL,
        packets_recv INTEGER NOT NULL,
        err_in INTEGER NOT NULL,
        err_out INTEGER NOT NULL,
        drop_in INTEGER NOT NULL,
        drop_out INTEGER NOT NULL
    )
    "#,
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_snapshots_scheduler_time ON snapshots(scheduler_id, time)",
    "CREATE INDEX IF NOT EXISTS idx_meta_snapshot ON meta(snapshot_id)",
    "CREATE INDEX IF NOT EXISTS idx_stat_requests_agent_time ON stat_requests(agent_id, time)",
    "CREATE INDEX IF NOT EXISTS idx_cpu_info_request ON cpu_info(stat_request_id)",
    "CREATE INDEX IF NOT EXISTS idx_memory_info_request ON memory_info(stat_request_id)",
    "CREATE INDEX IF NOT EXISTS idx_memory_info ON memory(memory_info_id)",
    "CREATE INDEX IF NOT EXISTS idx_disk_info_request ON disk_info(stat_request_id)",
    "CREATE INDEX IF NOT EXISTS idx_net_info_request ON net_info(stat_request_id)",
];

pub(super) async fn create_tables(pool: &SqlitePool) -> anyhow::Result<()> {
    for ddl in TABLES.iter().chain(INDEXES) {
        sqlx::query(ddl).execute(pool).await?;
    }
    Ok(())
}
