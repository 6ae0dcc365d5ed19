// Shared test helpers
#![allow(dead_code)]

use std::collections::BTreeMap;

use squzy_storage::config::DatabaseConfig;
use squzy_storage::models::*;
use squzy_storage::storage::{CountScope, Database};
use tempfile::TempDir;

/// Fresh database file under `dir`, schema created.
pub async fn temp_db(dir: &TempDir, count_scope: CountScope) -> Database {
    let path = dir.path().join("storage.db");
    let config = DatabaseConfig {
        path: path.to_str().unwrap().to_string(),
        max_pool_size: 2,
        busy_timeout_secs: 5,
        count_scope,
    };
    let db = Database::connect(&config).await.unwrap();
    db.init().await.unwrap();
    db
}

pub fn ts(seconds: i64) -> Timestamp {
    Timestamp::new(seconds, 0)
}

pub fn snapshot(scheduler_id: &str, start_secs: i64) -> Snapshot {
    Snapshot {
        scheduler_id: scheduler_id.into(),
        code: SchedulerCode::Ok,
        type_: SchedulerType::HttpJsonValue,
        error: String::new(),
        meta: Some(MetaData {
            start_time: Some(ts(start_secs)),
            end_time: Some(Timestamp::new(start_secs + 1, 250_000_000)),
            value: Some(MetaValue::Struct(BTreeMap::from([
                ("status".to_string(), MetaValue::Number(200.0)),
                ("healthy".to_string(), MetaValue::Bool(true)),
                (
                    "tags".to_string(),
                    MetaValue::List(vec![MetaValue::String("edge".into()), MetaValue::Null]),
                ),
            ]))),
        }),
    }
}

pub fn memory(total: u64, used: u64) -> MemorySnapshot {
    MemorySnapshot {
        total,
        used,
        free: total - used,
        shared: 64,
        used_percent: used as f64 / total as f64 * 100.0,
    }
}

/// Sample with every category populated.
pub fn sample(agent_id: &str, secs: i64) -> StatisticsSample {
    StatisticsSample {
        agent_id: agent_id.into(),
        agent_name: "edge-node".into(),
        time: Some(ts(secs)),
        cpu_info: Some(vec![12.5, 80.25, 0.0, 3.125]),
        memory_info: Some(MemoryInfo {
            mem: Some(memory(16_384, 4_096)),
            swap: Some(memory(2_048, 512)),
        }),
        disk_info: Some(vec![
            DiskSnapshot {
                name: "/".into(),
                total: 500_000,
                free: 200_000,
                used: 300_000,
                used_percent: 60.0,
            },
            DiskSnapshot {
                name: "/data".into(),
                total: 1_000_000,
                free: 900_000,
                used: 100_000,
                used_percent: 10.0,
            },
        ]),
        net_info: Some(vec![NetworkSnapshot {
            name: "eth0".into(),
            bytes_sent: 1_000,
            bytes_recv: 2_000,
            packets_sent: 10,
            packets_recv: 20,
            err_in: 1,
            err_out: 2,
            drop_in: 3,
            drop_out: 4,
        }]),
    }
}

/// Sample carrying only identity and time.
pub fn bare_sample(agent_id: &str, secs: i64) -> StatisticsSample {
    StatisticsSample {
        agent_id: agent_id.into(),
        agent_name: String::new(),
        time: Some(ts(secs)),
        cpu_info: None,
        memory_info: None,
        disk_info: None,
        net_info: None,
    }
}
