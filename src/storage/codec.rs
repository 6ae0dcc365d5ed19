// Wire <-> row conversion for snapshots and statistics samples.
//
// Encoding validates the wire record (owner id, time) and is the only place
// ConversionError is raised on the write path. u64 counters are stored as their i64
// bit pattern so the full range survives SQLite's signed INTEGER; NaN floats as NULL.

use crate::error::{StoreError, StoreResult};
use crate::models::{
    DiskSnapshot, MemoryInfo, MemorySnapshot, MetaData, MetaValue, NetworkSnapshot,
    SchedulerCode, SchedulerType, Snapshot, StatisticsSample, Timestamp,
};

use super::rows::{
    CpuInfoRow, DiskInfoRow, MemoryInfoRow, MemoryRow, MetaRow, NetInfoRow, SnapshotRecordRows,
    SnapshotRow, StatRequestRecordRows, StatRequestRow,
};

pub fn encode_snapshot(snapshot: &Snapshot) -> StoreResult<SnapshotRecordRows> {
    if snapshot.scheduler_id.is_empty() {
        return Err(StoreError::Conversion("schedulerId is required".into()));
    }
    let meta = snapshot
        .meta
        .as_ref()
        .ok_or_else(|| StoreError::Conversion("meta is required".into()))?;
    let start_time = required_time(meta.start_time, "meta.startTime")?;
    let end_time = meta
        .end_time
        .map(|t| time_to_db(t, "meta.endTime"))
        .transpose()?;
    let value = meta
        .value
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| StoreError::Conversion(format!("meta.value: {e}")))?;

    Ok(SnapshotRecordRows {
        snapshot: SnapshotRow {
            scheduler_id: snapshot.scheduler_id.clone(),
            code: snapshot.code.as_str().to_string(),
            type_: snapshot.type_.as_str().to_string(),
            error: snapshot.error.clone(),
            time: start_time,
        },
        meta: MetaRow {
            start_time,
            end_time,
            value,
        },
    })
}

pub fn decode_snapshot(rows: SnapshotRecordRows) -> StoreResult<Snapshot> {
    let SnapshotRecordRows { snapshot, meta } = rows;
    let code = SchedulerCode::parse(&snapshot.code).ok_or_else(|| {
        StoreError::Conversion(format!("unknown scheduler code {:?}", snapshot.code))
    })?;
    let type_ = SchedulerType::parse(&snapshot.type_).ok_or_else(|| {
        StoreError::Conversion(format!("unknown scheduler type {:?}", snapshot.type_))
    })?;
    let value = meta
        .value
        .as_deref()
        .map(serde_json::from_str::<MetaValue>)
        .transpose()
        .map_err(|e| StoreError::Conversion(format!("stored meta value: {e}")))?;

    Ok(Snapshot {
        scheduler_id: snapshot.scheduler_id,
        code,
        type_,
        error: snapshot.error,
        meta: Some(MetaData {
            start_time: Some(Timestamp::from_unix_nanos(meta.start_time)),
            end_time: meta.end_time.map(Timestamp::from_unix_nanos),
            value,
        }),
    })
}

pub fn encode_sample(sample: &StatisticsSample) -> StoreResult<StatRequestRecordRows> {
    if sample.agent_id.is_empty() {
        return Err(StoreError::Conversion("agentId is required".into()));
    }
    let time = required_time(sample.time, "time")?;

    let cpu = sample
        .cpu_info
        .iter()
        .flatten()
        .enumerate()
        .map(|(i, load)| CpuInfoRow {
            position: i as i64,
            load: real_to_db(*load),
        })
        .collect();
    let memory = sample.memory_info.as_ref().map(|m| MemoryInfoRow {
        mem: m.mem.as_ref().map(encode_memory),
        swap: m.swap.as_ref().map(encode_memory),
    });
    let disks = sample
        .disk_info
        .iter()
        .flatten()
        .enumerate()
        .map(|(i, d)| DiskInfoRow {
            position: i as i64,
            name: d.name.clone(),
            total: to_db(d.total),
            free: to_db(d.free),
            used: to_db(d.used),
            used_percent: real_to_db(d.used_percent),
        })
        .collect();
    let nets = sample
        .net_info
        .iter()
        .flatten()
        .enumerate()
        .map(|(i, n)| NetInfoRow {
            position: i as i64,
            name: n.name.clone(),
            bytes_sent: to_db(n.bytes_sent),
            bytes_recv: to_db(n.bytes_recv),
            packets_sent: to_db(n.packets_sent),
            packets_recv: to_db(n.packets_recv),
            err_in: to_db(n.err_in),
            err_out: to_db(n.err_out),
            drop_in: to_db(n.drop_in),
            drop_out: to_db(n.drop_out),
        })
        .collect();

    Ok(StatRequestRecordRows {
        request: StatRequestRow {
            agent_id: sample.agent_id.clone(),
            agent_name: sample.agent_name.clone(),
            time,
            has_cpu_info: sample.cpu_info.is_some(),
            has_disk_info: sample.disk_info.is_some(),
            has_net_info: sample.net_info.is_some(),
        },
        cpu,
        memory,
        disks,
        nets,
    })
}

/// Child rows are expected in position order. A category whose presence flag is unset
/// decodes as absent even if rows were supplied.
pub fn decode_sample(rows: StatRequestRecordRows) -> StatisticsSample {
    let StatRequestRecordRows {
        request,
        cpu,
        memory,
        disks,
        nets,
    } = rows;

    StatisticsSample {
        agent_id: request.agent_id,
        agent_name: request.agent_name,
        time: Some(Timestamp::from_unix_nanos(request.time)),
        cpu_info: request
            .has_cpu_info
            .then(|| cpu.into_iter().map(|c| real_from_db(c.load)).collect()),
        memory_info: memory.map(|m| MemoryInfo {
            mem: m.mem.map(decode_memory),
            swap: m.swap.map(decode_memory),
        }),
        disk_info: request.has_disk_info.then(|| {
            disks
                .into_iter()
                .map(|d| DiskSnapshot {
                    name: d.name,
                    total: from_db(d.total),
                    free: from_db(d.free),
                    used: from_db(d.used),
                    used_percent: real_from_db(d.used_percent),
                })
                .collect()
        }),
        net_info: request.has_net_info.then(|| {
            nets.into_iter()
                .map(|n| NetworkSnapshot {
                    name: n.name,
                    bytes_sent: from_db(n.bytes_sent),
                    bytes_recv: from_db(n.bytes_recv),
                    packets_sent: from_db(n.packets_sent),
                    packets_recv: from_db(n.packets_recv),
                    err_in: from_db(n.err_in),
                    err_out: from_db(n.err_out),
                    drop_in: from_db(n.drop_in),
                    drop_out: from_db(n.drop_out),
                })
                .collect()
        }),
    }
}

fn encode_memory(m: &MemorySnapshot) -> MemoryRow {
    MemoryRow {
        total: to_db(m.total),
        used: to_db(m.used),
        free: to_db(m.free),
        shared: to_db(m.shared),
        used_percent: real_to_db(m.used_percent),
    }
}

fn decode_memory(m: MemoryRow) -> MemorySnapshot {
    MemorySnapshot {
        total: from_db(m.total),
        used: from_db(m.used),
        free: from_db(m.free),
        shared: from_db(m.shared),
        used_percent: real_from_db(m.used_percent),
    }
}

fn required_time(ts: Option<Timestamp>, field: &str) -> StoreResult<i64> {
    let ts = ts.ok_or_else(|| StoreError::Conversion(format!("{field} is required")))?;
    time_to_db(ts, field)
}

fn time_to_db(ts: Timestamp, field: &str) -> StoreResult<i64> {
    ts.to_unix_nanos().ok_or_else(|| {
        StoreError::InvalidTimestamp(format!(
            "{field}: seconds={} nanos={}",
            ts.seconds, ts.nanos
        ))
    })
}

fn to_db(v: u64) -> i64 {
    v as i64
}

fn from_db(v: i64) -> u64 {
    v as u64
}

/// SQLite has no NaN; it is stored as NULL. Infinities are stored as is.
fn real_to_db(v: f64) -> Option<f64> {
    (!v.is_nan()).then_some(v)
}

fn real_from_db(v: Option<f64>) -> f64 {
    v.unwrap_or(f64::NAN)
}
