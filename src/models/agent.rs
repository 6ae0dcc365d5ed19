// Agent statistics sample and its memory records

use serde::{Deserialize, Serialize};

use super::{DiskSnapshot, NetworkSnapshot, Timestamp};

/// Byte counters for one memory kind (physical or swap).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorySnapshot {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub shared: u64,
    pub used_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mem: Option<MemorySnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap: Option<MemorySnapshot>,
}

/// One agent sampling interval. Each category is independently optional:
/// `None` means "not reported", `Some(vec![])` means "reported, nothing in it".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSample {
    #[serde(default)]
    pub agent_id: String,
    #[serde(default)]
    pub agent_name: String,
    pub time: Option<Timestamp>,
    /// Per-core load, in core order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_info: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_info: Option<MemoryInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_info: Option<Vec<DiskSnapshot>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_info: Option<Vec<NetworkSnapshot>>,
}

/// Statistic category a query can be projected to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Cpu,
    Memory,
    Disk,
    #[serde(rename = "net")]
    Network,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Cpu => "cpu",
            Category::Memory => "memory",
            Category::Disk => "disk",
            Category::Network => "net",
        }
    }
}
