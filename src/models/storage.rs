// Disk usage models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskSnapshot {
    pub name: String,
    pub total: u64,
    pub free: u64,
    pub used: u64,
    pub used_percent: f64,
}
