// Wire models (camelCase JSON) for snapshots and agent statistics

mod agent;
mod network;
mod scheduler;
mod storage;
mod time;

pub use agent::{Category, MemoryInfo, MemorySnapshot, StatisticsSample};
pub use network::NetworkSnapshot;
pub use scheduler::{MetaData, MetaValue, SchedulerCode, SchedulerType, Snapshot};
pub use storage::DiskSnapshot;
pub use time::{Page, Pagination, TimeFilter, Timestamp};
