// ==========================================
// 生产监控驾驶舱 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、值对象
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod date_range;
pub mod history;
pub mod machine;
pub mod production;
pub mod report;
pub mod session;
pub mod types;

// 重导出核心类型
pub use date_range::{DateRange, InvalidRangeError};
pub use history::{HistoryEntry, HistoryPage};
pub use machine::Machine;
pub use production::{ProductionRecord, RawProductionRow, RecordConversionError};
pub use report::{
    Bucket, KpiSummary, MachineStatusSummary, PerShift, ShiftReport, ShiftTotals, SkippedRecord,
};
pub use session::SessionContext;
pub use types::{HistoryAction, MachineStatus, MergePolicy, Shift, UserRole, ViewMode};
