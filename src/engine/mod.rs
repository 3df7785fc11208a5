// ==========================================
// 生产监控驾驶舱 - 引擎层
// ==========================================
// 职责: KPI 聚合管线（桶生成 / 班次分区 / 聚合 / 格式化 / 导出）
// 红线: Engine 不拼 SQL，不做 I/O，纯函数
// ==========================================

pub mod aggregator;
pub mod bucket_generator;
pub mod error;
pub mod export;
pub mod formatter;
pub mod report_engine;
pub mod shift_partitioner;

// 重导出核心引擎
pub use aggregator::{efficiency_percent, utilization_percent, KpiAggregator};
pub use bucket_generator::DateBucketGenerator;
pub use error::{EngineError, EngineResult};
pub use export::{export_filename, CsvExporter, ExportFile, CSV_MIME_TYPE, RECORD_EXPORT_HEADER};
pub use formatter::{round_one_decimal, KpiFormatter};
pub use report_engine::ShiftReportEngine;
pub use shift_partitioner::ShiftPartitioner;
