// ==========================================
// 生产监控驾驶舱 - API 层
// ==========================================
// 职责: 提供驾驶舱业务 API 接口,供命令行 / 上层界面调用
// ==========================================

pub mod error;
pub mod kpi_api;
pub mod report_cache;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use kpi_api::{KpiDashboardApi, ReportOutcome};
pub use report_cache::{ReportCache, ReportKey, RequestTicket};
