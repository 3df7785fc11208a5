// ==========================================
// 生产监控驾驶舱 - 核心库
// ==========================================
// 系统定位: 生产 KPI 聚合与报表引擎
// 管线: 日期桶生成 → 班次分区合并 → KPI 汇总 → 本地化格式化 / CSV 导出
// 技术栈: Rust + SQLite
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 聚合管线
pub mod engine;

// 配置层 - 驾驶舱配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{HistoryAction, MachineStatus, MergePolicy, Shift, UserRole, ViewMode};

// 领域实体
pub use domain::{
    Bucket, DateRange, HistoryEntry, HistoryPage, KpiSummary, Machine, ProductionRecord,
    RawProductionRow, SessionContext, ShiftReport, ShiftTotals,
};

// 引擎
pub use engine::{CsvExporter, DateBucketGenerator, KpiAggregator, KpiFormatter, ShiftPartitioner, ShiftReportEngine};

// API
pub use api::{ApiError, ApiResult, KpiDashboardApi, ReportOutcome};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "生产监控驾驶舱";
