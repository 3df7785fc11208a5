// ==========================================
// 生产监控驾驶舱 - 配置层
// ==========================================
// 职责: 驾驶舱配置管理（语言 / 货币 / 导出 / 聚合策略）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{config_keys, KpiConfigManager, KpiSettings};
