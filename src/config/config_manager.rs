// ==========================================
// 生产监控驾驶舱 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value, scope_id='global')
// 约定: 配置缺失或格式错误时回退默认值并记录告警
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::types::MergePolicy;
use crate::i18n;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

// ==========================================
// 默认值
// ==========================================
pub const DEFAULT_CURRENCY_CODE: &str = "PLN";
pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_KPI_WINDOW_DAYS: u32 = 30;
pub const MAX_KPI_WINDOW_DAYS: u32 = 3660;
pub const DEFAULT_HISTORY_PAGE_SIZE: u32 = 100;

// ==========================================
// KpiSettings - 驾驶舱配置快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiSettings {
    pub display_locale: String,
    pub currency_code: String,
    pub csv_delimiter: u8,
    pub kpi_window_days: u32,
    pub history_page_size: u32,
    pub merge_policy: MergePolicy,
}

impl Default for KpiSettings {
    fn default() -> Self {
        Self {
            display_locale: i18n::DEFAULT_LOCALE.to_string(),
            currency_code: DEFAULT_CURRENCY_CODE.to_string(),
            csv_delimiter: DEFAULT_CSV_DELIMITER,
            kpi_window_days: DEFAULT_KPI_WINDOW_DAYS,
            history_page_size: DEFAULT_HISTORY_PAGE_SIZE,
            merge_policy: MergePolicy::default(),
        }
    }
}

// ==========================================
// KpiConfigManager - 配置管理器
// ==========================================
pub struct KpiConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl KpiConfigManager {
    /// 创建新的 KpiConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 KpiConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 配置（Upsert）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at) VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value],
        )?;
        tracing::info!(config_key = %key, value = %value, "配置已更新");
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let config_map: BTreeMap<String, String> = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<_, _>>()?;

        Ok(serde_json::to_string(&config_map)?)
    }

    // ===== 展示配置 =====

    /// 界面语言（默认 pl）
    pub fn get_display_locale(&self) -> RepositoryResult<String> {
        let value = self.get_config_or_default(config_keys::DISPLAY_LOCALE, i18n::DEFAULT_LOCALE)?;
        Ok(i18n::normalize_locale(&value).to_string())
    }

    /// 货币代码（ISO 4217，默认 PLN）
    pub fn get_currency_code(&self) -> RepositoryResult<String> {
        let value = self.get_config_or_default(config_keys::CURRENCY_CODE, DEFAULT_CURRENCY_CODE)?;
        let code = value.trim().to_uppercase();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(code)
        } else {
            tracing::warn!(
                config_key = config_keys::CURRENCY_CODE,
                raw_value = %value,
                "货币代码格式错误，使用默认值"
            );
            Ok(DEFAULT_CURRENCY_CODE.to_string())
        }
    }

    // ===== 导出配置 =====

    /// CSV 分隔符（单个 ASCII 字符，默认逗号）
    pub fn get_csv_delimiter(&self) -> RepositoryResult<u8> {
        let value = self.get_config_or_default(config_keys::CSV_DELIMITER, ",")?;
        match value.as_bytes() {
            [b] if b.is_ascii() && *b != b'"' && *b != b'\n' && *b != b'\r' => Ok(*b),
            _ => {
                tracing::warn!(
                    config_key = config_keys::CSV_DELIMITER,
                    raw_value = %value,
                    "CSV分隔符配置无效，使用逗号"
                );
                Ok(DEFAULT_CSV_DELIMITER)
            }
        }
    }

    // ===== 聚合配置 =====

    /// KPI 滚动窗口天数（默认 30，取值 1..=3660）
    pub fn get_kpi_window_days(&self) -> RepositoryResult<u32> {
        let value = self.get_config_or_default(config_keys::KPI_WINDOW_DAYS, "30")?;
        match value.trim().parse::<u32>() {
            Ok(days) if (1..=MAX_KPI_WINDOW_DAYS).contains(&days) => Ok(days),
            _ => {
                tracing::warn!(
                    config_key = config_keys::KPI_WINDOW_DAYS,
                    raw_value = %value,
                    max = MAX_KPI_WINDOW_DAYS,
                    "KPI窗口天数配置无效，使用默认值"
                );
                Ok(DEFAULT_KPI_WINDOW_DAYS)
            }
        }
    }

    /// 历史面板每页条数（默认 100）
    pub fn get_history_page_size(&self) -> RepositoryResult<u32> {
        let value = self.get_config_or_default(config_keys::HISTORY_PAGE_SIZE, "100")?;
        Ok(value
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_HISTORY_PAGE_SIZE))
    }

    /// 同日同班多条记录的合并策略（默认 SUM）
    pub fn get_merge_policy(&self) -> RepositoryResult<MergePolicy> {
        let value = self.get_config_or_default(config_keys::MERGE_POLICY, "SUM")?;
        Ok(MergePolicy::from_str(&value).unwrap_or_else(|| {
            tracing::warn!(
                config_key = config_keys::MERGE_POLICY,
                raw_value = %value,
                "合并策略配置无效，使用 SUM"
            );
            MergePolicy::default()
        }))
    }

    /// 一次性读取全部驾驶舱配置
    pub fn load_settings(&self) -> RepositoryResult<KpiSettings> {
        Ok(KpiSettings {
            display_locale: self.get_display_locale()?,
            currency_code: self.get_currency_code()?,
            csv_delimiter: self.get_csv_delimiter()?,
            kpi_window_days: self.get_kpi_window_days()?,
            history_page_size: self.get_history_page_size()?,
            merge_policy: self.get_merge_policy()?,
        })
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 展示
    pub const DISPLAY_LOCALE: &str = "display_locale";
    pub const CURRENCY_CODE: &str = "currency_code";

    // 导出
    pub const CSV_DELIMITER: &str = "csv_delimiter";

    // 聚合
    pub const KPI_WINDOW_DAYS: &str = "kpi_window_days";
    pub const MERGE_POLICY: &str = "merge_policy";

    // 历史面板
    pub const HISTORY_PAGE_SIZE: &str = "history_page_size";
}
