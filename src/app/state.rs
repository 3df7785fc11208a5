// ==========================================
// 生产监控驾驶舱 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::api::KpiDashboardApi;
use crate::config::{KpiConfigManager, KpiSettings};
use crate::db::{init_schema, open_sqlite_connection};
use crate::repository::{MachineRepository, ProductionDataRepository};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "PRODUCTION_KPI_DB_PATH";

/// 应用状态
///
/// 所有仓储共享同一个 SQLite 连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 配置管理器
    pub config: Arc<KpiConfigManager>,

    /// 生产数据仓储
    pub production_repo: Arc<ProductionDataRepository>,

    /// 设备仓储
    pub machine_repo: Arc<MachineRepository>,

    /// KPI 驾驶舱 API
    pub kpi_api: Arc<KpiDashboardApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库并建表（幂等）
    /// 2. 读取驾驶舱配置
    /// 3. 创建仓储与API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("无法初始化数据库结构: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let config = Arc::new(KpiConfigManager::from_connection(conn.clone()));
        let settings = config
            .load_settings()
            .map_err(|e| format!("无法读取配置: {}", e))?;

        Ok(Self::with_settings(db_path, conn, config, settings))
    }

    fn with_settings(
        db_path: String,
        conn: Arc<Mutex<rusqlite::Connection>>,
        config: Arc<KpiConfigManager>,
        settings: KpiSettings,
    ) -> Self {
        let production_repo = Arc::new(ProductionDataRepository::from_connection(conn.clone()));
        let machine_repo = Arc::new(MachineRepository::from_connection(conn));

        tracing::info!(
            locale = %settings.display_locale,
            merge_policy = %settings.merge_policy,
            kpi_window_days = settings.kpi_window_days,
            "驾驶舱配置已加载"
        );

        let kpi_api = Arc::new(KpiDashboardApi::new(
            production_repo.clone(),
            machine_repo.clone(),
            settings,
        ));

        Self {
            db_path,
            config,
            production_repo,
            machine_repo,
            kpi_api,
        }
    }
}

/// 默认数据库路径
///
/// 优先级: 环境变量 > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./production_kpi.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("production-kpi");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("production_kpi.db");
        }
    }

    path.to_string_lossy().to_string()
}
