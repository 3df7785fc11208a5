// ==========================================
// KpiConfigManager 集成测试
// ==========================================
// 测试目标: 验证配置读取 / 写入 / 快照在文件数据库上的行为
// ==========================================

mod test_helpers;

use production_kpi::config::{config_keys, KpiConfigManager, KpiSettings};
use production_kpi::domain::types::MergePolicy;
use test_helpers::{create_test_db, insert_test_config, open_test_connection};

#[test]
fn test_config_manager_creation() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = KpiConfigManager::new(&db_path);
    assert!(
        config_manager.is_ok(),
        "KpiConfigManager should be created successfully"
    );
}

#[test]
fn test_empty_database_uses_defaults() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = KpiConfigManager::new(&db_path).expect("Failed to create KpiConfigManager");

    let settings = config_manager.load_settings().expect("Failed to load settings");
    assert_eq!(settings, KpiSettings::default());
    assert_eq!(settings.display_locale, "pl");
    assert_eq!(settings.currency_code, "PLN");
    assert_eq!(settings.kpi_window_days, 30);
    assert_eq!(settings.history_page_size, 100);
    assert_eq!(settings.merge_policy, MergePolicy::Sum);
}

#[test]
fn test_values_written_by_other_connection_are_visible() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");
    insert_test_config(&conn, config_keys::DISPLAY_LOCALE, "zh").unwrap();
    insert_test_config(&conn, config_keys::CURRENCY_CODE, "cny").unwrap();
    insert_test_config(&conn, config_keys::HISTORY_PAGE_SIZE, "25").unwrap();

    let config_manager = KpiConfigManager::new(&db_path).expect("Failed to create KpiConfigManager");
    let settings = config_manager.load_settings().unwrap();
    assert_eq!(settings.display_locale, "zh-CN");
    assert_eq!(settings.currency_code, "CNY");
    assert_eq!(settings.history_page_size, 25);
}

#[test]
fn test_set_then_snapshot() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = KpiConfigManager::new(&db_path).expect("Failed to create KpiConfigManager");

    config_manager
        .set_global_config_value(config_keys::MERGE_POLICY, "last_write_wins")
        .unwrap();
    config_manager
        .set_global_config_value(config_keys::MERGE_POLICY, "SUM")
        .unwrap();
    assert_eq!(config_manager.get_merge_policy().unwrap(), MergePolicy::Sum);

    let snapshot: serde_json::Value =
        serde_json::from_str(&config_manager.get_config_snapshot().unwrap()).unwrap();
    assert_eq!(snapshot[config_keys::MERGE_POLICY], "SUM");
}
