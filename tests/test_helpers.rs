// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

use chrono::NaiveDate;
use production_kpi::db::{init_schema, open_sqlite_connection};
use rusqlite::{params, Connection};
use std::error::Error;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试数据库连接
pub fn open_test_connection(db_path: &str) -> Result<Connection, Box<dyn Error>> {
    Ok(open_sqlite_connection(db_path)?)
}

/// 2024 年 3 月的某一天
pub fn march(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

/// 直接写入一行原始生产数据（可写入脏数据）
pub fn insert_raw_production_row(
    conn: &Connection,
    id: &str,
    date: &str,
    shift: Option<&str>,
    planned_units: Option<i64>,
    actual_units: Option<i64>,
    product_type: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    conn.execute(
        r#"
        INSERT INTO production_data (id, date, shift, planned_units, actual_units, product_type)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![id, date, shift, planned_units, actual_units, product_type],
    )?;
    Ok(())
}

/// 写入测试设备
pub fn insert_test_machine(
    conn: &Connection,
    id: &str,
    name: &str,
    status: &str,
) -> Result<(), Box<dyn Error>> {
    conn.execute(
        "INSERT INTO machines (id, name, status) VALUES (?1, ?2, ?3)",
        params![id, name, status],
    )?;
    Ok(())
}

/// 写入 global 配置
pub fn insert_test_config(conn: &Connection, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    conn.execute(
        "INSERT OR REPLACE INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)",
        params![key, value],
    )?;
    Ok(())
}
