// ==========================================
// 生产监控驾驶舱 - 生产数据仓储
// ==========================================
// 职责: production_data / production_data_history 表读写
// 红线: Repository 不做业务逻辑,只做数据映射
// 说明: 读取时保持原始形态（RawProductionRow），脏数据交由引擎层过滤
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::date_range::DateRange;
use crate::domain::history::{HistoryEntry, HistoryPage};
use crate::domain::production::{ProductionRecord, RawProductionRow, DATE_FORMAT};
use crate::domain::types::HistoryAction;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::store::ProductionRecordStore;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SELECT_COLUMNS: &str = r#"
    id, date, shift, planned_units, actual_units,
    product_type, production_line_id, created_by
"#;

// ==========================================
// 宽松列读取
// ==========================================
// production_data 的列允许外部写入任意类型，读取时统一转为 Option

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Text(s) => Some(s),
        Value::Blob(b) => String::from_utf8(b).ok(),
    }
}

fn value_to_i64(value: Value) -> Option<i64> {
    match value {
        Value::Integer(i) => Some(i),
        Value::Real(f) if f.fract() == 0.0 => Some(f as i64),
        Value::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn map_raw_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawProductionRow> {
    Ok(RawProductionRow {
        id: value_to_string(row.get(0)?),
        date: value_to_string(row.get(1)?),
        shift: value_to_string(row.get(2)?),
        planned_units: value_to_i64(row.get(3)?),
        actual_units: value_to_i64(row.get(4)?),
        product_type: value_to_string(row.get(5)?),
        production_line_id: value_to_string(row.get(6)?),
        created_by: value_to_string(row.get(7)?),
    })
}

// ==========================================
// ProductionDataRepository - 生产数据仓储
// ==========================================
pub struct ProductionDataRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProductionDataRepository {
    /// 打开数据库文件创建仓储（表结构由 db::init_schema 负责）
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按日期闭区间查询原始行（日期升序，同日按写入顺序）
    pub fn find_by_date_range(&self, range: &DateRange) -> RepositoryResult<Vec<RawProductionRow>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM production_data WHERE date >= ?1 AND date <= ?2 ORDER BY date ASC, created_at ASC, rowid ASC",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(
                params![
                    range.start.format(DATE_FORMAT).to_string(),
                    range.end.format(DATE_FORMAT).to_string()
                ],
                map_raw_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// 按ID查询
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<RawProductionRow>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM production_data WHERE id = ?1", SELECT_COLUMNS);
        let row = conn.query_row(&sql, params![id], map_raw_row).optional()?;
        Ok(row)
    }

    // ==========================================
    // 写入操作（同一事务内写入历史）
    // ==========================================

    /// 新增记录
    ///
    /// # 返回
    /// - Ok(record): 带新分配ID与录入人的记录
    pub fn insert(&self, record: &ProductionRecord, actor: &str) -> RepositoryResult<ProductionRecord> {
        let mut stored = record.clone();
        stored.id = Some(Uuid::new_v4().to_string());
        stored.created_by = Some(actor.to_string());
        let now = chrono::Local::now().naive_local();

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO production_data (
                id, date, shift, planned_units, actual_units,
                product_type, production_line_id, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                stored.id,
                stored.date_str(),
                stored.shift.to_db_str(),
                stored.planned_units,
                stored.actual_units,
                stored.product_type,
                stored.production_line_id,
                stored.created_by,
                now.format(TIMESTAMP_FORMAT).to_string(),
            ],
        )?;
        Self::append_history(&tx, &stored, actor, HistoryAction::Create, now)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tracing::debug!(id = ?stored.id, date = %stored.date, shift = %stored.shift, "生产记录已写入");
        Ok(stored)
    }

    /// 更新记录
    ///
    /// # 返回
    /// - Err(NotFound): 记录不存在
    pub fn update(
        &self,
        id: &str,
        record: &ProductionRecord,
        actor: &str,
    ) -> RepositoryResult<ProductionRecord> {
        let mut stored = record.clone();
        stored.id = Some(id.to_string());
        let now = chrono::Local::now().naive_local();

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let affected = tx.execute(
            r#"
            UPDATE production_data SET
                date = ?2, shift = ?3, planned_units = ?4, actual_units = ?5,
                product_type = ?6, production_line_id = ?7, updated_at = ?8
            WHERE id = ?1
            "#,
            params![
                id,
                stored.date_str(),
                stored.shift.to_db_str(),
                stored.planned_units,
                stored.actual_units,
                stored.product_type,
                stored.production_line_id,
                now.format(TIMESTAMP_FORMAT).to_string(),
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "production_data".to_string(),
                id: id.to_string(),
            });
        }

        stored.created_by = tx
            .query_row(
                "SELECT created_by FROM production_data WHERE id = ?1",
                params![id],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?
            .flatten();

        Self::append_history(&tx, &stored, actor, HistoryAction::Update, now)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tracing::debug!(id = %id, actor = %actor, "生产记录已更新");
        Ok(stored)
    }

    fn append_history(
        tx: &Transaction<'_>,
        record: &ProductionRecord,
        actor: &str,
        action: HistoryAction,
        at: NaiveDateTime,
    ) -> RepositoryResult<()> {
        let snapshot = serde_json::to_string(&RawProductionRow::from(record))?;
        tx.execute(
            r#"
            INSERT INTO production_data_history (
                history_id, production_data_id, user_id, action, snapshot_json, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                Uuid::new_v4().to_string(),
                record.id,
                actor,
                action.to_db_str(),
                snapshot,
                at.format(TIMESTAMP_FORMAT).to_string(),
            ],
        )?;
        Ok(())
    }

    // ==========================================
    // 变更历史
    // ==========================================

    /// 按变更日期闭区间分页查询历史（倒序）
    ///
    /// # 参数
    /// - page: 从 1 开始（0 视为 1）
    /// - per_page: 每页条数（0 视为 1）
    pub fn find_history(
        &self,
        range: &DateRange,
        page: u32,
        per_page: u32,
    ) -> RepositoryResult<HistoryPage> {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let start = range.start.format(DATE_FORMAT).to_string();
        let end = range.end.format(DATE_FORMAT).to_string();

        let conn = self.get_conn()?;
        let total_count: i64 = conn.query_row(
            r#"
            SELECT COUNT(*) FROM production_data_history
            WHERE substr(created_at, 1, 10) >= ?1 AND substr(created_at, 1, 10) <= ?2
            "#,
            params![start, end],
            |row| row.get(0),
        )?;

        let offset = i64::from(page - 1) * i64::from(per_page);
        let mut stmt = conn.prepare(
            r#"
            SELECT history_id, production_data_id, user_id, action, snapshot_json, created_at
            FROM production_data_history
            WHERE substr(created_at, 1, 10) >= ?1 AND substr(created_at, 1, 10) <= ?2
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?3 OFFSET ?4
            "#,
        )?;

        let raw: Vec<(String, String, Option<String>, String, String, String)> = stmt
            .query_map(params![start, end, i64::from(per_page), offset], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut entries = Vec::with_capacity(raw.len());
        for (history_id, production_data_id, user_id, action, snapshot_json, created_at) in raw {
            let action = HistoryAction::from_str(&action).ok_or_else(|| RepositoryError::FieldValueError {
                field: "action".to_string(),
                message: format!("未知变更类型: {}", action),
            })?;
            let created_at = NaiveDateTime::parse_from_str(&created_at, TIMESTAMP_FORMAT).map_err(|e| {
                RepositoryError::FieldValueError {
                    field: "created_at".to_string(),
                    message: e.to_string(),
                }
            })?;
            entries.push(HistoryEntry {
                history_id,
                production_data_id,
                user_id,
                action,
                created_at,
                snapshot: serde_json::from_str(&snapshot_json)?,
            });
        }

        Ok(HistoryPage {
            entries,
            total_count: u64::try_from(total_count).unwrap_or(0),
            page,
            per_page,
        })
    }
}

#[async_trait]
impl ProductionRecordStore for ProductionDataRepository {
    async fn fetch_records(&self, range: &DateRange) -> RepositoryResult<Vec<RawProductionRow>> {
        self.find_by_date_range(range)
    }

    async fn insert_record(
        &self,
        record: &ProductionRecord,
        actor: &str,
    ) -> RepositoryResult<ProductionRecord> {
        self.insert(record, actor)
    }

    async fn update_record(
        &self,
        id: &str,
        record: &ProductionRecord,
        actor: &str,
    ) -> RepositoryResult<ProductionRecord> {
        self.update(id, record, actor)
    }

    async fn fetch_history(
        &self,
        range: &DateRange,
        page: u32,
        per_page: u32,
    ) -> RepositoryResult<HistoryPage> {
        self.find_history(range, page, per_page)
    }
}
