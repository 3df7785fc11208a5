// ==========================================
// 生产监控驾驶舱 - 设备仓储
// ==========================================
// 职责: machines 表读写（设备状态卡片 / 利用率输入）
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::machine::Machine;
use crate::domain::types::MachineStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::store::MachineRegistry;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct MachineRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MachineRepository {
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

    /// 查询全部设备（按名称排序）
    ///
    /// 状态列无法识别的设备会被跳过并记录告警
    pub fn find_all(&self) -> RepositoryResult<Vec<Machine>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, name, status, production_line_id, failure_reason
            FROM machines
            ORDER BY name ASC, id ASC
            "#,
        )?;

        let rows: Vec<(String, String, String, Option<String>, Option<String>)> = stmt
            .query_map([], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let machines = rows
            .into_iter()
            .map(|(id, name, status, production_line_id, failure_reason)| {
                let status = MachineStatus::from_str(&status).unwrap_or_else(|| {
                    tracing::warn!(machine_id = %id, status = %status, "设备状态无法识别，按未知状态计入");
                    MachineStatus::Unknown
                });
                Machine {
                    id,
                    name,
                    status,
                    production_line_id,
                    failure_reason,
                }
            })
            .collect();
        Ok(machines)
    }

    /// 新增或覆盖设备
    pub fn upsert(&self, machine: &Machine) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO machines (id, name, status, production_line_id, failure_reason, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, datetime('now'))
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                status = excluded.status,
                production_line_id = excluded.production_line_id,
                failure_reason = excluded.failure_reason,
                updated_at = excluded.updated_at
            "#,
            params![
                machine.id,
                machine.name,
                machine.status.to_db_str(),
                machine.production_line_id,
                machine.failure_reason,
            ],
        )?;
        Ok(())
    }

    /// 更新设备状态
    ///
    /// - failure 以外的状态会清空故障原因
    /// - 进入 service 时记录最近保养日期
    pub fn update_status(
        &self,
        id: &str,
        status: MachineStatus,
        failure_reason: Option<&str>,
    ) -> RepositoryResult<()> {
        let failure_reason = match status {
            MachineStatus::Failure => failure_reason,
            _ => None,
        };

        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE machines SET
                status = ?2,
                failure_reason = ?3,
                last_service = CASE WHEN ?2 = 'service' THEN date('now', 'localtime') ELSE last_service END,
                updated_at = datetime('now')
            WHERE id = ?1
            "#,
            params![id, status.to_db_str(), failure_reason],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "machines".to_string(),
                id: id.to_string(),
            });
        }
        tracing::info!(machine_id = %id, status = %status, "设备状态已更新");
        Ok(())
    }
}

#[async_trait]
impl MachineRegistry for MachineRepository {
    async fn fetch_machines(&self) -> RepositoryResult<Vec<Machine>> {
        self.find_all()
    }
}
