// ==========================================
// 生产监控驾驶舱 - 外部协作方接口
// ==========================================
// Record Store / Machine Registry 在聚合引擎看来是外部服务，
// 以 async trait 抽象；SQLite 实现见 production_repo / machine_repo
// ==========================================

use crate::domain::date_range::DateRange;
use crate::domain::history::HistoryPage;
use crate::domain::machine::Machine;
use crate::domain::production::{ProductionRecord, RawProductionRow};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

/// 生产记录存储
#[async_trait]
pub trait ProductionRecordStore: Send + Sync {
    /// 按日期闭区间拉取原始记录（按日期升序）
    async fn fetch_records(&self, range: &DateRange) -> RepositoryResult<Vec<RawProductionRow>>;

    /// 新增记录，返回带 ID 的记录
    async fn insert_record(
        &self,
        record: &ProductionRecord,
        actor: &str,
    ) -> RepositoryResult<ProductionRecord>;

    /// 更新已有记录
    async fn update_record(
        &self,
        id: &str,
        record: &ProductionRecord,
        actor: &str,
    ) -> RepositoryResult<ProductionRecord>;

    /// 变更历史分页（按变更时间倒序）
    async fn fetch_history(
        &self,
        range: &DateRange,
        page: u32,
        per_page: u32,
    ) -> RepositoryResult<HistoryPage>;
}

/// 设备注册表
#[async_trait]
pub trait MachineRegistry: Send + Sync {
    async fn fetch_machines(&self) -> RepositoryResult<Vec<Machine>>;
}
