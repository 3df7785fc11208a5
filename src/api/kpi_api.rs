// ==========================================
// 生产监控驾驶舱 - KPI 驾驶舱 API
// ==========================================
// 职责: 拉取（记录 + 设备并发）→ 聚合管线 → 缓存 → 展示/导出
// 架构: API 层 → Engine 层（纯函数）+ Repository 层（外部协作方）
// 红线: 日期范围非法必须在任何拉取之前拒绝；拉取失败不重试
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::report_cache::{ReportCache, ReportKey};
use crate::config::KpiSettings;
use crate::domain::date_range::DateRange;
use crate::domain::history::HistoryPage;
use crate::domain::machine::Machine;
use crate::domain::production::{ProductionRecord, RawProductionRow};
use crate::domain::report::{KpiSummary, ShiftReport};
use crate::domain::session::SessionContext;
use crate::domain::types::ViewMode;
use crate::engine::export::{CsvExporter, ExportFile};
use crate::engine::formatter::KpiFormatter;
use crate::engine::report_engine::ShiftReportEngine;
use crate::i18n;
use crate::repository::store::{MachineRegistry, ProductionRecordStore};
use chrono::NaiveDate;
use std::sync::Arc;

// ==========================================
// ReportOutcome - 报表请求结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    /// 应展示的报表
    Current(Arc<ShiftReport>),
    /// 应答到达前已有更新的请求，调用方应丢弃
    Superseded,
}

impl ReportOutcome {
    pub fn report(&self) -> Option<&ShiftReport> {
        match self {
            ReportOutcome::Current(report) => Some(report),
            ReportOutcome::Superseded => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, ReportOutcome::Superseded)
    }
}

// ==========================================
// KpiDashboardApi - KPI 驾驶舱 API
// ==========================================
pub struct KpiDashboardApi {
    store: Arc<dyn ProductionRecordStore>,
    registry: Arc<dyn MachineRegistry>,
    engine: ShiftReportEngine,
    exporter: CsvExporter,
    cache: ReportCache,
    settings: KpiSettings,
}

impl KpiDashboardApi {
    /// 创建新的 KpiDashboardApi 实例
    ///
    /// # 参数
    /// - store: 生产记录存储
    /// - registry: 设备注册表
    /// - settings: 驾驶舱配置（语言 / 合并策略 / 分隔符 等）
    pub fn new(
        store: Arc<dyn ProductionRecordStore>,
        registry: Arc<dyn MachineRegistry>,
        settings: KpiSettings,
    ) -> Self {
        let formatter = KpiFormatter::new(&settings.display_locale);
        Self {
            store,
            registry,
            engine: ShiftReportEngine::new(formatter, settings.merge_policy),
            exporter: CsvExporter::new(settings.csv_delimiter),
            cache: ReportCache::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &KpiSettings {
        &self.settings
    }

    pub fn formatter(&self) -> &KpiFormatter {
        self.engine.formatter()
    }

    pub fn cache(&self) -> &ReportCache {
        &self.cache
    }

    /// 并发拉取记录与设备
    async fn fetch_inputs(&self, range: &DateRange) -> ApiResult<(Vec<RawProductionRow>, Vec<Machine>)> {
        futures::try_join!(self.store.fetch_records(range), self.registry.fetch_machines()).map_err(|e| {
            tracing::error!(range = %range, error = %e, "生产数据拉取失败");
            ApiError::Fetch(e.to_string())
        })
    }

    // ==========================================
    // 报表查询
    // ==========================================

    /// 按视图 + 参考日加载班次报表
    pub async fn load_shift_report(
        &self,
        view_mode: ViewMode,
        reference: NaiveDate,
    ) -> ApiResult<ReportOutcome> {
        let range = DateRange::for_view(view_mode, reference);
        self.load_range_report(range, view_mode).await
    }

    /// 按显式日期范围加载班次报表
    ///
    /// # 返回
    /// - Ok(Current): 应展示的报表（可能来自缓存）
    /// - Ok(Superseded): 期间有更新的不同请求，结果已缓存但不应展示
    /// - Err(InvalidRange): 日期范围非法（未发起任何拉取）
    /// - Err(Fetch): 存储或注册表失败
    pub async fn load_range_report(
        &self,
        range: DateRange,
        view_mode: ViewMode,
    ) -> ApiResult<ReportOutcome> {
        range.validate()?;

        let key = ReportKey {
            range,
            view_mode,
            locale: self.formatter().locale(),
        };
        let ticket = self.cache.begin(key);

        if let Some(report) = self.cache.get(&key) {
            tracing::debug!(range = %range, view_mode = %view_mode, "报表缓存命中");
            return Ok(ReportOutcome::Current(report));
        }

        let (rows, machines) = self.fetch_inputs(&range).await?;
        let report = Arc::new(self.engine.build(&range, view_mode, rows, &machines)?);
        self.cache.insert(&ticket, Arc::clone(&report));

        if self.cache.is_current(&ticket) {
            Ok(ReportOutcome::Current(report))
        } else {
            tracing::debug!(
                generation = ticket.generation,
                range = %range,
                "报表应答已过期，丢弃"
            );
            Ok(ReportOutcome::Superseded)
        }
    }

    /// 加载报表；拉取失败时降级为全零骨架报表（携带错误信息）
    pub async fn load_report_or_empty(
        &self,
        view_mode: ViewMode,
        reference: NaiveDate,
    ) -> ApiResult<ReportOutcome> {
        let range = DateRange::for_view(view_mode, reference);
        match self.load_range_report(range, view_mode).await {
            Err(ApiError::Fetch(msg)) => {
                tracing::warn!(range = %range, error = %msg, "拉取失败，返回空报表");
                let message = format!(
                    "{}: {}",
                    i18n::t(self.formatter().locale(), "report.fetch_failed"),
                    msg
                );
                let report = self.engine.empty(&range, view_mode, Some(message))?;
                Ok(ReportOutcome::Current(Arc::new(report)))
            }
            other => other,
        }
    }

    /// 滚动窗口 KPI（截至 today 的最近 N 天，N 来自配置）
    pub async fn rolling_kpi_summary(&self, today: NaiveDate) -> ApiResult<KpiSummary> {
        let days = self.settings.kpi_window_days;
        let range = DateRange::trailing_days(today, days).ok_or_else(|| {
            ApiError::InvalidInput(format!("滚动窗口 {} 天超出可表示的日期范围", days))
        })?;
        let (rows, machines) = self.fetch_inputs(&range).await?;
        Ok(self.engine.summarize(&range, rows, &machines)?)
    }

    // ==========================================
    // 导出
    // ==========================================

    /// 导出日期闭区间内的原始记录为 CSV
    ///
    /// 异常记录与报表一致地被跳过
    pub async fn export_csv(&self, start: NaiveDate, end: NaiveDate) -> ApiResult<ExportFile> {
        let range = DateRange::new(start, end)?;
        let rows = self.store.fetch_records(&range).await.map_err(|e| {
            tracing::error!(range = %range, error = %e, "导出数据拉取失败");
            ApiError::Fetch(e.to_string())
        })?;
        let (records, skipped) = self.engine.partitioner().accept_rows(rows);
        if !skipped.is_empty() {
            tracing::warn!(range = %range, skipped = skipped.len(), "导出跳过异常记录");
        }
        Ok(self.exporter.export_records(&range, &records)?)
    }

    // ==========================================
    // 写入
    // ==========================================

    fn validate_record(record: &ProductionRecord) -> ApiResult<()> {
        if record.product_type.trim().is_empty() {
            return Err(ApiError::InvalidInput("产品类型不能为空".to_string()));
        }
        Ok(())
    }

    /// 录入生产记录
    ///
    /// # 返回
    /// - Err(Unauthorized): 未登录
    /// - Err(InvalidInput): 记录字段非法
    pub async fn insert_record(
        &self,
        session: &SessionContext,
        record: ProductionRecord,
    ) -> ApiResult<ProductionRecord> {
        if !session.can_insert_records() {
            return Err(ApiError::Unauthorized("录入生产数据需要登录".to_string()));
        }
        Self::validate_record(&record)?;

        let stored = self.store.insert_record(&record, &session.user_id).await?;
        let invalidated = self.cache.invalidate_date(stored.date);

        tracing::info!(
            user_id = %session.user_id,
            date = %stored.date,
            shift = %stored.shift,
            invalidated,
            "生产记录已录入"
        );
        Ok(stored)
    }

    /// 修改已录入的生产记录（管理员 / 班组长）
    pub async fn update_record(
        &self,
        session: &SessionContext,
        id: &str,
        record: ProductionRecord,
    ) -> ApiResult<ProductionRecord> {
        if !session.can_update_records() {
            return Err(ApiError::Unauthorized(format!(
                "角色 {} 无权修改生产数据",
                session.role
            )));
        }
        if id.trim().is_empty() {
            return Err(ApiError::InvalidInput("记录ID不能为空".to_string()));
        }
        Self::validate_record(&record)?;

        let stored = self
            .store
            .update_record(id, &record, &session.user_id)
            .await?;
        // 旧日期未知，整体清空
        self.cache.clear();

        tracing::info!(user_id = %session.user_id, id = %id, "生产记录已修改");
        Ok(stored)
    }

    // ==========================================
    // 变更历史
    // ==========================================

    /// 分页查询变更历史（每页条数来自配置）
    pub async fn list_history(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        page: u32,
    ) -> ApiResult<HistoryPage> {
        let range = DateRange::new(start, end)?;
        self.store
            .fetch_history(&range, page.max(1), self.settings.history_page_size)
            .await
            .map_err(|e| ApiError::Fetch(e.to_string()))
    }
}
