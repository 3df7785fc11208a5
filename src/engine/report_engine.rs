// ==========================================
// 生产监控驾驶舱 - 班次报表引擎
// ==========================================
// 管线: 桶生成 → 脏数据过滤 → 班次合并 → KPI 汇总 → 标签
// 红线: 纯同步、单次遍历，不做 I/O；相同输入必然得到相同输出
// ==========================================

use crate::domain::date_range::DateRange;
use crate::domain::machine::Machine;
use crate::domain::production::RawProductionRow;
use crate::domain::report::{KpiSummary, MachineStatusSummary, ShiftReport};
use crate::domain::types::{MergePolicy, ViewMode};
use crate::engine::aggregator::KpiAggregator;
use crate::engine::bucket_generator::DateBucketGenerator;
use crate::engine::error::EngineResult;
use crate::engine::formatter::KpiFormatter;
use crate::engine::shift_partitioner::ShiftPartitioner;

pub struct ShiftReportEngine {
    formatter: KpiFormatter,
    generator: DateBucketGenerator,
    partitioner: ShiftPartitioner,
    aggregator: KpiAggregator,
}

impl ShiftReportEngine {
    pub fn new(formatter: KpiFormatter, policy: MergePolicy) -> Self {
        let partitioner = ShiftPartitioner::new(policy);
        Self {
            formatter,
            generator: DateBucketGenerator::new(formatter),
            partitioner,
            aggregator: KpiAggregator::new(partitioner),
        }
    }

    pub fn formatter(&self) -> &KpiFormatter {
        &self.formatter
    }

    pub fn aggregator(&self) -> &KpiAggregator {
        &self.aggregator
    }

    pub fn partitioner(&self) -> &ShiftPartitioner {
        &self.partitioner
    }

    /// 仅计算区间 KPI（滚动窗口卡片用，不生成桶）
    pub fn summarize(
        &self,
        range: &DateRange,
        rows: Vec<RawProductionRow>,
        machines: &[Machine],
    ) -> EngineResult<KpiSummary> {
        range.validate()?;
        let (records, skipped) = self.partitioner.accept_rows(rows);
        if !skipped.is_empty() {
            tracing::debug!(range = %range, skipped = skipped.len(), "KPI 汇总跳过异常记录");
        }
        Ok(self.aggregator.summarize(range, &records, machines))
    }

    /// 构建班次报表
    ///
    /// # 参数
    /// - rows: 存储层原始行（可能含脏数据）
    /// - machines: 设备列表（用于利用率）
    ///
    /// # 返回
    /// - Err(EngineError::InvalidRange): 日期范围非法
    pub fn build(
        &self,
        range: &DateRange,
        view_mode: ViewMode,
        rows: Vec<RawProductionRow>,
        machines: &[Machine],
    ) -> EngineResult<ShiftReport> {
        let skeleton = self.generator.generate(range, view_mode)?;
        let (records, skipped_records) = self.partitioner.accept_rows(rows);

        let buckets = self.aggregator.fill_buckets(skeleton, &records);
        let summary = self.aggregator.summarize(range, &records, machines);
        let machine_summary = self.aggregator.machine_summary(machines);

        tracing::debug!(
            range = %range,
            view_mode = %view_mode,
            records = records.len(),
            skipped = skipped_records.len(),
            total_planned = summary.total_planned,
            total_actual = summary.total_actual,
            "班次报表构建完成"
        );

        Ok(ShiftReport {
            range: *range,
            view_mode,
            period_label: self.formatter.period_label(view_mode, range),
            buckets,
            summary,
            machine_summary,
            skipped_records,
            fetch_error: None,
        })
    }

    /// 全零骨架报表（拉取失败时使用，保证图表布局完整）
    pub fn empty(
        &self,
        range: &DateRange,
        view_mode: ViewMode,
        fetch_error: Option<String>,
    ) -> EngineResult<ShiftReport> {
        let buckets = self.generator.generate(range, view_mode)?;
        Ok(ShiftReport {
            range: *range,
            view_mode,
            period_label: self.formatter.period_label(view_mode, range),
            buckets,
            summary: KpiSummary::default(),
            machine_summary: MachineStatusSummary::default(),
            skipped_records: Vec::new(),
            fetch_error,
        })
    }
}

impl Default for ShiftReportEngine {
    fn default() -> Self {
        Self::new(KpiFormatter::default(), MergePolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::production::ProductionRecord;
    use crate::domain::types::Shift;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn row(day: u32, shift: Shift, planned: u32, actual: u32) -> RawProductionRow {
        RawProductionRow::from(&ProductionRecord::new(d(day), shift, planned, actual, "Widget"))
    }

    #[test]
    fn test_build_is_idempotent() {
        let engine = ShiftReportEngine::default();
        let range = DateRange::new(d(1), d(7)).unwrap();
        let rows = vec![row(1, Shift::Morning, 10, 9), row(3, Shift::Night, 20, 15)];

        let first = engine.build(&range, ViewMode::Week, rows.clone(), &[]).unwrap();
        let second = engine.build(&range, ViewMode::Week, rows, &[]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_build_keeps_valid_days_when_rows_are_malformed() {
        let engine = ShiftReportEngine::default();
        let range = DateRange::new(d(1), d(2)).unwrap();
        let mut bad = row(2, Shift::Morning, 1, 1);
        bad.shift = Some("brunch".to_string());

        let report = engine
            .build(&range, ViewMode::Month, vec![row(1, Shift::Morning, 10, 9), bad], &[])
            .unwrap();
        assert_eq!(report.buckets.len(), 2);
        assert_eq!(report.buckets[0].totals(Shift::Morning).planned, 10);
        assert!(report.buckets[1].is_empty());
        assert_eq!(report.skipped_records.len(), 1);
        assert_eq!(report.summary.total_planned, 10);
    }

    #[test]
    fn test_summarize_matches_report_summary() {
        let engine = ShiftReportEngine::default();
        let range = DateRange::new(d(1), d(7)).unwrap();
        let rows = vec![row(1, Shift::Morning, 50, 40), row(1, Shift::Morning, 30, 25)];

        let summary = engine.summarize(&range, rows.clone(), &[]).unwrap();
        let report = engine.build(&range, ViewMode::Week, rows, &[]).unwrap();
        assert_eq!(summary, report.summary);
        assert_eq!(summary.total_planned, 80);
    }

    #[test]
    fn test_empty_report_has_full_skeleton() {
        let engine = ShiftReportEngine::default();
        let range = DateRange::new(d(1), d(7)).unwrap();
        let report = engine
            .empty(&range, ViewMode::Week, Some("timeout".to_string()))
            .unwrap();
        assert_eq!(report.buckets.len(), 7);
        assert!(report.buckets.iter().all(|b| b.is_empty()));
        assert!(report.has_error());
        assert_eq!(report.summary.efficiency_percent, 0.0);
    }
}
