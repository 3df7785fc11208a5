// ==========================================
// 生产监控驾驶舱 - KPI 聚合器
// ==========================================
// 输入: 桶骨架 + 规范生产记录 + 设备列表
// 输出: 填充后的桶 + 区间 KpiSummary
// 红线:
// - 效率 = 实际 / 计划 * 100，计划为 0 时效率为 0
// - 设备利用率 = 运行中 / 总数 * 100，无设备时为 0
// - 合计保持精确整数，四舍五入只在展示层做
// ==========================================

use crate::domain::date_range::DateRange;
use crate::domain::machine::Machine;
use crate::domain::production::ProductionRecord;
use crate::domain::report::{Bucket, KpiSummary, MachineStatusSummary};
use crate::domain::types::MachineStatus;
use crate::engine::shift_partitioner::ShiftPartitioner;

/// 效率百分比（计划为 0 时返回 0）
pub fn efficiency_percent(total_planned: u64, total_actual: u64) -> f64 {
    if total_planned == 0 {
        return 0.0;
    }
    total_actual as f64 / total_planned as f64 * 100.0
}

/// 设备利用率百分比（无设备时返回 0）
pub fn utilization_percent(working: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    working as f64 / total as f64 * 100.0
}

// ==========================================
// KpiAggregator - 聚合器
// ==========================================
// 无状态：每次调用生成新的桶与摘要
#[derive(Debug, Clone, Copy, Default)]
pub struct KpiAggregator {
    partitioner: ShiftPartitioner,
}

impl KpiAggregator {
    pub fn new(partitioner: ShiftPartitioner) -> Self {
        Self { partitioner }
    }

    /// 将记录合并进桶骨架
    ///
    /// 不在骨架日期内的记录被忽略
    pub fn fill_buckets(&self, mut skeleton: Vec<Bucket>, records: &[ProductionRecord]) -> Vec<Bucket> {
        let mut by_date = self.partitioner.partition_by_date(records);

        for bucket in skeleton.iter_mut() {
            if let Some(per_shift) = by_date.remove(&bucket.date) {
                bucket.per_shift = per_shift;
            }
        }

        if !by_date.is_empty() {
            tracing::debug!(
                ignored_dates = by_date.len(),
                "部分记录日期不在桶范围内，已忽略"
            );
        }
        skeleton
    }

    /// 区间 KPI 汇总
    ///
    /// 合计为范围内全部记录之和（与合并策略无关）
    pub fn summarize(
        &self,
        range: &DateRange,
        records: &[ProductionRecord],
        machines: &[Machine],
    ) -> KpiSummary {
        let (total_planned, total_actual) = records
            .iter()
            .filter(|r| range.contains(r.date))
            .fold((0u64, 0u64), |(planned, actual), r| {
                (
                    planned.saturating_add(u64::from(r.planned_units)),
                    actual.saturating_add(u64::from(r.actual_units)),
                )
            });

        let machine_summary = self.machine_summary(machines);

        KpiSummary {
            total_planned,
            total_actual,
            efficiency_percent: efficiency_percent(total_planned, total_actual),
            machine_utilization_percent: utilization_percent(
                machine_summary.working,
                machine_summary.total,
            ),
        }
    }

    /// 设备状态计数
    pub fn machine_summary(&self, machines: &[Machine]) -> MachineStatusSummary {
        machines
            .iter()
            .fold(MachineStatusSummary::default(), |mut acc, m| {
                match m.status {
                    MachineStatus::Working => acc.working += 1,
                    MachineStatus::Service => acc.service += 1,
                    MachineStatus::Failure => acc.failure += 1,
                    MachineStatus::Unknown => acc.unknown += 1,
                }
                acc.total += 1;
                acc
            })
    }
}
