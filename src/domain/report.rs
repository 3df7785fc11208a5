// ==========================================
// 生产监控驾驶舱 - 报表领域模型
// ==========================================
// 桶 / KPI 摘要 / 班次报表均为派生数据
// 每次聚合全新生成，不持久化
// ==========================================

use crate::domain::date_range::DateRange;
use crate::domain::types::{Shift, ViewMode};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// ShiftTotals - 单班次计划/实际合计
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftTotals {
    pub planned: u64,
    pub actual: u64,
}

impl ShiftTotals {
    pub fn new(planned: u64, actual: u64) -> Self {
        Self { planned, actual }
    }
}

// ==========================================
// PerShift - 班次 → 合计 映射（三班固定）
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerShift {
    pub morning: ShiftTotals,
    pub afternoon: ShiftTotals,
    pub night: ShiftTotals,
}

impl PerShift {
    pub fn get(&self, shift: Shift) -> &ShiftTotals {
        match shift {
            Shift::Morning => &self.morning,
            Shift::Afternoon => &self.afternoon,
            Shift::Night => &self.night,
        }
    }

    pub fn get_mut(&mut self, shift: Shift) -> &mut ShiftTotals {
        match shift {
            Shift::Morning => &mut self.morning,
            Shift::Afternoon => &mut self.afternoon,
            Shift::Night => &mut self.night,
        }
    }

    /// 全天计划合计
    pub fn planned_total(&self) -> u64 {
        Shift::ALL.iter().map(|s| self.get(*s).planned).sum()
    }

    /// 全天实际合计
    pub fn actual_total(&self) -> u64 {
        Shift::ALL.iter().map(|s| self.get(*s).actual).sum()
    }
}

// ==========================================
// Bucket - 自然日时间桶
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub date: NaiveDate,
    pub display_label: String,
    pub per_shift: PerShift,
}

impl Bucket {
    /// 全零桶
    pub fn empty(date: NaiveDate, display_label: String) -> Self {
        Self {
            date,
            display_label,
            per_shift: PerShift::default(),
        }
    }

    pub fn totals(&self, shift: Shift) -> &ShiftTotals {
        self.per_shift.get(shift)
    }

    pub fn is_empty(&self) -> bool {
        self.per_shift == PerShift::default()
    }
}

// ==========================================
// KpiSummary - 区间 KPI 汇总
// ==========================================
// 百分比字段保留原始精度，展示时再四舍五入到 1 位小数
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub total_planned: u64,
    pub total_actual: u64,
    pub efficiency_percent: f64,          // [0, ∞)
    pub machine_utilization_percent: f64, // [0, 100]
}

// ==========================================
// MachineStatusSummary - 设备状态计数
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineStatusSummary {
    pub working: usize,
    pub service: usize,
    pub failure: usize,
    /// 状态无法识别的设备（计入 total，不计入运行中）
    pub unknown: usize,
    pub total: usize,
}

// ==========================================
// SkippedRecord - 被跳过的脏数据
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub record_id: Option<String>,
    pub reason: String,
}

// ==========================================
// ShiftReport - 班次报表（驾驶舱图表数据）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftReport {
    pub range: DateRange,
    pub view_mode: ViewMode,
    pub period_label: String,
    pub buckets: Vec<Bucket>,
    pub summary: KpiSummary,
    pub machine_summary: MachineStatusSummary,
    pub skipped_records: Vec<SkippedRecord>,
    pub fetch_error: Option<String>, // 拉取失败时为 Some，桶为全零骨架
}

impl ShiftReport {
    pub fn has_error(&self) -> bool {
        self.fetch_error.is_some()
    }
}
