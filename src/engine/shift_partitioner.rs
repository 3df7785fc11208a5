// ==========================================
// 生产监控驾驶舱 - 班次分区器
// ==========================================
// 职责:
// 1. 原始行 → 规范记录（脏数据跳过并记录，不中断聚合）
// 2. 同一日期的记录按班次归入三个槽位，缺失班次为 {0, 0}
// 重复 (日期, 班次): 由 MergePolicy 决定累加或后到覆盖
// ==========================================

use crate::domain::production::{ProductionRecord, RawProductionRow};
use crate::domain::report::{PerShift, ShiftTotals, SkippedRecord};
use crate::domain::types::MergePolicy;
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default)]
pub struct ShiftPartitioner {
    policy: MergePolicy,
}

impl ShiftPartitioner {
    pub fn new(policy: MergePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// 原始行转换为规范记录
    ///
    /// # 返回
    /// - (合法记录, 被跳过的行及原因)；合法记录保持输入顺序
    pub fn accept_rows(
        &self,
        rows: Vec<RawProductionRow>,
    ) -> (Vec<ProductionRecord>, Vec<SkippedRecord>) {
        let mut records = Vec::with_capacity(rows.len());
        let mut skipped = Vec::new();

        for row in rows {
            let record_id = row.id.clone();
            match ProductionRecord::try_from(row) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(
                        record_id = record_id.as_deref().unwrap_or("-"),
                        reason = %e,
                        "跳过异常生产记录"
                    );
                    skipped.push(SkippedRecord {
                        record_id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        (records, skipped)
    }

    /// 单日分区：记录按班次合并
    ///
    /// 调用方保证 records 属于同一日期
    pub fn partition<'a, I>(&self, records: I) -> PerShift
    where
        I: IntoIterator<Item = &'a ProductionRecord>,
    {
        let mut per_shift = PerShift::default();
        for record in records {
            self.merge_into(per_shift.get_mut(record.shift), record);
        }
        per_shift
    }

    /// 多日分区：按日期分组后逐日分区
    pub fn partition_by_date(&self, records: &[ProductionRecord]) -> BTreeMap<NaiveDate, PerShift> {
        let mut by_date: BTreeMap<NaiveDate, PerShift> = BTreeMap::new();
        for record in records {
            let slot = by_date.entry(record.date).or_default().get_mut(record.shift);
            self.merge_into(slot, record);
        }
        by_date
    }

    fn merge_into(&self, slot: &mut ShiftTotals, record: &ProductionRecord) {
        let planned = u64::from(record.planned_units);
        let actual = u64::from(record.actual_units);
        match self.policy {
            MergePolicy::Sum => {
                slot.planned = slot.planned.saturating_add(planned);
                slot.actual = slot.actual.saturating_add(actual);
            }
            MergePolicy::LastWriteWins => {
                slot.planned = planned;
                slot.actual = actual;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Shift;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn rec(day: u32, shift: Shift, planned: u32, actual: u32) -> ProductionRecord {
        ProductionRecord::new(d(day), shift, planned, actual, "Widget")
    }

    #[test]
    fn test_missing_shifts_default_to_zero() {
        let partitioner = ShiftPartitioner::default();
        let records = vec![rec(1, Shift::Afternoon, 10, 8)];
        let per_shift = partitioner.partition(&records);
        assert_eq!(per_shift.afternoon, ShiftTotals::new(10, 8));
        assert_eq!(per_shift.morning, ShiftTotals::default());
        assert_eq!(per_shift.night, ShiftTotals::default());
    }

    #[test]
    fn test_duplicates_sum_by_default() {
        let partitioner = ShiftPartitioner::new(MergePolicy::Sum);
        let records = vec![rec(1, Shift::Night, 50, 40), rec(1, Shift::Night, 30, 25)];
        let per_shift = partitioner.partition(&records);
        assert_eq!(per_shift.night, ShiftTotals::new(80, 65));
    }

    #[test]
    fn test_duplicates_last_write_wins() {
        let partitioner = ShiftPartitioner::new(MergePolicy::LastWriteWins);
        let records = vec![rec(1, Shift::Night, 50, 40), rec(1, Shift::Night, 30, 25)];
        let per_shift = partitioner.partition(&records);
        assert_eq!(per_shift.night, ShiftTotals::new(30, 25));
    }

    #[test]
    fn test_partition_by_date_groups_each_day() {
        let partitioner = ShiftPartitioner::default();
        let records = vec![
            rec(2, Shift::Morning, 5, 5),
            rec(1, Shift::Morning, 1, 1),
            rec(2, Shift::Night, 7, 6),
        ];
        let by_date = partitioner.partition_by_date(&records);
        assert_eq!(by_date.len(), 2);
        assert_eq!(by_date[&d(1)].morning, ShiftTotals::new(1, 1));
        assert_eq!(by_date[&d(2)].night, ShiftTotals::new(7, 6));
        assert_eq!(by_date[&d(2)].planned_total(), 12);
    }

    #[test]
    fn test_accept_rows_skips_malformed() {
        let partitioner = ShiftPartitioner::default();
        let good = RawProductionRow::from(&rec(1, Shift::Morning, 100, 90));
        let missing_shift = RawProductionRow {
            id: Some("bad-1".to_string()),
            shift: None,
            ..good.clone()
        };
        let negative = RawProductionRow {
            id: Some("bad-2".to_string()),
            actual_units: Some(-3),
            ..good.clone()
        };

        let (records, skipped) = partitioner.accept_rows(vec![missing_shift, good, negative]);
        assert_eq!(records.len(), 1);
        assert_eq!(skipped.len(), 2);
        assert_eq!(skipped[0].record_id.as_deref(), Some("bad-1"));
        assert_eq!(skipped[1].record_id.as_deref(), Some("bad-2"));
    }
}
