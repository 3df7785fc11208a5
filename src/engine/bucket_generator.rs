// ==========================================
// 生产监控驾驶舱 - 日期桶生成器
// ==========================================
// 输入: DateRange + ViewMode
// 输出: 每个自然日一个全零桶（升序、无重复、无缺口）
// 红线: 无数据的日期也必须出桶，图表不允许断档
// ==========================================

use crate::domain::date_range::DateRange;
use crate::domain::report::Bucket;
use crate::domain::types::ViewMode;
use crate::engine::error::EngineResult;
use crate::engine::formatter::KpiFormatter;

pub struct DateBucketGenerator {
    formatter: KpiFormatter,
}

impl DateBucketGenerator {
    pub fn new(formatter: KpiFormatter) -> Self {
        Self { formatter }
    }

    /// 生成桶骨架
    ///
    /// # 返回
    /// - Ok(Vec<Bucket>): 长度 = 天数 + 1 的闭区间
    /// - Err(EngineError::InvalidRange): start > end
    pub fn generate(&self, range: &DateRange, view_mode: ViewMode) -> EngineResult<Vec<Bucket>> {
        range.validate()?;

        let buckets: Vec<Bucket> = range
            .iter_days()
            .map(|date| Bucket::empty(date, self.formatter.bucket_label(date, view_mode)))
            .collect();

        tracing::trace!(
            range = %range,
            view_mode = %view_mode,
            bucket_count = buckets.len(),
            "桶骨架生成完成"
        );
        Ok(buckets)
    }
}

impl Default for DateBucketGenerator {
    fn default() -> Self {
        Self::new(KpiFormatter::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Shift;
    use crate::engine::error::EngineError;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_bucket_count_and_order() {
        let generator = DateBucketGenerator::default();
        let ranges = [
            DateRange::single_day(d(2024, 3, 1)),
            DateRange::for_view(ViewMode::Week, d(2024, 1, 3)),
            DateRange::for_view(ViewMode::Month, d(2024, 2, 1)),
            DateRange::for_view(ViewMode::Month, d(2023, 2, 1)),
            DateRange::for_view(ViewMode::Year, d(2024, 6, 1)),
            DateRange::for_view(ViewMode::Year, d(2100, 6, 1)),
        ];

        for range in ranges {
            let buckets = generator.generate(&range, ViewMode::Month).unwrap();
            let expected = (range.end - range.start).num_days() + 1;
            assert_eq!(buckets.len() as i64, expected, "range {}", range);
            assert_eq!(buckets.first().unwrap().date, range.start);
            assert_eq!(buckets.last().unwrap().date, range.end);
            assert!(buckets.windows(2).all(|w| w[0].date < w[1].date));
            assert!(buckets.iter().all(|b| range.contains(b.date)));
        }
    }

    #[test]
    fn test_buckets_are_zeroed() {
        let generator = DateBucketGenerator::default();
        let range = DateRange::for_view(ViewMode::Week, d(2024, 3, 7));
        let buckets = generator.generate(&range, ViewMode::Week).unwrap();
        for bucket in &buckets {
            for shift in Shift::ALL {
                assert_eq!(bucket.totals(shift).planned, 0);
                assert_eq!(bucket.totals(shift).actual, 0);
            }
        }
    }

    #[test]
    fn test_labels_follow_view_mode() {
        let generator = DateBucketGenerator::new(KpiFormatter::new("en"));
        let range = DateRange::new(d(2024, 2, 28), d(2024, 3, 1)).unwrap();

        let week = generator.generate(&range, ViewMode::Week).unwrap();
        let labels: Vec<_> = week.iter().map(|b| b.display_label.as_str()).collect();
        assert_eq!(labels, vec!["Wed 28", "Thu 29", "Fri 1"]);

        let year = generator.generate(&range, ViewMode::Year).unwrap();
        let labels: Vec<_> = year.iter().map(|b| b.display_label.as_str()).collect();
        assert_eq!(labels, vec!["Feb", "Feb", "Mar"]);
    }

    #[test]
    fn test_inverted_range_fails() {
        let generator = DateBucketGenerator::default();
        let range = DateRange {
            start: d(2024, 3, 2),
            end: d(2024, 3, 1),
        };
        let result = generator.generate(&range, ViewMode::Week);
        assert!(matches!(result, Err(EngineError::InvalidRange(_))));
    }
}
