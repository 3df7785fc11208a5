// ==========================================
// 生产监控驾驶舱 - 日期范围
// ==========================================
// 红线: start <= end（闭区间，按自然日计）
// 推导规则:
// - week:  [参考日 - 6 天, 参考日]
// - month: [当月 1 日, 当月最后一天]
// - year:  [1 月 1 日, 12 月 31 日]
// ==========================================

use crate::domain::types::ViewMode;
use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 日期范围非法（start 晚于 end）
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("日期范围无效: start={start} 晚于 end={end}")]
pub struct InvalidRangeError {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

// ==========================================
// DateRange - 闭区间日期范围
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// 创建日期范围
    ///
    /// # 返回
    /// - Err(InvalidRangeError): start > end
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InvalidRangeError> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    /// 单日范围
    pub fn single_day(date: NaiveDate) -> Self {
        Self { start: date, end: date }
    }

    /// 校验 start <= end（用于反序列化得到的范围）
    pub fn validate(&self) -> Result<(), InvalidRangeError> {
        if self.start > self.end {
            return Err(InvalidRangeError {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// 按视图模式和参考日推导范围
    pub fn for_view(view_mode: ViewMode, reference: NaiveDate) -> Self {
        match view_mode {
            ViewMode::Week => Self {
                start: reference - Duration::days(6),
                end: reference,
            },
            ViewMode::Month => {
                let start = reference - Duration::days(i64::from(reference.day0()));
                let last = days_in_month(reference.year(), reference.month());
                Self {
                    start,
                    end: start + Duration::days(i64::from(last) - 1),
                }
            }
            ViewMode::Year => {
                let start = reference - Duration::days(i64::from(reference.ordinal0()));
                Self {
                    start,
                    end: start + Duration::days(i64::from(days_in_year(reference.year())) - 1),
                }
            }
        }
    }

    /// 最近 N 天（含参考日），用于滚动 KPI 窗口
    ///
    /// 起点超出可表示的日期范围时返回 None
    pub fn trailing_days(reference: NaiveDate, days: u32) -> Option<Self> {
        let start = reference.checked_sub_signed(Duration::days(i64::from(days)))?;
        Some(Self { start, end: reference })
    }

    /// 范围内的自然日数量（闭区间）
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// 是否包含指定日期
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// 逐日迭代（升序，含两端）
    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// 视图导航：按视图粒度前后翻页
///
/// # 参数
/// - direction: 正数向后翻，负数向前翻
///
/// # 说明
/// 按月/年翻页时日号超出目标月天数会被截断到月末（如 3/31 → 2/29）
pub fn navigate(view_mode: ViewMode, reference: NaiveDate, direction: i32) -> NaiveDate {
    let steps = direction.unsigned_abs();
    match view_mode {
        ViewMode::Week => reference + Duration::days(7 * i64::from(direction)),
        ViewMode::Month => shift_months(reference, direction.signum(), steps),
        ViewMode::Year => shift_months(reference, direction.signum(), steps.saturating_mul(12)),
    }
}

fn shift_months(reference: NaiveDate, sign: i32, months: u32) -> NaiveDate {
    let shifted = if sign >= 0 {
        reference.checked_add_months(Months::new(months))
    } else {
        reference.checked_sub_months(Months::new(months))
    };
    shifted.unwrap_or(reference)
}

/// 是否闰年
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// 指定年份天数
pub fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// 指定月份天数
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}
