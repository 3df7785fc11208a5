// ==========================================
// 生产监控驾驶舱 - 展示格式化
// ==========================================
// 职责: 桶标签 / 周期标题 / 货币 / 百分比 的本地化字符串
// 红线: 只格式化，不改变底层数值（合计保持精确整数）
// ==========================================

use crate::domain::date_range::DateRange;
use crate::domain::types::{Shift, ViewMode};
use crate::i18n::{normalize_locale, t, t_with_args};
use chrono::{Datelike, NaiveDate, Weekday};

/// 不换行空格（波兰语千分位与货币符号间隔）
const NBSP: &str = "\u{a0}";

/// 百分比/比例统一保留 1 位小数
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ==========================================
// NumberStyle - 数字本地化样式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NumberStyle {
    thousands: &'static str,
    decimal: char,
    min_grouping_digits: usize, // 整数位数达到该值才分组
    symbol_after: bool,
}

impl NumberStyle {
    fn for_locale(locale: &str) -> Self {
        match locale {
            "pl" => NumberStyle {
                thousands: NBSP,
                decimal: ',',
                min_grouping_digits: 5,
                symbol_after: true,
            },
            _ => NumberStyle {
                thousands: ",",
                decimal: '.',
                min_grouping_digits: 4,
                symbol_after: false,
            },
        }
    }
}

fn group_digits(int_part: &str, style: &NumberStyle) -> String {
    if int_part.len() < style.min_grouping_digits {
        return int_part.to_string();
    }
    let mut out = String::with_capacity(int_part.len() + int_part.len() / 3 * 2);
    let lead = int_part.len() % 3;
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (i + 3 - lead) % 3 == 0 {
            out.push_str(style.thousands);
        }
        out.push(ch);
    }
    out
}

fn currency_symbol(locale: &str, currency_code: &str) -> String {
    match currency_code.trim().to_uppercase().as_str() {
        "PLN" if locale == "pl" => "zł".to_string(),
        "USD" => "$".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        "CNY" => "¥".to_string(),
        other => other.to_string(),
    }
}

fn weekday_key(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "mon",
        Weekday::Tue => "tue",
        Weekday::Wed => "wed",
        Weekday::Thu => "thu",
        Weekday::Fri => "fri",
        Weekday::Sat => "sat",
        Weekday::Sun => "sun",
    }
}

fn month_key(month: u32) -> &'static str {
    match month {
        1 => "jan",
        2 => "feb",
        3 => "mar",
        4 => "apr",
        5 => "may",
        6 => "jun",
        7 => "jul",
        8 => "aug",
        9 => "sep",
        10 => "oct",
        11 => "nov",
        _ => "dec",
    }
}

// ==========================================
// KpiFormatter - 本地化格式化器
// ==========================================
// 无状态，按语言构造；可在多个报表间复用
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KpiFormatter {
    locale: &'static str,
}

impl Default for KpiFormatter {
    fn default() -> Self {
        Self::new(crate::i18n::DEFAULT_LOCALE)
    }
}

impl KpiFormatter {
    pub fn new(locale: &str) -> Self {
        Self {
            locale: normalize_locale(locale),
        }
    }

    pub fn locale(&self) -> &'static str {
        self.locale
    }

    // ==========================================
    // 日期标签
    // ==========================================

    /// 桶标签
    ///
    /// - week: 星期简称 + 日号（pl: "pt. 1"）
    /// - month: 日号（"1"）
    /// - year: 月份简称（pl: "mar"）
    pub fn bucket_label(&self, date: NaiveDate, view_mode: ViewMode) -> String {
        let day = date.day().to_string();
        match view_mode {
            ViewMode::Week => {
                let weekday = self.weekday_short(date.weekday());
                t_with_args(self.locale, "label.week", &[("weekday", &weekday), ("day", &day)])
            }
            ViewMode::Month => t_with_args(self.locale, "label.month", &[("day", &day)]),
            ViewMode::Year => {
                let month = self.month_short(date.month());
                t_with_args(self.locale, "label.year", &[("month", &month)])
            }
        }
    }

    /// 周期标题（图表上方）
    ///
    /// - week: "1 marca 2024 - 7 marca 2024"
    /// - month: "marzec 2024"
    /// - year: "2024"
    pub fn period_label(&self, view_mode: ViewMode, range: &DateRange) -> String {
        match view_mode {
            ViewMode::Week => {
                let start = self.long_date(range.start);
                let end = self.long_date(range.end);
                t_with_args(self.locale, "period.range", &[("start", &start), ("end", &end)])
            }
            ViewMode::Month => {
                let month = t(self.locale, &format!("month_long.{}", month_key(range.end.month())));
                let year = range.end.year().to_string();
                t_with_args(self.locale, "period.month_year", &[("month", &month), ("year", &year)])
            }
            ViewMode::Year => {
                let year = range.end.year().to_string();
                t_with_args(self.locale, "period.year", &[("year", &year)])
            }
        }
    }

    /// 完整日期（日 + 月份属格 + 年）
    pub fn long_date(&self, date: NaiveDate) -> String {
        let day = date.day().to_string();
        let month = t(self.locale, &format!("month_genitive.{}", month_key(date.month())));
        let year = date.year().to_string();
        t_with_args(
            self.locale,
            "period.day_month_year",
            &[("day", &day), ("month", &month), ("year", &year)],
        )
    }

    pub fn weekday_short(&self, weekday: Weekday) -> String {
        t(self.locale, &format!("weekday_short.{}", weekday_key(weekday)))
    }

    pub fn month_short(&self, month: u32) -> String {
        t(self.locale, &format!("month_short.{}", month_key(month)))
    }

    /// 班次本地化名称
    pub fn shift_name(&self, shift: Shift) -> String {
        t(self.locale, &format!("shift.{}", shift.to_db_str()))
    }

    // ==========================================
    // 数值
    // ==========================================

    /// 数字（固定小数位，本地化分隔符）
    pub fn format_number(&self, value: f64, decimals: usize) -> String {
        let style = NumberStyle::for_locale(self.locale);
        let raw = format!("{:.*}", decimals, value.abs());
        let (int_part, frac_part) = match raw.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (raw.as_str(), None),
        };

        let mut out = String::new();
        if value < 0.0 && raw.chars().any(|c| c != '0' && c != '.') {
            out.push('-');
        }
        out.push_str(&group_digits(int_part, &style));
        if let Some(frac) = frac_part {
            out.push(style.decimal);
            out.push_str(frac);
        }
        out
    }

    /// 货币（2 位小数）
    ///
    /// pl + PLN: "1 234,56 zł"（千分位仅在 5 位整数起生效）
    /// en + USD: "$1,234.56"
    pub fn format_currency(&self, value: f64, currency_code: &str) -> String {
        let style = NumberStyle::for_locale(self.locale);
        let number = self.format_number(value.abs(), 2);
        let symbol = currency_symbol(self.locale, currency_code);
        let sign = if value < 0.0 && number.chars().any(|c| c.is_ascii_digit() && c != '0') {
            "-"
        } else {
            ""
        };

        if style.symbol_after {
            format!("{}{}{}{}", sign, number, NBSP, symbol)
        } else if symbol.chars().all(|c| c.is_ascii_alphabetic()) {
            format!("{}{}{}{}", sign, symbol, NBSP, number)
        } else {
            format!("{}{}{}", sign, symbol, number)
        }
    }

    /// 百分比（1 位小数 + "%"）
    pub fn format_percent(&self, value: f64) -> String {
        format!("{:.1}%", round_one_decimal(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_round_one_decimal() {
        assert_eq!(round_one_decimal(90.0), 90.0);
        assert_eq!(round_one_decimal(66.666), 66.7);
        assert_eq!(round_one_decimal(81.25), 81.3);
    }

    #[test]
    fn test_bucket_labels_per_view() {
        let pl = KpiFormatter::new("pl-PL");
        let date = d(2024, 3, 1); // 周五
        assert_eq!(pl.bucket_label(date, ViewMode::Week), "pt. 1");
        assert_eq!(pl.bucket_label(date, ViewMode::Month), "1");
        assert_eq!(pl.bucket_label(date, ViewMode::Year), "mar");

        let en = KpiFormatter::new("en");
        assert_eq!(en.bucket_label(date, ViewMode::Week), "Fri 1");
        assert_eq!(en.bucket_label(d(2024, 10, 9), ViewMode::Year), "Oct");

        let zh = KpiFormatter::new("zh-CN");
        assert_eq!(zh.bucket_label(date, ViewMode::Week), "周五 1日");
    }

    #[test]
    fn test_period_labels() {
        let pl = KpiFormatter::new("pl");
        let week = DateRange::for_view(ViewMode::Week, d(2024, 3, 7));
        assert_eq!(pl.period_label(ViewMode::Week, &week), "1 marca 2024 - 7 marca 2024");

        let month = DateRange::for_view(ViewMode::Month, d(2024, 3, 7));
        assert_eq!(pl.period_label(ViewMode::Month, &month), "marzec 2024");

        let year = DateRange::for_view(ViewMode::Year, d(2024, 3, 7));
        assert_eq!(KpiFormatter::new("en").period_label(ViewMode::Year, &year), "2024");
        assert_eq!(pl.period_label(ViewMode::Year, &year), "Rok 2024");
    }

    #[test]
    fn test_currency_pl() {
        let pl = KpiFormatter::new("pl");
        assert_eq!(pl.format_currency(1234.5, "PLN"), "1234,50\u{a0}zł");
        assert_eq!(pl.format_currency(12345.678, "PLN"), "12\u{a0}345,68\u{a0}zł");
        assert_eq!(pl.format_currency(-0.5, "PLN"), "-0,50\u{a0}zł");
    }

    #[test]
    fn test_currency_en() {
        let en = KpiFormatter::new("en");
        assert_eq!(en.format_currency(1234.5, "USD"), "$1,234.50");
        assert_eq!(en.format_currency(1234567.0, "PLN"), "PLN\u{a0}1,234,567.00");
        assert_eq!(en.format_currency(999.999, "EUR"), "€1,000.00");
    }

    #[test]
    fn test_percent() {
        let f = KpiFormatter::default();
        assert_eq!(f.format_percent(90.0), "90.0%");
        assert_eq!(f.format_percent(0.0), "0.0%");
        assert_eq!(f.format_percent(83.333_333), "83.3%");
    }

    #[test]
    fn test_shift_names() {
        assert_eq!(KpiFormatter::new("pl").shift_name(Shift::Afternoon), "Popołudniowa");
        assert_eq!(KpiFormatter::new("en").shift_name(Shift::Morning), "Morning");
    }
}
