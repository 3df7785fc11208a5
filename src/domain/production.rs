// ==========================================
// 生产监控驾驶舱 - 生产记录领域模型
// ==========================================
// 边界约定:
// - 存储层返回宽松的 RawProductionRow（字段名 snake_case / camelCase 混用）
// - 在边界处一次性转换为强类型 ProductionRecord，下游只认 ProductionRecord
// ==========================================

use crate::domain::types::Shift;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 日期存储格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ==========================================
// ProductionRecord - 生产记录（规范形态）
// ==========================================
// 用途: 聚合引擎、导出、写入的唯一输入形态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionRecord {
    pub id: Option<String>,                 // 存储层分配的ID（新建时为 None）
    pub date: NaiveDate,                    // 生产日期
    pub shift: Shift,                       // 班次
    pub planned_units: u32,                 // 计划产量
    pub actual_units: u32,                  // 实际产量
    pub product_type: String,               // 产品类型
    pub production_line_id: Option<String>, // 产线
    pub created_by: Option<String>,         // 录入人（用户ID）
}

impl ProductionRecord {
    /// 构造新记录（未持久化）
    pub fn new(
        date: NaiveDate,
        shift: Shift,
        planned_units: u32,
        actual_units: u32,
        product_type: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            date,
            shift,
            planned_units,
            actual_units,
            product_type: product_type.into(),
            production_line_id: None,
            created_by: None,
        }
    }

    /// 设置产线
    pub fn with_line(mut self, production_line_id: impl Into<String>) -> Self {
        self.production_line_id = Some(production_line_id.into());
        self
    }

    /// 日期的存储字符串
    pub fn date_str(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

// ==========================================
// RawProductionRow - 存储层原始行
// ==========================================
// 所有字段可缺失；数量用 i64 承载，以便识别负数脏数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProductionRow {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub shift: Option<String>,
    #[serde(default, alias = "plannedUnits")]
    pub planned_units: Option<i64>,
    #[serde(default, alias = "actualUnits")]
    pub actual_units: Option<i64>,
    #[serde(default, alias = "productType")]
    pub product_type: Option<String>,
    #[serde(default, alias = "productionLineId")]
    pub production_line_id: Option<String>,
    #[serde(default, alias = "createdBy")]
    pub created_by: Option<String>,
}

impl From<&ProductionRecord> for RawProductionRow {
    fn from(record: &ProductionRecord) -> Self {
        Self {
            id: record.id.clone(),
            date: Some(record.date_str()),
            shift: Some(record.shift.to_db_str().to_string()),
            planned_units: Some(i64::from(record.planned_units)),
            actual_units: Some(i64::from(record.actual_units)),
            product_type: Some(record.product_type.clone()),
            production_line_id: record.production_line_id.clone(),
            created_by: record.created_by.clone(),
        }
    }
}

// ==========================================
// RecordConversionError - 原始行转换失败原因
// ==========================================
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordConversionError {
    #[error("缺少字段: {0}")]
    MissingField(&'static str),

    #[error("日期格式错误: {0}")]
    InvalidDate(String),

    #[error("未知班次: {0}")]
    InvalidShift(String),

    #[error("数量为负: {field}={value}")]
    NegativeUnits { field: &'static str, value: i64 },

    #[error("数量超出范围: {field}={value}")]
    UnitsOutOfRange { field: &'static str, value: i64 },
}

fn convert_units(field: &'static str, value: Option<i64>) -> Result<u32, RecordConversionError> {
    let value = value.ok_or(RecordConversionError::MissingField(field))?;
    if value < 0 {
        return Err(RecordConversionError::NegativeUnits { field, value });
    }
    u32::try_from(value).map_err(|_| RecordConversionError::UnitsOutOfRange { field, value })
}

impl TryFrom<RawProductionRow> for ProductionRecord {
    type Error = RecordConversionError;

    fn try_from(row: RawProductionRow) -> Result<Self, Self::Error> {
        let date_raw = row
            .date
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(RecordConversionError::MissingField("date"))?;
        let date = NaiveDate::parse_from_str(date_raw, DATE_FORMAT)
            .map_err(|_| RecordConversionError::InvalidDate(date_raw.to_string()))?;

        let shift_raw = row
            .shift
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(RecordConversionError::MissingField("shift"))?;
        let shift = Shift::from_str(shift_raw)
            .ok_or_else(|| RecordConversionError::InvalidShift(shift_raw.to_string()))?;

        let planned_units = convert_units("planned_units", row.planned_units)?;
        let actual_units = convert_units("actual_units", row.actual_units)?;

        Ok(Self {
            id: row.id,
            date,
            shift,
            planned_units,
            actual_units,
            product_type: row.product_type.unwrap_or_default(),
            production_line_id: row.production_line_id,
            created_by: row.created_by,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(shift: Option<&str>, planned: Option<i64>, actual: Option<i64>) -> RawProductionRow {
        RawProductionRow {
            id: Some("r1".to_string()),
            date: Some("2024-03-01".to_string()),
            shift: shift.map(str::to_string),
            planned_units: planned,
            actual_units: actual,
            product_type: Some("Widget".to_string()),
            production_line_id: None,
            created_by: None,
        }
    }

    #[test]
    fn test_convert_valid_row() {
        let record = ProductionRecord::try_from(raw(Some("morning"), Some(100), Some(90))).unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(record.shift, Shift::Morning);
        assert_eq!(record.planned_units, 100);
        assert_eq!(record.actual_units, 90);
    }

    #[test]
    fn test_convert_rejects_malformed_rows() {
        assert_eq!(
            ProductionRecord::try_from(raw(None, Some(1), Some(1))),
            Err(RecordConversionError::MissingField("shift"))
        );
        assert_eq!(
            ProductionRecord::try_from(raw(Some("evening"), Some(1), Some(1))),
            Err(RecordConversionError::InvalidShift("evening".to_string()))
        );
        assert_eq!(
            ProductionRecord::try_from(raw(Some("night"), Some(-5), Some(1))),
            Err(RecordConversionError::NegativeUnits {
                field: "planned_units",
                value: -5
            })
        );

        let mut bad_date = raw(Some("night"), Some(1), Some(1));
        bad_date.date = Some("01.03.2024".to_string());
        assert!(matches!(
            ProductionRecord::try_from(bad_date),
            Err(RecordConversionError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_raw_row_accepts_camel_case() {
        let json = r#"{
            "date": "2024-03-02",
            "shift": "afternoon",
            "plannedUnits": 50,
            "actualUnits": 40,
            "productType": "Bolt",
            "productionLineId": "L1"
        }"#;
        let row: RawProductionRow = serde_json::from_str(json).unwrap();
        let record = ProductionRecord::try_from(row).unwrap();
        assert_eq!(record.planned_units, 50);
        assert_eq!(record.product_type, "Bolt");
        assert_eq!(record.production_line_id.as_deref(), Some("L1"));
    }

    #[test]
    fn test_raw_row_accepts_snake_case() {
        let json = r#"{"date":"2024-03-02","shift":"night","planned_units":7,"actual_units":3}"#;
        let row: RawProductionRow = serde_json::from_str(json).unwrap();
        let record = ProductionRecord::try_from(row).unwrap();
        assert_eq!(record.shift, Shift::Night);
        assert_eq!(record.product_type, "");
    }
}
