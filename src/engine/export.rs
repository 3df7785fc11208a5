// ==========================================
// 生产监控驾驶舱 - CSV 导出
// ==========================================
// 格式: 固定表头 + 每条记录一行（保持输入顺序）
// 转义: 标准 CSV 引号规则，含分隔符/引号/换行的字段加引号
// 输出: text/csv 字节流，文件名 production_data_<start>_<end>.csv
// ==========================================

use crate::domain::date_range::DateRange;
use crate::domain::production::ProductionRecord;
use crate::domain::report::Bucket;
use crate::domain::types::Shift;
use crate::engine::error::{EngineError, EngineResult};
use csv::{QuoteStyle, WriterBuilder};
use serde::{Deserialize, Serialize};

/// 原始记录导出表头
pub const RECORD_EXPORT_HEADER: [&str; 5] = ["Date", "Shift", "Planned", "Actual", "Product Type"];

/// 导出 MIME 类型
pub const CSV_MIME_TYPE: &str = "text/csv";

/// 导出文件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportFile {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// 导出文件名
pub fn export_filename(range: &DateRange) -> String {
    format!("production_data_{}_{}.csv", range.start, range.end)
}

// ==========================================
// CsvExporter - CSV 导出器
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct CsvExporter {
    delimiter: u8,
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvExporter {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    fn writer(&self) -> csv::Writer<Vec<u8>> {
        WriterBuilder::new()
            .delimiter(self.delimiter)
            .quote_style(QuoteStyle::Necessary)
            .from_writer(Vec::new())
    }

    fn finish(writer: csv::Writer<Vec<u8>>) -> EngineResult<Vec<u8>> {
        writer
            .into_inner()
            .map_err(|e| EngineError::Export(e.to_string()))
    }

    /// 原始记录导出为 CSV 文本
    pub fn records_to_csv(&self, records: &[ProductionRecord]) -> EngineResult<Vec<u8>> {
        let mut writer = self.writer();
        writer.write_record(RECORD_EXPORT_HEADER)?;

        for record in records {
            writer.write_record([
                record.date_str(),
                record.shift.to_db_str().to_string(),
                record.planned_units.to_string(),
                record.actual_units.to_string(),
                record.product_type.clone(),
            ])?;
        }

        Self::finish(writer)
    }

    /// 原始记录导出为下载文件
    pub fn export_records(
        &self,
        range: &DateRange,
        records: &[ProductionRecord],
    ) -> EngineResult<ExportFile> {
        range.validate()?;
        let bytes = self.records_to_csv(records)?;

        tracing::info!(
            range = %range,
            rows = records.len(),
            size_bytes = bytes.len(),
            "生产数据导出完成"
        );

        Ok(ExportFile {
            filename: export_filename(range),
            mime_type: CSV_MIME_TYPE.to_string(),
            bytes,
        })
    }

    /// 聚合桶导出（每天一行，三班计划/实际各一列）
    pub fn buckets_to_csv(&self, buckets: &[Bucket]) -> EngineResult<Vec<u8>> {
        let mut writer = self.writer();

        let mut header = vec!["Date".to_string(), "Label".to_string()];
        for shift in Shift::ALL {
            header.push(format!("{} Planned", shift.to_db_str()));
            header.push(format!("{} Actual", shift.to_db_str()));
        }
        writer.write_record(&header)?;

        for bucket in buckets {
            let mut row = vec![bucket.date.to_string(), bucket.display_label.clone()];
            for shift in Shift::ALL {
                let totals = bucket.totals(shift);
                row.push(totals.planned.to_string());
                row.push(totals.actual.to_string());
            }
            writer.write_record(&row)?;
        }

        Self::finish(writer)
    }
}
