// ==========================================
// 生产监控驾驶舱 - 引擎层错误类型
// ==========================================
// 说明: 聚合管线本身是纯函数，唯一的业务失败是日期范围非法；
//       导出写出失败单独归类
// ==========================================

use crate::domain::date_range::InvalidRangeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    InvalidRange(#[from] InvalidRangeError),

    #[error("导出失败: {0}")]
    Export(String),
}

impl From<csv::Error> for EngineError {
    fn from(err: csv::Error) -> Self {
        EngineError::Export(err.to_string())
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
