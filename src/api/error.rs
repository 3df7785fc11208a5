// ==========================================
// 生产监控驾驶舱 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换 Repository / Engine 错误为用户友好的错误消息
// ==========================================

use crate::domain::date_range::InvalidRangeError;
use crate::engine::error::EngineError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 请求错误
    // ==========================================
    /// 起始日期晚于结束日期（在任何拉取之前拒绝）
    #[error(transparent)]
    InvalidRange(#[from] InvalidRangeError),

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("无权限: {0}")]
    Unauthorized(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 外部协作方错误
    // ==========================================
    /// 记录存储 / 设备注册表拉取失败（不重试）
    #[error("数据拉取失败: {0}")]
    Fetch(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 导出错误
    // ==========================================
    #[error("导出失败: {0}")]
    ExportError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::ValidationError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::ValidationError(format!("外键约束违反: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::SerializationError(msg) => ApiError::InternalError(msg),
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidRange(e) => ApiError::InvalidRange(e),
            EngineError::Export(msg) => ApiError::ExportError(msg),
        }
    }
}

impl ApiError {
    /// 是否为拉取失败（可降级为全零骨架报表）
    pub fn is_fetch_error(&self) -> bool {
        matches!(self, ApiError::Fetch(_))
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
