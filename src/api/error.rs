// ==========================================
// 张拉布框架报价系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换引擎/仓储/导入错误为用户可读的错误消息
// ==========================================

use crate::domain::error::QuoteError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 报价状态错误
    // ==========================================
    #[error("报价不完整: 缺少 {}", missing.join(", "))]
    IncompleteQuote { missing: Vec<String> },

    #[error("报价已完成，禁止修改: quote_id={0}")]
    QuoteFinalized(String),

    // ==========================================
    // 目录错误
    // ==========================================
    #[error("目录查询失败 (category={category}): {message}")]
    CatalogLookup { category: String, message: String },

    #[error("计价失败: {0}")]
    PricingError(String),

    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("文件导入失败: {0}")]
    ImportError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 QuoteError 转换
// ==========================================
impl From<QuoteError> for ApiError {
    fn from(err: QuoteError) -> Self {
        match err {
            QuoteError::IncompleteQuote { missing } => ApiError::IncompleteQuote { missing },
            QuoteError::FinalizedQuote { quote_id } => ApiError::QuoteFinalized(quote_id),
            QuoteError::CatalogLookup { category, message } => {
                ApiError::CatalogLookup { category, message }
            }
            other @ (QuoteError::UnpriceableAmount { .. } | QuoteError::AmountOverflow { .. }) => {
                ApiError::PricingError(other.to_string())
            }
            other @ (QuoteError::InvalidDimension { .. } | QuoteError::DegenerateGeometry { .. }) => {
                ApiError::InvalidInput(other.to_string())
            }
        }
    }
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
                ApiError::DatabaseError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::SerializationError(msg) => ApiError::InternalError(msg),
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Repository(repo_err) => ApiError::from(repo_err),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
