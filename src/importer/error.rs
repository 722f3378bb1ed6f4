// ==========================================
// 张拉布框架报价系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("缺少必需列: {0}")]
    MissingColumn(String),

    // ===== 数据映射错误 =====
    #[error("类型转换失败 (行 {row}, 字段 {field}): {message}")]
    TypeConversionError {
        row: usize,
        field: String,
        message: String,
    },

    // ===== 数据质量错误 =====
    #[error("主键缺失 (行 {0}): id 为空")]
    PrimaryKeyMissing(usize),

    #[error("未知目录集合 (行 {row}): {category}")]
    UnknownCategory { row: usize, category: String },

    #[error("数值范围错误 (行 {row}, 字段 {field}): 值 {value} 不能为负数")]
    NegativeValue { row: usize, field: String, value: f64 },

    #[error("数值超出上限 (行 {row}, 字段 {field}): {value} > {max}")]
    ValueOutOfRange {
        row: usize,
        field: String,
        value: f64,
        max: f64,
    },

    #[error("运费记录缺少档位 (行 {row}): id={id}")]
    FreightTierMissing { row: usize, id: String },

    // ===== 数据库错误 =====
    #[error("目录写入失败: {0}")]
    Repository(#[from] RepositoryError),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 行级错误（可跳过该行继续导入）
    pub fn is_row_level(&self) -> bool {
        matches!(
            self,
            ImportError::TypeConversionError { .. }
                | ImportError::PrimaryKeyMissing(_)
                | ImportError::UnknownCategory { .. }
                | ImportError::NegativeValue { .. }
                | ImportError::ValueOutOfRange { .. }
                | ImportError::FreightTierMissing { .. }
        )
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
