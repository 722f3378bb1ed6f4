// ==========================================
// 张拉布框架报价系统 - 报价引擎错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约定:
// - InvalidDimension / DegenerateGeometry 在计算器内部就地恢复（零几何 + 告警）
// - IncompleteQuote / FinalizedQuote 必须上抛给调用方
// - CatalogLookup 原样上抛，不重试
// - UnpriceableAmount / AmountOverflow 上抛，金额不得按 0 静默放行
// ==========================================

use thiserror::Error;

/// 报价引擎错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuoteError {
    // ===== 几何错误（内部恢复）=====
    #[error("尺寸无效: shape={shape}, dimension={dimension}, value={value:?}")]
    InvalidDimension {
        shape: String,
        dimension: String,
        value: Option<f64>,
    },

    #[error("几何退化: shape={shape}, {reason}")]
    DegenerateGeometry { shape: String, reason: String },

    // ===== 状态机错误（上抛）=====
    #[error("报价不完整: 缺少 {}", missing.join(", "))]
    IncompleteQuote { missing: Vec<String> },

    #[error("报价已完成，禁止修改: quote_id={quote_id}")]
    FinalizedQuote { quote_id: String },

    // ===== 目录错误（上抛）=====
    #[error("目录查询失败 (category={category}): {message}")]
    CatalogLookup { category: String, message: String },

    // ===== 金额错误（上抛）=====
    #[error("金额无法计价: category={category}, value={value}")]
    UnpriceableAmount { category: String, value: f64 },

    #[error("金额合计溢出: {context}")]
    AmountOverflow { context: String },
}

/// Result 类型别名
pub type QuoteResult<T> = Result<T, QuoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_message_lists_missing() {
        let err = QuoteError::IncompleteQuote {
            missing: vec!["shape".to_string(), "FRAME".to_string()],
        };
        assert_eq!(err.to_string(), "报价不完整: 缺少 shape, FRAME");
    }

    #[test]
    fn test_amount_errors_name_the_line() {
        let err = QuoteError::UnpriceableAmount {
            category: "DESIGN".to_string(),
            value: f64::INFINITY,
        };
        assert!(err.to_string().contains("DESIGN"));

        let err = QuoteError::AmountOverflow {
            context: "grand_total".to_string(),
        };
        assert_eq!(err.to_string(), "金额合计溢出: grand_total");
    }
}
