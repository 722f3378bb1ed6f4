// ==========================================
// 张拉布框架报价系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、报价状态机
// 红线: 不含数据访问逻辑,不含计价逻辑
// ==========================================

pub mod catalog;
pub mod content;
pub mod error;
pub mod geometry;
pub mod quote;
pub mod types;

// 重导出核心类型
pub use catalog::{CatalogRateRecord, Selection, NOT_APPLICABLE_ID};
pub use content::StepHeader;
pub use error::{QuoteError, QuoteResult};
pub use geometry::{DimensionSet, GeometryResult};
pub use quote::{
    FinalizedQuote, LineCost, PricingBreakdown, QuoteAggregate, QuoteLineItem, QuoteSnapshot,
    WeightEstimate,
};
pub use types::{
    DimensionKey, FreightTier, LineGroup, QuoteCategory, QuoteStatus, RateBasis, Shape,
};
