// ==========================================
// 张拉布框架报价系统 - 引擎层
// ==========================================
// 职责: 几何 / 计价 / 档位 / 重算 / 定稿
// 红线: Engine 不拼 SQL, 不做 I/O; 目录数据由 API 层注入
// ==========================================

pub mod finalizer;
pub mod freight_tier;
pub mod geometry;
pub mod pricing;
pub mod recalc;

// 重导出核心引擎
pub use finalizer::{group_subtotal, round_currency, to_decimal, QuoteFinalizer, QuotePreview};
pub use freight_tier::{classify_tier, FreightTierClassifier};
pub use geometry::{compute_geometry, compute_geometry_by_id, compute_geometry_opt, validate_dimensions};
pub use pricing::{AppliedSelection, PricingAccumulator};
pub use recalc::RecalcEngine;
