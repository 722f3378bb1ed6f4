// ==========================================
// 张拉布框架报价系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 张拉布框架配置向导的报价计算引擎
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 计价规则
pub mod engine;

// 导入层 - 外部目录数据
pub mod importer;

// 配置层 - 引擎参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 报价会话
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{DimensionKey, FreightTier, LineGroup, QuoteCategory, QuoteStatus, Shape};

// 领域实体
pub use domain::{
    CatalogRateRecord, DimensionSet, FinalizedQuote, GeometryResult, QuoteAggregate, QuoteError,
    QuoteLineItem, QuoteSnapshot, Selection,
};

// 引擎
pub use engine::{
    classify_tier, compute_geometry, FreightTierClassifier, PricingAccumulator, QuoteFinalizer,
    RecalcEngine,
};

// API
pub use api::{ApiError, QuoteApi, QuoteRequest};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "张拉布框架报价系统";
