// ==========================================
// 张拉布框架报价系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 目录 / 步骤文案 / 报价快照的数据访问
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod catalog_repo;
pub mod content_repo;
pub mod error;
pub mod quote_sink;

// 重导出核心仓储
pub use catalog_repo::{CatalogReader, CatalogRecordRepository};
pub use content_repo::{ContentReader, StepContentRepository};
pub use error::{RepositoryError, RepositoryResult};
pub use quote_sink::{QuoteSink, QuoteSnapshotRepository};
