// ==========================================
// 张拉布框架报价系统 - 导入层
// ==========================================
// 职责: 外部目录数据导入 (CSV)
// ==========================================

pub mod catalog_csv;
pub mod error;

// 重导出核心类型
pub use catalog_csv::{
    import_catalog_csv, parse_catalog_csv, parse_catalog_file, CatalogImportReport,
    CatalogParseOutcome, RejectedRow, MAX_CATALOG_VALUE,
};
pub use error::{ImportError, ImportResult};
