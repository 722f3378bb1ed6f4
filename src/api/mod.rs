// ==========================================
// 张拉布框架报价系统 - API 层
// ==========================================
// 职责: 提供报价会话接口,供向导界面与命令行调用
// ==========================================

pub mod error;
pub mod quote_api;
pub mod quote_request;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use quote_api::QuoteApi;
pub use quote_request::QuoteRequest;
