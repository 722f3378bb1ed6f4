// ==========================================
// 张拉布框架报价系统 - 配置层
// ==========================================
// 职责: 报价引擎参数管理,支持 config_kv 覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod quote_config;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use quote_config::{QuoteConfig, TierThresholds, DEFAULT_LIGHTING_OVERHEAD_KG_PER_SQM};
