// ==========================================
// 集成测试辅助模块
// ==========================================
#![allow(dead_code)]

pub mod mock_catalog;
pub mod recording_sink;
pub mod test_data_builder;
