// ==========================================
// 张拉布框架报价系统 - 步骤文案
// ==========================================
// 仅用于展示，不参与任何计算
// ==========================================

use serde::{Deserialize, Serialize};

/// 向导步骤标题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepHeader {
    pub title: String,
    pub subtitle: String,
}

impl StepHeader {
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
        }
    }
}
