// ==========================================
// 张拉布框架报价系统 - 报价请求回放
// ==========================================
// 职责: 一次性 JSON 请求 → 按向导顺序回放到报价会话 → 定稿
// 步骤顺序: 形状 → 尺寸 → 各类别 → 运费
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::quote_api::QuoteApi;
use crate::domain::geometry::DimensionSet;
use crate::domain::quote::FinalizedQuote;
use crate::domain::types::QuoteCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 报价请求
///
/// ```json
/// {
///   "shape": "SQUARE",
///   "dimensions": { "a": 1000 },
///   "selections": { "FRAME": "F-40", "FABRIC_FACE": "FAB-1" },
///   "freight_destination": "Sydney"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub shape: String,
    #[serde(default)]
    pub dimensions: serde_json::Value,
    #[serde(default)]
    pub selections: BTreeMap<String, String>, // 类别 → 目录记录 ID（"NA" 表示不需要）
    #[serde(default)]
    pub freight_destination: Option<String>, // 有值时按档位自动匹配运费
}

impl QuoteRequest {
    /// 解析类别键
    fn parsed_selections(&self) -> ApiResult<Vec<(QuoteCategory, String)>> {
        self.selections
            .iter()
            .map(|(key, id)| {
                QuoteCategory::parse(key)
                    .map(|category| (category, id.clone()))
                    .ok_or_else(|| ApiError::InvalidInput(format!("未知类别: {}", key)))
            })
            .collect()
    }
}

impl QuoteApi {
    /// 回放请求并定稿
    pub async fn replay(&mut self, request: &QuoteRequest) -> ApiResult<FinalizedQuote> {
        let selections = request.parsed_selections()?;

        self.set_shape(&request.shape).await?;
        self.set_dimensions(DimensionSet::from_json(&request.dimensions))
            .await?;

        // 运费最后选择，档位依赖其他类别的重量
        for (category, id) in selections.iter().filter(|(c, _)| *c != QuoteCategory::Freight) {
            self.select(*category, id).await?;
        }

        match (&request.freight_destination, selections.iter().find(|(c, _)| *c == QuoteCategory::Freight)) {
            (_, Some((_, id))) => {
                self.select(QuoteCategory::Freight, id).await?;
            }
            (Some(destination), None) => {
                self.select_freight(destination).await?;
            }
            (None, None) => {}
        }

        self.finalize().await
    }
}
