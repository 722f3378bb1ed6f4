// ==========================================
// 张拉布框架报价系统 - 运费档位判定引擎
// ==========================================
// 职责: 总重量 + 最大尺寸 → 运费档位
// 红线: 唯一的档位判定实现；重量优先于尺寸；规则顺序执行，命中即返回
// ==========================================

use crate::config::quote_config::TierThresholds;
use crate::domain::catalog::Selection;
use crate::domain::types::{FreightTier, QuoteCategory};
use std::collections::BTreeMap;
use tracing::instrument;

/// 使用默认阈值判定档位
pub fn classify_tier(total_weight_kg: f64, max_dimension_mm: f64) -> FreightTier {
    FreightTierClassifier::default().classify(total_weight_kg, max_dimension_mm)
}

// ==========================================
// FreightTierClassifier - 运费档位判定
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct FreightTierClassifier {
    thresholds: TierThresholds,
}

impl FreightTierClassifier {
    pub fn new(thresholds: TierThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &TierThresholds {
        &self.thresholds
    }

    /// 判定档位
    ///
    /// 规则（顺序执行，命中即返回）:
    /// 1) 重量 > 100kg → pallet / crate
    /// 2) 最大尺寸 > 3000mm → pallet / crate
    /// 3) 最大尺寸 > 2400mm → large - complete
    /// 4) 最大尺寸 > 2000mm → medium - complete
    /// 5) 其他 → small - complete
    pub fn classify(&self, total_weight_kg: f64, max_dimension_mm: f64) -> FreightTier {
        let t = &self.thresholds;
        if total_weight_kg > t.pallet_weight_kg {
            FreightTier::PalletCrate
        } else if max_dimension_mm > t.pallet_dim_mm {
            FreightTier::PalletCrate
        } else if max_dimension_mm > t.large_dim_mm {
            FreightTier::LargeComplete
        } else if max_dimension_mm > t.medium_dim_mm {
            FreightTier::MediumComplete
        } else {
            FreightTier::SmallComplete
        }
    }

    /// 按报价选择判定档位
    ///
    /// 重量超限时始终为 pallet / crate；
    /// 否则未选框架但选了布料时只发布料，档位为 fabric only
    #[instrument(skip(self, selections))]
    pub fn classify_selections(
        &self,
        selections: &BTreeMap<QuoteCategory, Selection>,
        total_weight_kg: f64,
        max_dimension_mm: f64,
    ) -> FreightTier {
        let is_selected = |category: QuoteCategory| {
            selections
                .get(&category)
                .map(|s| !s.is_not_applicable())
                .unwrap_or(false)
        };

        if total_weight_kg > self.thresholds.pallet_weight_kg {
            return FreightTier::PalletCrate;
        }

        if !is_selected(QuoteCategory::Frame)
            && (is_selected(QuoteCategory::FabricFace) || is_selected(QuoteCategory::FabricRear))
        {
            return FreightTier::FabricOnly;
        }

        self.classify(total_weight_kg, max_dimension_mm)
    }
}
