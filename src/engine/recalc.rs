// ==========================================
// 张拉布框架报价系统 - 重算引擎
// ==========================================
// 职责: 聚合的派生字段整体重算
// 顺序: 几何 → 计价 → 重量 → 运费档位
// 红线:
// - 派生字段只在此处写入
// - 任何选择/形状/尺寸变更后必须调用一次
// ==========================================

use crate::config::QuoteConfig;
use crate::domain::quote::QuoteAggregate;
use crate::engine::freight_tier::FreightTierClassifier;
use crate::engine::geometry::compute_geometry_opt;
use crate::engine::pricing::PricingAccumulator;
use tracing::{debug, instrument};

// ==========================================
// RecalcEngine - 派生字段重算
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct RecalcEngine {
    pricing: PricingAccumulator,
    classifier: FreightTierClassifier,
}

impl RecalcEngine {
    pub fn new(config: &QuoteConfig) -> Self {
        Self {
            pricing: PricingAccumulator::new(config.lighting_overhead_kg_per_sqm),
            classifier: FreightTierClassifier::new(config.tier_thresholds),
        }
    }

    pub fn pricing(&self) -> &PricingAccumulator {
        &self.pricing
    }

    pub fn classifier(&self) -> &FreightTierClassifier {
        &self.classifier
    }

    /// 返回重算后的副本
    pub fn recompute(&self, aggregate: &QuoteAggregate) -> QuoteAggregate {
        let mut next = aggregate.clone();
        self.recompute_in_place(&mut next);
        next
    }

    /// 原地重算
    ///
    /// 已定稿的聚合不再重算，保持定稿时的派生值
    #[instrument(skip(self, aggregate), fields(quote_id = %aggregate.quote_id()))]
    pub fn recompute_in_place(&self, aggregate: &mut QuoteAggregate) {
        if aggregate.is_completed() {
            return;
        }

        let geometry = compute_geometry_opt(aggregate.shape(), aggregate.dimensions());
        let (pricing, weight) = self
            .pricing
            .accumulate_with_weight(aggregate.selections(), geometry);
        let tier = self.classifier.classify_selections(
            aggregate.selections(),
            weight.total_kg(),
            aggregate.dimensions().max_dimension(),
        );

        debug!(
            lm = geometry.lm,
            sqm = geometry.sqm,
            weight_kg = weight.total_kg(),
            tier = %tier,
            "派生字段重算完成"
        );

        aggregate.geometry = geometry;
        aggregate.pricing = pricing;
        aggregate.weight = weight;
        aggregate.freight_tier = Some(tier);
    }
}
