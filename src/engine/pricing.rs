// ==========================================
// 张拉布框架报价系统 - 计价累加器
// ==========================================
// 职责: 目录费率 + 几何结果 → 分类别金额与重量
// 红线:
// - 无状态: 每次由当前选择集整体重算，替换而非累加
// - NA 是一等选择: 金额与重量恰为 0，不报错
// - 非有限金额不归零，原样交给定稿器报错
// ==========================================
// 计价口径:
// - 面积类 (布料/灯光/吸音): sqm × 单价
// - 长度类 (框架/转角): lm × 单价
// - 固定类 (设计/开机费/控制器/表面处理/预装/运费): 单价
// 重量:
// - 长度/面积类: 度量 × 单位重量（无重量字段按 0）
// - 灯光: 不用目录重量，非 NA 时按 sqm × 1.2kg 附加
// ==========================================

use crate::config::quote_config::DEFAULT_LIGHTING_OVERHEAD_KG_PER_SQM;
use crate::domain::catalog::{CatalogRateRecord, Selection};
use crate::domain::geometry::GeometryResult;
use crate::domain::quote::{LineCost, PricingBreakdown, WeightEstimate};
use crate::domain::types::{QuoteCategory, RateBasis};
use std::collections::BTreeMap;
use tracing::instrument;

/// 单次选择的计价结果
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedSelection {
    pub selection: Selection,
    pub line_cost: f64,
    pub weight_delta: f64,
}

// ==========================================
// PricingAccumulator - 计价累加器
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct PricingAccumulator {
    lighting_overhead_kg_per_sqm: f64,
}

impl Default for PricingAccumulator {
    fn default() -> Self {
        Self::new(DEFAULT_LIGHTING_OVERHEAD_KG_PER_SQM)
    }
}

impl PricingAccumulator {
    pub fn new(lighting_overhead_kg_per_sqm: f64) -> Self {
        Self {
            lighting_overhead_kg_per_sqm,
        }
    }

    /// 归一化目录记录并计价
    pub fn apply_selection(
        &self,
        category: QuoteCategory,
        record: &CatalogRateRecord,
        geometry: GeometryResult,
    ) -> AppliedSelection {
        let selection = Selection::from_record(category, record);
        let line = self.price_selection(category, &selection, geometry);
        AppliedSelection {
            selection,
            line_cost: line.cost,
            weight_delta: line.weight_kg,
        }
    }

    /// 单类别计价
    pub fn price_selection(
        &self,
        category: QuoteCategory,
        selection: &Selection,
        geometry: GeometryResult,
    ) -> LineCost {
        if selection.is_not_applicable() {
            return LineCost::zero();
        }

        let measure = match category.rate_basis() {
            RateBasis::Length => geometry.lm,
            RateBasis::Area => geometry.sqm,
            RateBasis::Flat => 1.0,
        };

        let cost = measure * selection.sell;
        let cost = if cost < 0.0 { 0.0 } else { cost };

        let weight_kg = match (category, category.rate_basis()) {
            (QuoteCategory::Lighting, _) => geometry.sqm * self.lighting_overhead_kg_per_sqm,
            (_, RateBasis::Flat) => 0.0,
            (_, _) => measure * selection.weight.unwrap_or(0.0),
        };

        LineCost {
            cost,
            weight_kg: non_negative(weight_kg),
        }
    }

    /// 由当前选择集整体重算计价明细
    ///
    /// 未定义选择的类别不出现在明细中（金额与重量按 0）
    #[instrument(skip(self, selections), fields(count = selections.len()))]
    pub fn accumulate(
        &self,
        selections: &BTreeMap<QuoteCategory, Selection>,
        geometry: GeometryResult,
    ) -> PricingBreakdown {
        PricingBreakdown {
            lines: selections
                .iter()
                .map(|(category, selection)| {
                    (*category, self.price_selection(*category, selection, geometry))
                })
                .collect(),
        }
    }

    /// 计价明细 + 重量估算
    pub fn accumulate_with_weight(
        &self,
        selections: &BTreeMap<QuoteCategory, Selection>,
        geometry: GeometryResult,
    ) -> (PricingBreakdown, WeightEstimate) {
        let pricing = self.accumulate(selections, geometry);
        let weight = WeightEstimate::from_pricing(&pricing);
        (pricing, weight)
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
