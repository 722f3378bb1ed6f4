// ==========================================
// 张拉布框架报价系统 - 报价聚合
// ==========================================
// 职责: 向导会话内累积的报价记录（唯一写者）
// 状态机: Draft → Completed（单向，仅由 QuoteFinalizer 触发）
// 红线:
// - Completed 后禁止任何类别变更 (FinalizedQuote)
// - 派生字段 (geometry/pricing/weight/freight_tier) 只由 recompute 整体替换
// ==========================================

use crate::domain::catalog::Selection;
use crate::domain::error::{QuoteError, QuoteResult};
use crate::domain::geometry::{DimensionSet, GeometryResult};
use crate::domain::types::{DimensionKey, FreightTier, LineGroup, QuoteCategory, QuoteStatus, Shape};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// ==========================================
// LineCost - 单类别计价结果
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LineCost {
    pub cost: f64,      // 金额
    pub weight_kg: f64, // 重量贡献
}

impl LineCost {
    pub fn zero() -> Self {
        Self::default()
    }
}

// ==========================================
// PricingBreakdown - 按类别的计价明细
// ==========================================
// 每次由当前选择集整体重算，不做历史累加
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingBreakdown {
    pub lines: BTreeMap<QuoteCategory, LineCost>,
}

impl PricingBreakdown {
    pub fn line(&self, category: QuoteCategory) -> LineCost {
        self.lines.get(&category).copied().unwrap_or_default()
    }

    /// 未取整的金额合计
    pub fn total_cost(&self) -> f64 {
        self.lines.values().map(|l| l.cost).sum()
    }
}

// ==========================================
// WeightEstimate - 重量估算
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightEstimate {
    pub contributions: BTreeMap<QuoteCategory, f64>, // 类别 → kg
}

impl WeightEstimate {
    pub fn from_pricing(pricing: &PricingBreakdown) -> Self {
        Self {
            contributions: pricing
                .lines
                .iter()
                .filter(|(_, line)| line.weight_kg > 0.0)
                .map(|(category, line)| (*category, line.weight_kg))
                .collect(),
        }
    }

    pub fn contribution(&self, category: QuoteCategory) -> f64 {
        self.contributions.get(&category).copied().unwrap_or(0.0)
    }

    pub fn total_kg(&self) -> f64 {
        self.contributions.values().sum()
    }
}

// ==========================================
// QuoteLineItem - 报价明细行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteLineItem {
    pub group: LineGroup,
    pub category: QuoteCategory,
    pub label: String,
    pub value: Decimal,
}

// ==========================================
// FinalizedQuote - 定稿报价
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizedQuote {
    pub quote_id: String,
    pub line_items: Vec<QuoteLineItem>,
    pub grand_total: Decimal,
    pub status: QuoteStatus,
    pub geometry: GeometryResult,
    pub weight_kg: f64,
    pub freight_tier: Option<FreightTier>,
    pub finalized_at: DateTime<Utc>,
}

impl FinalizedQuote {
    /// 指定分组的明细行（保持原顺序）
    pub fn items_in(&self, group: LineGroup) -> impl Iterator<Item = &QuoteLineItem> {
        self.line_items.iter().filter(move |item| item.group == group)
    }

    pub fn item(&self, category: QuoteCategory) -> Option<&QuoteLineItem> {
        self.line_items.iter().find(|item| item.category == category)
    }
}

// ==========================================
// QuoteAggregate - 报价聚合
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteAggregate {
    quote_id: String,
    revision: u32,
    status: QuoteStatus,
    shape: Option<Shape>,
    dimensions: DimensionSet,
    selections: BTreeMap<QuoteCategory, Selection>,

    // ===== 派生字段 (recompute 写入) =====
    pub(crate) geometry: GeometryResult,
    pub(crate) pricing: PricingBreakdown,
    pub(crate) weight: WeightEstimate,
    pub(crate) freight_tier: Option<FreightTier>,

    finalized: Option<FinalizedQuote>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl QuoteAggregate {
    /// 向导开始时创建：所有类别默认 NA，派生字段为零
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    /// 使用指定 ID 创建
    pub fn with_id(quote_id: String) -> Self {
        let now = Utc::now();
        Self {
            quote_id,
            revision: 0,
            status: QuoteStatus::Draft,
            shape: None,
            dimensions: DimensionSet::default(),
            selections: QuoteCategory::ALL
                .iter()
                .map(|c| (*c, Selection::not_applicable()))
                .collect(),
            geometry: GeometryResult::zero(),
            pricing: PricingBreakdown::default(),
            weight: WeightEstimate::default(),
            freight_tier: None,
            finalized: None,
            created_at: now,
            updated_at: now,
        }
    }

    // ==========================================
    // 只读访问
    // ==========================================

    pub fn quote_id(&self) -> &str {
        &self.quote_id
    }

    pub fn revision(&self) -> u32 {
        self.revision
    }

    pub fn status(&self) -> QuoteStatus {
        self.status
    }

    pub fn is_completed(&self) -> bool {
        self.status == QuoteStatus::Completed
    }

    pub fn shape(&self) -> Option<Shape> {
        self.shape
    }

    pub fn dimensions(&self) -> &DimensionSet {
        &self.dimensions
    }

    pub fn selection(&self, category: QuoteCategory) -> Option<&Selection> {
        self.selections.get(&category)
    }

    pub fn selections(&self) -> &BTreeMap<QuoteCategory, Selection> {
        &self.selections
    }

    pub fn geometry(&self) -> GeometryResult {
        self.geometry
    }

    pub fn pricing(&self) -> &PricingBreakdown {
        &self.pricing
    }

    pub fn weight(&self) -> &WeightEstimate {
        &self.weight
    }

    pub fn freight_tier(&self) -> Option<FreightTier> {
        self.freight_tier
    }

    pub fn finalized(&self) -> Option<&FinalizedQuote> {
        self.finalized.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // ==========================================
    // 变更操作（仅 Draft 允许）
    // ==========================================

    /// 设置形状
    pub fn set_shape(&mut self, shape: Shape) -> QuoteResult<()> {
        self.ensure_draft()?;
        self.shape = Some(shape);
        self.touch();
        Ok(())
    }

    /// 整体替换尺寸集合
    pub fn set_dimensions(&mut self, dimensions: DimensionSet) -> QuoteResult<()> {
        self.ensure_draft()?;
        self.dimensions = dimensions;
        self.touch();
        Ok(())
    }

    /// 设置单个尺寸
    pub fn set_dimension(&mut self, key: DimensionKey, value: f64) -> QuoteResult<()> {
        self.ensure_draft()?;
        self.dimensions.set(key, value);
        self.touch();
        Ok(())
    }

    /// 替换某类别的选择
    pub fn select(&mut self, category: QuoteCategory, selection: Selection) -> QuoteResult<()> {
        self.ensure_draft()?;
        self.selections.insert(category, selection);
        self.touch();
        Ok(())
    }

    /// 清除某类别的选择（该步骤需重新选择）
    pub fn clear_selection(&mut self, category: QuoteCategory) -> QuoteResult<()> {
        self.ensure_draft()?;
        self.selections.remove(&category);
        self.touch();
        Ok(())
    }

    // ==========================================
    // 完整性
    // ==========================================

    /// 尚未定义选择的类别
    pub fn missing_categories(&self) -> Vec<QuoteCategory> {
        QuoteCategory::ALL
            .iter()
            .copied()
            .filter(|c| !self.selections.contains_key(c))
            .collect()
    }

    /// 完整性校验
    ///
    /// 条件（全部满足）:
    /// 1) 每个类别都有选择（NA 计为已选）
    /// 2) 形状已设置
    /// 3) 形状所需尺寸均为正数（allow_zero 时可为 0）
    /// 4) 非 NA 的运费选择档位与当前档位一致
    pub fn check_complete(&self, allow_zero: bool) -> QuoteResult<()> {
        let mut missing: Vec<String> = self
            .missing_categories()
            .iter()
            .map(|c| c.to_string())
            .collect();

        match self.shape {
            None => missing.push("shape".to_string()),
            Some(shape) => {
                for key in self.dimensions.invalid_for(shape, allow_zero) {
                    missing.push(format!("dimension {}", key));
                }
            }
        }

        if let Some(freight) = self.selections.get(&QuoteCategory::Freight) {
            if !freight.is_not_applicable() && freight.tier != self.freight_tier {
                missing.push(format!(
                    "freight tier mismatch (selected={}, current={})",
                    freight.tier.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string()),
                    self.freight_tier.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string()),
                ));
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(QuoteError::IncompleteQuote { missing })
        }
    }

    // ==========================================
    // 内部
    // ==========================================

    fn ensure_draft(&self) -> QuoteResult<()> {
        if self.is_completed() {
            return Err(QuoteError::FinalizedQuote {
                quote_id: self.quote_id.clone(),
            });
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.revision += 1;
        self.updated_at = Utc::now();
    }

    /// 定稿（由 QuoteFinalizer 调用）
    pub(crate) fn mark_completed(&mut self, finalized: FinalizedQuote) {
        self.status = QuoteStatus::Completed;
        self.updated_at = finalized.finalized_at;
        self.finalized = Some(finalized);
    }
}

impl Default for QuoteAggregate {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// QuoteSnapshot - 草稿快照
// ==========================================
// 每次变更后推送给持久化端
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub quote_id: String,
    pub revision: u32,
    pub status: QuoteStatus,
    pub aggregate: QuoteAggregate,
    pub captured_at: DateTime<Utc>,
}

impl QuoteSnapshot {
    pub fn capture(aggregate: &QuoteAggregate) -> Self {
        Self {
            quote_id: aggregate.quote_id.clone(),
            revision: aggregate.revision,
            status: aggregate.status,
            aggregate: aggregate.clone(),
            captured_at: Utc::now(),
        }
    }
}
