// ==========================================
// 张拉布框架报价系统 - 报价定稿器
// ==========================================
// 职责: 重算 → 完整性校验 → 明细行 → 总价取整 → 标记完成
// 红线:
// - 只有完整的草稿可以定稿
// - 总价按四舍五入 (half-up) 保留 2 位小数，明细行不取整
// - 金额无法表示或合计溢出时报错，绝不按 0 计入
// - 幂等: 已完成的聚合直接返回已保存的定稿结果，不重算
// ==========================================

use crate::config::QuoteConfig;
use crate::domain::error::{QuoteError, QuoteResult};
use crate::domain::quote::{FinalizedQuote, QuoteAggregate, QuoteLineItem};
use crate::domain::types::{FreightTier, LineGroup, QuoteCategory, QuoteStatus};
use crate::engine::recalc::RecalcEngine;
use crate::i18n::t;
use chrono::Utc;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// 明细行顺序: 材料 → 服务 → 运费
pub const LINE_ORDER: [QuoteCategory; 12] = [
    QuoteCategory::Frame,
    QuoteCategory::Corners,
    QuoteCategory::FabricFace,
    QuoteCategory::FabricRear,
    QuoteCategory::Lighting,
    QuoteCategory::Control,
    QuoteCategory::Acoustics,
    QuoteCategory::Finish,
    QuoteCategory::Prebuild,
    QuoteCategory::Design,
    QuoteCategory::Setup,
    QuoteCategory::Freight,
];

/// 金额保留位数
pub const CURRENCY_SCALE: u32 = 2;

/// f64 金额转 Decimal
///
/// # 错误
/// - UnpriceableAmount: 非有限值或超出 Decimal 表示范围
pub fn to_decimal(category: QuoteCategory, value: f64) -> QuoteResult<Decimal> {
    Decimal::from_f64(value).ok_or_else(|| QuoteError::UnpriceableAmount {
        category: category.to_string(),
        value,
    })
}

/// 金额合计（溢出时报错）
fn checked_sum<I>(values: I, context: &str) -> QuoteResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().try_fold(Decimal::ZERO, |acc, value| {
        acc.checked_add(value).ok_or_else(|| QuoteError::AmountOverflow {
            context: context.to_string(),
        })
    })
}

/// 四舍五入到分（固定 2 位小数，0 输出为 0.00）
pub fn round_currency(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(CURRENCY_SCALE);
    rounded
}

// ==========================================
// QuotePreview - 向导过程中的实时报价
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotePreview {
    pub quote_id: String,
    pub line_items: Vec<QuoteLineItem>,
    pub running_total: Decimal,
    pub weight_kg: f64,
    pub freight_tier: Option<FreightTier>,
    pub missing: Vec<String>, // 空表示可以定稿
}

impl QuotePreview {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

// ==========================================
// QuoteFinalizer - 报价定稿
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct QuoteFinalizer {
    recalc: RecalcEngine,
    allow_zero_dimensions: bool,
}

impl QuoteFinalizer {
    pub fn new(config: &QuoteConfig) -> Self {
        Self {
            recalc: RecalcEngine::new(config),
            allow_zero_dimensions: config.allow_zero_dimensions,
        }
    }

    pub fn recalc(&self) -> &RecalcEngine {
        &self.recalc
    }

    /// 定稿
    ///
    /// # 错误
    /// - IncompleteQuote: 有类别未定义 / 形状或尺寸缺失 / 运费档位不一致
    /// - UnpriceableAmount / AmountOverflow: 明细金额无法表示或合计溢出（报价保持草稿）
    #[instrument(skip(self, aggregate), fields(quote_id = %aggregate.quote_id()))]
    pub fn finalize(&self, aggregate: &mut QuoteAggregate) -> QuoteResult<FinalizedQuote> {
        if aggregate.is_completed() {
            return aggregate.finalized().cloned().ok_or_else(|| QuoteError::FinalizedQuote {
                quote_id: aggregate.quote_id().to_string(),
            });
        }

        self.recalc.recompute_in_place(aggregate);
        aggregate.check_complete(self.allow_zero_dimensions)?;

        let line_items = build_line_items(aggregate)?;
        let grand_total = round_currency(checked_sum(
            line_items.iter().map(|item| item.value),
            "grand_total",
        )?);

        let finalized = FinalizedQuote {
            quote_id: aggregate.quote_id().to_string(),
            line_items,
            grand_total,
            status: QuoteStatus::Completed,
            geometry: aggregate.geometry(),
            weight_kg: aggregate.weight().total_kg(),
            freight_tier: aggregate.freight_tier(),
            finalized_at: Utc::now(),
        };

        aggregate.mark_completed(finalized.clone());
        info!(grand_total = %finalized.grand_total, "报价已定稿");
        Ok(finalized)
    }

    /// 实时报价（不改变状态）
    pub fn preview(&self, aggregate: &QuoteAggregate) -> QuoteResult<QuotePreview> {
        if let Some(finalized) = aggregate.finalized() {
            return Ok(QuotePreview {
                quote_id: finalized.quote_id.clone(),
                line_items: finalized.line_items.clone(),
                running_total: finalized.grand_total,
                weight_kg: finalized.weight_kg,
                freight_tier: finalized.freight_tier,
                missing: Vec::new(),
            });
        }

        let current = self.recalc.recompute(aggregate);
        let line_items = build_line_items(&current)?;
        let running_total = round_currency(checked_sum(
            line_items.iter().map(|item| item.value),
            "running_total",
        )?);
        let missing = match current.check_complete(self.allow_zero_dimensions) {
            Ok(()) => Vec::new(),
            Err(QuoteError::IncompleteQuote { missing }) => missing,
            Err(other) => vec![other.to_string()],
        };

        Ok(QuotePreview {
            quote_id: current.quote_id().to_string(),
            line_items,
            running_total,
            weight_kg: current.weight().total_kg(),
            freight_tier: current.freight_tier(),
            missing,
        })
    }
}

/// 按固定顺序生成明细行（NA 与未定义的类别金额为 0）
fn build_line_items(aggregate: &QuoteAggregate) -> QuoteResult<Vec<QuoteLineItem>> {
    LINE_ORDER
        .iter()
        .map(|category| {
            Ok(QuoteLineItem {
                group: category.line_group(),
                category: *category,
                label: line_label(aggregate, *category),
                value: to_decimal(*category, aggregate.pricing().line(*category).cost)?,
            })
        })
        .collect()
}

fn line_label(aggregate: &QuoteAggregate, category: QuoteCategory) -> String {
    let base = t(&category.label_key());
    match aggregate.selection(category) {
        Some(selection) if selection.is_not_applicable() => {
            format!("{} ({})", base, t("common.not_applicable"))
        }
        Some(selection) if category == QuoteCategory::Freight => match selection.tier {
            Some(tier) => format!("{} ({})", base, t(tier.label_key())),
            None => format!("{} ({})", base, selection.name),
        },
        Some(selection) => format!("{} ({})", base, selection.name),
        None => base,
    }
}

/// 分组小计（未取整）
pub fn group_subtotal(items: &[QuoteLineItem], group: LineGroup) -> QuoteResult<Decimal> {
    checked_sum(
        items
            .iter()
            .filter(|item| item.group == group)
            .map(|item| item.value),
        &group.to_string(),
    )
}
