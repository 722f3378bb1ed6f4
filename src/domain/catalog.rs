// ==========================================
// 张拉布框架报价系统 - 目录领域模型
// ==========================================
// 职责: 目录费率记录（只读值对象）与报价选择项
// 红线: 引擎从不回写目录；NA 哨兵是一等选择，不是缺失
// ==========================================

use crate::domain::types::{FreightTier, QuoteCategory, RateBasis};
use serde::{Deserialize, Serialize};

/// NA 哨兵 ID
pub const NOT_APPLICABLE_ID: &str = "NA";

// ==========================================
// CatalogRateRecord - 目录费率记录
// ==========================================
// 由文档库按 category 提供；字段按目录原始命名
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRateRecord {
    pub id: String,
    pub category: String, // 目录集合名 (frame/fabric/lighting/...)
    pub name: String,

    // ===== 价格 =====
    #[serde(default)]
    pub sell: Option<f64>, // 固定价
    #[serde(default)]
    pub sell_per_lm: Option<f64>, // 每延米价
    #[serde(default)]
    pub sell_per_sqm: Option<f64>, // 每平方米价

    // ===== 重量 =====
    #[serde(default)]
    pub weight_per_lm: Option<f64>, // kg/延米
    #[serde(default)]
    pub weight_per_sqm: Option<f64>, // kg/平方米

    // ===== 运费专用 =====
    #[serde(default)]
    pub tier: Option<FreightTier>,
    #[serde(default)]
    pub destination: Option<String>,
}

impl CatalogRateRecord {
    /// 创建只有名称的空记录（价格/重量均未设置）
    pub fn new(id: &str, category: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            category: category.to_string(),
            name: name.to_string(),
            sell: None,
            sell_per_lm: None,
            sell_per_sqm: None,
            weight_per_lm: None,
            weight_per_sqm: None,
            tier: None,
            destination: None,
        }
    }

    /// 是否为 NA 哨兵记录
    pub fn is_not_applicable(&self) -> bool {
        self.id == NOT_APPLICABLE_ID
    }

    /// 按计价口径取单价
    ///
    /// 长度/面积类只认对应单价字段，不回退到固定价
    pub fn rate_for(&self, basis: RateBasis) -> Option<f64> {
        match basis {
            RateBasis::Length => self.sell_per_lm,
            RateBasis::Area => self.sell_per_sqm,
            RateBasis::Flat => self.sell,
        }
    }

    /// 按计价口径取单位重量
    pub fn weight_for(&self, basis: RateBasis) -> Option<f64> {
        match basis {
            RateBasis::Length => self.weight_per_lm,
            RateBasis::Area => self.weight_per_sqm,
            RateBasis::Flat => None,
        }
    }

    /// 运费记录是否匹配档位与目的地（目的地大小写不敏感）
    pub fn matches_freight(&self, tier: FreightTier, destination: &str) -> bool {
        self.tier == Some(tier)
            && self
                .destination
                .as_deref()
                .map(|d| d.trim().eq_ignore_ascii_case(destination.trim()))
                .unwrap_or(false)
    }
}

// ==========================================
// Selection - 报价选择项
// ==========================================
// 引擎对某类别所选目录项的归一化视图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub id: String,
    pub name: String,
    pub sell: f64, // 单价或固定价，口径由类别决定
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>, // 单位重量
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<FreightTier>, // 运费选择所匹配的档位
}

impl Selection {
    /// NA 哨兵选择
    pub fn not_applicable() -> Self {
        Self {
            id: NOT_APPLICABLE_ID.to_string(),
            name: NOT_APPLICABLE_ID.to_string(),
            sell: 0.0,
            weight: Some(0.0),
            tier: None,
        }
    }

    /// 从目录记录归一化
    ///
    /// 缺失对应口径单价时按 0 处理并记录告警
    pub fn from_record(category: QuoteCategory, record: &CatalogRateRecord) -> Self {
        if record.is_not_applicable() {
            return Self::not_applicable();
        }

        let basis = category.rate_basis();
        let sell = match record.rate_for(basis) {
            Some(v) if v.is_finite() && v >= 0.0 => v,
            other => {
                tracing::warn!(
                    category = %category,
                    record_id = %record.id,
                    rate = ?other,
                    "目录记录缺少有效单价，按 0 计价"
                );
                0.0
            }
        };

        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            sell,
            weight: record
                .weight_for(basis)
                .filter(|w| w.is_finite() && *w >= 0.0),
            tier: record.tier,
        }
    }

    /// 是否为 NA 哨兵
    pub fn is_not_applicable(&self) -> bool {
        self.id == NOT_APPLICABLE_ID
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::not_applicable()
    }
}
