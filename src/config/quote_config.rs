// ==========================================
// 张拉布框架报价系统 - 报价引擎参数
// ==========================================
// 默认值即业务基线；config_kv 中的值覆盖默认值
// ==========================================

use serde::{Deserialize, Serialize};

/// 默认灯光附加重量 (kg/平方米)
pub const DEFAULT_LIGHTING_OVERHEAD_KG_PER_SQM: f64 = 1.2;

// ==========================================
// TierThresholds - 运费档位阈值
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub pallet_weight_kg: f64, // 超过该重量直接托盘/木箱
    pub pallet_dim_mm: f64,    // 超过该尺寸托盘/木箱
    pub large_dim_mm: f64,     // 超过该尺寸为大件
    pub medium_dim_mm: f64,    // 超过该尺寸为中件
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            pallet_weight_kg: 100.0,
            pallet_dim_mm: 3000.0,
            large_dim_mm: 2400.0,
            medium_dim_mm: 2000.0,
        }
    }
}

impl TierThresholds {
    /// 阈值需单调递增，否则档位判定会跳档
    pub fn is_consistent(&self) -> bool {
        self.pallet_weight_kg > 0.0
            && self.medium_dim_mm > 0.0
            && self.medium_dim_mm <= self.large_dim_mm
            && self.large_dim_mm <= self.pallet_dim_mm
    }
}

// ==========================================
// QuoteConfig - 报价引擎配置
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuoteConfig {
    pub lighting_overhead_kg_per_sqm: f64,
    pub tier_thresholds: TierThresholds,
    pub allow_zero_dimensions: bool,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            lighting_overhead_kg_per_sqm: DEFAULT_LIGHTING_OVERHEAD_KG_PER_SQM,
            tier_thresholds: TierThresholds::default(),
            allow_zero_dimensions: false,
        }
    }
}
