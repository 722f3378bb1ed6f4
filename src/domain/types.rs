// ==========================================
// 张拉布框架报价系统 - 领域类型定义
// ==========================================
// 职责: 形状、报价类别、计价口径、运费档位、报价状态
// 红线: 运费档位名称与目录数据严格一致（含空格与斜杠）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 形状 (Shape)
// ==========================================
// 决定所需尺寸 (a/b/c/d, 毫米) 与几何公式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Shape {
    Square,    // 正方形: a = 边长
    Rectangle, // 矩形: a × b
    Round,     // 圆形: a = 半径
    Triangle,  // 三角形: a/b/c = 三边
    Oval,      // 椭圆: a = 半长轴, b = 半短轴
    Diamond,   // 菱形: a/b = 对角线
    Trapezium, // 梯形: a/b = 平行边, c = 高, d = 第四边
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl Shape {
    /// 全部形状（按向导展示顺序）
    pub const ALL: [Shape; 7] = [
        Shape::Square,
        Shape::Rectangle,
        Shape::Round,
        Shape::Triangle,
        Shape::Oval,
        Shape::Diamond,
        Shape::Trapezium,
    ];

    /// 从标识解析形状（大小写不敏感）
    ///
    /// 未知标识返回 None，由几何计算器按零几何处理
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "SQUARE" => Some(Shape::Square),
            "RECTANGLE" => Some(Shape::Rectangle),
            "ROUND" | "CIRCLE" => Some(Shape::Round),
            "TRIANGLE" => Some(Shape::Triangle),
            "OVAL" | "ELLIPSE" => Some(Shape::Oval),
            "DIAMOND" | "RHOMBUS" => Some(Shape::Diamond),
            "TRAPEZIUM" | "TRAPEZOID" => Some(Shape::Trapezium),
            _ => None,
        }
    }

    /// 转换为存储字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Shape::Square => "SQUARE",
            Shape::Rectangle => "RECTANGLE",
            Shape::Round => "ROUND",
            Shape::Triangle => "TRIANGLE",
            Shape::Oval => "OVAL",
            Shape::Diamond => "DIAMOND",
            Shape::Trapezium => "TRAPEZIUM",
        }
    }

    /// 该形状必须填写的尺寸
    pub fn required_dimensions(&self) -> &'static [DimensionKey] {
        use DimensionKey::*;
        match self {
            Shape::Square | Shape::Round => &[A],
            Shape::Rectangle | Shape::Oval | Shape::Diamond => &[A, B],
            Shape::Triangle => &[A, B, C],
            Shape::Trapezium => &[A, B, C, D],
        }
    }
}

// ==========================================
// 尺寸键 (Dimension Key)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionKey {
    A,
    B,
    C,
    D,
}

impl DimensionKey {
    pub const ALL: [DimensionKey; 4] = [DimensionKey::A, DimensionKey::B, DimensionKey::C, DimensionKey::D];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "a" => Some(DimensionKey::A),
            "b" => Some(DimensionKey::B),
            "c" => Some(DimensionKey::C),
            "d" => Some(DimensionKey::D),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DimensionKey::A => "a",
            DimensionKey::B => "b",
            DimensionKey::C => "c",
            DimensionKey::D => "d",
        }
    }
}

impl fmt::Display for DimensionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 计价口径 (Rate Basis)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateBasis {
    Length, // 按延米 (LM)
    Area,   // 按平方米 (SQM)
    Flat,   // 固定价
}

impl fmt::Display for RateBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateBasis::Length => write!(f, "LENGTH"),
            RateBasis::Area => write!(f, "AREA"),
            RateBasis::Flat => write!(f, "FLAT"),
        }
    }
}

// ==========================================
// 报价明细分组 (Line Group)
// ==========================================
// 顺序: 材料 < 服务 < 运费
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineGroup {
    Materials,
    Services,
    Freight,
}

impl LineGroup {
    /// i18n 键
    pub fn label_key(&self) -> &'static str {
        match self {
            LineGroup::Materials => "groups.materials",
            LineGroup::Services => "groups.services",
            LineGroup::Freight => "groups.freight",
        }
    }
}

impl fmt::Display for LineGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineGroup::Materials => write!(f, "MATERIALS"),
            LineGroup::Services => write!(f, "SERVICES"),
            LineGroup::Freight => write!(f, "FREIGHT"),
        }
    }
}

// ==========================================
// 报价类别 (Quote Category)
// ==========================================
// 每个类别在报价中恰好持有一个 Selection（NA 哨兵也算）
// 枚举顺序即报价明细顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteCategory {
    // ===== 材料 =====
    Frame,      // 框架型材 (LM)
    Corners,    // 转角件 (LM)
    FabricFace, // 正面布 (SQM)
    FabricRear, // 背面布 (SQM)
    Lighting,   // 灯光 (SQM)
    Control,    // 控制器/驱动 (固定价)
    Acoustics,  // 吸音填充 (SQM)
    Finish,     // 表面处理 (固定价)
    Prebuild,   // 预装服务 (固定价)
    // ===== 服务 =====
    Design, // 设计 (固定价)
    Setup,  // 开机/异形费 (固定价)
    // ===== 运费 =====
    Freight, // 运费目的地 (固定价, 按档位匹配)
}

impl QuoteCategory {
    /// 全部类别（报价明细顺序）
    pub const ALL: [QuoteCategory; 12] = [
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

    /// 计价口径
    pub fn rate_basis(&self) -> RateBasis {
        match self {
            QuoteCategory::Frame | QuoteCategory::Corners => RateBasis::Length,
            QuoteCategory::FabricFace
            | QuoteCategory::FabricRear
            | QuoteCategory::Lighting
            | QuoteCategory::Acoustics => RateBasis::Area,
            QuoteCategory::Control
            | QuoteCategory::Finish
            | QuoteCategory::Prebuild
            | QuoteCategory::Design
            | QuoteCategory::Setup
            | QuoteCategory::Freight => RateBasis::Flat,
        }
    }

    /// 所属明细分组
    pub fn line_group(&self) -> LineGroup {
        match self {
            QuoteCategory::Design | QuoteCategory::Setup => LineGroup::Services,
            QuoteCategory::Freight => LineGroup::Freight,
            _ => LineGroup::Materials,
        }
    }

    /// 目录集合名（正反面布共用 fabric 目录）
    pub fn catalog_key(&self) -> &'static str {
        match self {
            QuoteCategory::Frame => "frame",
            QuoteCategory::Corners => "corners",
            QuoteCategory::FabricFace | QuoteCategory::FabricRear => "fabric",
            QuoteCategory::Lighting => "lighting",
            QuoteCategory::Control => "control",
            QuoteCategory::Acoustics => "acoustics",
            QuoteCategory::Finish => "finish",
            QuoteCategory::Prebuild => "prebuild",
            QuoteCategory::Design => "design",
            QuoteCategory::Setup => "setup",
            QuoteCategory::Freight => "freight",
        }
    }

    /// 是否为目录中存在的集合名
    pub fn is_catalog_key(key: &str) -> bool {
        Self::ALL.iter().any(|c| c.catalog_key() == key)
    }

    /// 从字符串解析类别
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.to_db_str().eq_ignore_ascii_case(s.trim()))
    }

    /// 转换为存储字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            QuoteCategory::Frame => "FRAME",
            QuoteCategory::Corners => "CORNERS",
            QuoteCategory::FabricFace => "FABRIC_FACE",
            QuoteCategory::FabricRear => "FABRIC_REAR",
            QuoteCategory::Lighting => "LIGHTING",
            QuoteCategory::Control => "CONTROL",
            QuoteCategory::Acoustics => "ACOUSTICS",
            QuoteCategory::Finish => "FINISH",
            QuoteCategory::Prebuild => "PREBUILD",
            QuoteCategory::Design => "DESIGN",
            QuoteCategory::Setup => "SETUP",
            QuoteCategory::Freight => "FREIGHT",
        }
    }

    /// i18n 键（明细标签）
    pub fn label_key(&self) -> String {
        format!("categories.{}", self.to_db_str().to_lowercase())
    }
}

impl fmt::Display for QuoteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 运费档位 (Freight Tier)
// ==========================================
// 序列化格式与目录中的 tier 字段一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FreightTier {
    #[serde(rename = "fabric only")]
    FabricOnly,
    #[serde(rename = "small - complete")]
    SmallComplete,
    #[serde(rename = "medium - complete")]
    MediumComplete,
    #[serde(rename = "large - complete")]
    LargeComplete,
    #[serde(rename = "pallet / crate")]
    PalletCrate,
}

impl FreightTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            FreightTier::FabricOnly => "fabric only",
            FreightTier::SmallComplete => "small - complete",
            FreightTier::MediumComplete => "medium - complete",
            FreightTier::LargeComplete => "large - complete",
            FreightTier::PalletCrate => "pallet / crate",
        }
    }

    /// i18n 键
    pub fn label_key(&self) -> &'static str {
        match self {
            FreightTier::FabricOnly => "tiers.fabric_only",
            FreightTier::SmallComplete => "tiers.small",
            FreightTier::MediumComplete => "tiers.medium",
            FreightTier::LargeComplete => "tiers.large",
            FreightTier::PalletCrate => "tiers.pallet",
        }
    }

    /// 从目录字符串解析档位
    ///
    /// 兼容历史数据中的 "meduim - complete" 拼写
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        match normalized.as_str() {
            "fabric only" => Some(FreightTier::FabricOnly),
            "small - complete" => Some(FreightTier::SmallComplete),
            "medium - complete" | "meduim - complete" => Some(FreightTier::MediumComplete),
            "large - complete" => Some(FreightTier::LargeComplete),
            "pallet / crate" => Some(FreightTier::PalletCrate),
            _ => None,
        }
    }
}

impl fmt::Display for FreightTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 报价状态 (Quote Status)
// ==========================================
// Draft → Completed 单向转换
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    Draft,
    Completed,
}

impl QuoteStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}
