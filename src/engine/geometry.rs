// ==========================================
// 张拉布框架报价系统 - 几何计算器
// ==========================================
// 职责: 形状 + 尺寸 (毫米) → 周长 (延米) + 面积 (平方米)
// 红线:
// - 全函数: 任何输入都不报错，缺失/非法尺寸按 0 处理
// - 绝不向下游计价传播 NaN / Infinity / 负数
// ==========================================

use crate::domain::error::{QuoteError, QuoteResult};
use crate::domain::geometry::{DimensionSet, GeometryResult};
use crate::domain::types::{DimensionKey, Shape};
use std::f64::consts::PI;
use tracing::warn;

const MM_PER_M: f64 = 1_000.0;
const MM2_PER_M2: f64 = 1_000_000.0;

/// 计算几何结果
///
/// 相同输入恒得相同输出（纯函数）
pub fn compute_geometry(shape: Shape, dims: &DimensionSet) -> GeometryResult {
    let a = dims.value(DimensionKey::A);
    let b = dims.value(DimensionKey::B);
    let c = dims.value(DimensionKey::C);
    let d = dims.value(DimensionKey::D);

    let perimeter_mm = perimeter(shape, a, b, c, d);
    let area_mm2 = match area(shape, a, b, c) {
        Ok(v) => v,
        Err(e) => {
            warn!("{}，面积按 0 处理", e);
            0.0
        }
    };

    GeometryResult {
        lm: guard(shape, "perimeter", perimeter_mm / MM_PER_M),
        sqm: guard(shape, "area", area_mm2 / MM2_PER_M2),
    }
}

/// 按形状标识计算几何结果
///
/// 未知标识返回 {0, 0}
pub fn compute_geometry_by_id(shape_id: &str, dims: &DimensionSet) -> GeometryResult {
    match Shape::parse(shape_id) {
        Some(shape) => compute_geometry(shape, dims),
        None => {
            tracing::debug!(shape_id = shape_id, "未知形状标识，返回零几何");
            GeometryResult::zero()
        }
    }
}

/// 可选形状（未选形状时返回零几何）
pub fn compute_geometry_opt(shape: Option<Shape>, dims: &DimensionSet) -> GeometryResult {
    shape
        .map(|s| compute_geometry(s, dims))
        .unwrap_or_else(GeometryResult::zero)
}

/// 校验形状所需尺寸
///
/// 仅供完整性判定使用；计算器本身不因尺寸不合法而失败
pub fn validate_dimensions(shape: Shape, dims: &DimensionSet, allow_zero: bool) -> QuoteResult<()> {
    dims.validate_for(shape, allow_zero)
}

// ==========================================
// 周长公式 (毫米)
// ==========================================
fn perimeter(shape: Shape, a: f64, b: f64, c: f64, d: f64) -> f64 {
    match shape {
        Shape::Square => 4.0 * a,
        Shape::Rectangle => 2.0 * (a + b),
        Shape::Round => 2.0 * PI * a,
        Shape::Triangle => a + b + c,
        Shape::Oval => ramanujan_perimeter(a, b),
        Shape::Diamond => 4.0 * ((a / 2.0).powi(2) + (b / 2.0).powi(2)).sqrt(),
        Shape::Trapezium => a + b + c + d,
    }
}

/// Ramanujan 第二近似: π(a+b)(1 + 3h/(10+√(4−3h))), h=((a−b)/(a+b))²
fn ramanujan_perimeter(a: f64, b: f64) -> f64 {
    let sum = a + b;
    if sum <= 0.0 {
        return 0.0;
    }
    let h = ((a - b) / sum).powi(2);
    PI * sum * (1.0 + 3.0 * h / (10.0 + (4.0 - 3.0 * h).sqrt()))
}

// ==========================================
// 面积公式 (平方毫米)
// ==========================================
fn area(shape: Shape, a: f64, b: f64, c: f64) -> QuoteResult<f64> {
    match shape {
        Shape::Square => Ok(a * a),
        Shape::Rectangle => Ok(a * b),
        Shape::Round => Ok(PI * a * a),
        Shape::Triangle => heron_area(a, b, c),
        // 历史公式: a/b 已是半轴却再次减半，保持与既有报价一致
        Shape::Oval => Ok(PI * (a / 2.0) * (b / 2.0)),
        Shape::Diamond => Ok(a * b / 2.0),
        Shape::Trapezium => Ok(0.5 * (a + b) * c),
    }
}

/// Heron 公式，违反三角不等式时返回 DegenerateGeometry
fn heron_area(a: f64, b: f64, c: f64) -> QuoteResult<f64> {
    if a + b < c || a + c < b || b + c < a {
        return Err(QuoteError::DegenerateGeometry {
            shape: Shape::Triangle.to_string(),
            reason: format!("三角不等式不成立: a={}, b={}, c={}", a, b, c),
        });
    }
    let s = (a + b + c) / 2.0;
    let product = s * (s - a) * (s - b) * (s - c);
    // 退化三角形的浮点误差可能给出极小负数
    Ok(product.max(0.0).sqrt())
}

/// 非有限或负数结果归零
fn guard(shape: Shape, field: &str, value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        let err = QuoteError::DegenerateGeometry {
            shape: shape.to_string(),
            reason: format!("{} 结果非法: {}", field, value),
        };
        warn!("{}，按 0 处理", err);
        0.0
    }
}
