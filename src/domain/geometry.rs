// ==========================================
// 张拉布框架报价系统 - 几何领域模型
// ==========================================
// 职责: 尺寸集合 (毫米) 与几何结果 (延米 / 平方米)
// 红线: 计算用尺寸恒为有限非负数
// ==========================================

use crate::domain::error::{QuoteError, QuoteResult};
use crate::domain::types::{DimensionKey, Shape};
use serde::{Deserialize, Serialize};

// ==========================================
// DimensionSet - 尺寸集合
// ==========================================
// None 表示未填写；计算时按 0 处理
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<f64>,
}

impl DimensionSet {
    /// 空尺寸集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 链式设置尺寸（非法值被丢弃）
    pub fn with(mut self, key: DimensionKey, value: f64) -> Self {
        self.set(key, value);
        self
    }

    /// 设置尺寸
    ///
    /// 非有限数或负数视为未填写
    pub fn set(&mut self, key: DimensionKey, value: f64) {
        let slot = self.slot_mut(key);
        *slot = Self::coerce(value);
    }

    /// 从原始文本设置尺寸（表单输入）
    pub fn set_raw(&mut self, key: DimensionKey, raw: &str) {
        let slot = self.slot_mut(key);
        *slot = raw.trim().parse::<f64>().ok().and_then(Self::coerce);
    }

    /// 从 JSON 对象解析尺寸
    ///
    /// 接受数字或数字字符串，其他值一律视为未填写
    pub fn from_json(value: &serde_json::Value) -> Self {
        let mut dims = Self::default();
        let Some(obj) = value.as_object() else {
            return dims;
        };
        for (name, raw) in obj {
            let Some(key) = DimensionKey::parse(name) else {
                continue;
            };
            let parsed = match raw {
                serde_json::Value::Number(n) => n.as_f64(),
                serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            *dims.slot_mut(key) = parsed.and_then(Self::coerce);
        }
        dims
    }

    /// 原始填写值（未填写 → None）
    pub fn get(&self, key: DimensionKey) -> Option<f64> {
        match key {
            DimensionKey::A => self.a,
            DimensionKey::B => self.b,
            DimensionKey::C => self.c,
            DimensionKey::D => self.d,
        }
    }

    /// 计算用数值（未填写 → 0）
    pub fn value(&self, key: DimensionKey) -> f64 {
        self.get(key).and_then(Self::coerce).unwrap_or(0.0)
    }

    /// 所有已填写尺寸中的最大值（毫米）
    pub fn max_dimension(&self) -> f64 {
        DimensionKey::ALL
            .iter()
            .map(|k| self.value(*k))
            .fold(0.0, f64::max)
    }

    /// 形状所需但未填写或不合法的尺寸
    ///
    /// allow_zero=true 时允许 0（目录明确允许零尺寸的场景）
    pub fn invalid_for(&self, shape: Shape, allow_zero: bool) -> Vec<DimensionKey> {
        shape
            .required_dimensions()
            .iter()
            .copied()
            .filter(|key| match self.get(*key) {
                Some(v) if v > 0.0 => false,
                Some(v) if v == 0.0 => !allow_zero,
                _ => true,
            })
            .collect()
    }

    /// 校验形状所需尺寸均已填写且为正数
    pub fn validate_for(&self, shape: Shape, allow_zero: bool) -> QuoteResult<()> {
        match self.invalid_for(shape, allow_zero).first() {
            Some(key) => Err(QuoteError::InvalidDimension {
                shape: shape.to_string(),
                dimension: key.to_string(),
                value: self.get(*key),
            }),
            None => Ok(()),
        }
    }

    fn slot_mut(&mut self, key: DimensionKey) -> &mut Option<f64> {
        match key {
            DimensionKey::A => &mut self.a,
            DimensionKey::B => &mut self.b,
            DimensionKey::C => &mut self.c,
            DimensionKey::D => &mut self.d,
        }
    }

    fn coerce(value: f64) -> Option<f64> {
        if value.is_finite() && value >= 0.0 {
            Some(value)
        } else {
            None
        }
    }
}

// ==========================================
// GeometryResult - 几何结果
// ==========================================
// lm: 周长 (延米), sqm: 面积 (平方米)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryResult {
    pub lm: f64,
    pub sqm: f64,
}

impl GeometryResult {
    pub fn zero() -> Self {
        Self { lm: 0.0, sqm: 0.0 }
    }

    pub fn is_zero(&self) -> bool {
        self.lm == 0.0 && self.sqm == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_rejects_negative_and_nan() {
        let dims = DimensionSet::new()
            .with(DimensionKey::A, -5.0)
            .with(DimensionKey::B, f64::NAN)
            .with(DimensionKey::C, 300.0);

        assert_eq!(dims.get(DimensionKey::A), None);
        assert_eq!(dims.get(DimensionKey::B), None);
        assert_eq!(dims.value(DimensionKey::A), 0.0);
        assert_eq!(dims.value(DimensionKey::C), 300.0);
    }

    #[test]
    fn test_set_raw() {
        let mut dims = DimensionSet::new();
        dims.set_raw(DimensionKey::A, " 1200 ");
        dims.set_raw(DimensionKey::B, "abc");

        assert_eq!(dims.get(DimensionKey::A), Some(1200.0));
        assert_eq!(dims.get(DimensionKey::B), None);
    }

    #[test]
    fn test_from_json_mixed_inputs() {
        let dims = DimensionSet::from_json(&json!({
            "a": 2000,
            "b": "1000",
            "c": null,
            "d": true,
            "e": 50
        }));

        assert_eq!(dims.a, Some(2000.0));
        assert_eq!(dims.b, Some(1000.0));
        assert_eq!(dims.c, None);
        assert_eq!(dims.d, None);
    }

    #[test]
    fn test_validate_for_required_dimensions() {
        let dims = DimensionSet::new().with(DimensionKey::A, 1000.0);
        assert!(dims.validate_for(Shape::Square, false).is_ok());
        assert!(matches!(
            dims.validate_for(Shape::Rectangle, false),
            Err(QuoteError::InvalidDimension { ref dimension, .. }) if dimension == "b"
        ));

        let zero = DimensionSet::new().with(DimensionKey::A, 0.0);
        assert!(zero.validate_for(Shape::Round, false).is_err());
        assert!(zero.validate_for(Shape::Round, true).is_ok());
    }

    #[test]
    fn test_max_dimension_includes_c() {
        let dims = DimensionSet::new()
            .with(DimensionKey::A, 1000.0)
            .with(DimensionKey::B, 1200.0)
            .with(DimensionKey::C, 2500.0);
        assert_eq!(dims.max_dimension(), 2500.0);
        assert_eq!(DimensionSet::new().max_dimension(), 0.0);
    }
}
