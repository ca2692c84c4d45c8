// crates/al_workflow/src/range.rs

//! 一维扫掠范围
//!
//! [`AnalysisRange`] 描述一个控制变量的扫掠（如迎角 0°→11° 步长 1°）。
//! 遍历方向感知：步长符号自动归一到 `max − min` 的方向，
//! 两端点都包含在内。
//!
//! 当区间不是步长的整数倍时，终点钳制到 `max`：
//! 余量不小于半个步长时补出一个钳制点，否则最后一个内点
//! 直接移动到 `max`（不发射越界点，也不丢失终点）。

use al_foundation::error::{AlError, AlResult};
use serde::{Deserialize, Serialize};

/// 一维扫掠范围
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRange {
    /// 是否参与遍历
    pub active: bool,
    /// 起点
    pub min: f64,
    /// 终点
    pub max: f64,
    /// 步长（符号在遍历时归一到扫掠方向）
    pub increment: f64,
}

impl AnalysisRange {
    /// 创建激活的范围
    pub fn new(min: f64, max: f64, increment: f64) -> Self {
        Self {
            active: true,
            min,
            max,
            increment,
        }
    }

    /// 单点范围
    pub fn single(value: f64) -> Self {
        Self {
            active: true,
            min: value,
            max: value,
            increment: 1.0,
        }
    }

    /// 验证：min ≠ max 时步长不得为零
    pub fn validate(&self) -> AlResult<()> {
        if self.min != self.max && self.increment == 0.0 {
            return Err(AlError::invalid_config(
                "increment",
                "0",
                "min ≠ max 的范围步长不能为零",
            ));
        }
        if !self.min.is_finite() || !self.max.is_finite() || !self.increment.is_finite() {
            return Err(AlError::invalid_config(
                "range",
                format!("[{}, {}] @ {}", self.min, self.max, self.increment),
                "范围参数必须有限",
            ));
        }
        Ok(())
    }

    /// 遍历点数
    pub fn n_points(&self) -> usize {
        self.values().len()
    }

    /// 按遍历顺序展开全部取值（含两端点）
    ///
    /// 非激活范围返回空。`min == max` 返回单点。
    pub fn values(&self) -> Vec<f64> {
        if !self.active {
            return Vec::new();
        }
        let span = self.max - self.min;
        if span == 0.0 {
            return vec![self.min];
        }
        let step = self.increment.abs() * span.signum();
        if step == 0.0 {
            return vec![self.min];
        }

        // 整数倍判断带相对容差，避免浮点累积误差丢点
        let ratio = span / step;
        let n_full = (ratio + 1e-9).floor() as usize;
        let residual = (span - n_full as f64 * step).abs();

        let mut values: Vec<f64> = (0..=n_full).map(|k| self.min + k as f64 * step).collect();

        if residual > 1e-9 * step.abs() {
            if residual >= 0.5 * step.abs() {
                // 余量足够大：补出钳制到终点的最后一步
                values.push(self.max);
            } else {
                // 余量不足半步：最后一个内点移动到终点
                if let Some(last) = values.last_mut() {
                    *last = self.max;
                }
            }
        } else {
            // 整数倍：末点直接取精确终点
            if let Some(last) = values.last_mut() {
                *last = self.max;
            }
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascending_sweep() {
        // 0..11 步长 1：恰好 12 个点
        let range = AnalysisRange::new(0.0, 11.0, 1.0);
        let values = range.values();
        assert_eq!(values.len(), 12);
        assert_eq!(values[0], 0.0);
        assert_eq!(values[11], 11.0);
        assert!((values[5] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_descending_sweep_sign_normalized() {
        // 0..-7 步长 1（符号自动归一）：8 个点
        let range = AnalysisRange::new(0.0, -7.0, 1.0);
        let values = range.values();
        assert_eq!(values.len(), 8);
        assert_eq!(values[0], 0.0);
        assert_eq!(values[7], -7.0);
        assert!((values[3] - (-3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_clamp_large_residual() {
        // 0..10.5 步长 1：余量 0.5 ≥ 半步，补出钳制终点
        let values = AnalysisRange::new(0.0, 10.5, 1.0).values();
        assert_eq!(values.len(), 12);
        assert_eq!(*values.last().unwrap(), 10.5);
        assert_eq!(values[10], 10.0);
    }

    #[test]
    fn test_clamp_small_residual() {
        // 0..10.2 步长 1：余量 0.2 < 半步，末内点移到终点
        let values = AnalysisRange::new(0.0, 10.2, 1.0).values();
        assert_eq!(values.len(), 11);
        assert_eq!(*values.last().unwrap(), 10.2);
        assert_eq!(values[9], 9.0);
    }

    #[test]
    fn test_single_point() {
        let values = AnalysisRange::single(3.5).values();
        assert_eq!(values, vec![3.5]);
    }

    #[test]
    fn test_inactive_empty() {
        let mut range = AnalysisRange::new(0.0, 5.0, 1.0);
        range.active = false;
        assert!(range.values().is_empty());
    }

    #[test]
    fn test_validate_zero_increment() {
        let range = AnalysisRange::new(0.0, 5.0, 0.0);
        assert!(range.validate().is_err());
        assert!(AnalysisRange::single(2.0).validate().is_ok());
    }

    #[test]
    fn test_fractional_step_no_drift() {
        // 0..9 步长 0.1：浮点累积不得丢失终点
        let values = AnalysisRange::new(0.0, 9.0, 0.1).values();
        assert_eq!(values.len(), 91);
        assert_eq!(*values.last().unwrap(), 9.0);
    }
}
