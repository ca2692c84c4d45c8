// crates/al_solver/src/kernel/vorton.rs

//! 点涡粒子
//!
//! 涡粒子尾流法（VPW）的离散单元：位置 + 涡量向量 Ω
//! （方向为涡轴，模为环量）。诱导速度使用五阶精度的代数磨光核：
//!
//! ```text
//! λ = r/σ
//! f(λ) = (λ² + 2.5)·λ³ / (1 + λ²)^2.5
//! K = −(R_field − R_vorton)/r³
//! V = f(λ)/(4π) · (K × Ω)
//! ```
//!
//! 与 f 对应的涡量分布为 η(λ) = (15/8π)·(1+λ²)^(−7/2)，
//! 由 f′(λ) = 4πλ²·η(λ) 导出，`induced_vorticity` 按此计算。
//! r < 1e−6 时速度取零。

use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const INV_4PI: f64 = 1.0 / (4.0 * PI);
const R_MIN: f64 = 1.0e-6;

/// 点涡粒子
///
/// 由运行中任务的尾流行数组持有；对流期间创建/销毁/再分布。
/// 不变量：`circulation() == omega.length()`。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vorton {
    /// 位置 [m]
    pub position: DVec3,
    /// 涡量向量 Ω（方向为涡轴，模为环量）[m²/s]
    pub omega: DVec3,
    /// 关联涡核体积 [m³]
    pub volume: f64,
    /// 是否参与诱导计算
    pub active: bool,
}

impl Vorton {
    /// 创建涡粒子
    pub fn new(position: DVec3, omega: DVec3, volume: f64) -> Self {
        Self {
            position,
            omega,
            volume,
            active: true,
        }
    }

    /// 环量（涡量向量的模）
    #[inline]
    pub fn circulation(&self) -> f64 {
        self.omega.length()
    }

    /// 磨光因子 f(λ)
    #[inline]
    pub fn mollifier(lambda: f64) -> f64 {
        let l2 = lambda * lambda;
        (l2 + 2.5) * l2 * lambda / (1.0 + l2).powf(2.5)
    }

    /// 在场点处的诱导速度
    ///
    /// `core` 为磨光半径 σ。热循环中每步调用 O(N²) 次，保持无分配。
    #[inline]
    pub fn induced_velocity(&self, point: DVec3, core: f64) -> DVec3 {
        let r_vec = point - self.position;
        let r = r_vec.length();
        if r < R_MIN {
            return DVec3::ZERO;
        }
        let f = Self::mollifier(r / core);
        let k = -r_vec / (r * r * r);
        k.cross(self.omega) * (f * INV_4PI)
    }

    /// 在场点处的诱导涡量
    ///
    /// 磨光涡量分布 `ζ = Ω · η(r/σ)/σ³`，η 与速度核一致。
    #[inline]
    pub fn induced_vorticity(&self, point: DVec3, core: f64) -> DVec3 {
        let r = point.distance(self.position);
        let lambda = r / core;
        let eta = 15.0 / (8.0 * PI) * (1.0 + lambda * lambda).powf(-3.5);
        self.omega * (eta / (core * core * core))
    }

    /// 停用粒子（再分布合并后的空位）
    pub fn deactivate(&mut self) {
        self.active = false;
        self.omega = DVec3::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circulation_invariant() {
        let v = Vorton::new(DVec3::ZERO, DVec3::new(0.0, 0.0, 2.0), 1e-3);
        assert!((v.circulation() - 2.0).abs() < 1e-15);
    }

    #[test]
    fn test_velocity_zero_at_center() {
        let v = Vorton::new(DVec3::ZERO, DVec3::Z, 1e-3);
        assert_eq!(v.induced_velocity(DVec3::ZERO, 0.1), DVec3::ZERO);
    }

    #[test]
    fn test_mollifier_limits() {
        // λ→0 时 f→0，λ→∞ 时 f→1
        assert!(Vorton::mollifier(0.0).abs() < 1e-15);
        assert!((Vorton::mollifier(50.0) - 1.0).abs() < 1e-3);
        // 单调不减
        let mut prev = 0.0;
        for i in 0..500 {
            let f = Vorton::mollifier(i as f64 * 0.02);
            assert!(f >= prev - 1e-12);
            prev = f;
        }
    }

    #[test]
    fn test_far_field_matches_singular_kernel() {
        // 远场退化为无磨光的点涡诱导
        let vorton = Vorton::new(DVec3::ZERO, DVec3::Z, 1e-3);
        let core = 0.05;
        let point = DVec3::new(2.0, 0.0, 0.0);
        let v = vorton.induced_velocity(point, core);

        let r_vec = point;
        let r = r_vec.length();
        let k = -r_vec / (r * r * r);
        let exact = k.cross(DVec3::Z) / (4.0 * PI);
        assert!((v - exact).length() / exact.length() < 1e-3);
    }

    #[test]
    fn test_velocity_bounded_everywhere() {
        let vorton = Vorton::new(DVec3::ZERO, DVec3::Z, 1e-3);
        let core = 0.05;
        for i in 1..100 {
            let r = i as f64 * 0.002;
            let v = vorton.induced_velocity(DVec3::new(r, 0.0, 0.0), core);
            assert!(v.is_finite());
        }
    }

    #[test]
    fn test_vorticity_consistent_with_mollifier() {
        // f′(λ) = 4πλ²·η(λ)（数值微分校验）
        let core = 1.0;
        let vorton = Vorton::new(DVec3::ZERO, DVec3::Z, 1e-3);
        for &lambda in &[0.3, 0.8, 1.5, 3.0] {
            let h = 1e-5;
            let df = (Vorton::mollifier(lambda + h) - Vorton::mollifier(lambda - h)) / (2.0 * h);
            let eta = vorton
                .induced_vorticity(DVec3::new(lambda, 0.0, 0.0), core)
                .z;
            assert!(
                (df - 4.0 * PI * lambda * lambda * eta).abs() < 1e-6,
                "lambda={lambda}"
            );
        }
    }

    #[test]
    fn test_deactivate() {
        let mut v = Vorton::new(DVec3::ZERO, DVec3::Z, 1e-3);
        v.deactivate();
        assert!(!v.active);
        assert_eq!(v.circulation(), 0.0);
    }
}
