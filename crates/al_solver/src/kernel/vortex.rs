// crates/al_solver/src/kernel/vortex.rs

//! 直线涡线段
//!
//! 束缚涡与涡环边的 Biot-Savart 闭式解（AB 段对场点 C）。
//! 几何因子由两条端点-场点向量给出：
//!
//! ```text
//! r0 = B − A,  r1 = C − A,  r2 = C − B
//! Psi   = r1 × r2
//! Omega = r0·r1/|r1| − r0·r2/|r2|
//! V     = Γ/(4π) · Omega/|Psi|² · Psi · f(h, core)
//! ```
//!
//! 其中 `h = |Psi|/|r0|` 为场点到涡轴的垂距，`f` 为涡核阻尼因子。
//! 三个距离（段长、两条端点距离）任一低于 `DISTANCE_PRECISION`，
//! 或 `|Psi|²` 低于 `PRECISION`（共线退化）时直接返回零向量。

use al_foundation::tolerance::{DISTANCE_PRECISION, PRECISION};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::kernel::core_model::CoreModel;

const INV_4PI: f64 = 1.0 / (4.0 * PI);

/// 直线涡线段（束缚涡）
///
/// 一个工况求解完成后环量不再改变；线段由面元网格持有。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vortex {
    /// 起点 A
    pub a: DVec3,
    /// 终点 B
    pub b: DVec3,
    /// 环量 Γ [m²/s]
    pub gamma: f64,
}

impl Vortex {
    /// 创建涡线段
    pub fn new(a: DVec3, b: DVec3, gamma: f64) -> Self {
        Self { a, b, gamma }
    }

    /// 线段长度
    #[inline]
    pub fn length(&self) -> f64 {
        self.a.distance(self.b)
    }

    /// 线段中点
    #[inline]
    pub fn midpoint(&self) -> DVec3 {
        (self.a + self.b) * 0.5
    }

    /// 在场点处的诱导速度
    #[inline]
    pub fn induced_velocity(&self, point: DVec3, model: CoreModel, core: f64) -> DVec3 {
        induced_velocity_segment(self.a, self.b, self.gamma, point, model, core)
    }
}

/// 涡线段 AB（环量 gamma）在场点 C 处的诱导速度
///
/// 自由函数形式供影响矩阵装配使用（单位环量核）。
#[inline]
pub fn induced_velocity_segment(
    a: DVec3,
    b: DVec3,
    gamma: f64,
    c: DVec3,
    model: CoreModel,
    core: f64,
) -> DVec3 {
    let r0 = b - a;
    let r1 = c - a;
    let r2 = c - b;

    let l0 = r0.length();
    let l1 = r1.length();
    let l2 = r2.length();
    if l0 < DISTANCE_PRECISION || l1 < DISTANCE_PRECISION || l2 < DISTANCE_PRECISION {
        return DVec3::ZERO;
    }

    let psi = r1.cross(r2);
    let psi_sq = psi.length_squared();
    if psi_sq < PRECISION {
        // 场点与涡轴共线，几何因子无定义
        return DVec3::ZERO;
    }

    let omega = r0.dot(r1) / l1 - r0.dot(r2) / l2;

    // 场点到涡轴垂距上的涡核阻尼
    let h = psi_sq.sqrt() / l0;
    let damp = model.factor(h, core);

    psi * (gamma * INV_4PI * omega / psi_sq * damp)
}
