// crates/al_geom/src/foil.rs

//! 二维翼型
//!
//! 提供翼型坐标表示与 NACA 四位数字系列生成器。
//! 坐标按惯例从后缘沿上翼面绕到前缘，再沿下翼面回到后缘。
//!
//! 薄翼理论量（零升迎角、Fourier 系数）由弯度线数值积分得到，
//! 供二维截面引擎作初值与替代模型使用。

use al_foundation::error::{AlError, AlResult};
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::panel::Panel2d;

/// 二维翼型
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Foil {
    /// 翼型名称
    pub name: String,
    /// 表面坐标（后缘→上翼面→前缘→下翼面→后缘，弦长归一化）
    pub coords: Vec<DVec2>,
    /// 最大弯度（弦长比例）
    pub max_camber: f64,
    /// 最大弯度位置（弦长比例）
    pub camber_position: f64,
    /// 最大厚度（弦长比例）
    pub thickness: f64,
}

impl Foil {
    /// 生成 NACA 四位数字翼型
    ///
    /// # 参数
    /// - `digits`: 四位数字串，如 `"2410"`
    /// - `n_points`: 单侧表面点数（余弦加密分布）
    pub fn naca4(digits: &str, n_points: usize) -> AlResult<Self> {
        if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(AlError::config(format!("无效的 NACA 四位数字: {digits}")));
        }
        if n_points < 10 {
            return Err(AlError::config("翼型表面点数过少"));
        }

        let m = digits[0..1].parse::<f64>().unwrap_or(0.0) / 100.0;
        let p = digits[1..2].parse::<f64>().unwrap_or(0.0) / 10.0;
        let t = digits[2..4].parse::<f64>().unwrap_or(0.0) / 100.0;

        // 余弦分布，前后缘加密
        let xs: Vec<f64> = (0..=n_points)
            .map(|i| 0.5 * (1.0 - (PI * i as f64 / n_points as f64).cos()))
            .collect();

        let camber = |x: f64| -> f64 {
            if p <= 0.0 {
                0.0
            } else if x < p {
                m / (p * p) * (2.0 * p * x - x * x)
            } else {
                m / ((1.0 - p) * (1.0 - p)) * ((1.0 - 2.0 * p) + 2.0 * p * x - x * x)
            }
        };
        let slope = |x: f64| -> f64 {
            if p <= 0.0 {
                0.0
            } else if x < p {
                2.0 * m / (p * p) * (p - x)
            } else {
                2.0 * m / ((1.0 - p) * (1.0 - p)) * (p - x)
            }
        };
        // 闭合后缘厚度分布
        let half_thickness = |x: f64| -> f64 {
            5.0 * t
                * (0.2969 * x.sqrt() - 0.1260 * x - 0.3516 * x * x + 0.2843 * x * x * x
                    - 0.1036 * x * x * x * x)
        };

        let mut coords = Vec::with_capacity(2 * n_points + 1);
        // 上翼面：后缘 → 前缘
        for &x in xs.iter().rev() {
            let yc = camber(x);
            let yt = half_thickness(x);
            let theta = slope(x).atan();
            coords.push(DVec2::new(x - yt * theta.sin(), yc + yt * theta.cos()));
        }
        // 下翼面：前缘之后 → 后缘
        for &x in xs.iter().skip(1) {
            let yc = camber(x);
            let yt = half_thickness(x);
            let theta = slope(x).atan();
            coords.push(DVec2::new(x + yt * theta.sin(), yc - yt * theta.cos()));
        }

        Ok(Self {
            name: format!("NACA {digits}"),
            coords,
            max_camber: m,
            camber_position: p,
            thickness: t,
        })
    }

    /// 弯度线斜率 dz/dx
    pub fn camber_slope_at(&self, x: f64) -> f64 {
        let m = self.max_camber;
        let p = self.camber_position;
        if p <= 0.0 || m <= 0.0 {
            0.0
        } else if x < p {
            2.0 * m / (p * p) * (p - x)
        } else {
            2.0 * m / ((1.0 - p) * (1.0 - p)) * (p - x)
        }
    }

    /// 薄翼理论 Fourier 系数 (A0 偏置项, A1, A2)
    ///
    /// 以 `x = (1 − cos θ)/2` 换元对弯度线斜率做数值积分。
    /// A0 返回的是迎角无关部分 `−(1/π)∫ dz/dx dθ`，
    /// 实际 A0 = α + 该值。
    pub fn thin_foil_coefficients(&self) -> (f64, f64, f64) {
        const N: usize = 200;
        let mut a0 = 0.0;
        let mut a1 = 0.0;
        let mut a2 = 0.0;
        let dtheta = PI / N as f64;
        for i in 0..N {
            let theta = (i as f64 + 0.5) * dtheta;
            let x = 0.5 * (1.0 - theta.cos());
            let dz = self.camber_slope_at(x);
            a0 += dz * dtheta;
            a1 += dz * theta.cos() * dtheta;
            a2 += dz * (2.0 * theta).cos() * dtheta;
        }
        (-a0 / PI, 2.0 * a1 / PI, 2.0 * a2 / PI)
    }

    /// 零升迎角 [rad]
    ///
    /// 薄翼理论: `α_L0 = −(1/π) ∫ dz/dx (cos θ − 1) dθ`
    pub fn zero_lift_angle(&self) -> f64 {
        let (a0_bias, a1, _) = self.thin_foil_coefficients();
        // cl = 2π(α + a0_bias + a1/2) = 0
        -(a0_bias + 0.5 * a1)
    }

    /// 1/4 弦点力矩系数（迎角无关，薄翼理论）
    pub fn cm_quarter_chord(&self) -> f64 {
        let (_, a1, a2) = self.thin_foil_coefficients();
        -PI / 4.0 * (a1 - a2)
    }

    /// 表面离散为线元
    pub fn to_panels(&self) -> Vec<Panel2d> {
        self.coords
            .windows(2)
            .map(|w| Panel2d::new(w[0], w[1]))
            .collect()
    }

    /// 表面点数
    #[inline]
    pub fn n_points(&self) -> usize {
        self.coords.len()
    }
}
