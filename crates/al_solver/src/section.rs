// crates/al_solver/src/section.rs

//! 二维截面引擎
//!
//! [`SectionEngine`] 是外部二维粘性/无粘求解器的 trait 边界：
//! 序列器只通过 `analyze_alpha` / `process_cl` 两个入口交互，
//! 引擎内部的边界层方程不在本仓库范围内。
//!
//! [`ThinFoilEngine`] 是内置的解析替代实现（薄翼理论升力 +
//! 平板摩阻阻力），用于测试与命令行演示：良态输入下必定收敛，
//! 深失速区按引擎惯例报不收敛。

use al_geom::foil::Foil;
use al_geom::polar::Polar2d;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// 一个截面工况的求解结果
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SectionPoint {
    /// 迎角 [°]
    pub alpha_deg: f64,
    /// 升力系数
    pub cl: f64,
    /// 阻力系数
    pub cd: f64,
    /// 力矩系数（1/4 弦点）
    pub cm: f64,
    /// 上翼面转捩位置 (x/c)
    pub xtr_top: f64,
    /// 下翼面转捩位置 (x/c)
    pub xtr_bot: f64,
    /// 粘性迭代是否收敛
    pub converged: bool,
}

impl SectionPoint {
    /// 不收敛结果
    pub fn diverged(alpha_deg: f64) -> Self {
        Self {
            alpha_deg,
            cl: 0.0,
            cd: 0.0,
            cm: 0.0,
            xtr_top: 1.0,
            xtr_bot: 1.0,
            converged: false,
        }
    }
}

/// 二维截面引擎 trait（外部粘性求解器的接缝）
pub trait SectionEngine: Send + Sync {
    /// 引擎名称
    fn name(&self) -> &'static str;

    /// 粘性迭代次数上限
    fn max_iterations(&self) -> usize;

    /// 给定迎角求解一个工况
    fn analyze_alpha(&self, foil: &Foil, polar: &Polar2d, alpha_deg: f64) -> SectionPoint;

    /// 给定目标升力系数反解迎角并求解（processCl）
    fn process_cl(&self, foil: &Foil, polar: &Polar2d, cl_target: f64) -> SectionPoint;
}

/// 解析薄翼替代引擎
///
/// 升力线斜率 2π，零升迎角与 1/4 弦力矩由翼型弯度线积分得到；
/// 阻力为平板湍流摩阻加厚度修正与升力二次项。
/// 失速区以双曲正切软限幅过渡，超过 `diverge_alpha_deg` 报不收敛。
#[derive(Debug, Clone)]
pub struct ThinFoilEngine {
    /// 最大可达升力系数（软限幅渐近值）
    pub cl_max: f64,
    /// 判定发散的迎角界限 [°]
    pub diverge_alpha_deg: f64,
    /// 粘性迭代次数上限（trait 契约）
    pub max_iter: usize,
}

impl Default for ThinFoilEngine {
    fn default() -> Self {
        Self {
            cl_max: 1.6,
            diverge_alpha_deg: 25.0,
            max_iter: 100,
        }
    }
}

impl ThinFoilEngine {
    /// 线性段升力系数（未限幅）
    fn cl_linear(&self, foil: &Foil, alpha_deg: f64) -> f64 {
        let alpha = alpha_deg.to_radians();
        2.0 * PI * (alpha - foil.zero_lift_angle())
    }

    /// 软限幅：线性段之外以 tanh 过渡到 cl_max
    fn soften(&self, cl_lin: f64) -> f64 {
        let knee = 0.8 * self.cl_max;
        if cl_lin.abs() <= knee {
            cl_lin
        } else {
            let excess = cl_lin.abs() - knee;
            let span = self.cl_max - knee;
            cl_lin.signum() * (knee + span * (excess / span).tanh())
        }
    }

    /// 阻力模型：平板湍流摩阻 + 厚度修正 + 升力二次项
    fn drag(&self, foil: &Foil, reynolds: f64, cl: f64) -> f64 {
        let cf = 0.074 / reynolds.powf(0.2);
        let t = foil.thickness;
        let form = 1.0 + 2.0 * t + 60.0 * t.powi(4);
        2.0 * cf * form + 0.008 * cl * cl
    }

    /// 转捩位置启发式：迎角增大时上翼面转捩前移
    fn transitions(&self, foil: &Foil, polar: &Polar2d, alpha_deg: f64) -> (f64, f64) {
        let alpha_eff = alpha_deg - foil.zero_lift_angle().to_degrees();
        let ncrit_shift = (9.0 - polar.ncrit) * 0.02;
        let top = (0.7 - 0.05 * alpha_eff - ncrit_shift).clamp(0.02, 1.0);
        let bot = (0.7 + 0.03 * alpha_eff - ncrit_shift).clamp(0.02, 1.0);
        (top.min(polar.xtr_top_forced), bot.min(polar.xtr_bot_forced))
    }
}

impl SectionEngine for ThinFoilEngine {
    fn name(&self) -> &'static str {
        "thin-foil"
    }

    fn max_iterations(&self) -> usize {
        self.max_iter
    }

    fn analyze_alpha(&self, foil: &Foil, polar: &Polar2d, alpha_deg: f64) -> SectionPoint {
        if alpha_deg.abs() > self.diverge_alpha_deg || polar.reynolds <= 0.0 {
            return SectionPoint::diverged(alpha_deg);
        }

        let cl = self.soften(self.cl_linear(foil, alpha_deg));
        let cd = self.drag(foil, polar.reynolds, cl);
        let (xtr_top, xtr_bot) = self.transitions(foil, polar, alpha_deg);

        SectionPoint {
            alpha_deg,
            cl,
            cd,
            cm: foil.cm_quarter_chord(),
            xtr_top,
            xtr_bot,
            converged: true,
        }
    }

    fn process_cl(&self, foil: &Foil, polar: &Polar2d, cl_target: f64) -> SectionPoint {
        if cl_target.abs() >= self.cl_max {
            return SectionPoint::diverged(0.0);
        }

        // Newton 迭代反解迎角
        let mut alpha_deg = foil.zero_lift_angle().to_degrees() + cl_target / (2.0 * PI) * 180.0 / PI;
        for _ in 0..self.max_iter {
            let point = self.analyze_alpha(foil, polar, alpha_deg);
            if !point.converged {
                return SectionPoint::diverged(alpha_deg);
            }
            let residual = point.cl - cl_target;
            if residual.abs() < 1e-8 {
                return point;
            }
            // dcl/dα ≈ 2π [1/rad]
            alpha_deg -= residual / (2.0 * PI) * 180.0 / PI;
        }
        SectionPoint::diverged(alpha_deg)
    }
}
