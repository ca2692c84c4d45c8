// crates/al_solver/src/kernel/core_model.rs

//! 涡核正则化模型
//!
//! Biot-Savart 定律在涡线上有 1/r 奇点。正则化模型给出阻尼因子
//! `f(r, core)`：r ≫ core 时趋于 1（恢复无粘解），r → 0 时趋于 0
//! （速度有界）。模型在任务配置中选定，运行期间不变。
//!
//! 各模型的阻尼因子：
//!
//! ```text
//! POTENTIAL    1                       （不阻尼，调用方负责距离保护）
//! CUT_OFF      0 (r<core), 1 (r≥core)
//! LAMB_OSEEN   1 − exp(−(r/core)²)
//! RANKINE      min((r/core)², 1)
//! SCULLY       r²/(core²+r²)
//! VATISTAS     r²/√(core⁴+r⁴)         （n=2）
//! ```

use serde::{Deserialize, Serialize};

/// 涡核正则化模型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CoreModel {
    /// 无阻尼（真实 1/r 奇点，靠距离阈值截断）
    Potential,
    /// 涡核内硬截断
    CutOff,
    /// Lamb-Oseen 粘性涡
    #[default]
    LambOseen,
    /// Rankine 刚体涡核
    Rankine,
    /// Scully 代数涡核
    Scully,
    /// Vatistas n=2 涡核
    Vatistas,
}

impl CoreModel {
    /// 阻尼因子 `f(r, core) ∈ [0, 1]`
    ///
    /// `r` 为到涡轴的距离，`core` 为涡核半径。
    /// 调用方保证 `core > 0`；`Potential` 模型不使用 `core`。
    #[inline]
    pub fn factor(self, r: f64, core: f64) -> f64 {
        match self {
            Self::Potential => 1.0,
            Self::CutOff => {
                if r < core {
                    0.0
                } else {
                    1.0
                }
            }
            Self::LambOseen => {
                let x = r / core;
                1.0 - (-x * x).exp()
            }
            Self::Rankine => {
                let x = r / core;
                (x * x).min(1.0)
            }
            Self::Scully => {
                let r2 = r * r;
                r2 / (core * core + r2)
            }
            Self::Vatistas => {
                let r2 = r * r;
                let c2 = core * core;
                r2 / (c2 * c2 + r2 * r2).sqrt()
            }
        }
    }

    /// 模型名称
    pub fn name(self) -> &'static str {
        match self {
            Self::Potential => "potential",
            Self::CutOff => "cut-off",
            Self::LambOseen => "Lamb-Oseen",
            Self::Rankine => "Rankine",
            Self::Scully => "Scully",
            Self::Vatistas => "Vatistas",
        }
    }

    /// 全部模型（测试与 CLI 枚举用）
    pub const ALL: [CoreModel; 6] = [
        Self::Potential,
        Self::CutOff,
        Self::LambOseen,
        Self::Rankine,
        Self::Scully,
        Self::Vatistas,
    ];
}

impl std::fmt::Display for CoreModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
