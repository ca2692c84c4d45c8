// crates/al_foundation/src/tolerance.rs

//! 数值容差配置
//!
//! 提供诱导速度核与迭代求解中使用的全部阈值。
//! 全局静态变量已被移除，请使用参数注入模式：
//! 核函数接受常量阈值，求解循环接受 `NumericalTolerance` 实例。

/// 距离退化阈值 [m]
///
/// 涡线段长度或端点到场点距离低于此值时，诱导速度直接取零，
/// 避免 Biot-Savart 公式中的 1/r 爆破。
pub const DISTANCE_PRECISION: f64 = 1.0e-6;

/// 叉积模方退化阈值
///
/// `|r1 × r2|²` 低于此值说明场点与涡线段共线，几何因子无定义，取零。
pub const PRECISION: f64 = 1.0e-10;

/// 数值容差配置
///
/// 包含迭代求解与结果筛选中使用的容差阈值。
/// 任务构造时捕获一份副本，运行期间不变。
#[derive(Debug, Clone)]
pub struct NumericalTolerance {
    /// 迭代收敛容差
    pub convergence: f64,
    /// 安全除法阈值
    pub safe_div: f64,
    /// 面元面积最小值 [m²]
    pub min_area: f64,
    /// 阻力系数合理性下限（|Cd| 低于此值视为伪收敛点）
    pub cd_error: f64,
    /// 扫掠步进相对容差（终点包含判断）
    pub sweep_rel: f64,
}

impl Default for NumericalTolerance {
    fn default() -> Self {
        Self {
            convergence: 1e-8,
            safe_div: 1e-14,
            min_area: 1e-12,
            cd_error: 1e-5,
            sweep_rel: 1e-6,
        }
    }
}

impl NumericalTolerance {
    /// 创建保守配置（更严格的容差）
    pub fn conservative() -> Self {
        Self {
            convergence: 1e-10,
            cd_error: 1e-6,
            ..Default::default()
        }
    }

    /// 创建快速配置（更宽松的容差）
    pub fn fast() -> Self {
        Self {
            convergence: 1e-6,
            ..Default::default()
        }
    }

    /// 判断残差是否收敛
    #[inline]
    pub fn is_converged(&self, residual: f64) -> bool {
        residual.abs() < self.convergence
    }

    /// 判断阻力系数是否为伪收敛结果
    #[inline]
    pub fn is_spurious_cd(&self, cd: f64) -> bool {
        cd.abs() < self.cd_error
    }

    /// 安全除法（分母过小时返回零）
    #[inline]
    pub fn safe_div(&self, num: f64, den: f64) -> f64 {
        if den.abs() < self.safe_div {
            0.0
        } else {
            num / den
        }
    }

    /// 判断面元面积是否退化
    #[inline]
    pub fn is_degenerate_area(&self, area: f64) -> bool {
        area < self.min_area
    }
}
