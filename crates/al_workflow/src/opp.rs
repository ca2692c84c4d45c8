// crates/al_workflow/src/opp.rs

//! 工况点结果对象
//!
//! 每个收敛工况产出一个自持的结果对象：拥有自己的逐面元/逐站位
//! 数组，不含任何引用或指针，字段布局稳定以满足外部序列化契约。
//! 任务创建后所有权移交外部对象库，任务只保留一个顾问性的
//! "实时"副本用于进度显示（以完成信号为准）。

use al_solver::forces::{AeroForces, SpanDistribs};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 二维截面工况点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpPoint {
    /// 翼型名称
    pub foil_name: String,
    /// 极曲线名称
    pub polar_name: String,
    /// 迎角 [°]
    pub alpha_deg: f64,
    /// 雷诺数
    pub reynolds: f64,
    /// 升力系数
    pub cl: f64,
    /// 阻力系数
    pub cd: f64,
    /// 力矩系数（1/4 弦点）
    pub cm: f64,
    /// 上翼面转捩位置
    pub xtr_top: f64,
    /// 下翼面转捩位置
    pub xtr_bot: f64,
    /// 创建时间
    pub created: DateTime<Utc>,
}

/// 机翼工况点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WingOpp {
    /// 机翼名称
    pub wing_name: String,
    /// 迎角 [°]
    pub alpha_deg: f64,
    /// 来流速度 [m/s]
    pub speed: f64,
    /// 气动力（合力 + 系数 + 逐面元 Cp）
    pub forces: AeroForces,
    /// 展向载荷分布
    pub distribs: SpanDistribs,
    /// 本点计算是否带警告（如尾流未完全松弛）
    pub warning: bool,
    /// 创建时间
    pub created: DateTime<Utc>,
}

/// 帆船工况点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoatOpp {
    /// 船名
    pub boat_name: String,
    /// 极曲线配置名称
    pub polar_name: String,
    /// 控制变量取值（风速或风角，由配置决定）
    pub control: f64,
    /// 真风速 [m/s]
    pub tws: f64,
    /// 真风角 [°]
    pub twa_deg: f64,
    /// 横倾角 [°]
    pub heel_deg: f64,
    /// 逐帆气动力
    pub sail_forces: Vec<AeroForces>,
    /// 逐帆展向分布
    pub sail_distribs: Vec<SpanDistribs>,
    /// 船体风阻（物理单位）[N]
    pub hull_windage: f64,
    /// 合力 [N]
    pub total_force: glam::DVec3,
    /// 合力矩 [N·m]
    pub total_moment: glam::DVec3,
    /// 本点计算是否带警告
    pub warning: bool,
    /// 创建时间
    pub created: DateTime<Utc>,
}

impl BoatOpp {
    /// 驱动力（沿船艏方向，x 轴负向为前进）
    pub fn drive_force(&self) -> f64 {
        -self.total_force.x
    }

    /// 侧倾力
    pub fn side_force(&self) -> f64 {
        self.total_force.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oppoint_serialize_roundtrip() {
        let opp = OpPoint {
            foil_name: "NACA 2410".into(),
            polar_name: "T1".into(),
            alpha_deg: 4.0,
            reynolds: 1e5,
            cl: 0.65,
            cd: 0.012,
            cm: -0.05,
            xtr_top: 0.5,
            xtr_bot: 0.9,
            created: Utc::now(),
        };
        let json = serde_json::to_string(&opp).unwrap();
        let parsed: OpPoint = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.foil_name, "NACA 2410");
        assert!((parsed.cl - 0.65).abs() < 1e-12);
    }

    #[test]
    fn test_boat_opp_force_decomposition() {
        let opp = BoatOpp {
            boat_name: "test".into(),
            polar_name: "upwind".into(),
            control: 6.0,
            tws: 6.0,
            twa_deg: 40.0,
            heel_deg: 10.0,
            sail_forces: Vec::new(),
            sail_distribs: Vec::new(),
            hull_windage: 12.0,
            total_force: glam::DVec3::new(-150.0, 400.0, 30.0),
            total_moment: glam::DVec3::ZERO,
            warning: false,
            created: Utc::now(),
        };
        assert!((opp.drive_force() - 150.0).abs() < 1e-12);
        assert!((opp.side_force() - 400.0).abs() < 1e-12);
    }
}
