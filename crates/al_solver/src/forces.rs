// crates/al_solver/src/forces.rs

//! 气动力与展向载荷
//!
//! 环量求解完成后，以 Kutta–Joukowski 定理在各面元束缚段上求力：
//!
//! ```text
//! dF = ΔΓ · (V_local × dl)
//! ```
//!
//! 求解在单位来流下进行，力以"每单位 ρU²"的归一化形式累加；
//! [`AeroForces::scale_to_speed`] 是纯缩放，不重新求解，
//! 对相同输入重复调用结果一致。
//!
//! 坐标分解采用风轴：阻力沿来流方向，升力取竖直方向在来流
//! 法平面内的投影，侧力完成右手系。

use al_foundation::error::{AlError, AlResult};
use al_geom::panel::Panel4;
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// 气动力合力与系数
///
/// `force_unit`/`moment_unit` 为单位 ρU² 下的归一化值；
/// `force`/`moment` 为 `scale_to_speed` 之后的物理值。
/// 持久化时字段布局稳定，不含任何引用。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AeroForces {
    /// 归一化合力（每单位 ρU²）[m²]
    pub force_unit: DVec3,
    /// 归一化力矩（每单位 ρU²）[m³]
    pub moment_unit: DVec3,
    /// 物理合力 [N]
    pub force: DVec3,
    /// 物理力矩 [N·m]
    pub moment: DVec3,
    /// 升力系数
    pub cl: f64,
    /// 阻力系数（诱导阻力）
    pub cd: f64,
    /// 侧力系数
    pub cy: f64,
    /// 参考面积 [m²]
    pub ref_area: f64,
    /// 逐面元压差系数
    pub panel_cp: Vec<f64>,
}

impl AeroForces {
    /// 缩放到物理单位（纯缩放，不重新求解）
    pub fn scale_to_speed(&mut self, density: f64, speed: f64) {
        let rho_u2 = density * speed * speed;
        self.force = self.force_unit * rho_u2;
        self.moment = self.moment_unit * rho_u2;
    }
}

/// 展向载荷分布
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SpanDistribs {
    /// 展向站位坐标（机翼为 y，帆为 z）
    pub stations: Vec<f64>,
    /// 当地弦长 [m]
    pub chord: Vec<f64>,
    /// 条带总环量（后缘面元环量）
    pub gamma: Vec<f64>,
    /// 当地升力系数
    pub cl_local: Vec<f64>,
}

impl SpanDistribs {
    /// 条带数
    #[inline]
    pub fn n_stations(&self) -> usize {
        self.stations.len()
    }
}

/// 风轴单位向量 (阻力方向, 升力方向, 侧力方向)
fn wind_axes(freestream_dir: DVec3) -> (DVec3, DVec3, DVec3) {
    let d = freestream_dir.normalize_or_zero();
    // 升力方向：竖直方向在来流法平面内的投影；来流接近竖直时退化到 x
    let mut l = DVec3::Z - d * DVec3::Z.dot(d);
    if l.length_squared() < 1e-12 {
        l = DVec3::X - d * DVec3::X.dot(d);
    }
    let l = l.normalize_or_zero();
    let s = d.cross(l);
    (d, l, s)
}

/// 计算气动力合力与展向分布
///
/// # 参数
/// - `panels`: 工作面元（展向条带连续，弦向 `n_chord` 个）
/// - `gammas`: 求解出的涡环环量（单位来流）
/// - `bound_velocities`: 各面元束缚段中点处的当地速度（单位来流系）
/// - `freestream_dir`: 来流方向
/// - `ref_point`: 力矩参考点
/// - `ref_area`: 参考面积
/// - `spanwise_vertical`: 展向站位取 z 坐标（帆）还是 y 坐标（机翼）
///
/// 纯函数：相同输入产生相同结果，不修改任何任务状态。
#[allow(clippy::too_many_arguments)]
pub fn compute_loads(
    panels: &[Panel4],
    n_chord: usize,
    gammas: &[f64],
    bound_velocities: &[DVec3],
    freestream_dir: DVec3,
    ref_point: DVec3,
    ref_area: f64,
    spanwise_vertical: bool,
) -> AlResult<(AeroForces, SpanDistribs)> {
    let n = panels.len();
    if n == 0 {
        return Err(AlError::geometry("载荷计算: 面元数为零"));
    }
    if gammas.len() != n {
        return Err(AlError::size_mismatch("gammas", n, gammas.len()));
    }
    if bound_velocities.len() != n {
        return Err(AlError::size_mismatch(
            "bound velocities",
            n,
            bound_velocities.len(),
        ));
    }
    if n_chord == 0 || n % n_chord != 0 {
        return Err(AlError::geometry("载荷计算: 弦向面元数与总数不一致"));
    }
    if ref_area <= 0.0 {
        return Err(AlError::out_of_range("ref_area", ref_area, 0.0, f64::MAX));
    }

    let n_span = n / n_chord;
    let (d, l, s) = wind_axes(freestream_dir);

    let mut force_unit = DVec3::ZERO;
    let mut moment_unit = DVec3::ZERO;
    let mut panel_cp = vec![0.0; n];

    let mut distribs = SpanDistribs {
        stations: Vec::with_capacity(n_span),
        chord: Vec::with_capacity(n_span),
        gamma: Vec::with_capacity(n_span),
        cl_local: Vec::with_capacity(n_span),
    };

    for j in 0..n_span {
        let mut strip_force = DVec3::ZERO;
        let mut strip_area = 0.0;
        let mut strip_chord = 0.0;
        let mut strip_center = DVec3::ZERO;

        for i in 0..n_chord {
            let p = j * n_chord + i;
            let panel = &panels[p];
            let net_gamma = if i == 0 {
                gammas[p]
            } else {
                gammas[p] - gammas[p - 1]
            };

            let [ra, rb, _, _] = panel.ring_corners();
            let dl = rb - ra;
            let df = bound_velocities[p].cross(dl) * -net_gamma;

            force_unit += df;
            strip_force += df;
            let mid = (ra + rb) * 0.5;
            moment_unit += (mid - ref_point).cross(df);

            // 压差系数：法向力 / (q·面积)，q = ½ρU²，归一化力已除 ρU²
            if panel.area > 0.0 {
                panel_cp[p] = 2.0 * df.dot(panel.normal) / panel.area;
            }

            strip_area += panel.area;
            strip_chord += panel.mean_chord();
            strip_center += panel.centroid();
        }

        strip_center /= n_chord as f64;
        let te_panel = j * n_chord + n_chord - 1;

        distribs.stations.push(if spanwise_vertical {
            strip_center.z
        } else {
            strip_center.y
        });
        distribs.chord.push(strip_chord);
        distribs.gamma.push(gammas[te_panel]);
        distribs.cl_local.push(if strip_area > 0.0 {
            2.0 * strip_force.dot(l) / strip_area
        } else {
            0.0
        });
    }

    let forces = AeroForces {
        force_unit,
        moment_unit,
        force: DVec3::ZERO,
        moment: DVec3::ZERO,
        cl: 2.0 * force_unit.dot(l) / ref_area,
        cd: 2.0 * force_unit.dot(d) / ref_area,
        cy: 2.0 * force_unit.dot(s) / ref_area,
        ref_area,
        panel_cp,
    };

    Ok((forces, distribs))
}
