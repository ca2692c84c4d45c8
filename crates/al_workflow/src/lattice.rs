// crates/al_workflow/src/lattice.rs

//! 格栅求解公用例程
//!
//! 帆船与机翼模型共享的逐工况求解骨架：
//! 环量求解与尾流对流交替迭代（尾流松弛），每个子步之间
//! 轮询取消。多升力面以 [`SurfaceLayout`] 描述各自在拼接
//! 面元数组中的区段与弦向布局。

use al_foundation::error::{AlError, AlResult};
use al_geom::panel::Panel4;
use al_solver::influence::InfluenceSystem;
use al_solver::kernel::{Vortex, Vorton};
use glam::DVec3;

use crate::queue::{TaskMessage, VpwReport};
use crate::task::PointContext;

/// 升力面在拼接面元数组中的布局
#[derive(Debug, Clone, Copy)]
pub(crate) struct SurfaceLayout {
    /// 区段起始面元索引
    pub start: usize,
    /// 弦向面元数
    pub n_chord: usize,
    /// 展向面元数
    pub n_span: usize,
}

impl SurfaceLayout {
    /// 区段面元数
    pub fn len(&self) -> usize {
        self.n_chord * self.n_span
    }
}

/// 提取带实际环量的束缚涡系（多升力面）
///
/// 每个面元导出其涡环前段，环量取与弦向上游面元之差（净涡强）。
pub(crate) fn bound_vortices(
    panels: &[Panel4],
    gammas: &[f64],
    surfaces: &[SurfaceLayout],
) -> Vec<Vortex> {
    let mut bound = Vec::with_capacity(panels.len());
    for surface in surfaces {
        for local in 0..surface.len() {
            let p = surface.start + local;
            let i = local % surface.n_chord;
            let net_gamma = if i == 0 {
                gammas[p]
            } else {
                gammas[p] - gammas[p - 1]
            };
            let [ra, rb, _, _] = panels[p].ring_corners();
            bound.push(Vortex::new(ra, rb, net_gamma));
        }
    }
    bound
}

/// 从后缘面元脱出一行涡粒子
///
/// 每个后缘面元产生一个粒子：位置在涡环尾段中点，涡量为
/// 该条带总环量乘以展向尾段向量，体积取展向宽度与涡核的乘积。
pub(crate) fn shed_vorton_row(
    panels: &[Panel4],
    gammas: &[f64],
    surfaces: &[SurfaceLayout],
    core_radius: f64,
) -> Vec<Vorton> {
    let mut row = Vec::new();
    for surface in surfaces {
        for j in 0..surface.n_span {
            let p = surface.start + j * surface.n_chord + surface.n_chord - 1;
            let panel = &panels[p];
            let gamma_te = gammas[p];
            let [_, _, rc, rd] = panel.ring_corners();
            let aft = rc - rd;
            let position = (rc + rd) * 0.5;
            row.push(Vorton::new(
                position,
                aft * gamma_te,
                aft.length() * core_radius * core_radius,
            ));
        }
    }
    row
}

/// 尾流松弛求解一个工况
///
/// 交替执行环量求解与尾流对流 `config.wake_iterations` 次；
/// 每个子步之间检查取消，观察到取消时返回 `AlError::Cancelled`。
/// 返回最终环量分布。
pub(crate) fn relax_and_solve(
    system: &InfluenceSystem,
    ctx: &mut PointContext<'_>,
    surfaces: &[SurfaceLayout],
    freestream_dir: DVec3,
    qrhs: usize,
    control: f64,
) -> AlResult<Vec<f64>> {
    let n = system.n_panels();
    let mut gammas = vec![0.0; n];

    for iteration in 0..ctx.config.wake_iterations.max(1) {
        if ctx.is_cancelled() {
            return Err(AlError::Cancelled);
        }

        // 当前尾流下的来流条件
        let onset: Vec<DVec3> = system
            .panels()
            .iter()
            .map(|p| freestream_dir + ctx.wake.induced_velocity(p.collocation))
            .collect();
        gammas = system.solve_rhs(&onset)?;

        // 束缚涡 + 尾流自诱导下推进尾流
        let bound = bound_vortices(system.panels(), &gammas, surfaces);
        ctx.wake.advect(&bound, freestream_dir);

        if ctx.config.live_update {
            ctx.sender.push(TaskMessage::Report(Box::new(VpwReport {
                qrhs,
                control,
                iteration,
                vorton_rows: ctx.wake.rows_snapshot(),
                log: format!("工况 {} 尾流迭代 {}", qrhs, iteration + 1),
            })));
        }
    }

    Ok(gammas)
}

/// 束缚段中点处的当地速度（载荷计算输入）
pub(crate) fn bound_velocities(
    system: &InfluenceSystem,
    wake_velocity: impl Fn(DVec3) -> DVec3,
    gammas: &[f64],
    freestream_dir: DVec3,
) -> Vec<DVec3> {
    system
        .panels()
        .iter()
        .map(|p| {
            let [ra, rb, _, _] = p.ring_corners();
            let mid = (ra + rb) * 0.5;
            freestream_dir + wake_velocity(mid) + system.induced_velocity(mid, gammas)
        })
        .collect()
}
