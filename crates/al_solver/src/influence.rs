// crates/al_solver/src/influence.rs

//! 影响系数系统
//!
//! 把面元格栅装配成法向速度影响矩阵并求解环量分布。
//! 每个面元携带一个单位环量涡环（1/4 弦规则），后缘面元的涡环
//! 以两条长尾腿沿来流方向延伸闭合（马蹄涡）。
//!
//! 边界条件为配置点处的不可穿透（Neumann）：
//!
//! ```text
//! Σ_j AIC[i][j]·Γ_j = −(U∞ + u_onset(x_i))·n_i
//! ```
//!
//! 矩阵按行并行装配（每行互斥写入，快照只读），
//! 行数低于阈值时串行。分解一次，多工况复用。

use al_foundation::error::{AlError, AlResult};
use al_geom::panel::Panel4;
use glam::DVec3;
use rayon::prelude::*;

use crate::kernel::vortex::induced_velocity_segment;
use crate::kernel::{CoreModel, Vortex};
use crate::linalg::{lu_factorize, DenseMatrix, LuFactorization};

/// 尾腿延伸长度（相对几何尺度的倍数）
const FAR_WAKE_FACTOR: f64 = 100.0;

/// 影响系数系统
pub struct InfluenceSystem {
    /// 工作面元数组（任务的私有副本，可能已做逐工况旋转）
    panels: Vec<Panel4>,
    /// 涡环线段（按面元分组，单位环量）
    rings: Vec<Vec<Vortex>>,
    /// 涡核模型
    model: CoreModel,
    /// 涡核半径
    core: f64,
    /// 装配最小并行行数
    min_parallel_rows: usize,
    /// LU 分解（assemble 后可用）
    factorization: Option<LuFactorization>,
}

impl InfluenceSystem {
    /// 创建系统
    pub fn new(panels: Vec<Panel4>, model: CoreModel, core: f64) -> Self {
        Self {
            panels,
            rings: Vec::new(),
            model,
            core,
            min_parallel_rows: 64,
            factorization: None,
        }
    }

    /// 设置装配并行阈值
    pub fn with_min_parallel_rows(mut self, rows: usize) -> Self {
        self.min_parallel_rows = rows;
        self
    }

    /// 面元数
    #[inline]
    pub fn n_panels(&self) -> usize {
        self.panels.len()
    }

    /// 工作面元
    pub fn panels(&self) -> &[Panel4] {
        &self.panels
    }

    /// 替换工作面元（逐工况旋转后），分解失效
    pub fn set_panels(&mut self, panels: Vec<Panel4>) {
        self.panels = panels;
        self.rings.clear();
        self.factorization = None;
    }

    /// 构建单个面元的涡环线段（单位环量）
    ///
    /// 普通面元为闭合四边形环；后缘面元以尾腿沿 `trailing_dir`
    /// 延伸 `far_length` 后闭合。
    fn build_ring(panel: &Panel4, trailing_dir: DVec3, far_length: f64) -> Vec<Vortex> {
        let [ra, rb, rc, rd] = panel.ring_corners();
        if panel.trailing {
            let far_b = rc + trailing_dir * far_length;
            let far_a = rd + trailing_dir * far_length;
            vec![
                Vortex::new(ra, rb, 1.0),
                Vortex::new(rb, rc, 1.0),
                Vortex::new(rc, far_b, 1.0),
                Vortex::new(far_b, far_a, 1.0),
                Vortex::new(far_a, rd, 1.0),
                Vortex::new(rd, ra, 1.0),
            ]
        } else {
            vec![
                Vortex::new(ra, rb, 1.0),
                Vortex::new(rb, rc, 1.0),
                Vortex::new(rc, rd, 1.0),
                Vortex::new(rd, ra, 1.0),
            ]
        }
    }

    /// 单位环量涡环 j 在场点处的诱导速度
    fn unit_ring_velocity(&self, j: usize, point: DVec3) -> DVec3 {
        self.rings[j]
            .iter()
            .map(|vx| {
                induced_velocity_segment(vx.a, vx.b, 1.0, point, self.model, self.core)
            })
            .sum()
    }

    /// 装配影响矩阵并做 LU 分解
    ///
    /// `trailing_dir` 为尾腿方向（通常取来流方向单位向量）。
    pub fn assemble(&mut self, trailing_dir: DVec3) -> AlResult<()> {
        let n = self.panels.len();
        if n == 0 {
            return Err(AlError::geometry("影响矩阵装配: 面元数为零"));
        }

        // 几何尺度决定尾腿长度
        let scale = self
            .panels
            .iter()
            .map(|p| p.mean_chord())
            .fold(0.0f64, f64::max)
            .max(1.0);
        let far_length = FAR_WAKE_FACTOR * scale;

        let dir = trailing_dir.normalize_or_zero();
        if dir == DVec3::ZERO {
            return Err(AlError::numerical("尾腿方向为零向量"));
        }

        self.rings = self
            .panels
            .iter()
            .map(|p| Self::build_ring(p, dir, far_length))
            .collect();

        // 行装配：行 i 为配置点 i 处各单位涡环的法向诱导
        let mut aic = DenseMatrix::zeros(n);
        let panels = &self.panels;
        let rings = &self.rings;
        let model = self.model;
        let core = self.core;

        let fill_row = |i: usize, row: &mut [f64]| {
            let colloc = panels[i].collocation;
            let normal = panels[i].normal;
            for (j, ring) in rings.iter().enumerate() {
                let v: DVec3 = ring
                    .iter()
                    .map(|vx| induced_velocity_segment(vx.a, vx.b, 1.0, colloc, model, core))
                    .sum();
                row[j] = v.dot(normal);
            }
        };

        if n >= self.min_parallel_rows {
            aic.par_rows_mut()
                .enumerate()
                .for_each(|(i, row)| fill_row(i, row));
        } else {
            for i in 0..n {
                fill_row(i, aic.row_mut(i));
            }
        }

        let factorization = lu_factorize(&aic)
            .map_err(|e| AlError::numerical(format!("影响矩阵分解失败: {e}")))?;
        self.factorization = Some(factorization);
        Ok(())
    }

    /// 求解一个工况（一个右端项）
    ///
    /// `onset[i]` 为配置点 i 处除环量系统外的全部来流速度
    /// （自由来流 + 尾流诱导）。返回各面元环量。
    pub fn solve_rhs(&self, onset: &[DVec3]) -> AlResult<Vec<f64>> {
        let n = self.panels.len();
        if onset.len() != n {
            return Err(AlError::size_mismatch("onset velocities", n, onset.len()));
        }
        let factorization = self
            .factorization
            .as_ref()
            .ok_or_else(|| AlError::internal("solve_rhs 在 assemble 之前被调用"))?;

        let rhs: Vec<f64> = self
            .panels
            .iter()
            .zip(onset)
            .map(|(p, u)| -u.dot(p.normal))
            .collect();

        factorization
            .solve(&rhs)
            .map_err(|e| AlError::numerical(format!("环量求解失败: {e}")))
    }

    /// 环量系统在场点处的诱导速度
    pub fn induced_velocity(&self, point: DVec3, gammas: &[f64]) -> DVec3 {
        let mut v = DVec3::ZERO;
        for (j, &gamma) in gammas.iter().enumerate() {
            if gamma != 0.0 {
                v += self.unit_ring_velocity(j, point) * gamma;
            }
        }
        v
    }

    /// 带实际环量的束缚涡系（尾流对流的诱导源）
    ///
    /// 只导出每个面元涡环的前段（束缚段），环量取该面元环量与
    /// 弦向上游面元环量之差（净涡强）。
    pub fn bound_vortices(&self, gammas: &[f64], n_chord: usize) -> Vec<Vortex> {
        let mut bound = Vec::with_capacity(self.panels.len());
        for (p, panel) in self.panels.iter().enumerate() {
            let i = p % n_chord;
            let net_gamma = if i == 0 {
                gammas[p]
            } else {
                gammas[p] - gammas[p - 1]
            };
            let [ra, rb, _, _] = panel.ring_corners();
            bound.push(Vortex::new(ra, rb, net_gamma));
        }
        bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use al_geom::mesh::QuadMesh;

    fn flat_wing_mesh(n_chord: usize, n_span: usize) -> QuadMesh {
        let grid: Vec<Vec<DVec3>> = (0..=n_chord)
            .map(|i| {
                (0..=n_span)
                    .map(|j| {
                        DVec3::new(
                            i as f64 / n_chord as f64,
                            -2.0 + 4.0 * j as f64 / n_span as f64,
                            0.0,
                        )
                    })
                    .collect()
            })
            .collect();
        QuadMesh::from_grid(&grid)
    }

    #[test]
    fn test_assemble_and_solve_flat_plate() {
        let mesh = flat_wing_mesh(3, 8);
        let mut system = InfluenceSystem::new(mesh.panels.clone(), CoreModel::Potential, 0.01)
            .with_min_parallel_rows(usize::MAX);

        // 5° 迎角来流
        let alpha = 5f64.to_radians();
        let u_inf = DVec3::new(alpha.cos(), 0.0, alpha.sin());
        system.assemble(DVec3::X).unwrap();

        let onset = vec![u_inf; system.n_panels()];
        let gammas = system.solve_rhs(&onset).unwrap();

        assert_eq!(gammas.len(), 24);
        // 升力面情形下环量非零且有限
        assert!(gammas.iter().all(|g| g.is_finite()));
        assert!(gammas.iter().any(|g| g.abs() > 1e-6));

        // 边界条件校验：配置点法向速度接近零
        for (i, panel) in system.panels().iter().enumerate() {
            let v = system.induced_velocity(panel.collocation, &gammas) + u_inf;
            let vn = v.dot(panel.normal);
            assert!(vn.abs() < 1e-8, "panel {i}: vn={vn}");
        }
    }

    #[test]
    fn test_zero_alpha_symmetric_zero_lift() {
        // 平板零迎角：来流平行面元，环量应为零
        let mesh = flat_wing_mesh(2, 4);
        let mut system = InfluenceSystem::new(mesh.panels.clone(), CoreModel::Potential, 0.01)
            .with_min_parallel_rows(usize::MAX);
        system.assemble(DVec3::X).unwrap();
        let onset = vec![DVec3::X; system.n_panels()];
        let gammas = system.solve_rhs(&onset).unwrap();
        for g in &gammas {
            assert!(g.abs() < 1e-10);
        }
    }

    #[test]
    fn test_empty_mesh_rejected() {
        let mut system = InfluenceSystem::new(Vec::new(), CoreModel::Potential, 0.01);
        assert!(system.assemble(DVec3::X).is_err());
    }

    #[test]
    fn test_solve_before_assemble_rejected() {
        let mesh = flat_wing_mesh(2, 2);
        let system = InfluenceSystem::new(mesh.panels.clone(), CoreModel::Potential, 0.01);
        assert!(system.solve_rhs(&vec![DVec3::X; 4]).is_err());
    }

    #[test]
    fn test_bound_vortices_net_circulation() {
        let mesh = flat_wing_mesh(3, 2);
        let system = InfluenceSystem::new(mesh.panels.clone(), CoreModel::Potential, 0.01);
        // 人工环量：条带内弦向 [1, 3, 6]
        let gammas = vec![1.0, 3.0, 6.0, 1.0, 3.0, 6.0];
        let bound = system.bound_vortices(&gammas, 3);
        assert_eq!(bound.len(), 6);
        assert!((bound[0].gamma - 1.0).abs() < 1e-12);
        assert!((bound[1].gamma - 2.0).abs() < 1e-12);
        assert!((bound[2].gamma - 3.0).abs() < 1e-12);
    }
}
