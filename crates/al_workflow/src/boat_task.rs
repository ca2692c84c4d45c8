// crates/al_workflow/src/boat_task.rs

//! 帆船分析任务
//!
//! 对一条船（帆装 + 船体）与一份极曲线配置执行控制变量扫掠，
//! 每个取值产出一个 [`BoatOpp`]。帆面拼接为一个涡环格栅系统，
//! 船体只以投影面积参与风阻。
//!
//! 每工况流程：横倾旋转（私有面元副本）→ 影响矩阵装配 →
//! 尾流松弛求解 → `compute_boat`（归一化载荷，幂等）→
//! `scale_results_to_speed`（纯缩放到物理单位）。
//!
//! 几何校验在任务构造时完成：零帆或零面元立即报
//! 几何错误，任务从不进入 RUNNING。

use std::sync::Arc;

use al_foundation::error::{AlError, AlResult};
use al_geom::panel::Panel4;
use al_geom::rig::{Boat, BoatControl, BoatPolar};
use al_solver::config::LatticeConfig;
use al_solver::forces::compute_loads;
use al_solver::influence::InfluenceSystem;
use al_solver::wake::VortonWake;
use chrono::Utc;
use glam::DVec3;
use parking_lot::RwLock;

use crate::lattice::{self, SurfaceLayout};
use crate::opp::BoatOpp;
use crate::queue::TaskSender;
use crate::range::AnalysisRange;
use crate::status::AnalysisStatus;
use crate::task::{LatticeModel, PointContext, Task3d, TaskError, TaskHandle};

/// 船体风阻系数（钝体绕流）
const HULL_DRAG_COEFF: f64 = 0.9;

/// 一个已求解工况的冻结输入
struct SolvedPoint {
    control: f64,
    freestream_dir: DVec3,
    gammas: Vec<f64>,
    bound_velocities: Vec<DVec3>,
}

/// 帆船格栅模型（[`Task3d`] 的具体离散）
pub struct BoatModel {
    boat: Arc<Boat>,
    polar: BoatPolar,
    /// 未旋转的基准面元
    base_panels: Vec<Panel4>,
    /// 各帆在拼接数组中的布局
    surfaces: Vec<SurfaceLayout>,
    sail_areas: Vec<f64>,
    system: InfluenceSystem,
    config: LatticeConfig,
    /// 上一工况的环量（尾流脱出用；首工况为零）
    last_gammas: Vec<f64>,
    solutions: Vec<Option<SolvedPoint>>,
    opps: Vec<BoatOpp>,
    live: Arc<RwLock<Option<BoatOpp>>>,
    assembled_dir: Option<DVec3>,
}

impl BoatModel {
    /// 绑定几何与配置，格栅化并校验
    ///
    /// 零帆或零面元几何立即失败（任务不得启动）。
    fn initialize(
        boat: Arc<Boat>,
        polar: BoatPolar,
        config: LatticeConfig,
        n_chord: usize,
        n_span: usize,
    ) -> AlResult<Self> {
        polar.validate()?;

        let mut base_panels = Vec::new();
        let mut surfaces = Vec::new();
        let mut sail_areas = Vec::new();

        for sail in &boat.sails {
            let mesh = sail.mesh(n_chord, n_span)?;
            let report = mesh.validate(config.tolerance.min_area);
            if report.has_errors() {
                return Err(AlError::geometry(format!(
                    "帆 '{}' 网格无效:\n{}",
                    sail.name, report
                )));
            }
            surfaces.push(SurfaceLayout {
                start: base_panels.len(),
                n_chord: mesh.n_chord,
                n_span: mesh.n_span,
            });
            sail_areas.push(sail.reference_area());
            base_panels.extend(mesh.panels);
        }

        let mut model = Self {
            boat,
            polar,
            base_panels,
            surfaces,
            sail_areas,
            system: InfluenceSystem::new(Vec::new(), config.wake.core_model, config.wake.core_radius)
                .with_min_parallel_rows(config.min_parallel_rows),
            config,
            last_gammas: Vec::new(),
            solutions: Vec::new(),
            opps: Vec::new(),
            live: Arc::new(RwLock::new(None)),
            assembled_dir: None,
        };
        model.allocate_sail_results_arrays()?;
        let heel = model.polar.heel_deg;
        model.set_angles(heel);
        Ok(model)
    }

    /// 分配结果数组并做退化几何快速失败
    fn allocate_sail_results_arrays(&mut self) -> AlResult<()> {
        if self.boat.sails.is_empty() {
            return Err(AlError::geometry("船上没有帆面"));
        }
        if self.base_panels.is_empty() {
            return Err(AlError::geometry("帆面格栅化后面元数为零"));
        }
        self.last_gammas = vec![0.0; self.base_panels.len()];
        self.solutions.clear();
        self.opps.clear();
        Ok(())
    }

    /// 施加逐工况面元旋转（横倾角 phi，绕 x 轴）
    ///
    /// 只旋转任务的私有工作副本，共享的 `Boat` 网格不受影响。
    fn set_angles(&mut self, phi_deg: f64) {
        let phi = phi_deg.to_radians();
        let rotated: Vec<Panel4> = self
            .base_panels
            .iter()
            .map(|p| p.rotated_about(DVec3::ZERO, DVec3::X, phi))
            .collect();
        self.system.set_panels(rotated);
        self.assembled_dir = None;
    }

    /// 控制变量到 (风速, 来流方向) 的映射
    fn operating_condition(&self, control: f64) -> (f64, DVec3) {
        let (speed, angle_deg) = match self.polar.control {
            BoatControl::WindSpeed => (control, self.polar.twa_deg),
            BoatControl::WindAngle => (self.polar.tws, control),
        };
        let angle = angle_deg.to_radians();
        (speed, DVec3::new(angle.cos(), angle.sin(), 0.0))
    }

    /// 船体风阻（归一化，每单位 ρU²）
    fn hull_windage_unit(&self, freestream_dir: DVec3) -> f64 {
        match &self.boat.hull {
            Some(hull) => {
                let area_eff = hull.frontal_area() * freestream_dir.x.abs()
                    + hull.lateral_area() * freestream_dir.y.abs();
                0.5 * HULL_DRAG_COEFF * area_eff
            }
            None => 0.0,
        }
    }

    /// 从已求解的强度数组计算归一化载荷（幂等）
    ///
    /// 同样的输入产生同样的 [`BoatOpp`]，不做任何跨调用累积，
    /// 也不修改扫掠范围或已存结果。
    pub fn compute_boat(&self, qrhs: usize) -> AlResult<BoatOpp> {
        let solved = self
            .solutions
            .get(qrhs)
            .and_then(|s| s.as_ref())
            .ok_or_else(|| AlError::internal(format!("工况 {} 尚未求解", qrhs)))?;

        let panels = self.system.panels();
        let mut sail_forces = Vec::with_capacity(self.surfaces.len());
        let mut sail_distribs = Vec::with_capacity(self.surfaces.len());

        for (k, surface) in self.surfaces.iter().enumerate() {
            let range = surface.start..surface.start + surface.len();
            let (forces, distribs) = compute_loads(
                &panels[range.clone()],
                surface.n_chord,
                &solved.gammas[range.clone()],
                &solved.bound_velocities[range],
                solved.freestream_dir,
                DVec3::ZERO,
                self.sail_areas[k],
                true,
            )?;
            sail_forces.push(forces);
            sail_distribs.push(distribs);
        }

        Ok(BoatOpp {
            boat_name: self.boat.name.clone(),
            polar_name: self.polar.name.clone(),
            control: solved.control,
            tws: match self.polar.control {
                BoatControl::WindSpeed => solved.control,
                BoatControl::WindAngle => self.polar.tws,
            },
            twa_deg: match self.polar.control {
                BoatControl::WindSpeed => self.polar.twa_deg,
                BoatControl::WindAngle => solved.control,
            },
            heel_deg: self.polar.heel_deg,
            sail_forces,
            sail_distribs,
            hull_windage: 0.0,
            total_force: DVec3::ZERO,
            total_moment: DVec3::ZERO,
            warning: false,
            created: Utc::now(),
        })
    }

    /// 把归一化结果缩放到当前工况的物理单位（纯缩放，不重新求解）
    pub fn scale_results_to_speed(&self, qrhs: usize, opp: &mut BoatOpp) -> AlResult<()> {
        let solved = self
            .solutions
            .get(qrhs)
            .and_then(|s| s.as_ref())
            .ok_or_else(|| AlError::internal(format!("工况 {} 尚未求解", qrhs)))?;

        let (speed, dir) = self.operating_condition(solved.control);
        let rho = self.polar.air_density;
        let rho_u2 = rho * speed * speed;

        let mut total_force = DVec3::ZERO;
        let mut total_moment = DVec3::ZERO;
        for forces in &mut opp.sail_forces {
            forces.scale_to_speed(rho, speed);
            total_force += forces.force;
            total_moment += forces.moment;
        }

        let windage = self.hull_windage_unit(dir) * rho_u2;
        opp.hull_windage = windage;
        opp.total_force = total_force + dir * windage;
        opp.total_moment = total_moment;
        Ok(())
    }

    /// 已完成的工况点
    pub fn operating_points(&self) -> &[BoatOpp] {
        &self.opps
    }

    /// 实时工况点槽位（顾问性；以任务完成信号为准）
    pub fn live_slot(&self) -> Arc<RwLock<Option<BoatOpp>>> {
        self.live.clone()
    }
}

impl LatticeModel for BoatModel {
    fn make_vorton_row(&mut self, _qrhs: usize, wake: &mut VortonWake) -> AlResult<()> {
        let row = lattice::shed_vorton_row(
            self.system.panels(),
            &self.last_gammas,
            &self.surfaces,
            self.config.wake.core_radius,
        );
        wake.push_row(row);
        Ok(())
    }

    fn solve_point(
        &mut self,
        qrhs: usize,
        control: f64,
        ctx: &mut PointContext<'_>,
    ) -> AlResult<bool> {
        let (_, dir) = self.operating_condition(control);

        // 来流方向变化时重新装配（尾腿方向依赖来流）
        if self.assembled_dir != Some(dir) {
            self.system.assemble(dir)?;
            self.assembled_dir = Some(dir);
        }

        let gammas = lattice::relax_and_solve(&self.system, ctx, &self.surfaces, dir, qrhs, control)?;
        if gammas.iter().any(|g| !g.is_finite()) {
            return Ok(false);
        }

        let bound_velocities = {
            let wake = &*ctx.wake;
            lattice::bound_velocities(&self.system, |p| wake.induced_velocity(p), &gammas, dir)
        };

        if qrhs >= self.solutions.len() {
            self.solutions.resize_with(qrhs + 1, || None);
        }
        self.solutions[qrhs] = Some(SolvedPoint {
            control,
            freestream_dir: dir,
            gammas: gammas.clone(),
            bound_velocities,
        });
        self.last_gammas = gammas;

        let mut opp = self.compute_boat(qrhs)?;
        self.scale_results_to_speed(qrhs, &mut opp)?;

        *self.live.write() = Some(opp.clone());
        self.opps.push(opp);
        Ok(true)
    }
}

/// 帆船分析任务（[`Task3d`] 外观）
pub struct BoatTask {
    task: Task3d<BoatModel>,
}

impl BoatTask {
    /// 绑定船与极曲线配置并创建任务
    ///
    /// `n_chord`/`n_span` 为每面帆的格栅密度。
    /// 几何或配置无效时立即返回错误，任务不会创建。
    pub fn new(
        boat: Arc<Boat>,
        polar: BoatPolar,
        config: LatticeConfig,
        sender: TaskSender,
        n_chord: usize,
        n_span: usize,
    ) -> AlResult<Self> {
        config.validate()?;
        let model = BoatModel::initialize(boat, polar, config.clone(), n_chord, n_span)?;
        Ok(Self {
            task: Task3d::new(model, config, sender),
        })
    }

    /// 设置控制变量扫掠（每个取值一个 [`BoatOpp`]）
    pub fn set_analysis_range(&mut self, range: AnalysisRange) -> AlResult<()> {
        self.task.set_analysis_range(range)
    }

    /// 跨线程句柄
    pub fn handle(&self) -> TaskHandle {
        self.task.handle()
    }

    /// 请求取消
    pub fn on_cancel(&self) {
        self.task.on_cancel();
    }

    /// 运行（阻塞直到终止）
    pub fn run(&mut self) -> Result<AnalysisStatus, TaskError> {
        self.task.run()
    }

    /// 当前状态
    pub fn status(&self) -> AnalysisStatus {
        self.task.status()
    }

    /// 是否已结束
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// 是否记录过错误
    pub fn has_errors(&self) -> bool {
        self.task.has_errors()
    }

    /// 是否记录过警告
    pub fn has_warnings(&self) -> bool {
        self.task.has_warnings()
    }

    /// 已完成的工况点
    pub fn operating_points(&self) -> &[BoatOpp] {
        self.task.model().operating_points()
    }

    /// 重算一个已求解工况的归一化载荷（幂等性入口）
    pub fn compute_boat(&self, qrhs: usize) -> AlResult<BoatOpp> {
        self.task.model().compute_boat(qrhs)
    }

    /// 实时工况点（顾问性）
    pub fn live_point(&self) -> Option<BoatOpp> {
        self.task.model().live.read().clone()
    }

    /// 结束后取出全部结果
    pub fn into_results(self) -> Vec<BoatOpp> {
        self.task.into_model().opps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::task_channel;
    use al_geom::rig::{HullPatch, Sail};

    fn test_boat() -> Arc<Boat> {
        Arc::new(
            Boat::new("test-boat")
                .with_sail(Sail::mainsail("main", 3.0, 9.0))
                .with_hull(HullPatch::box_hull(8.0, 2.5, 1.0)),
        )
    }

    fn small_config() -> LatticeConfig {
        let mut config = LatticeConfig::default();
        config.wake.n_wake_rows = 4;
        config.wake_iterations = 2;
        config.live_update = false;
        config
    }

    #[test]
    fn test_no_sails_fails_fast() {
        let boat = Arc::new(Boat::new("bare"));
        let (tx, _rx) = task_channel();
        let result = BoatTask::new(
            boat,
            BoatPolar::new("p"),
            small_config(),
            tx,
            3,
            6,
        );
        assert!(matches!(result, Err(AlError::Geometry { .. })));
    }

    #[test]
    fn test_wind_speed_sweep() {
        let (tx, _rx) = task_channel();
        let mut task =
            BoatTask::new(test_boat(), BoatPolar::new("upwind"), small_config(), tx, 3, 6)
                .unwrap();
        task.set_analysis_range(AnalysisRange::new(4.0, 6.0, 1.0))
            .unwrap();
        let status = task.run().unwrap();

        assert_eq!(status, AnalysisStatus::Finished);
        assert!(!task.has_errors());
        let opps = task.operating_points();
        assert_eq!(opps.len(), 3);
        // 风速增大时物理合力增大
        assert!(opps[0].total_force.length() < opps[2].total_force.length());
        // 船体风阻为正
        assert!(opps[0].hull_windage > 0.0);
        // 每帆一份分布
        assert_eq!(opps[0].sail_distribs.len(), 1);
        assert_eq!(opps[0].sail_distribs[0].n_stations(), 6);
    }

    #[test]
    fn test_compute_boat_idempotent() {
        let (tx, _rx) = task_channel();
        let mut task =
            BoatTask::new(test_boat(), BoatPolar::new("upwind"), small_config(), tx, 3, 6)
                .unwrap();
        task.set_analysis_range(AnalysisRange::single(5.0)).unwrap();
        task.run().unwrap();

        let a = task.compute_boat(0).unwrap();
        let b = task.compute_boat(0).unwrap();
        assert_eq!(a.sail_forces[0].force_unit, b.sail_forces[0].force_unit);
        assert_eq!(a.sail_forces[0].cl, b.sail_forces[0].cl);
        assert_eq!(a.sail_distribs[0].gamma, b.sail_distribs[0].gamma);
    }

    #[test]
    fn test_heel_rotates_private_copy_only() {
        let boat = test_boat();
        let mut polar = BoatPolar::new("heeled");
        polar.heel_deg = 20.0;
        let (tx, _rx) = task_channel();
        let task = BoatTask::new(boat.clone(), polar, small_config(), tx, 3, 6).unwrap();

        // 共享几何未被修改
        let fresh_mesh = boat.sails[0].mesh(3, 6).unwrap();
        let working = task.task.model().system.panels();
        assert_eq!(working.len(), fresh_mesh.panels.len());
        // 工作副本绕 x 轴旋转过，法向不同
        let diff = (working[0].normal - fresh_mesh.panels[0].normal).length();
        assert!(diff > 1e-3);
    }

    #[test]
    fn test_unsolved_point_rejected() {
        let (tx, _rx) = task_channel();
        let task =
            BoatTask::new(test_boat(), BoatPolar::new("p"), small_config(), tx, 3, 6).unwrap();
        assert!(task.compute_boat(0).is_err());
    }
}
