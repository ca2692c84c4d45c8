// crates/al_workflow/src/plane_task.rs

//! 机翼分析任务
//!
//! 对一副机翼执行迎角扫掠，每个迎角产出一个 [`WingOpp`]。
//! 面元保持固定，迎角通过旋转来流方向施加；
//! 与帆船任务共享格栅装配、尾流松弛与载荷计算例程。

use std::sync::Arc;

use al_foundation::error::{AlError, AlResult};
use al_geom::rig::Wing;
use al_solver::config::LatticeConfig;
use al_solver::forces::compute_loads;
use al_solver::influence::InfluenceSystem;
use al_solver::wake::VortonWake;
use chrono::Utc;
use glam::DVec3;
use parking_lot::RwLock;

use crate::lattice::{self, SurfaceLayout};
use crate::opp::WingOpp;
use crate::queue::TaskSender;
use crate::range::AnalysisRange;
use crate::status::AnalysisStatus;
use crate::task::{LatticeModel, PointContext, Task3d, TaskError, TaskHandle};

/// 机翼格栅模型
pub struct WingModel {
    wing: Arc<Wing>,
    /// 来流速度 [m/s]
    speed: f64,
    /// 空气密度 [kg/m³]
    density: f64,
    surface: SurfaceLayout,
    ref_area: f64,
    system: InfluenceSystem,
    config: LatticeConfig,
    last_gammas: Vec<f64>,
    opps: Vec<WingOpp>,
    live: Arc<RwLock<Option<WingOpp>>>,
}

impl WingModel {
    fn initialize(
        wing: Arc<Wing>,
        speed: f64,
        density: f64,
        config: LatticeConfig,
        n_chord: usize,
        n_span: usize,
    ) -> AlResult<Self> {
        if speed <= 0.0 {
            return Err(AlError::out_of_range("speed", speed, 0.0, f64::MAX));
        }
        if density <= 0.0 {
            return Err(AlError::out_of_range("density", density, 0.0, f64::MAX));
        }

        let mesh = wing.mesh(n_chord, n_span)?;
        let report = mesh.validate(config.tolerance.min_area);
        if report.has_errors() {
            return Err(AlError::geometry(format!(
                "机翼 '{}' 网格无效:\n{}",
                wing.name, report
            )));
        }

        let surface = SurfaceLayout {
            start: 0,
            n_chord: mesh.n_chord,
            n_span: mesh.n_span,
        };
        let ref_area = wing.reference_area();
        let n = mesh.panels.len();
        let system =
            InfluenceSystem::new(mesh.panels, config.wake.core_model, config.wake.core_radius)
                .with_min_parallel_rows(config.min_parallel_rows);

        Ok(Self {
            wing,
            speed,
            density,
            surface,
            ref_area,
            system,
            config,
            last_gammas: vec![0.0; n],
            opps: Vec::new(),
            live: Arc::new(RwLock::new(None)),
        })
    }

    /// 迎角对应的来流方向（绕 y 轴旋转）
    fn freestream_dir(alpha_deg: f64) -> DVec3 {
        let alpha = alpha_deg.to_radians();
        DVec3::new(alpha.cos(), 0.0, alpha.sin())
    }

    /// 已完成的工况点
    pub fn operating_points(&self) -> &[WingOpp] {
        &self.opps
    }
}

impl LatticeModel for WingModel {
    fn make_vorton_row(&mut self, _qrhs: usize, wake: &mut VortonWake) -> AlResult<()> {
        let row = lattice::shed_vorton_row(
            self.system.panels(),
            &self.last_gammas,
            std::slice::from_ref(&self.surface),
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
        let dir = Self::freestream_dir(control);
        // 迎角逐点变化，尾腿方向随来流重新装配
        self.system.assemble(dir)?;

        let surfaces = [self.surface];
        let gammas = lattice::relax_and_solve(&self.system, ctx, &surfaces, dir, qrhs, control)?;
        if gammas.iter().any(|g| !g.is_finite()) {
            return Ok(false);
        }

        let bound_velocities = {
            let wake = &*ctx.wake;
            lattice::bound_velocities(&self.system, |p| wake.induced_velocity(p), &gammas, dir)
        };

        let (mut forces, distribs) = compute_loads(
            self.system.panels(),
            self.surface.n_chord,
            &gammas,
            &bound_velocities,
            dir,
            DVec3::ZERO,
            self.ref_area,
            false,
        )?;
        forces.scale_to_speed(self.density, self.speed);
        self.last_gammas = gammas;

        let opp = WingOpp {
            wing_name: self.wing.name.clone(),
            alpha_deg: control,
            speed: self.speed,
            forces,
            distribs,
            warning: false,
            created: Utc::now(),
        };
        *self.live.write() = Some(opp.clone());
        self.opps.push(opp);
        Ok(true)
    }
}

/// 机翼分析任务（[`Task3d`] 外观）
pub struct PlaneTask {
    task: Task3d<WingModel>,
}

impl PlaneTask {
    /// 绑定机翼并创建任务
    pub fn new(
        wing: Arc<Wing>,
        speed: f64,
        density: f64,
        config: LatticeConfig,
        sender: TaskSender,
        n_chord: usize,
        n_span: usize,
    ) -> AlResult<Self> {
        config.validate()?;
        let model = WingModel::initialize(wing, speed, density, config.clone(), n_chord, n_span)?;
        Ok(Self {
            task: Task3d::new(model, config, sender),
        })
    }

    /// 设置迎角扫掠范围 [°]
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
    pub fn operating_points(&self) -> &[WingOpp] {
        self.task.model().operating_points()
    }

    /// 实时工况点（顾问性）
    pub fn live_point(&self) -> Option<WingOpp> {
        self.task.model().live.read().clone()
    }

    /// 结束后取出全部结果
    pub fn into_results(self) -> Vec<WingOpp> {
        self.task.into_model().opps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::task_channel;

    fn small_config() -> LatticeConfig {
        let mut config = LatticeConfig::default();
        config.wake.n_wake_rows = 4;
        config.wake_iterations = 2;
        config.live_update = false;
        config
    }

    fn test_wing() -> Arc<Wing> {
        Arc::new(Wing::trapezoidal("test-wing", 8.0, 1.2, 0.8))
    }

    #[test]
    fn test_alpha_sweep() {
        let (tx, _rx) = task_channel();
        let mut task =
            PlaneTask::new(test_wing(), 20.0, 1.225, small_config(), tx, 3, 8).unwrap();
        task.set_analysis_range(AnalysisRange::new(0.0, 6.0, 2.0))
            .unwrap();
        let status = task.run().unwrap();

        assert_eq!(status, AnalysisStatus::Finished);
        assert!(!task.has_errors());
        let opps = task.operating_points();
        assert_eq!(opps.len(), 4);

        // 升力系数随迎角增大
        assert!(opps[3].forces.cl > opps[1].forces.cl);
        assert!(opps[1].forces.cl > 0.05);
        // 有限翼升力线斜率低于 2π
        let slope = (opps[3].forces.cl - opps[0].forces.cl) / 6f64.to_radians();
        assert!(slope < 2.0 * std::f64::consts::PI);
        assert!(slope > 2.0);
    }

    #[test]
    fn test_zero_alpha_near_zero_lift() {
        // 无扭转平直翼零迎角升力接近零
        let (tx, _rx) = task_channel();
        let mut task =
            PlaneTask::new(test_wing(), 20.0, 1.225, small_config(), tx, 3, 8).unwrap();
        task.set_analysis_range(AnalysisRange::single(0.0)).unwrap();
        task.run().unwrap();
        let opps = task.operating_points();
        assert!(opps[0].forces.cl.abs() < 1e-6);
    }

    #[test]
    fn test_invalid_speed_rejected() {
        let (tx, _rx) = task_channel();
        assert!(PlaneTask::new(test_wing(), 0.0, 1.225, small_config(), tx, 3, 8).is_err());
    }

    #[test]
    fn test_span_distribs_symmetric() {
        let (tx, _rx) = task_channel();
        let mut task =
            PlaneTask::new(test_wing(), 20.0, 1.225, small_config(), tx, 3, 8).unwrap();
        task.set_analysis_range(AnalysisRange::single(4.0)).unwrap();
        task.run().unwrap();
        let distribs = &task.operating_points()[0].distribs;
        assert_eq!(distribs.n_stations(), 8);
        // 对称翼对称载荷
        let n = distribs.gamma.len();
        for j in 0..n / 2 {
            let diff = (distribs.gamma[j] - distribs.gamma[n - 1 - j]).abs();
            assert!(diff < 1e-8, "asymmetric gamma at station {j}");
        }
    }
}
