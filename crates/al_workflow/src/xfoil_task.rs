// crates/al_workflow/src/xfoil_task.rs

//! 二维截面分析序列器
//!
//! 驱动外部二维粘性/无粘求解器（[`SectionEngine`] trait 边界）
//! 完成一个或多个扫掠范围，每个收敛工况收集一个 [`OpPoint`]。
//!
//! - 范围按追加顺序执行；范围内按遍历顺序逐步推进，
//!   后续点可能以前一点为初值，不允许乱序
//! - 单步不收敛：记日志并跳过，扫掠继续
//! - 收敛但 |Cd| 低于 `cd_error`：视为伪收敛结果丢弃
//! - 取消每步检查一次；已完成的工况点保持有效
//! - 全部进度/诊断文本同时追加到内部日志串并镜像到消息队列，
//!   与三维任务契约一致
//!
//! `keep_opps = false` 时逐点对象在聚合进极曲线后丢弃，
//! 控制大批量扫掠的内存占用。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use al_foundation::error::{AlError, AlResult};
use al_foundation::tolerance::NumericalTolerance;
use al_geom::foil::Foil;
use al_geom::polar::Polar2d;
use al_solver::section::{SectionEngine, SectionPoint};
use chrono::Utc;
use parking_lot::RwLock;

use crate::opp::OpPoint;
use crate::queue::{TaskMessage, TaskSender};
use crate::range::AnalysisRange;
use crate::status::{AnalysisStatus, TaskId};
use crate::task::{TaskError, TaskHandle};

/// 扫掠变量
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepVariable {
    /// 迎角序列 [°]
    Alpha,
    /// 目标升力系数序列
    Cl,
    /// 雷诺数序列（迎角固定）
    Reynolds,
}

/// 二维分析输入束
///
/// 翼型与极曲线由外部对象库持有，任务只读翼型、向极曲线
/// 追加收敛点；两者的生命周期必须覆盖任务运行。
pub struct FoilAnalysis {
    /// 翼型（只读）
    pub foil: Arc<Foil>,
    /// 极曲线（配置只读，曲线由任务追加）
    pub polar: Arc<RwLock<Polar2d>>,
    /// 雷诺数扫掠时的固定迎角 [°]
    pub fixed_alpha_deg: f64,
}

/// 二维截面分析序列器
pub struct XfoilTask {
    id: TaskId,
    engine: Arc<dyn SectionEngine>,
    analysis: Option<FoilAnalysis>,
    ranges: Vec<(SweepVariable, AnalysisRange)>,
    keep_opps: bool,
    opps: Vec<OpPoint>,
    log: String,
    tolerance: NumericalTolerance,
    sender: TaskSender,
    status: Arc<RwLock<AnalysisStatus>>,
    cancel: Arc<AtomicBool>,
    errors: Arc<AtomicBool>,
    warnings: Arc<AtomicBool>,
}

impl XfoilTask {
    /// 创建序列器
    pub fn new(engine: Arc<dyn SectionEngine>, sender: TaskSender) -> Self {
        Self {
            id: TaskId::new(),
            engine,
            analysis: None,
            ranges: Vec::new(),
            keep_opps: true,
            opps: Vec::new(),
            log: String::new(),
            tolerance: NumericalTolerance::default(),
            sender,
            status: Arc::new(RwLock::new(AnalysisStatus::Pending)),
            cancel: Arc::new(AtomicBool::new(false)),
            errors: Arc::new(AtomicBool::new(false)),
            warnings: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 任务ID
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// 绑定翼型与极曲线，重置累积状态
    ///
    /// `keep_opps = false` 时逐点对象聚合后丢弃，只保留极曲线。
    pub fn initialize(
        &mut self,
        foil: Arc<Foil>,
        polar: Arc<RwLock<Polar2d>>,
        keep_opps: bool,
    ) -> AlResult<()> {
        polar.read().validate()?;
        self.analysis = Some(FoilAnalysis {
            foil,
            polar,
            fixed_alpha_deg: 0.0,
        });
        self.keep_opps = keep_opps;
        self.opps.clear();
        self.log.clear();
        self.ranges.clear();
        Ok(())
    }

    /// 设置雷诺数扫掠的固定迎角
    pub fn set_fixed_alpha(&mut self, alpha_deg: f64) {
        if let Some(analysis) = &mut self.analysis {
            analysis.fixed_alpha_deg = alpha_deg;
        }
    }

    /// 设置数值容差
    pub fn set_tolerance(&mut self, tolerance: NumericalTolerance) {
        self.tolerance = tolerance;
    }

    /// 追加一个扫掠范围（按追加顺序执行）
    pub fn append_range(&mut self, variable: SweepVariable, range: AnalysisRange) -> AlResult<()> {
        range.validate()?;
        self.ranges.push((variable, range));
        Ok(())
    }

    /// 跨线程句柄
    pub fn handle(&self) -> TaskHandle {
        TaskHandle::from_parts(
            self.id,
            self.status.clone(),
            self.cancel.clone(),
            self.errors.clone(),
            self.warnings.clone(),
        )
    }

    /// 请求取消
    pub fn on_cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// 当前状态
    pub fn status(&self) -> AnalysisStatus {
        *self.status.read()
    }

    /// 是否已结束
    pub fn is_finished(&self) -> bool {
        self.status().is_done()
    }

    /// 是否已取消
    pub fn is_cancelled(&self) -> bool {
        self.status() == AnalysisStatus::Cancelled
    }

    /// 是否记录过错误
    pub fn has_errors(&self) -> bool {
        self.errors.load(Ordering::SeqCst)
    }

    /// 是否记录过警告
    pub fn has_warnings(&self) -> bool {
        self.warnings.load(Ordering::SeqCst)
    }

    /// 已收集的工况点（`keep_opps = true` 时）
    pub fn operating_points(&self) -> &[OpPoint] {
        &self.opps
    }

    /// 累积日志
    pub fn log(&self) -> &str {
        &self.log
    }

    /// 追加日志行并镜像到消息队列
    fn log_line(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.log.push_str(&text);
        self.log.push('\n');
        self.sender.log(text);
    }

    /// 单个目标升力系数的粘性求解（外部引擎最薄封装）
    pub fn process_cl(&self, cl_target: f64) -> AlResult<SectionPoint> {
        let analysis = self
            .analysis
            .as_ref()
            .ok_or_else(|| AlError::internal("process_cl 在 initialize 之前被调用"))?;
        let polar = analysis.polar.read();
        Ok(self.engine.process_cl(&analysis.foil, &polar, cl_target))
    }

    /// 一组目标升力系数的逐个求解
    pub fn process_cl_list(&self, targets: &[f64]) -> AlResult<Vec<SectionPoint>> {
        targets.iter().map(|&cl| self.process_cl(cl)).collect()
    }

    /// 迁移到终止状态并广播
    fn finish(&mut self, terminal: AnalysisStatus) {
        *self.status.write() = terminal;
        self.sender.push(TaskMessage::Finished(terminal));
        tracing::info!("二维分析 {} 结束: {}", self.id, terminal);
    }

    /// 求解一步（按扫掠变量分派）
    fn solve_step(&self, variable: SweepVariable, value: f64) -> AlResult<SectionPoint> {
        let analysis = self
            .analysis
            .as_ref()
            .ok_or_else(|| AlError::internal("run 在 initialize 之前被调用"))?;
        let polar = analysis.polar.read();
        let point = match variable {
            SweepVariable::Alpha => self.engine.analyze_alpha(&analysis.foil, &polar, value),
            SweepVariable::Cl => self.engine.process_cl(&analysis.foil, &polar, value),
            SweepVariable::Reynolds => {
                // 雷诺数逐点替换，迎角固定
                let mut re_polar = polar.clone();
                re_polar.reynolds = value;
                self.engine
                    .analyze_alpha(&analysis.foil, &re_polar, analysis.fixed_alpha_deg)
            }
        };
        Ok(point)
    }

    /// 运行序列（阻塞当前线程直到终止）
    pub fn run(&mut self) -> Result<AnalysisStatus, TaskError> {
        {
            let mut status = self.status.write();
            match *status {
                AnalysisStatus::Pending => {
                    if self.cancel.load(Ordering::SeqCst) {
                        *status = AnalysisStatus::Cancelled;
                        drop(status);
                        self.sender
                            .push(TaskMessage::Finished(AnalysisStatus::Cancelled));
                        return Ok(AnalysisStatus::Cancelled);
                    }
                    *status = AnalysisStatus::Running;
                }
                other => return Err(TaskError::NotPending(other)),
            }
        }

        if self.analysis.is_none() {
            self.errors.store(true, Ordering::SeqCst);
            self.finish(AnalysisStatus::Finished);
            return Err(TaskError::Fatal(AlError::internal(
                "run 在 initialize 之前被调用",
            )));
        }

        let ranges = self.ranges.clone();
        let (foil_name, polar_name, reynolds) = {
            let analysis = self.analysis.as_ref().expect("analysis bound above");
            let polar = analysis.polar.read();
            (
                analysis.foil.name.clone(),
                polar.name.clone(),
                polar.reynolds,
            )
        };
        self.log_line(format!(
            "二维分析启动: {} / {} ({} 个范围)",
            foil_name,
            polar_name,
            ranges.len()
        ));

        let mut n_converged = 0usize;
        for (variable, range) in &ranges {
            let values = range.values();
            let total = values.len();
            for (step, &value) in values.iter().enumerate() {
                // 每步检查一次取消；已完成点保持有效
                if self.cancel.load(Ordering::SeqCst) {
                    self.log_line(format!(
                        "取消于第 {}/{} 步，已收敛 {} 点",
                        step, total, n_converged
                    ));
                    self.finish(AnalysisStatus::Cancelled);
                    return Ok(AnalysisStatus::Cancelled);
                }

                let point = match self.solve_step(*variable, value) {
                    Ok(point) => point,
                    Err(e) => {
                        self.errors.store(true, Ordering::SeqCst);
                        self.log_line(format!("第 {} 步失败: {}", step, e));
                        self.finish(AnalysisStatus::Finished);
                        return Err(e.into());
                    }
                };

                if !point.converged {
                    self.warnings.store(true, Ordering::SeqCst);
                    self.log_line(format!("value={value:.4}: 未收敛，跳过"));
                    continue;
                }
                if self.tolerance.is_spurious_cd(point.cd) {
                    // 收敛但阻力非物理地小：伪收敛结果，丢弃
                    self.warnings.store(true, Ordering::SeqCst);
                    self.log_line(format!(
                        "value={value:.4}: Cd={:.2e} 低于合理下限，丢弃",
                        point.cd
                    ));
                    continue;
                }

                let point_reynolds = match variable {
                    SweepVariable::Reynolds => value,
                    _ => reynolds,
                };
                let opp = OpPoint {
                    foil_name: foil_name.clone(),
                    polar_name: polar_name.clone(),
                    alpha_deg: point.alpha_deg,
                    reynolds: point_reynolds,
                    cl: point.cl,
                    cd: point.cd,
                    cm: point.cm,
                    xtr_top: point.xtr_top,
                    xtr_bot: point.xtr_bot,
                    created: Utc::now(),
                };

                // 极曲线始终聚合；逐点对象按 keep_opps 保留
                if let Some(analysis) = &self.analysis {
                    analysis.polar.write().add_point(
                        opp.alpha_deg,
                        opp.cl,
                        opp.cd,
                        opp.cm,
                        opp.xtr_top,
                        opp.xtr_bot,
                    );
                }
                if self.keep_opps {
                    self.opps.push(opp);
                }
                n_converged += 1;

                self.log_line(format!(
                    "alpha={:.2}°  Cl={:.4}  Cd={:.5}  XTr=({:.2},{:.2})",
                    point.alpha_deg, point.cl, point.cd, point.xtr_top, point.xtr_bot
                ));
                self.sender.push(TaskMessage::Progress {
                    done: step + 1,
                    total,
                    control: value,
                });
            }
        }

        self.log_line(format!("二维分析完成: {} 个收敛点", n_converged));
        self.finish(AnalysisStatus::Finished);
        Ok(AnalysisStatus::Finished)
    }
}
