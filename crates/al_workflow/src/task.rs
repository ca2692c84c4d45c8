// crates/al_workflow/src/task.rs

//! 三维分析任务运行器
//!
//! [`Task3d`] 协调一次多工况三维分析：状态机、协作式取消、
//! 消息队列推送与涡粒子尾流的生命周期，与具体离散（帆船/机翼）
//! 解耦。具体模型通过 [`LatticeModel`] 接入，trait 只含两个
//! 必需操作：脱出尾流行与求解一个工况。
//!
//! # 错误语义
//!
//! - 单点不收敛：记警告，跳过该点，扫掠继续
//! - 非致命数值错误：记错误，跳过该点，扫掠继续
//! - 致命错误（几何/内部）：任务立即终止于 Finished 并上抛
//! - 取消请求：不是错误；已完成工况保持有效，终止于 Cancelled
//!
//! 取消在每个工况之间至少检查一次；模型可在尾流子步之间
//! 通过 [`PointContext::is_cancelled`] 提前退出。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use al_foundation::error::{AlError, AlResult};
use al_solver::config::LatticeConfig;
use al_solver::wake::VortonWake;
use parking_lot::RwLock;
use thiserror::Error;

use crate::queue::{TaskMessage, TaskSender};
use crate::range::AnalysisRange;
use crate::status::{AnalysisStatus, TaskId};

/// 任务错误
#[derive(Debug, Error)]
pub enum TaskError {
    /// 任务不在可启动状态
    #[error("任务不在可启动状态: {0}")]
    NotPending(AnalysisStatus),

    /// 致命分析错误
    #[error(transparent)]
    Fatal(#[from] AlError),
}

/// 工况求解上下文
///
/// 模型在 `solve_point` 中通过它访问尾流、推送消息并
/// 在长循环内部轮询取消。
pub struct PointContext<'a> {
    /// 涡粒子尾流（任务所有）
    pub wake: &'a mut VortonWake,
    /// 消息发送端
    pub sender: &'a TaskSender,
    /// 运行配置
    pub config: &'a LatticeConfig,
    cancel: &'a AtomicBool,
}

impl PointContext<'_> {
    /// 是否已请求取消
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }
}

/// 格栅分析模型
///
/// 具体离散（帆船、机翼）在任务构造前完成几何绑定与校验；
/// trait 只保留运行期的两个必需操作。
pub trait LatticeModel: Send {
    /// 为工况 `qrhs` 脱出一行新尾流涡粒子
    ///
    /// 在该工况求解之前被调用，向 `wake` 压入一行。
    fn make_vorton_row(&mut self, qrhs: usize, wake: &mut VortonWake) -> AlResult<()>;

    /// 求解工况 `qrhs`（控制变量取值 `control`）
    ///
    /// 返回 `Ok(true)` 表示收敛并已产出结果；`Ok(false)` 表示
    /// 未收敛（该点跳过，扫掠继续）；`Err(AlError::Cancelled)`
    /// 表示在子步中观察到取消。
    fn solve_point(
        &mut self,
        qrhs: usize,
        control: f64,
        ctx: &mut PointContext<'_>,
    ) -> AlResult<bool>;
}

/// 任务句柄（跨线程查询与取消）
#[derive(Debug, Clone)]
pub struct TaskHandle {
    /// 任务ID
    pub id: TaskId,
    status: Arc<RwLock<AnalysisStatus>>,
    cancel: Arc<AtomicBool>,
    errors: Arc<AtomicBool>,
    warnings: Arc<AtomicBool>,
}

impl TaskHandle {
    /// 由共享状态拼装句柄（任务实现内部使用）
    pub(crate) fn from_parts(
        id: TaskId,
        status: Arc<RwLock<AnalysisStatus>>,
        cancel: Arc<AtomicBool>,
        errors: Arc<AtomicBool>,
        warnings: Arc<AtomicBool>,
    ) -> Self {
        Self {
            id,
            status,
            cancel,
            errors,
            warnings,
        }
    }

    /// 请求取消（协作式，任务在下一个检查点观察到）
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// 是否已请求取消
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// 当前状态
    pub fn status(&self) -> AnalysisStatus {
        *self.status.read()
    }

    /// 是否已结束（两个终止态等价）
    pub fn is_done(&self) -> bool {
        self.status().is_done()
    }

    /// 运行期间是否记录过错误
    pub fn has_errors(&self) -> bool {
        self.errors.load(Ordering::SeqCst)
    }

    /// 运行期间是否记录过警告
    pub fn has_warnings(&self) -> bool {
        self.warnings.load(Ordering::SeqCst)
    }
}

/// 三维分析任务
pub struct Task3d<M: LatticeModel> {
    id: TaskId,
    model: M,
    config: LatticeConfig,
    range: AnalysisRange,
    wake: VortonWake,
    sender: TaskSender,
    status: Arc<RwLock<AnalysisStatus>>,
    cancel: Arc<AtomicBool>,
    errors: Arc<AtomicBool>,
    warnings: Arc<AtomicBool>,
    started_at: Option<Instant>,
}

impl<M: LatticeModel> Task3d<M> {
    /// 创建任务
    ///
    /// `model` 应当已完成几何绑定与校验（致命几何错误在此之前
    /// 暴露，任务从不进入 RUNNING）。
    pub fn new(model: M, config: LatticeConfig, sender: TaskSender) -> Self {
        let wake = VortonWake::new(config.wake.clone());
        Self {
            id: TaskId::new(),
            model,
            config,
            range: AnalysisRange::single(0.0),
            wake,
            sender,
            status: Arc::new(RwLock::new(AnalysisStatus::Pending)),
            cancel: Arc::new(AtomicBool::new(false)),
            errors: Arc::new(AtomicBool::new(false)),
            warnings: Arc::new(AtomicBool::new(false)),
            started_at: None,
        }
    }

    /// 任务ID
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// 设置控制变量扫掠范围（每个取值产出一个工况）
    pub fn set_analysis_range(&mut self, range: AnalysisRange) -> AlResult<()> {
        range.validate()?;
        if self.status().is_done() || self.is_running() {
            return Err(AlError::internal("任务启动后不能修改扫掠范围"));
        }
        self.range = range;
        Ok(())
    }

    /// 扫掠范围
    pub fn analysis_range(&self) -> &AnalysisRange {
        &self.range
    }

    /// 跨线程句柄
    pub fn handle(&self) -> TaskHandle {
        TaskHandle {
            id: self.id,
            status: self.status.clone(),
            cancel: self.cancel.clone(),
            errors: self.errors.clone(),
            warnings: self.warnings.clone(),
        }
    }

    /// 当前状态
    pub fn status(&self) -> AnalysisStatus {
        *self.status.read()
    }

    /// 是否等待启动
    pub fn is_pending(&self) -> bool {
        self.status() == AnalysisStatus::Pending
    }

    /// 是否运行中
    pub fn is_running(&self) -> bool {
        self.status() == AnalysisStatus::Running
    }

    /// 是否已取消
    pub fn is_cancelled(&self) -> bool {
        self.status() == AnalysisStatus::Cancelled
    }

    /// 是否已结束（Finished 或 Cancelled）
    pub fn is_finished(&self) -> bool {
        self.status().is_done()
    }

    /// 请求取消
    pub fn on_cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// 是否记录过错误
    pub fn has_errors(&self) -> bool {
        self.errors.load(Ordering::SeqCst)
    }

    /// 是否记录过警告
    pub fn has_warnings(&self) -> bool {
        self.warnings.load(Ordering::SeqCst)
    }

    /// 模型引用（结果读取）
    pub fn model(&self) -> &M {
        &self.model
    }

    /// 取出模型（任务结束后回收结果）
    pub fn into_model(self) -> M {
        self.model
    }

    /// 迁移到终止状态并广播
    fn finish(&self, terminal: AnalysisStatus) {
        *self.status.write() = terminal;
        self.sender.push(TaskMessage::Finished(terminal));
        let elapsed = self
            .started_at
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        tracing::info!("任务 {} 结束: {} ({:.2}s)", self.id, terminal, elapsed);
    }

    /// 运行任务（阻塞当前线程直到终止）
    ///
    /// 通常在专用工作线程上调用；驱动线程通过 [`TaskHandle`]
    /// 与消息队列交互。
    pub fn run(&mut self) -> Result<AnalysisStatus, TaskError> {
        // 启动迁移：Pending → Running；启动前的取消请求直接终止
        {
            let mut status = self.status.write();
            match *status {
                AnalysisStatus::Pending => {
                    if self.cancel.load(Ordering::SeqCst) {
                        *status = AnalysisStatus::Cancelled;
                        drop(status);
                        self.sender.push(TaskMessage::Finished(AnalysisStatus::Cancelled));
                        tracing::info!("任务 {} 在启动前被取消", self.id);
                        return Ok(AnalysisStatus::Cancelled);
                    }
                    *status = AnalysisStatus::Running;
                }
                other => return Err(TaskError::NotPending(other)),
            }
        }
        self.started_at = Some(Instant::now());
        self.wake.clear();

        let values = self.range.values();
        let total = values.len().min(self.config.max_rhs);
        if values.len() > self.config.max_rhs {
            self.warnings.store(true, Ordering::SeqCst);
            self.sender.log(format!(
                "扫掠点数 {} 超过上限 {}，截断",
                values.len(),
                self.config.max_rhs
            ));
        }
        self.sender
            .log(format!("分析启动: {} 个工况", total));
        tracing::info!("任务 {} 启动: {} 个工况", self.id, total);

        for (qrhs, &control) in values.iter().take(total).enumerate() {
            // 每个工况之间至少检查一次取消
            if self.cancel.load(Ordering::SeqCst) {
                self.sender
                    .log(format!("取消于工况 {}/{}，已完成结果有效", qrhs, total));
                self.finish(AnalysisStatus::Cancelled);
                return Ok(AnalysisStatus::Cancelled);
            }

            if let Err(e) = self.model.make_vorton_row(qrhs, &mut self.wake) {
                self.errors.store(true, Ordering::SeqCst);
                self.sender.log(format!("工况 {}: {}", qrhs, e));
                if e.is_fatal() {
                    self.finish(AnalysisStatus::Finished);
                    return Err(e.into());
                }
                continue;
            }

            let mut ctx = PointContext {
                wake: &mut self.wake,
                sender: &self.sender,
                config: &self.config,
                cancel: &self.cancel,
            };

            match self.model.solve_point(qrhs, control, &mut ctx) {
                Ok(true) => {
                    self.sender.push(TaskMessage::Progress {
                        done: qrhs + 1,
                        total,
                        control,
                    });
                }
                Ok(false) => {
                    // 单点不收敛：跳过，扫掠继续
                    self.warnings.store(true, Ordering::SeqCst);
                    self.sender
                        .log(format!("工况 {} (control={control}) 未收敛，跳过", qrhs));
                }
                Err(AlError::Cancelled) => {
                    self.sender
                        .log(format!("取消于工况 {} 的子步，已完成结果有效", qrhs));
                    self.finish(AnalysisStatus::Cancelled);
                    return Ok(AnalysisStatus::Cancelled);
                }
                Err(e) if e.is_fatal() => {
                    self.errors.store(true, Ordering::SeqCst);
                    self.sender.log(format!("致命错误: {}", e));
                    self.finish(AnalysisStatus::Finished);
                    return Err(e.into());
                }
                Err(e) => {
                    self.errors.store(true, Ordering::SeqCst);
                    self.sender.log(format!("工况 {} 失败: {}", qrhs, e));
                }
            }
        }

        self.finish(AnalysisStatus::Finished);
        Ok(AnalysisStatus::Finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::task_channel;

    /// 计数模型：记录求解过的工况
    struct MockModel {
        solved: Vec<f64>,
        rows_made: usize,
        fail_at: Option<usize>,
        diverge_at: Option<usize>,
        cancel_handle: Option<TaskHandle>,
        cancel_after: usize,
    }

    impl MockModel {
        fn new() -> Self {
            Self {
                solved: Vec::new(),
                rows_made: 0,
                fail_at: None,
                diverge_at: None,
                cancel_handle: None,
                cancel_after: usize::MAX,
            }
        }
    }

    impl LatticeModel for MockModel {
        fn make_vorton_row(&mut self, _qrhs: usize, _wake: &mut VortonWake) -> AlResult<()> {
            self.rows_made += 1;
            Ok(())
        }

        fn solve_point(
            &mut self,
            qrhs: usize,
            control: f64,
            _ctx: &mut PointContext<'_>,
        ) -> AlResult<bool> {
            if self.fail_at == Some(qrhs) {
                return Err(AlError::geometry("测试致命错误"));
            }
            if self.diverge_at == Some(qrhs) {
                return Ok(false);
            }
            self.solved.push(control);
            if self.solved.len() >= self.cancel_after {
                if let Some(handle) = &self.cancel_handle {
                    handle.cancel();
                }
            }
            Ok(true)
        }
    }

    fn make_task(model: MockModel) -> Task3d<MockModel> {
        let (tx, _rx) = task_channel();
        Task3d::new(model, LatticeConfig::default(), tx)
    }

    #[test]
    fn test_full_sweep_finishes() {
        let mut task = make_task(MockModel::new());
        task.set_analysis_range(AnalysisRange::new(0.0, 4.0, 1.0))
            .unwrap();
        let status = task.run().unwrap();
        assert_eq!(status, AnalysisStatus::Finished);
        assert!(task.is_finished());
        assert!(!task.has_errors());
        assert_eq!(task.model().solved.len(), 5);
        assert_eq!(task.model().rows_made, 5);
    }

    #[test]
    fn test_cancel_before_run() {
        let mut task = make_task(MockModel::new());
        task.set_analysis_range(AnalysisRange::new(0.0, 10.0, 1.0))
            .unwrap();
        task.on_cancel();
        let status = task.run().unwrap();
        // 启动前取消：不计算任何工况
        assert_eq!(status, AnalysisStatus::Cancelled);
        assert!(task.model().solved.is_empty());
        assert_eq!(task.model().rows_made, 0);
    }

    #[test]
    fn test_cancel_mid_sweep() {
        let mut model = MockModel::new();
        model.cancel_after = 5;
        let (tx, _rx) = task_channel();
        let mut task = Task3d::new(model, LatticeConfig::default(), tx);
        task.set_analysis_range(AnalysisRange::new(1.0, 20.0, 1.0))
            .unwrap();
        task.model = {
            let handle = task.handle();
            let mut m = MockModel::new();
            m.cancel_after = 5;
            m.cancel_handle = Some(handle);
            m
        };
        let status = task.run().unwrap();
        assert_eq!(status, AnalysisStatus::Cancelled);
        // 第 5 点求解后请求取消，下一检查点观察到
        let n = task.model().solved.len();
        assert!((1..=6).contains(&n), "solved {n} points");
    }

    #[test]
    fn test_rerun_rejected() {
        let mut task = make_task(MockModel::new());
        task.set_analysis_range(AnalysisRange::new(0.0, 2.0, 1.0))
            .unwrap();
        task.run().unwrap();
        assert!(matches!(task.run(), Err(TaskError::NotPending(_))));
    }

    #[test]
    fn test_divergent_point_skipped() {
        let mut model = MockModel::new();
        model.diverge_at = Some(2);
        let mut task = make_task(model);
        task.set_analysis_range(AnalysisRange::new(0.0, 4.0, 1.0))
            .unwrap();
        let status = task.run().unwrap();
        // 不收敛点跳过，扫掠完成，带警告不带错误
        assert_eq!(status, AnalysisStatus::Finished);
        assert!(task.has_warnings());
        assert!(!task.has_errors());
        assert_eq!(task.model().solved.len(), 4);
    }

    #[test]
    fn test_fatal_error_aborts() {
        let mut model = MockModel::new();
        model.fail_at = Some(1);
        let mut task = make_task(model);
        task.set_analysis_range(AnalysisRange::new(0.0, 4.0, 1.0))
            .unwrap();
        let result = task.run();
        assert!(result.is_err());
        assert!(task.has_errors());
        assert_eq!(task.status(), AnalysisStatus::Finished);
        // 致命错误前已完成的工况保留
        assert_eq!(task.model().solved.len(), 1);
    }

    #[test]
    fn test_handle_queries() {
        let task = make_task(MockModel::new());
        let handle = task.handle();
        assert_eq!(handle.status(), AnalysisStatus::Pending);
        assert!(!handle.is_done());
        handle.cancel();
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_messages_emitted() {
        let (tx, rx) = task_channel();
        let mut task = Task3d::new(MockModel::new(), LatticeConfig::default(), tx);
        task.set_analysis_range(AnalysisRange::new(0.0, 2.0, 1.0))
            .unwrap();
        task.run().unwrap();
        let messages = rx.drain();
        // 至少包含启动日志、3 条进度与结束消息
        let progress = messages
            .iter()
            .filter(|m| matches!(m, TaskMessage::Progress { .. }))
            .count();
        assert_eq!(progress, 3);
        assert!(matches!(
            messages.last(),
            Some(TaskMessage::Finished(AnalysisStatus::Finished))
        ));
    }
}
