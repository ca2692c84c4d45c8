// crates/al_workflow/src/lib.rs

//! AeroLattice 任务层
//!
//! 分析任务的协调与调度：
//!
//! - [`status`]: 任务状态机与任务 ID
//! - [`range`]: 一维扫掠范围与方向感知遍历
//! - [`queue`]: 单生产者/单消费者消息队列与实时快照
//! - [`task`]: 三维分析任务运行器 [`Task3d`] 与 [`LatticeModel`] trait
//! - [`boat_task`]: 帆船（帆装+船体）分析任务
//! - [`plane_task`]: 机翼迎角扫掠任务
//! - [`xfoil_task`]: 二维截面分析序列器
//! - [`opp`]: 工况点结果对象
//! - [`optim`]: 粒子群优化的消费方接口
//!
//! # 线程模型
//!
//! 每个运行中任务一个工作线程；驱动/GUI 线程是消息队列的唯一
//! 消费者。任务运行期间几何对象只读；取消是协作式的，
//! 每个工况至少检查一次，已完成工况的结果不受取消影响。

#![warn(clippy::all)]

pub mod boat_task;
mod lattice;
pub mod opp;
pub mod optim;
pub mod plane_task;
pub mod queue;
pub mod range;
pub mod status;
pub mod task;
pub mod xfoil_task;

pub use boat_task::BoatTask;
pub use opp::{BoatOpp, OpPoint, WingOpp};
pub use plane_task::PlaneTask;
pub use queue::{task_channel, TaskMessage, TaskReceiver, TaskSender, VpwReport};
pub use range::AnalysisRange;
pub use status::{AnalysisStatus, TaskId};
pub use task::{LatticeModel, Task3d, TaskError, TaskHandle};
pub use xfoil_task::{FoilAnalysis, SweepVariable, XfoilTask};
