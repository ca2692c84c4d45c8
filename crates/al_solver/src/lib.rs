// crates/al_solver/src/lib.rs

//! AeroLattice 求解层
//!
//! 三维格栅 / 涡粒子尾流求解器的数值核心：
//!
//! - [`kernel`]: 涡线段与涡粒子的诱导速度闭式解，带可插拔涡核正则化模型
//! - [`wake`]: 涡粒子尾流的行管理与对流积分（可并行）
//! - [`influence`]: 涡环影响系数矩阵与右端项装配
//! - [`linalg`]: 稠密 LU 分解（部分主元），充当外部线性代数依赖的占位
//! - [`forces`]: 面元压力求和与展向载荷分布
//! - [`section`]: 二维截面引擎 trait 边界（外部粘性求解器的接缝）
//! - [`config`]: 不可变运行配置（替代进程级可变全局量）
//!
//! # 并行模型
//!
//! 尾流对流与影响矩阵装配按"先并行计算、后统一提交"的方式组织：
//! 并行段只读冻结快照，结果收集后串行写回。
//! 低于 `min_parallel_size` 阈值的问题直接串行执行。

#![warn(clippy::all)]

pub mod config;
pub mod forces;
pub mod influence;
pub mod kernel;
pub mod linalg;
pub mod section;
pub mod wake;

pub use config::{LatticeConfig, WakeConfig};
pub use forces::{AeroForces, SpanDistribs};
pub use influence::InfluenceSystem;
pub use kernel::{CoreModel, Vortex, Vorton};
pub use section::{SectionEngine, SectionPoint, ThinFoilEngine};
pub use wake::VortonWake;
