// crates/al_solver/src/wake.rs

//! 涡粒子尾流
//!
//! [`VortonWake`] 按行管理涡粒子：每个工况迭代从后缘面元脱出一行
//! 新粒子（行 0 最新），随对流推向下游，超出保留行数的旧行被丢弃。
//!
//! # 对流
//!
//! 每个粒子的速度 = 来流 + 其余活动粒子的诱导 + 束缚涡的诱导。
//! 对流对冻结快照求值：并行段只读快照，结果收集后统一提交，
//! 行间与行内均无写竞争。粒子数低于 `min_parallel_size` 时串行。
//!
//! # 拉伸与再分布
//!
//! 涡量拉伸项 `dΩ/dt = (Ω·∇)u` 以沿 Ω 方向的中心差分计算。
//! 再分布（近距粒子合并）是串行后处理，不参与并行段。

use glam::DVec3;
use rayon::prelude::*;

use crate::config::WakeConfig;
use crate::kernel::{CoreModel, Vortex, Vorton};

/// 涡粒子尾流
#[derive(Debug, Clone)]
pub struct VortonWake {
    /// 尾流行（行 0 最新）
    rows: Vec<Vec<Vorton>>,
    /// 尾流配置
    config: WakeConfig,
}

impl VortonWake {
    /// 创建空尾流
    pub fn new(config: WakeConfig) -> Self {
        Self {
            rows: Vec::new(),
            config,
        }
    }

    /// 配置引用
    pub fn config(&self) -> &WakeConfig {
        &self.config
    }

    /// 行数
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// 活动粒子总数
    pub fn n_active(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.iter().filter(|v| v.active).count())
            .sum()
    }

    /// 行快照（实时报告用，按值拷出）
    pub fn rows_snapshot(&self) -> Vec<Vec<Vorton>> {
        self.rows.clone()
    }

    /// 压入一行新粒子（行 0 位置），旧行超出保留数时丢弃
    pub fn push_row(&mut self, row: Vec<Vorton>) {
        self.rows.insert(0, row);
        if self.rows.len() > self.config.n_wake_rows {
            self.rows.truncate(self.config.n_wake_rows);
        }
    }

    /// 清空尾流（任务结束或新工况开始）
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// 场点处的尾流诱导速度（全部活动粒子）
    pub fn induced_velocity(&self, point: DVec3) -> DVec3 {
        let core = self.config.core_radius;
        self.rows
            .iter()
            .flatten()
            .filter(|v| v.active)
            .map(|v| v.induced_velocity(point, core))
            .sum()
    }

    /// 对流一个时间步
    ///
    /// `bound` 为当前束缚涡系，`freestream` 为来流速度。
    /// 粒子自身不计入自己的诱导。
    pub fn advect(&mut self, bound: &[Vortex], freestream: DVec3) {
        // 冻结快照：并行段只读
        let snapshot: Vec<Vorton> = self
            .rows
            .iter()
            .flatten()
            .filter(|v| v.active)
            .copied()
            .collect();
        if snapshot.is_empty() {
            return;
        }

        let dt = self.config.time_step;
        let core = self.config.core_radius;
        let core_model = self.config.core_model;
        let stretch = self.config.vorton_stretch;

        let velocity_at = |point: DVec3, skip: usize| -> DVec3 {
            let mut u = freestream;
            for (k, other) in snapshot.iter().enumerate() {
                if k != skip {
                    u += other.induced_velocity(point, core);
                }
            }
            for vx in bound {
                u += vx.induced_velocity(point, core_model, core);
            }
            u
        };

        let step = |(i, v): (usize, &Vorton)| -> (DVec3, DVec3) {
            let u = velocity_at(v.position, i);
            let new_pos = v.position + u * dt;

            let new_omega = if stretch && v.circulation() > 0.0 {
                // (Ω·∇)u：沿涡轴方向的中心差分
                let eps = 0.01 * core;
                let axis = v.omega / v.circulation();
                let u_plus = velocity_at(v.position + axis * eps, i);
                let u_minus = velocity_at(v.position - axis * eps, i);
                let domega = (u_plus - u_minus) / (2.0 * eps) * v.circulation();
                v.omega + domega * dt
            } else {
                v.omega
            };
            (new_pos, new_omega)
        };

        let use_parallel =
            self.config.multithreaded && snapshot.len() >= self.config.min_parallel_size;
        let updates: Vec<(DVec3, DVec3)> = if use_parallel {
            snapshot.par_iter().enumerate().map(step).collect()
        } else {
            snapshot.iter().enumerate().map(step).collect()
        };

        // 统一提交
        let mut k = 0;
        for row in &mut self.rows {
            for v in row.iter_mut().filter(|v| v.active) {
                let (pos, omega) = updates[k];
                v.position = pos;
                v.omega = omega;
                k += 1;
            }
        }

        if self.config.vorton_redistribute {
            self.redistribute();
        }
    }

    /// 近距粒子合并（串行后处理）
    ///
    /// 行内两两检查：距离小于 `merge_ratio · core` 的活动粒子对合并，
    /// 涡量求和，位置取环量加权质心。跨行不合并。
    fn redistribute(&mut self) {
        let merge_dist = self.config.merge_ratio * self.config.core_radius;
        let mut merged = 0usize;

        for row in &mut self.rows {
            for i in 0..row.len() {
                if !row[i].active {
                    continue;
                }
                for j in (i + 1)..row.len() {
                    if !row[j].active {
                        continue;
                    }
                    if row[i].position.distance(row[j].position) < merge_dist {
                        let ci = row[i].circulation();
                        let cj = row[j].circulation();
                        let total = ci + cj;
                        if total > 0.0 {
                            row[i].position =
                                (row[i].position * ci + row[j].position * cj) / total;
                        }
                        let omega_j = row[j].omega;
                        let volume_j = row[j].volume;
                        row[i].omega += omega_j;
                        row[i].volume += volume_j;
                        row[j].deactivate();
                        merged += 1;
                    }
                }
            }
        }

        if merged > 0 {
            tracing::debug!("尾流再分布: 合并 {} 个涡粒子", merged);
        }
    }
}
