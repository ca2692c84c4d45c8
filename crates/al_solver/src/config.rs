// crates/al_solver/src/config.rs

//! 运行配置
//!
//! 原实现把尾流拉伸、再分布、线程数等开关放在进程级可变静态量里，
//! 多任务并发时存在读写竞争。这里改为不可变配置结构：
//! 任务构造时捕获一份，运行期间只读。
//!
//! 配置分两层：[`WakeConfig`] 管涡粒子尾流，[`LatticeConfig`] 管格栅装配
//! 与求解循环。两者都提供构建器与场景化快速配置。

use al_foundation::error::{AlError, AlResult};
use al_foundation::tolerance::NumericalTolerance;
use serde::{Deserialize, Serialize};

use crate::kernel::CoreModel;

// ============================================================
// 尾流配置
// ============================================================

/// 涡粒子尾流配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WakeConfig {
    /// 涡核正则化模型
    #[serde(default)]
    pub core_model: CoreModel,
    /// 涡核半径 [m]
    #[serde(default = "default_core_radius")]
    pub core_radius: f64,
    /// 对流时间步长 [s]
    #[serde(default = "default_time_step")]
    pub time_step: f64,
    /// 保留的尾流行数
    #[serde(default = "default_wake_rows")]
    pub n_wake_rows: usize,
    /// 是否启用涡量拉伸项
    #[serde(default)]
    pub vorton_stretch: bool,
    /// 是否启用涡粒子再分布（串行后处理）
    #[serde(default)]
    pub vorton_redistribute: bool,
    /// 再分布合并距离（相对涡核半径）
    #[serde(default = "default_merge_ratio")]
    pub merge_ratio: f64,
    /// 是否允许并行对流
    #[serde(default = "default_true")]
    pub multithreaded: bool,
    /// 最小并行规模（涡粒子数低于此值时串行）
    #[serde(default = "default_min_parallel")]
    pub min_parallel_size: usize,
}

fn default_core_radius() -> f64 {
    0.05
}
fn default_time_step() -> f64 {
    0.05
}
fn default_wake_rows() -> usize {
    20
}
fn default_merge_ratio() -> f64 {
    0.25
}
fn default_true() -> bool {
    true
}
fn default_min_parallel() -> usize {
    256
}

impl Default for WakeConfig {
    fn default() -> Self {
        Self {
            core_model: CoreModel::default(),
            core_radius: default_core_radius(),
            time_step: default_time_step(),
            n_wake_rows: default_wake_rows(),
            vorton_stretch: false,
            vorton_redistribute: false,
            merge_ratio: default_merge_ratio(),
            multithreaded: true,
            min_parallel_size: default_min_parallel(),
        }
    }
}

impl WakeConfig {
    /// 验证配置有效性
    pub fn validate(&self) -> AlResult<()> {
        if self.core_radius <= 0.0 {
            return Err(AlError::invalid_config(
                "core_radius",
                self.core_radius.to_string(),
                "涡核半径必须为正",
            ));
        }
        if self.time_step <= 0.0 {
            return Err(AlError::invalid_config(
                "time_step",
                self.time_step.to_string(),
                "时间步长必须为正",
            ));
        }
        if self.n_wake_rows == 0 {
            return Err(AlError::invalid_config(
                "n_wake_rows",
                "0",
                "尾流行数必须至少为 1",
            ));
        }
        Ok(())
    }
}

// ============================================================
// 格栅配置
// ============================================================

/// 格栅求解配置
#[derive(Debug, Clone)]
pub struct LatticeConfig {
    /// 尾流配置
    pub wake: WakeConfig,
    /// 数值容差
    pub tolerance: NumericalTolerance,
    /// 单任务最大工况数（右端项上限）
    pub max_rhs: usize,
    /// 每工况的尾流松弛迭代次数（求解↔对流交替）
    pub wake_iterations: usize,
    /// 影响矩阵装配最小并行行数
    pub min_parallel_rows: usize,
    /// 是否在每个工况后推送实时快照
    pub live_update: bool,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            wake: WakeConfig::default(),
            tolerance: NumericalTolerance::default(),
            max_rhs: 100,
            wake_iterations: 3,
            min_parallel_rows: 64,
            live_update: true,
        }
    }
}

impl LatticeConfig {
    /// 创建构建器
    pub fn builder() -> LatticeConfigBuilder {
        LatticeConfigBuilder::default()
    }

    /// 快速配置：性能优先（关闭拉伸与实时快照）
    pub fn performance() -> Self {
        Self {
            wake: WakeConfig {
                vorton_stretch: false,
                vorton_redistribute: false,
                ..Default::default()
            },
            tolerance: NumericalTolerance::fast(),
            live_update: false,
            ..Default::default()
        }
    }

    /// 快速配置：精度优先
    pub fn accuracy() -> Self {
        Self {
            wake: WakeConfig {
                vorton_stretch: true,
                vorton_redistribute: true,
                ..Default::default()
            },
            tolerance: NumericalTolerance::conservative(),
            ..Default::default()
        }
    }

    /// 验证配置有效性
    pub fn validate(&self) -> AlResult<()> {
        self.wake.validate()?;
        if self.max_rhs == 0 {
            return Err(AlError::invalid_config(
                "max_rhs",
                "0",
                "工况数上限必须至少为 1",
            ));
        }
        Ok(())
    }
}

/// 配置构建器
#[derive(Default)]
pub struct LatticeConfigBuilder {
    config: LatticeConfig,
}

impl LatticeConfigBuilder {
    /// 设置尾流配置
    pub fn wake(mut self, wake: WakeConfig) -> Self {
        self.config.wake = wake;
        self
    }

    /// 设置数值容差
    pub fn tolerance(mut self, tolerance: NumericalTolerance) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    /// 设置工况数上限
    pub fn max_rhs(mut self, max_rhs: usize) -> Self {
        self.config.max_rhs = max_rhs;
        self
    }

    /// 设置装配并行阈值
    pub fn min_parallel_rows(mut self, rows: usize) -> Self {
        self.config.min_parallel_rows = rows;
        self
    }

    /// 设置实时快照开关
    pub fn live_update(mut self, enable: bool) -> Self {
        self.config.live_update = enable;
        self
    }

    /// 完成构建
    pub fn build(self) -> AlResult<LatticeConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_valid() {
        assert!(LatticeConfig::default().validate().is_ok());
        assert!(WakeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = LatticeConfig::builder()
            .max_rhs(10)
            .live_update(false)
            .build()
            .unwrap();
        assert_eq!(config.max_rhs, 10);
        assert!(!config.live_update);
    }

    #[test]
    fn test_invalid_core_radius() {
        let wake = WakeConfig {
            core_radius: 0.0,
            ..Default::default()
        };
        assert!(wake.validate().is_err());
    }

    #[test]
    fn test_profiles() {
        assert!(LatticeConfig::performance().validate().is_ok());
        let acc = LatticeConfig::accuracy();
        assert!(acc.wake.vorton_stretch);
        assert!(acc.wake.vorton_redistribute);
    }
}
