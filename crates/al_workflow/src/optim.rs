// crates/al_workflow/src/optim.rs

//! 粒子群优化支持
//!
//! 气动求解器作为适应度函数的消费方接口：变量/目标的取值结构、
//! 粒子状态更新与 Pareto 前沿维护。只提供优化器需要的最小
//! 构件，种群调度与具体适应度评估由调用方组织。

use al_foundation::error::{AlError, AlResult};
use serde::{Deserialize, Serialize};

/// 优化变量（带边界）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptVariable {
    /// 变量名
    pub name: String,
    /// 下界
    pub min: f64,
    /// 上界
    pub max: f64,
}

impl OptVariable {
    /// 创建变量
    pub fn new(name: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
        }
    }

    /// 验证边界次序
    pub fn validate(&self) -> AlResult<()> {
        if self.min > self.max {
            return Err(AlError::invalid_config(
                "opt_variable",
                format!("[{}, {}]", self.min, self.max),
                "下界不得大于上界",
            ));
        }
        Ok(())
    }

    /// 把取值钳制到边界内
    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// 优化目标（目标值 + 容差）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptObjective {
    /// 目标名
    pub name: String,
    /// 目标值
    pub target: f64,
    /// 容差
    pub tolerance: f64,
}

impl OptObjective {
    /// 创建目标
    pub fn new(name: impl Into<String>, target: f64, tolerance: f64) -> Self {
        Self {
            name: name.into(),
            target,
            tolerance: tolerance.abs(),
        }
    }

    /// 误差（超出容差的部分，容差内为零）
    #[inline]
    pub fn error(&self, value: f64) -> f64 {
        let deviation = (value - self.target).abs();
        (deviation - self.tolerance).max(0.0)
    }
}

/// 压力分布目标（指定面元的目标 Cp）
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OptCp {
    /// 面元索引
    pub panel: usize,
    /// 目标压差系数
    pub target: f64,
}

/// 粒子群配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PsoConfig {
    /// 种群规模
    #[serde(default = "default_pop_size")]
    pub pop_size: usize,
    /// 惯性权重
    #[serde(default = "default_inertia")]
    pub inertia: f64,
    /// 个体认知权重
    #[serde(default = "default_cognitive")]
    pub cognitive: f64,
    /// 群体社会权重
    #[serde(default = "default_social")]
    pub social: f64,
}

fn default_pop_size() -> usize {
    30
}
fn default_inertia() -> f64 {
    0.7
}
fn default_cognitive() -> f64 {
    1.5
}
fn default_social() -> f64 {
    1.5
}

impl Default for PsoConfig {
    fn default() -> Self {
        Self {
            pop_size: default_pop_size(),
            inertia: default_inertia(),
            cognitive: default_cognitive(),
            social: default_social(),
        }
    }
}

/// 粒子状态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    /// 当前位置（设计变量向量）
    pub position: Vec<f64>,
    /// 当前速度
    pub velocity: Vec<f64>,
    /// 个体历史最优位置
    pub best_position: Vec<f64>,
    /// 个体历史最优误差
    pub best_error: Vec<f64>,
    /// 当前误差（每目标一项）
    pub error: Vec<f64>,
}

impl Particle {
    /// 在变量边界内创建静止粒子
    pub fn new(position: Vec<f64>, n_objectives: usize) -> Self {
        let n = position.len();
        Self {
            best_position: position.clone(),
            position,
            velocity: vec![0.0; n],
            best_error: vec![f64::MAX; n_objectives],
            error: vec![f64::MAX; n_objectives],
        }
    }

    /// 标准 PSO 速度/位置更新
    ///
    /// `r1`/`r2` 为调用方提供的 [0,1) 随机数（每维一个）。
    pub fn update(
        &mut self,
        config: &PsoConfig,
        global_best: &[f64],
        variables: &[OptVariable],
        r1: &[f64],
        r2: &[f64],
    ) {
        for d in 0..self.position.len() {
            self.velocity[d] = config.inertia * self.velocity[d]
                + config.cognitive * r1[d] * (self.best_position[d] - self.position[d])
                + config.social * r2[d] * (global_best[d] - self.position[d]);
            self.position[d] = variables[d].clamp(self.position[d] + self.velocity[d]);
        }
    }

    /// 以当前误差刷新个体最优（加权和比较）
    pub fn refresh_best(&mut self) {
        let current: f64 = self.error.iter().sum();
        let best: f64 = self.best_error.iter().sum();
        if current < best {
            self.best_error = self.error.clone();
            self.best_position = self.position.clone();
        }
    }
}

/// a 是否支配 b（每目标不劣且至少一个严格更优）
fn dominates(a: &[f64], b: &[f64]) -> bool {
    let mut strictly_better = false;
    for (x, y) in a.iter().zip(b) {
        if x > y {
            return false;
        }
        if x < y {
            strictly_better = true;
        }
    }
    strictly_better
}

/// Pareto 前沿
///
/// 维护一组互不支配的误差向量及其位置。
#[derive(Debug, Clone, Default)]
pub struct ParetoFront {
    /// 前沿成员 (位置, 误差向量)
    pub members: Vec<(Vec<f64>, Vec<f64>)>,
}

impl ParetoFront {
    /// 创建空前沿
    pub fn new() -> Self {
        Self::default()
    }

    /// 尝试纳入一个候选；被支配时拒绝，纳入时剔除被其支配的成员
    pub fn offer(&mut self, position: Vec<f64>, error: Vec<f64>) -> bool {
        if self.members.iter().any(|(_, e)| dominates(e, &error)) {
            return false;
        }
        self.members.retain(|(_, e)| !dominates(&error, e));
        self.members.push((position, error));
        true
    }

    /// 前沿规模
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_clamp() {
        let var = OptVariable::new("camber", 0.0, 0.1);
        assert!(var.validate().is_ok());
        assert_eq!(var.clamp(0.5), 0.1);
        assert_eq!(var.clamp(-0.5), 0.0);

        let bad = OptVariable::new("bad", 1.0, 0.0);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_objective_error_with_tolerance() {
        let obj = OptObjective::new("cl", 1.0, 0.05);
        assert_eq!(obj.error(1.03), 0.0);
        assert!((obj.error(1.10) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_particle_update_respects_bounds() {
        let variables = vec![OptVariable::new("x", 0.0, 1.0)];
        let config = PsoConfig::default();
        let mut particle = Particle::new(vec![0.9], 1);
        particle.velocity = vec![0.5];
        particle.update(&config, &[1.0], &variables, &[0.5], &[0.5]);
        assert!(particle.position[0] <= 1.0);
    }

    #[test]
    fn test_particle_refresh_best() {
        let mut particle = Particle::new(vec![0.5], 2);
        particle.error = vec![1.0, 2.0];
        particle.refresh_best();
        assert_eq!(particle.best_error, vec![1.0, 2.0]);

        particle.position = vec![0.6];
        particle.error = vec![0.5, 1.0];
        particle.refresh_best();
        assert_eq!(particle.best_position, vec![0.6]);
    }

    #[test]
    fn test_pareto_front_dominance() {
        let mut front = ParetoFront::new();
        assert!(front.offer(vec![0.0], vec![1.0, 2.0]));
        // 被支配的候选拒绝
        assert!(!front.offer(vec![0.1], vec![2.0, 3.0]));
        // 互不支配的候选共存
        assert!(front.offer(vec![0.2], vec![2.0, 1.0]));
        assert_eq!(front.len(), 2);
        // 支配全部成员的候选替换它们
        assert!(front.offer(vec![0.3], vec![0.5, 0.5]));
        assert_eq!(front.len(), 1);
    }
}
