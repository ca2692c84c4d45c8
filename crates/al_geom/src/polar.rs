// crates/al_geom/src/polar.rs

//! 二维极曲线
//!
//! [`Polar2d`] 描述一条二维分析配置（类型、雷诺数、马赫数、转捩设置），
//! 并累积收敛工况点的 Cl/Cd/Cm 曲线。任务在批量扫掠中即使丢弃
//! 单点结果对象（`keep_opps = false`），曲线仍然在此累积。
//!
//! 配置使用纯 f64 存储并通过 serde JSON 持久化，
//! `from_file`/`validate`/`save_to_file` 三件套与配置层其它结构一致。

use al_foundation::error::{AlError, AlResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 极曲线分析类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PolarType {
    /// T1: 定速（雷诺数固定）
    #[default]
    FixedSpeed,
    /// T2: 定升力（Re·√Cl 固定）
    FixedLift,
    /// T4: 定迎角（雷诺数扫掠）
    FixedAoa,
}

impl std::fmt::Display for PolarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FixedSpeed => write!(f, "T1 (fixed speed)"),
            Self::FixedLift => write!(f, "T2 (fixed lift)"),
            Self::FixedAoa => write!(f, "T4 (fixed aoa)"),
        }
    }
}

/// 二维极曲线
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polar2d {
    /// 极曲线名称
    pub name: String,
    /// 关联翼型名称
    pub foil_name: String,
    /// 分析类型
    #[serde(default)]
    pub polar_type: PolarType,
    /// 雷诺数
    #[serde(default = "default_reynolds")]
    pub reynolds: f64,
    /// 马赫数
    #[serde(default)]
    pub mach: f64,
    /// e^N 转捩判据的 N 临界值
    #[serde(default = "default_ncrit")]
    pub ncrit: f64,
    /// 上翼面强制转捩位置（1.0 = 自由转捩）
    #[serde(default = "default_xtr")]
    pub xtr_top_forced: f64,
    /// 下翼面强制转捩位置
    #[serde(default = "default_xtr")]
    pub xtr_bot_forced: f64,

    // 累积曲线（与收敛点一一对应，按扫掠顺序）
    /// 迎角 [°]
    #[serde(default)]
    pub alpha: Vec<f64>,
    /// 升力系数
    #[serde(default)]
    pub cl: Vec<f64>,
    /// 阻力系数
    #[serde(default)]
    pub cd: Vec<f64>,
    /// 力矩系数（1/4 弦点）
    #[serde(default)]
    pub cm: Vec<f64>,
    /// 上翼面转捩位置
    #[serde(default)]
    pub xtr_top: Vec<f64>,
    /// 下翼面转捩位置
    #[serde(default)]
    pub xtr_bot: Vec<f64>,
}

fn default_reynolds() -> f64 {
    100_000.0
}
fn default_ncrit() -> f64 {
    9.0
}
fn default_xtr() -> f64 {
    1.0
}

impl Polar2d {
    /// 创建 T1 定速极曲线
    pub fn fixed_speed(name: impl Into<String>, foil_name: impl Into<String>, reynolds: f64) -> Self {
        Self {
            name: name.into(),
            foil_name: foil_name.into(),
            polar_type: PolarType::FixedSpeed,
            reynolds,
            mach: 0.0,
            ncrit: default_ncrit(),
            xtr_top_forced: 1.0,
            xtr_bot_forced: 1.0,
            alpha: Vec::new(),
            cl: Vec::new(),
            cd: Vec::new(),
            cm: Vec::new(),
            xtr_top: Vec::new(),
            xtr_bot: Vec::new(),
        }
    }

    /// 追加一个收敛工况点
    pub fn add_point(
        &mut self,
        alpha: f64,
        cl: f64,
        cd: f64,
        cm: f64,
        xtr_top: f64,
        xtr_bot: f64,
    ) {
        self.alpha.push(alpha);
        self.cl.push(cl);
        self.cd.push(cd);
        self.cm.push(cm);
        self.xtr_top.push(xtr_top);
        self.xtr_bot.push(xtr_bot);
    }

    /// 曲线点数
    #[inline]
    pub fn n_points(&self) -> usize {
        self.alpha.len()
    }

    /// 清空累积曲线（配置保留）
    pub fn reset_curves(&mut self) {
        self.alpha.clear();
        self.cl.clear();
        self.cd.clear();
        self.cm.clear();
        self.xtr_top.clear();
        self.xtr_bot.clear();
    }

    /// 验证配置有效性
    pub fn validate(&self) -> AlResult<()> {
        if self.reynolds <= 0.0 {
            return Err(AlError::invalid_config(
                "reynolds",
                self.reynolds.to_string(),
                "雷诺数必须为正",
            ));
        }
        if self.mach < 0.0 || self.mach >= 1.0 {
            return Err(AlError::invalid_config(
                "mach",
                self.mach.to_string(),
                "马赫数必须在 [0, 1) 范围内",
            ));
        }
        if !(0.0..=1.0).contains(&self.xtr_top_forced) || !(0.0..=1.0).contains(&self.xtr_bot_forced)
        {
            return Err(AlError::invalid_config(
                "xtr_forced",
                format!("{}/{}", self.xtr_top_forced, self.xtr_bot_forced),
                "强制转捩位置必须在 [0, 1] 范围内",
            ));
        }
        Ok(())
    }

    /// 从文件加载
    pub fn from_file<P: AsRef<Path>>(path: P) -> AlResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| AlError::io_with_source("读取极曲线文件失败", e))?;
        let polar: Polar2d = serde_json::from_str(&content)
            .map_err(|e| AlError::serialization(e.to_string()))?;
        polar.validate()?;
        Ok(polar)
    }

    /// 保存到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> AlResult<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| AlError::serialization(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| AlError::io_with_source("写入极曲线文件失败", e))?;
        Ok(())
    }
}
