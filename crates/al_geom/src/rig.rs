// crates/al_geom/src/rig.rs

//! 机翼 / 帆装 / 船体几何
//!
//! 这些结构是外部几何层的最小替身：只描述足以格栅化的表面，
//! 由 [`mesh`](crate::mesh) 生成求解器消费的面元网格。
//! 坐标约定：x 沿来流方向（指向下游），y 指向右舷/右翼尖，z 竖直向上。
//!
//! 机翼沿 y 展开，帆沿 z 展开；两者都产出 [`QuadMesh`]。
//! 船体以三角面元补片表示，只参与风阻投影面积计算，不进入涡环格栅。

use al_foundation::error::{AlError, AlResult};
use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::mesh::QuadMesh;
use crate::panel::Panel3;

// ============================================================
// 机翼
// ============================================================

/// 机翼展向剖面
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WingSection {
    /// 展向位置 [m]
    pub y: f64,
    /// 弦长 [m]
    pub chord: f64,
    /// 前缘 x 偏移（后掠）[m]
    pub offset: f64,
    /// 扭转角 [°]（正值为前缘上抬）
    pub twist_deg: f64,
    /// 竖直位置（上反）[m]
    pub z: f64,
}

/// 机翼
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wing {
    /// 机翼名称
    pub name: String,
    /// 展向剖面（按 y 升序）
    pub sections: Vec<WingSection>,
}

impl Wing {
    /// 简单梯形翼（对称双剖面，根弦在 y=0）
    pub fn trapezoidal(name: impl Into<String>, span: f64, root_chord: f64, tip_chord: f64) -> Self {
        let half = span * 0.5;
        Self {
            name: name.into(),
            sections: vec![
                WingSection {
                    y: -half,
                    chord: tip_chord,
                    offset: 0.25 * (root_chord - tip_chord),
                    twist_deg: 0.0,
                    z: 0.0,
                },
                WingSection {
                    y: 0.0,
                    chord: root_chord,
                    offset: 0.0,
                    twist_deg: 0.0,
                    z: 0.0,
                },
                WingSection {
                    y: half,
                    chord: tip_chord,
                    offset: 0.25 * (root_chord - tip_chord),
                    twist_deg: 0.0,
                    z: 0.0,
                },
            ],
        }
    }

    /// 展长
    pub fn span(&self) -> f64 {
        match (self.sections.first(), self.sections.last()) {
            (Some(a), Some(b)) => b.y - a.y,
            _ => 0.0,
        }
    }

    /// 参考面积（梯形积分）
    pub fn reference_area(&self) -> f64 {
        self.sections
            .windows(2)
            .map(|w| 0.5 * (w[0].chord + w[1].chord) * (w[1].y - w[0].y))
            .sum()
    }

    /// 指定展向位置的插值剖面
    fn section_at(&self, y: f64) -> WingSection {
        let sections = &self.sections;
        if y <= sections[0].y {
            return sections[0];
        }
        for w in sections.windows(2) {
            if y <= w[1].y {
                let t = (y - w[0].y) / (w[1].y - w[0].y).max(1e-12);
                return WingSection {
                    y,
                    chord: w[0].chord + t * (w[1].chord - w[0].chord),
                    offset: w[0].offset + t * (w[1].offset - w[0].offset),
                    twist_deg: w[0].twist_deg + t * (w[1].twist_deg - w[0].twist_deg),
                    z: w[0].z + t * (w[1].z - w[0].z),
                };
            }
        }
        sections[sections.len() - 1]
    }

    /// 格栅化
    ///
    /// 弦向余弦加密，展向均匀分布。扭转绕 1/4 弦点施加。
    pub fn mesh(&self, n_chord: usize, n_span: usize) -> AlResult<QuadMesh> {
        if self.sections.len() < 2 {
            return Err(AlError::geometry("机翼至少需要两个剖面"));
        }
        let y0 = self.sections[0].y;
        let y1 = self.sections[self.sections.len() - 1].y;

        let mut grid = Vec::with_capacity(n_chord + 1);
        for i in 0..=n_chord {
            // 弦向余弦分布
            let xc = 0.5 * (1.0 - (std::f64::consts::PI * i as f64 / n_chord as f64).cos());
            let mut row = Vec::with_capacity(n_span + 1);
            for j in 0..=n_span {
                let y = y0 + (y1 - y0) * j as f64 / n_span as f64;
                let sec = self.section_at(y);
                let tw = sec.twist_deg.to_radians();
                let arm = sec.chord * (xc - 0.25);
                row.push(DVec3::new(
                    sec.offset + 0.25 * sec.chord + arm * tw.cos(),
                    y,
                    sec.z - arm * tw.sin(),
                ));
            }
            grid.push(row);
        }
        Ok(QuadMesh::from_grid(&grid))
    }
}

// ============================================================
// 帆
// ============================================================

/// 帆面
///
/// 由四个角点张成：下风角 (tack/clew) 与上风角 (throat/peak)。
/// 三角帆取 peak 靠近 throat。弧形弯度与线性扭转在格栅化时施加。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sail {
    /// 帆名称
    pub name: String,
    /// 前下角（帆角）
    pub tack: DVec3,
    /// 后下角（帆耳）
    pub clew: DVec3,
    /// 前上角
    pub throat: DVec3,
    /// 后上角
    pub peak: DVec3,
    /// 帆顶扭转角 [°]（沿高度线性分布）
    #[serde(default)]
    pub twist_deg: f64,
    /// 最大弧形弯度（弦长比例）
    #[serde(default)]
    pub camber: f64,
}

impl Sail {
    /// 主帆便捷构造（直立三角帆）
    pub fn mainsail(name: impl Into<String>, foot: f64, luff: f64) -> Self {
        Self {
            name: name.into(),
            tack: DVec3::new(0.0, 0.0, 0.0),
            clew: DVec3::new(foot, 0.0, 0.0),
            throat: DVec3::new(0.0, 0.0, luff),
            peak: DVec3::new(0.05 * foot, 0.0, luff),
            twist_deg: 8.0,
            camber: 0.08,
        }
    }

    /// 帆面高度
    pub fn height(&self) -> f64 {
        (self.throat.z - self.tack.z).abs()
    }

    /// 参考面积（上下弦梯形）
    pub fn reference_area(&self) -> f64 {
        let foot = self.tack.distance(self.clew);
        let head = self.throat.distance(self.peak);
        0.5 * (foot + head) * self.height()
    }

    /// 格栅化
    ///
    /// 展向（高度）均匀分布，弦向余弦加密；
    /// 扭转绕当地前缘在水平面内施加，弯度为垂直于当地弦的圆弧鼓形。
    pub fn mesh(&self, n_chord: usize, n_span: usize) -> AlResult<QuadMesh> {
        if self.height() <= 0.0 {
            return Err(AlError::geometry("帆面高度为零"));
        }
        let mut grid = Vec::with_capacity(n_chord + 1);
        for i in 0..=n_chord {
            let xc = 0.5 * (1.0 - (std::f64::consts::PI * i as f64 / n_chord as f64).cos());
            let mut row = Vec::with_capacity(n_span + 1);
            for j in 0..=n_span {
                let s = j as f64 / n_span as f64;
                let le = self.tack.lerp(self.throat, s);
                let te = self.clew.lerp(self.peak, s);
                let chord_vec = te - le;
                let chord_len = chord_vec.length();

                // 线性扭转：帆顶转角最大，绕当地前缘在水平面内旋转
                let tw = (self.twist_deg * s).to_radians();
                let (sin_t, cos_t) = tw.sin_cos();
                let rotated = DVec3::new(
                    chord_vec.x * cos_t - chord_vec.y * sin_t,
                    chord_vec.x * sin_t + chord_vec.y * cos_t,
                    chord_vec.z,
                );

                // 弧形弯度：水平面内垂直于弦的抛物鼓形
                let n_hat = DVec3::Z.cross(rotated).normalize_or_zero();
                let bulge = self.camber * chord_len * 4.0 * xc * (1.0 - xc);

                row.push(le + rotated * xc + n_hat * bulge);
            }
            grid.push(row);
        }
        Ok(QuadMesh::from_grid(&grid))
    }
}

// ============================================================
// 船体
// ============================================================

/// 船体补片（三角面元，只参与风阻投影）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HullPatch {
    /// 三角面元
    pub triangles: Vec<Panel3>,
}

impl HullPatch {
    /// 矩形干舷箱体（两舷 + 艏艉封板）
    pub fn box_hull(length: f64, beam: f64, freeboard: f64) -> Self {
        let hb = beam * 0.5;
        let quad = |a: DVec3, b: DVec3, c: DVec3, d: DVec3| {
            vec![Panel3::new(a, b, c), Panel3::new(a, c, d)]
        };
        let mut triangles = Vec::new();
        // 右舷 / 左舷
        triangles.extend(quad(
            DVec3::new(0.0, hb, 0.0),
            DVec3::new(length, hb, 0.0),
            DVec3::new(length, hb, freeboard),
            DVec3::new(0.0, hb, freeboard),
        ));
        triangles.extend(quad(
            DVec3::new(0.0, -hb, 0.0),
            DVec3::new(0.0, -hb, freeboard),
            DVec3::new(length, -hb, freeboard),
            DVec3::new(length, -hb, 0.0),
        ));
        // 艏板 / 艉板
        triangles.extend(quad(
            DVec3::new(0.0, -hb, 0.0),
            DVec3::new(0.0, hb, 0.0),
            DVec3::new(0.0, hb, freeboard),
            DVec3::new(0.0, -hb, freeboard),
        ));
        triangles.extend(quad(
            DVec3::new(length, -hb, 0.0),
            DVec3::new(length, -hb, freeboard),
            DVec3::new(length, hb, freeboard),
            DVec3::new(length, hb, 0.0),
        ));
        Self { triangles }
    }

    /// 迎风投影面积（x 向）
    pub fn frontal_area(&self) -> f64 {
        0.5 * self
            .triangles
            .iter()
            .map(|t| t.area * t.normal.x.abs())
            .sum::<f64>()
    }

    /// 侧向投影面积（y 向）
    pub fn lateral_area(&self) -> f64 {
        0.5 * self
            .triangles
            .iter()
            .map(|t| t.area * t.normal.y.abs())
            .sum::<f64>()
    }
}

// ============================================================
// 船 + 船极曲线
// ============================================================

/// 船（帆装 + 船体）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boat {
    /// 船名
    pub name: String,
    /// 帆面列表
    pub sails: Vec<Sail>,
    /// 船体补片
    pub hull: Option<HullPatch>,
}

impl Boat {
    /// 创建空船
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sails: Vec::new(),
            hull: None,
        }
    }

    /// 添加帆
    pub fn with_sail(mut self, sail: Sail) -> Self {
        self.sails.push(sail);
        self
    }

    /// 设置船体
    pub fn with_hull(mut self, hull: HullPatch) -> Self {
        self.hull = Some(hull);
        self
    }

    /// 帆面总参考面积
    pub fn sail_area(&self) -> f64 {
        self.sails.iter().map(|s| s.reference_area()).sum()
    }
}

/// 船极曲线控制变量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BoatControl {
    /// 扫掠真风速 [m/s]
    #[default]
    WindSpeed,
    /// 扫掠真风角 [°]
    WindAngle,
}

/// 船极曲线配置
///
/// 任务构造时读取一次，运行期间不变。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoatPolar {
    /// 配置名称
    pub name: String,
    /// 空气密度 [kg/m³]
    #[serde(default = "default_air_density")]
    pub air_density: f64,
    /// 运动粘度 [m²/s]
    #[serde(default = "default_viscosity")]
    pub kinematic_viscosity: f64,
    /// 横倾角 [°]
    #[serde(default)]
    pub heel_deg: f64,
    /// 真风角 [°]（控制变量为风速时固定）
    #[serde(default = "default_twa")]
    pub twa_deg: f64,
    /// 真风速 [m/s]（控制变量为风角时固定）
    #[serde(default = "default_tws")]
    pub tws: f64,
    /// 控制变量
    #[serde(default)]
    pub control: BoatControl,
}

fn default_air_density() -> f64 {
    1.225
}
fn default_viscosity() -> f64 {
    1.5e-5
}
fn default_twa() -> f64 {
    40.0
}
fn default_tws() -> f64 {
    6.0
}

impl BoatPolar {
    /// 创建默认配置
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            air_density: default_air_density(),
            kinematic_viscosity: default_viscosity(),
            heel_deg: 0.0,
            twa_deg: default_twa(),
            tws: default_tws(),
            control: BoatControl::default(),
        }
    }

    /// 验证配置有效性
    pub fn validate(&self) -> AlResult<()> {
        if self.air_density <= 0.0 {
            return Err(AlError::invalid_config(
                "air_density",
                self.air_density.to_string(),
                "空气密度必须为正",
            ));
        }
        if self.kinematic_viscosity <= 0.0 {
            return Err(AlError::invalid_config(
                "kinematic_viscosity",
                self.kinematic_viscosity.to_string(),
                "运动粘度必须为正",
            ));
        }
        if self.heel_deg.abs() > 80.0 {
            return Err(AlError::out_of_range("heel_deg", self.heel_deg, -80.0, 80.0));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trapezoidal_wing() {
        let wing = Wing::trapezoidal("test", 10.0, 1.5, 0.8);
        assert!((wing.span() - 10.0).abs() < 1e-12);
        // 梯形面积：2 × 0.5×(1.5+0.8)×5
        assert!((wing.reference_area() - 11.5).abs() < 1e-10);
    }

    #[test]
    fn test_wing_mesh() {
        let wing = Wing::trapezoidal("test", 10.0, 1.0, 1.0);
        let mesh = wing.mesh(4, 10).unwrap();
        assert_eq!(mesh.n_panels(), 40);
        assert!(mesh.validate(1e-12).is_valid());
        // 矩形翼面积接近参考面积
        assert!((mesh.total_area() - 10.0).abs() / 10.0 < 0.05);
    }

    #[test]
    fn test_sail_mesh() {
        let sail = Sail::mainsail("main", 4.0, 12.0);
        let mesh = sail.mesh(4, 12).unwrap();
        assert_eq!(mesh.n_panels(), 48);
        assert!(mesh.validate(1e-12).is_valid());
    }

    #[test]
    fn test_hull_areas() {
        let hull = HullPatch::box_hull(10.0, 3.0, 1.2);
        assert!((hull.frontal_area() - 3.0 * 1.2).abs() < 1e-10);
        assert!((hull.lateral_area() - 10.0 * 1.2).abs() < 1e-10);
    }

    #[test]
    fn test_boat_polar_validate() {
        let polar = BoatPolar::new("upwind");
        assert!(polar.validate().is_ok());

        let mut bad = BoatPolar::new("bad");
        bad.air_density = -1.0;
        assert!(bad.validate().is_err());
    }
}
