// crates/al_geom/src/panel.rs

//! 面元表示
//!
//! 提供求解器消费的三类面元：
//!
//! - [`Panel2d`]: 二维翼型表面线元（截面分析用）
//! - [`Panel3`]: 三角形面元（船体等非升力面）
//! - [`Panel4`]: 四边形格栅面元（升力面涡环载体）
//!
//! # 局部坐标系
//!
//! 每个三维面元携带正交局部坐标系 (l, m, n)：
//! l 沿弦向，m 沿展向，n 为单位法向。
//! 求解器在局部系中施加边界条件，在全局系中累加力。
//!
//! # 逐工况旋转
//!
//! `rotated_about` 返回旋转后的新面元，从不修改共享网格。
//! 任务在装配影响矩阵前对自己的私有面元副本施加横倾/迎角旋转。

use glam::{DQuat, DVec2, DVec3};
use serde::{Deserialize, Serialize};

// ============================================================
// 二维面元
// ============================================================

/// 二维翼型表面线元
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Panel2d {
    /// 起点（沿表面从下翼面后缘绕行）
    pub p1: DVec2,
    /// 终点
    pub p2: DVec2,
}

impl Panel2d {
    /// 创建线元
    pub fn new(p1: DVec2, p2: DVec2) -> Self {
        Self { p1, p2 }
    }

    /// 线元长度
    #[inline]
    pub fn length(&self) -> f64 {
        self.p1.distance(self.p2)
    }

    /// 中点
    #[inline]
    pub fn midpoint(&self) -> DVec2 {
        (self.p1 + self.p2) * 0.5
    }

    /// 外法向（表面逆时针绕行时指向流体一侧）
    #[inline]
    pub fn normal(&self) -> DVec2 {
        let t = (self.p2 - self.p1).normalize_or_zero();
        DVec2::new(t.y, -t.x)
    }

    /// 表面角（与 x 轴夹角）
    #[inline]
    pub fn theta(&self) -> f64 {
        let d = self.p2 - self.p1;
        d.y.atan2(d.x)
    }
}

// ============================================================
// 三角形面元
// ============================================================

/// 三角形面元（非升力面）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Panel3 {
    /// 三个角点
    pub corners: [DVec3; 3],
    /// 单位法向
    pub normal: DVec3,
    /// 面积 [m²]
    pub area: f64,
    /// 形心
    pub centroid: DVec3,
}

impl Panel3 {
    /// 从角点创建，按右手定则计算法向
    pub fn new(a: DVec3, b: DVec3, c: DVec3) -> Self {
        let cross = (b - a).cross(c - a);
        let area = 0.5 * cross.length();
        Self {
            corners: [a, b, c],
            normal: cross.normalize_or_zero(),
            area,
            centroid: (a + b + c) / 3.0,
        }
    }

    /// 绕轴旋转后的新面元
    pub fn rotated_about(&self, origin: DVec3, axis: DVec3, angle_rad: f64) -> Self {
        let q = DQuat::from_axis_angle(axis.normalize_or_zero(), angle_rad);
        let [a, b, c] = self.corners;
        Self::new(
            origin + q * (a - origin),
            origin + q * (b - origin),
            origin + q * (c - origin),
        )
    }

    /// 面元是否退化
    pub fn is_degenerate(&self, min_area: f64) -> bool {
        self.area < min_area
    }
}

// ============================================================
// 四边形面元
// ============================================================

/// 四边形格栅面元
///
/// 角点按 (前缘内侧 A, 前缘外侧 B, 后缘外侧 C, 后缘内侧 D) 绕行，
/// 保证法向指向吸力面一侧。涡环沿 1/4 弦线布置，
/// 配置点取 3/4 弦线中点（经典格栅法布局）。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Panel4 {
    /// 四个角点
    pub corners: [DVec3; 4],
    /// 配置点（边界条件施加位置）
    pub collocation: DVec3,
    /// 单位法向
    pub normal: DVec3,
    /// 弦向单位向量 l
    pub l: DVec3,
    /// 展向单位向量 m
    pub m: DVec3,
    /// 面积 [m²]
    pub area: f64,
    /// 是否为后缘面元（尾涡从此处脱出）
    pub trailing: bool,
}

impl Panel4 {
    /// 从角点创建面元并计算派生量
    pub fn new(a: DVec3, b: DVec3, c: DVec3, d: DVec3) -> Self {
        // 对角线叉积给出法向与面积
        let diag1 = c - a;
        let diag2 = d - b;
        let cross = diag1.cross(diag2);
        let area = 0.5 * cross.length();
        let normal = cross.normalize_or_zero();

        // 弦向取前后缘中点连线
        let le_mid = (a + b) * 0.5;
        let te_mid = (d + c) * 0.5;
        let l = (te_mid - le_mid).normalize_or_zero();
        let m = normal.cross(l).normalize_or_zero();

        // 涡环前段在 1/4 弦，配置点在 3/4 弦
        let collocation = le_mid + (te_mid - le_mid) * 0.75;

        Self {
            corners: [a, b, c, d],
            collocation,
            normal,
            l,
            m,
            area,
            trailing: false,
        }
    }

    /// 标记为后缘面元
    pub fn with_trailing(mut self, trailing: bool) -> Self {
        self.trailing = trailing;
        self
    }

    /// 涡环四角点（1/4 弦规则：环前段从面元 1/4 弦处通过）
    pub fn ring_corners(&self) -> [DVec3; 4] {
        let [a, b, c, d] = self.corners;
        let ra = a + (d - a) * 0.25;
        let rb = b + (c - b) * 0.25;
        let rc = c + (c - b) * 0.25;
        let rd = d + (d - a) * 0.25;
        [ra, rb, rc, rd]
    }

    /// 形心
    #[inline]
    pub fn centroid(&self) -> DVec3 {
        let [a, b, c, d] = self.corners;
        (a + b + c + d) * 0.25
    }

    /// 平均弦长
    #[inline]
    pub fn mean_chord(&self) -> f64 {
        let [a, b, c, d] = self.corners;
        0.5 * (a.distance(d) + b.distance(c))
    }

    /// 展向宽度
    #[inline]
    pub fn span_width(&self) -> f64 {
        let [a, b, c, d] = self.corners;
        0.5 * (a.distance(b) + d.distance(c))
    }

    /// 全局向量转局部坐标 (l, m, n) 分量
    #[inline]
    pub fn to_local(&self, v: DVec3) -> DVec3 {
        DVec3::new(v.dot(self.l), v.dot(self.m), v.dot(self.normal))
    }

    /// 局部分量转全局向量
    #[inline]
    pub fn to_global(&self, v: DVec3) -> DVec3 {
        self.l * v.x + self.m * v.y + self.normal * v.z
    }

    /// 绕轴旋转后的新面元
    ///
    /// 派生量（法向、局部系、配置点）全部重算，`trailing` 标记保留。
    pub fn rotated_about(&self, origin: DVec3, axis: DVec3, angle_rad: f64) -> Self {
        let q = DQuat::from_axis_angle(axis.normalize_or_zero(), angle_rad);
        let [a, b, c, d] = self.corners;
        Self::new(
            origin + q * (a - origin),
            origin + q * (b - origin),
            origin + q * (c - origin),
            origin + q * (d - origin),
        )
        .with_trailing(self.trailing)
    }

    /// 面元是否退化
    pub fn is_degenerate(&self, min_area: f64) -> bool {
        self.area < min_area || !self.normal.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_panel() -> Panel4 {
        // x 为弦向，y 为展向，位于 z=0 平面
        Panel4::new(
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
        )
    }

    #[test]
    fn test_panel4_derived() {
        let p = unit_panel();
        assert!((p.area - 1.0).abs() < 1e-12);
        assert!((p.normal.length() - 1.0).abs() < 1e-12);
        // 配置点在 3/4 弦中线
        assert!((p.collocation - DVec3::new(0.75, 0.5, 0.0)).length() < 1e-12);
        // 局部系正交
        assert!(p.l.dot(p.m).abs() < 1e-12);
        assert!(p.l.dot(p.normal).abs() < 1e-12);
    }

    #[test]
    fn test_local_global_roundtrip() {
        let p = unit_panel();
        let v = DVec3::new(0.3, -1.2, 2.5);
        let back = p.to_global(p.to_local(v));
        assert!((v - back).length() < 1e-12);
    }

    #[test]
    fn test_rotation_preserves_area() {
        let p = unit_panel();
        let r = p.rotated_about(DVec3::ZERO, DVec3::X, 30f64.to_radians());
        assert!((r.area - p.area).abs() < 1e-12);
        // 绕 x 轴旋转后法向离开 z 轴
        assert!(r.normal.z < 1.0);
    }

    #[test]
    fn test_panel3_area() {
        let t = Panel3::new(
            DVec3::ZERO,
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
        );
        assert!((t.area - 0.5).abs() < 1e-12);
        assert!((t.normal - DVec3::Z).length() < 1e-12);
    }

    #[test]
    fn test_panel2d_normal() {
        let p = Panel2d::new(DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0));
        let n = p.normal();
        assert!((n - DVec2::new(0.0, -1.0)).length() < 1e-12);
    }
}
