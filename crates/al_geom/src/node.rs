// crates/al_geom/src/node.rs

//! 网格节点
//!
//! 节点持有位置与累积法向。法向由相邻面元的单位法向累加后归一化，
//! 用于后处理中的表面量插值。

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// 网格节点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// 位置 [m]
    pub position: DVec3,
    /// 累积法向（未归一化前为相邻面元法向之和）
    pub normal: DVec3,
}

impl Node {
    /// 创建节点
    pub fn new(position: DVec3) -> Self {
        Self {
            position,
            normal: DVec3::ZERO,
        }
    }

    /// 从坐标创建
    pub fn from_xyz(x: f64, y: f64, z: f64) -> Self {
        Self::new(DVec3::new(x, y, z))
    }

    /// 累加一个相邻面元的法向
    pub fn accumulate_normal(&mut self, n: DVec3) {
        self.normal += n;
    }

    /// 归一化累积法向（无相邻面元时保持零向量）
    pub fn finalize_normal(&mut self) {
        self.normal = self.normal.normalize_or_zero();
    }

    /// 到另一节点的距离
    #[inline]
    pub fn distance_to(&self, other: &Node) -> f64 {
        self.position.distance(other.position)
    }

    /// 位置是否有限
    pub fn is_valid(&self) -> bool {
        self.position.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_accumulation() {
        let mut node = Node::from_xyz(0.0, 0.0, 0.0);
        node.accumulate_normal(DVec3::Z);
        node.accumulate_normal(DVec3::Z);
        node.finalize_normal();
        assert!((node.normal - DVec3::Z).length() < 1e-12);
    }

    #[test]
    fn test_distance() {
        let a = Node::from_xyz(0.0, 0.0, 0.0);
        let b = Node::from_xyz(3.0, 4.0, 0.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
    }
}
