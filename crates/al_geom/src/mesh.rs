// crates/al_geom/src/mesh.rs

//! 四边形格栅网格
//!
//! [`QuadMesh`] 持有节点与四边形面元，按展向条带（strip）组织：
//! 面元索引 `p = j * n_chord + i`，j 为展向站位，i 为弦向序号（前缘→后缘）。
//! 条带连续存储使得展向载荷分布可以按切片直接遍历。
//!
//! 网格由几何层生成后冻结；求解器只读，逐工况旋转发生在任务的私有副本上。

use al_foundation::validation::{ValidationError, ValidationReport, ValidationWarning};
use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::node::Node;
use crate::panel::Panel4;

/// 四边形格栅网格
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuadMesh {
    /// 节点数组
    pub nodes: Vec<Node>,
    /// 面元数组（展向条带连续）
    pub panels: Vec<Panel4>,
    /// 弦向面元数
    pub n_chord: usize,
    /// 展向面元数
    pub n_span: usize,
}

impl QuadMesh {
    /// 空网格
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            panels: Vec::new(),
            n_chord: 0,
            n_span: 0,
        }
    }

    /// 从点阵构建网格
    ///
    /// `grid[i][j]` 为弦向第 i 行（0=前缘）、展向第 j 列的角点，
    /// 尺寸 (n_chord+1) × (n_span+1)。最后一行弦向面元标记为后缘面元。
    pub fn from_grid(grid: &[Vec<DVec3>]) -> Self {
        if grid.len() < 2 || grid[0].len() < 2 {
            return Self::empty();
        }
        let n_chord = grid.len() - 1;
        let n_span = grid[0].len() - 1;

        let mut nodes = Vec::with_capacity((n_chord + 1) * (n_span + 1));
        for row in grid {
            for &p in row {
                nodes.push(Node::new(p));
            }
        }

        let mut panels = Vec::with_capacity(n_chord * n_span);
        for j in 0..n_span {
            for i in 0..n_chord {
                let a = grid[i][j];
                let b = grid[i][j + 1];
                let c = grid[i + 1][j + 1];
                let d = grid[i + 1][j];
                let panel = Panel4::new(a, b, c, d).with_trailing(i == n_chord - 1);

                // 法向累积到四个角点
                let stride = n_span + 1;
                for (ii, jj) in [(i, j), (i, j + 1), (i + 1, j + 1), (i + 1, j)] {
                    nodes[ii * stride + jj].accumulate_normal(panel.normal);
                }
                panels.push(panel);
            }
        }
        for node in &mut nodes {
            node.finalize_normal();
        }

        Self {
            nodes,
            panels,
            n_chord,
            n_span,
        }
    }

    /// 面元总数
    #[inline]
    pub fn n_panels(&self) -> usize {
        self.panels.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// 第 j 条展向条带的面元切片（弦向前缘→后缘）
    pub fn strip(&self, j: usize) -> &[Panel4] {
        let start = j * self.n_chord;
        &self.panels[start..start + self.n_chord]
    }

    /// 总面积
    pub fn total_area(&self) -> f64 {
        self.panels.iter().map(|p| p.area).sum()
    }

    /// 启动前验证
    ///
    /// 空网格与退化面元为错误（任务不得进入 RUNNING），
    /// 大长宽比面元仅产生警告。
    pub fn validate(&self, min_area: f64) -> ValidationReport {
        let mut report = ValidationReport::new();

        if self.is_empty() {
            report.add_error(ValidationError::EmptyGeometry {
                what: "panel mesh",
            });
            return report;
        }

        for (idx, panel) in self.panels.iter().enumerate() {
            if panel.is_degenerate(min_area) {
                report.add_error(ValidationError::DegeneratePanel {
                    index: idx,
                    area: panel.area,
                });
                continue;
            }
            let chord = panel.mean_chord();
            let width = panel.span_width();
            if chord > 0.0 && width > 0.0 {
                let aspect = (chord / width).max(width / chord);
                if aspect > 20.0 {
                    report.add_warning(ValidationWarning::HighAspectPanel {
                        index: idx,
                        aspect,
                    });
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_grid(n_chord: usize, n_span: usize) -> Vec<Vec<DVec3>> {
        (0..=n_chord)
            .map(|i| {
                (0..=n_span)
                    .map(|j| DVec3::new(i as f64 / n_chord as f64, j as f64 / n_span as f64, 0.0))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_from_grid_counts() {
        let mesh = QuadMesh::from_grid(&flat_grid(4, 8));
        assert_eq!(mesh.n_panels(), 32);
        assert_eq!(mesh.nodes.len(), 45);
        assert_eq!(mesh.n_chord, 4);
        assert_eq!(mesh.n_span, 8);
    }

    #[test]
    fn test_strip_layout() {
        let mesh = QuadMesh::from_grid(&flat_grid(4, 8));
        let strip = mesh.strip(3);
        assert_eq!(strip.len(), 4);
        // 条带内最后一个面元为后缘面元
        assert!(strip[3].trailing);
        assert!(!strip[0].trailing);
    }

    #[test]
    fn test_total_area() {
        let mesh = QuadMesh::from_grid(&flat_grid(4, 8));
        assert!((mesh.total_area() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_validate_empty() {
        let mesh = QuadMesh::empty();
        let report = mesh.validate(1e-12);
        assert!(report.has_errors());
    }

    #[test]
    fn test_validate_ok() {
        let mesh = QuadMesh::from_grid(&flat_grid(4, 8));
        let report = mesh.validate(1e-12);
        assert!(report.is_valid());
    }
}
