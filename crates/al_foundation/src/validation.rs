// crates/al_foundation/src/validation.rs

//! 运行时验证工具
//!
//! 提供验证报告和错误/警告类型，用于几何与配置数据的启动前检查。
//!
//! # 示例
//!
//! ```
//! use al_foundation::validation::{ValidationReport, ValidationError};
//!
//! let mut report = ValidationReport::new();
//! let n_panels = 0usize;
//! if n_panels == 0 {
//!     report.add_error(ValidationError::EmptyGeometry {
//!         what: "panel mesh",
//!     });
//! }
//! assert!(report.has_errors());
//! ```

use std::fmt;

/// 验证报告
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// 错误列表
    pub errors: Vec<ValidationError>,
    /// 警告列表
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// 创建空的验证报告
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加错误
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// 是否有错误
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// 是否有警告
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// 是否通过（无错误）
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// 合并另一份报告
    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "验证报告: {} 错误, {} 警告",
            self.errors.len(),
            self.warnings.len()
        )?;
        for e in &self.errors {
            writeln!(f, "  [E] {}", e)?;
        }
        for w in &self.warnings {
            writeln!(f, "  [W] {}", w)?;
        }
        Ok(())
    }
}

/// 验证错误
#[derive(Debug, Clone)]
pub enum ValidationError {
    /// 空几何
    EmptyGeometry {
        /// 对象描述
        what: &'static str,
    },
    /// 数值超出范围
    OutOfRange {
        /// 字段名
        field: &'static str,
        /// 实际值
        value: f64,
        /// 最小允许值
        min: f64,
        /// 最大允许值
        max: f64,
    },
    /// 非有限数值
    NotFinite {
        /// 字段名
        field: &'static str,
        /// 元素索引
        index: usize,
    },
    /// 退化面元
    DegeneratePanel {
        /// 面元索引
        index: usize,
        /// 面积
        area: f64,
    },
    /// 扫掠范围非法（min≠max 但 increment=0）
    InvalidRange {
        /// 描述
        message: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGeometry { what } => write!(f, "空几何: {}", what),
            Self::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(f, "{}={} 超出范围 [{}, {}]", field, value, min, max),
            Self::NotFinite { field, index } => {
                write!(f, "{}[{}] 非有限", field, index)
            }
            Self::DegeneratePanel { index, area } => {
                write!(f, "面元 {} 退化 (面积={:.3e})", index, area)
            }
            Self::InvalidRange { message } => write!(f, "非法扫掠范围: {}", message),
        }
    }
}

/// 验证警告
#[derive(Debug, Clone)]
pub enum ValidationWarning {
    /// 面元长宽比过大
    HighAspectPanel {
        /// 面元索引
        index: usize,
        /// 长宽比
        aspect: f64,
    },
    /// 扫掠步长不整除区间，终点将被钳制
    SweepClamped {
        /// 描述
        message: String,
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HighAspectPanel { index, aspect } => {
                write!(f, "面元 {} 长宽比过大 ({:.1})", index, aspect)
            }
            Self::SweepClamped { message } => write!(f, "{}", message),
        }
    }
}

/// 检查切片中的值全部有限
pub fn check_finite(field: &'static str, values: &[f64], report: &mut ValidationReport) {
    for (i, v) in values.iter().enumerate() {
        if !v.is_finite() {
            report.add_error(ValidationError::NotFinite { field, index: i });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_merge() {
        let mut a = ValidationReport::new();
        a.add_error(ValidationError::EmptyGeometry { what: "mesh" });

        let mut b = ValidationReport::new();
        b.add_warning(ValidationWarning::HighAspectPanel {
            index: 3,
            aspect: 25.0,
        });

        a.merge(b);
        assert!(a.has_errors());
        assert!(a.has_warnings());
        assert!(!a.is_valid());
    }

    #[test]
    fn test_check_finite() {
        let mut report = ValidationReport::new();
        check_finite("gamma", &[1.0, f64::NAN, 2.0], &mut report);
        assert_eq!(report.errors.len(), 1);
    }
}
