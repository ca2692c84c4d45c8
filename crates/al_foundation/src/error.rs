// crates/al_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `AlError` 枚举和 `AlResult` 类型别名，用于整个项目的错误处理。
//!
//! # 设计原则
//!
//! 1. **层次化**: 基础层只定义核心错误，任务相关错误在 al_workflow 中定义
//! 2. **易用性**: 提供便捷的构造方法
//! 3. **可恢复性区分**: 几何错误是致命的（任务不得进入 RUNNING），
//!    收敛失败是逐点可恢复的（由任务层标记并跳过）
//!
//! # 示例
//!
//! ```
//! use al_foundation::error::{AlError, AlResult};
//!
//! fn check_mesh(n_panels: usize) -> AlResult<()> {
//!     if n_panels == 0 {
//!         return Err(AlError::geometry("网格没有面元"));
//!     }
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// 统一结果类型
pub type AlResult<T> = Result<T, AlError>;

/// AeroLattice 错误类型
///
/// 核心错误类型，用于整个项目。任务调度相关的错误在 `al_workflow` 中扩展。
#[derive(Error, Debug)]
pub enum AlError {
    // ========================================================================
    // 几何相关错误（致命）
    // ========================================================================
    /// 几何错误：空网格、退化面元等，检测到时任务不得启动
    #[error("几何错误: {message}")]
    Geometry {
        /// 具体错误信息
        message: String,
    },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    // ========================================================================
    // 数值相关错误
    // ========================================================================
    /// 数值错误：非有限中间量、奇异矩阵等
    #[error("数值错误: {message}")]
    Numerical {
        /// 具体错误信息
        message: String,
    },

    /// 数据超出范围
    #[error("数据超出范围: {field}={value}, 期望范围=[{min}, {max}]")]
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

    // ========================================================================
    // 配置相关错误
    // ========================================================================
    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        /// 具体错误信息
        message: String,
    },

    /// 配置值无效
    #[error("配置值无效: {key}={value}, 原因: {reason}")]
    InvalidConfig {
        /// 配置键名
        key: String,
        /// 配置值
        value: String,
        /// 无效原因说明
        reason: String,
    },

    // ========================================================================
    // IO 相关错误
    // ========================================================================
    /// IO 错误
    #[error("IO错误: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        /// 可选的底层 IO 错误
        #[source]
        source: Option<std::io::Error>,
    },

    /// 文件不存在
    #[error("文件不存在: {path}")]
    FileNotFound {
        /// 未找到的路径
        path: PathBuf,
    },

    /// 序列化错误
    #[error("序列化错误: {message}")]
    Serialization {
        /// 序列化失败原因
        message: String,
    },

    // ========================================================================
    // 运行控制
    // ========================================================================
    /// 任务取消（非错误语义，用于提前退出传播）
    #[error("任务取消")]
    Cancelled,

    /// 验证失败
    #[error("验证失败: {0}")]
    Validation(String),

    /// 内部错误
    #[error("内部错误: {message}")]
    Internal {
        /// 内部错误描述
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl AlError {
    /// 几何错误
    pub fn geometry(message: impl Into<String>) -> Self {
        Self::Geometry {
            message: message.into(),
        }
    }

    /// 数值错误
    pub fn numerical(message: impl Into<String>) -> Self {
        Self::Numerical {
            message: message.into(),
        }
    }

    /// 数据超出范围
    pub fn out_of_range(field: &'static str, value: f64, min: f64, max: f64) -> Self {
        Self::OutOfRange {
            field,
            value,
            min,
            max,
        }
    }

    /// 数组大小不匹配
    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }

    /// 配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 配置值无效
    pub fn invalid_config(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// 从IO错误创建
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// 从IO错误创建（带源）
    pub fn io_with_source(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(source),
        }
    }

    /// 文件不存在
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// 序列化错误
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// 内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// 是否为致命错误（任务不应继续）
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Geometry { .. } | Self::SizeMismatch { .. } | Self::Internal { .. }
        )
    }
}

impl From<std::io::Error> for AlError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AlError::geometry("网格没有面元");
        assert!(err.to_string().contains("几何错误"));

        let err = AlError::out_of_range("alpha", 100.0, -20.0, 20.0);
        assert!(err.to_string().contains("alpha"));
    }

    #[test]
    fn test_fatal_classification() {
        assert!(AlError::geometry("empty").is_fatal());
        assert!(!AlError::numerical("diverged").is_fatal());
        assert!(!AlError::Cancelled.is_fatal());
    }

    #[test]
    fn test_io_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: AlError = io_err.into();
        assert!(matches!(err, AlError::Io { .. }));
    }
}
