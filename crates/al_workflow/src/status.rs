// crates/al_workflow/src/status.rs

//! 任务状态机
//!
//! 任意时刻恰有一个状态成立。合法迁移：
//!
//! ```text
//! Pending ──run()──> Running ──┬──> Finished   （范围耗尽或致命错误）
//!                              └──> Cancelled  （协作式取消）
//! ```
//!
//! `run()` 之前请求取消的任务在 `run()` 开始时直接终止于
//! Cancelled，不计算任何工况。两个终止态对 `is_done` 等价。

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 任务ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// 创建新的任务ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// 获取内部UUID
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 分析任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    /// 等待启动
    #[default]
    Pending,
    /// 运行中
    Running,
    /// 已取消（提前停止，已完成工况有效）
    Cancelled,
    /// 已完成（正常结束或带错误结束）
    Finished,
}

impl AnalysisStatus {
    /// 是否为终止状态
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Finished)
    }

    /// 是否可以取消
    pub fn can_cancel(&self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }

    /// 是否允许迁移到目标状态
    pub fn can_transition_to(&self, next: AnalysisStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running)
                | (Self::Pending, Self::Cancelled)
                | (Self::Running, Self::Cancelled)
                | (Self::Running, Self::Finished)
        )
    }
}

impl std::fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Cancelled => "Cancelled",
            Self::Finished => "Finished",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!AnalysisStatus::Pending.is_done());
        assert!(!AnalysisStatus::Running.is_done());
        assert!(AnalysisStatus::Cancelled.is_done());
        assert!(AnalysisStatus::Finished.is_done());
    }

    #[test]
    fn test_transitions() {
        use AnalysisStatus::*;
        assert!(Pending.can_transition_to(Running));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Running.can_transition_to(Finished));
        assert!(Running.can_transition_to(Cancelled));
        // 终止态不再迁移
        assert!(!Finished.can_transition_to(Running));
        assert!(!Cancelled.can_transition_to(Running));
        assert!(!Finished.can_transition_to(Cancelled));
    }

    #[test]
    fn test_task_id_unique() {
        assert_ne!(TaskId::new(), TaskId::new());
    }
}
