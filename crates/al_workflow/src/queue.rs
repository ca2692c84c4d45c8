// crates/al_workflow/src/queue.rs

//! 任务消息队列
//!
//! 求解线程与驱动/GUI 线程之间唯一的跨线程通道：
//! 单生产者（求解线程）/单消费者（驱动线程）的无界通道。
//! 推送从不阻塞；消费方可阻塞等待或轮询排空。
//!
//! 消息按值传递，快照在入队前拷出，队列两侧不共享可变状态。
//! 消费方停滞时队列无界增长是已记录的运行风险，本层不处理。

use std::sync::mpsc;

use al_solver::kernel::Vorton;
use serde::{Deserialize, Serialize};

use crate::status::AnalysisStatus;

/// 每次迭代的实时快照
///
/// 按值穿过队列：涡粒子行、控制参数与日志文本在入队时拷出。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VpwReport {
    /// 工况索引
    pub qrhs: usize,
    /// 当前控制参数值
    pub control: f64,
    /// 尾流迭代序号
    pub iteration: usize,
    /// 涡粒子行快照
    pub vorton_rows: Vec<Vec<Vorton>>,
    /// 本次迭代的日志文本
    pub log: String,
}

/// 任务消息
#[derive(Debug, Clone)]
pub enum TaskMessage {
    /// 日志文本
    Log(String),
    /// 进度更新
    Progress {
        /// 已完成工况数
        done: usize,
        /// 总工况数
        total: usize,
        /// 当前控制参数值
        control: f64,
    },
    /// 实时快照
    Report(Box<VpwReport>),
    /// 任务结束（终止状态）
    Finished(AnalysisStatus),
}

/// 发送端（求解线程持有）
#[derive(Debug, Clone)]
pub struct TaskSender {
    tx: mpsc::Sender<TaskMessage>,
}

impl TaskSender {
    /// 推送消息（从不阻塞；消费端已断开时静默丢弃）
    pub fn push(&self, message: TaskMessage) {
        let _ = self.tx.send(message);
    }

    /// 推送日志行
    pub fn log(&self, text: impl Into<String>) {
        self.push(TaskMessage::Log(text.into()));
    }
}

/// 接收端（驱动/GUI 线程持有）
#[derive(Debug)]
pub struct TaskReceiver {
    rx: mpsc::Receiver<TaskMessage>,
}

impl TaskReceiver {
    /// 非阻塞接收
    pub fn try_recv(&self) -> Option<TaskMessage> {
        self.rx.try_recv().ok()
    }

    /// 阻塞接收（生产端断开时返回 None）
    pub fn recv(&self) -> Option<TaskMessage> {
        self.rx.recv().ok()
    }

    /// 排空当前队列中的全部消息
    pub fn drain(&self) -> Vec<TaskMessage> {
        let mut messages = Vec::new();
        while let Some(msg) = self.try_recv() {
            messages.push(msg);
        }
        messages
    }
}

/// 创建一对任务消息通道
pub fn task_channel() -> (TaskSender, TaskReceiver) {
    let (tx, rx) = mpsc::channel();
    (TaskSender { tx }, TaskReceiver { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_drain() {
        let (tx, rx) = task_channel();
        tx.log("step 1");
        tx.push(TaskMessage::Progress {
            done: 1,
            total: 10,
            control: 0.5,
        });
        let messages = rx.drain();
        assert_eq!(messages.len(), 2);
        assert!(matches!(messages[0], TaskMessage::Log(_)));
        assert!(matches!(messages[1], TaskMessage::Progress { done: 1, .. }));
    }

    #[test]
    fn test_push_never_fails_after_receiver_drop() {
        let (tx, rx) = task_channel();
        drop(rx);
        // 消费端断开后推送静默丢弃，不得 panic
        tx.log("into the void");
    }

    #[test]
    fn test_blocking_recv_across_threads() {
        let (tx, rx) = task_channel();
        let handle = std::thread::spawn(move || {
            tx.push(TaskMessage::Finished(AnalysisStatus::Finished));
        });
        let msg = rx.recv();
        assert!(matches!(
            msg,
            Some(TaskMessage::Finished(AnalysisStatus::Finished))
        ));
        handle.join().unwrap();
    }

    #[test]
    fn test_report_by_value() {
        let (tx, rx) = task_channel();
        let report = VpwReport {
            qrhs: 2,
            control: 5.0,
            iteration: 1,
            vorton_rows: vec![vec![]],
            log: "iter 1".into(),
        };
        tx.push(TaskMessage::Report(Box::new(report)));
        match rx.try_recv() {
            Some(TaskMessage::Report(r)) => {
                assert_eq!(r.qrhs, 2);
                assert_eq!(r.iteration, 1);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }
}
