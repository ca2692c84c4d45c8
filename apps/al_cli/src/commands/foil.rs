// apps/al_cli/src/commands/foil.rs

//! 翼型极曲线命令
//!
//! 生成 NACA 翼型与 T1 定速极曲线，在工作线程上运行二维
//! 序列器，驱动线程消费消息队列并输出进度与结果表。

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use parking_lot::RwLock;
use tracing::{info, warn};

use al_geom::foil::Foil;
use al_geom::polar::Polar2d;
use al_solver::section::ThinFoilEngine;
use al_workflow::queue::{task_channel, TaskMessage};
use al_workflow::{AnalysisRange, SweepVariable, XfoilTask};

/// 翼型极曲线分析参数
#[derive(Args)]
pub struct FoilArgs {
    /// NACA 四位数字
    #[arg(long, default_value = "2410")]
    pub naca: String,

    /// 雷诺数
    #[arg(long, default_value = "100000")]
    pub reynolds: f64,

    /// 迎角起点 [°]
    #[arg(long, default_value = "0.0")]
    pub alpha_min: f64,

    /// 迎角终点 [°]
    #[arg(long, default_value = "9.0")]
    pub alpha_max: f64,

    /// 迎角步长 [°]
    #[arg(long, default_value = "1.0")]
    pub alpha_step: f64,

    /// 翼型表面点数
    #[arg(long, default_value = "80")]
    pub points: usize,

    /// 丢弃逐点对象，只保留极曲线（大批量模式）
    #[arg(long)]
    pub no_opps: bool,

    /// 极曲线 JSON 输出路径
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// 执行翼型分析命令
pub fn execute(args: FoilArgs) -> Result<()> {
    info!("=== 翼型极曲线分析 ===");

    let foil = Arc::new(
        Foil::naca4(&args.naca, args.points).context("生成 NACA 翼型失败")?,
    );
    let polar_name = format!("T1_Re{:.3}_M0.00", args.reynolds / 1e6);
    let polar = Arc::new(RwLock::new(Polar2d::fixed_speed(
        polar_name,
        foil.name.clone(),
        args.reynolds,
    )));
    info!(
        "翼型: {} / Re={:.0} / 迎角 {}°→{}° 步长 {}°",
        foil.name, args.reynolds, args.alpha_min, args.alpha_max, args.alpha_step
    );

    let (tx, rx) = task_channel();
    let mut task = XfoilTask::new(Arc::new(ThinFoilEngine::default()), tx);
    task.initialize(foil, polar.clone(), !args.no_opps)
        .context("任务初始化失败")?;
    task.append_range(
        SweepVariable::Alpha,
        AnalysisRange::new(args.alpha_min, args.alpha_max, args.alpha_step),
    )
    .context("扫掠范围无效")?;

    // 工作线程求解，本线程消费队列
    let worker = std::thread::spawn(move || {
        let status = task.run();
        (task, status)
    });

    loop {
        match rx.recv() {
            Some(TaskMessage::Log(line)) => info!("{}", line),
            Some(TaskMessage::Progress { done, total, control }) => {
                info!("进度 {}/{} (alpha={:.1}°)", done, total, control)
            }
            Some(TaskMessage::Finished(status)) => {
                info!("任务终止: {}", status);
                break;
            }
            Some(_) => {}
            None => break,
        }
    }

    let (task, status) = worker.join().expect("求解线程 panic");
    status.context("任务执行失败")?;
    if task.has_errors() {
        warn!("任务带错误结束，结果可能不完整");
    }

    // 结果表
    let polar_guard = polar.read();
    println!("\n  alpha      Cl        Cd        Cm     XTr_top  XTr_bot");
    for i in 0..polar_guard.n_points() {
        println!(
            "  {:5.1}  {:8.4}  {:8.5}  {:7.4}  {:7.3}  {:7.3}",
            polar_guard.alpha[i],
            polar_guard.cl[i],
            polar_guard.cd[i],
            polar_guard.cm[i],
            polar_guard.xtr_top[i],
            polar_guard.xtr_bot[i],
        );
    }
    println!("  共 {} 个收敛工况点", polar_guard.n_points());

    if let Some(path) = &args.output {
        polar_guard
            .save_to_file(path)
            .context("写入极曲线文件失败")?;
        info!("极曲线已保存: {}", path.display());
    }

    Ok(())
}
