// apps/al_cli/src/commands/wing.rs

//! 机翼扫掠命令
//!
//! 构建简单梯形翼并运行三维格栅迎角扫掠。

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{info, warn};

use al_geom::rig::Wing;
use al_solver::config::LatticeConfig;
use al_workflow::queue::{task_channel, TaskMessage};
use al_workflow::{AnalysisRange, PlaneTask};

/// 机翼扫掠参数
#[derive(Args)]
pub struct WingArgs {
    /// 展长 [m]
    #[arg(long, default_value = "8.0")]
    pub span: f64,

    /// 根弦长 [m]
    #[arg(long, default_value = "1.2")]
    pub root_chord: f64,

    /// 尖弦长 [m]
    #[arg(long, default_value = "0.8")]
    pub tip_chord: f64,

    /// 来流速度 [m/s]
    #[arg(long, default_value = "20.0")]
    pub speed: f64,

    /// 空气密度 [kg/m³]
    #[arg(long, default_value = "1.225")]
    pub density: f64,

    /// 迎角起点 [°]
    #[arg(long, default_value = "0.0")]
    pub alpha_min: f64,

    /// 迎角终点 [°]
    #[arg(long, default_value = "8.0")]
    pub alpha_max: f64,

    /// 迎角步长 [°]
    #[arg(long, default_value = "2.0")]
    pub alpha_step: f64,

    /// 弦向面元数
    #[arg(long, default_value = "4")]
    pub n_chord: usize,

    /// 展向面元数
    #[arg(long, default_value = "12")]
    pub n_span: usize,
}

/// 执行机翼扫掠命令
pub fn execute(args: WingArgs) -> Result<()> {
    info!("=== 机翼格栅分析 ===");

    let wing = Arc::new(Wing::trapezoidal(
        "trapezoidal-wing",
        args.span,
        args.root_chord,
        args.tip_chord,
    ));
    info!(
        "机翼: 展长 {} m / 参考面积 {:.3} m² / 格栅 {}×{}",
        args.span,
        wing.reference_area(),
        args.n_chord,
        args.n_span
    );

    let mut config = LatticeConfig::default();
    config.live_update = false;

    let (tx, rx) = task_channel();
    let mut task = PlaneTask::new(
        wing,
        args.speed,
        args.density,
        config,
        tx,
        args.n_chord,
        args.n_span,
    )
    .context("任务初始化失败")?;
    task.set_analysis_range(AnalysisRange::new(
        args.alpha_min,
        args.alpha_max,
        args.alpha_step,
    ))
    .context("扫掠范围无效")?;

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
    if task.has_warnings() {
        warn!("部分工况被跳过");
    }

    println!("\n  alpha      CL        CDi       升力[N]    阻力[N]");
    for opp in task.operating_points() {
        let lift = opp.forces.force.z;
        let drag = opp.forces.force.x;
        println!(
            "  {:5.1}  {:8.4}  {:8.5}  {:9.2}  {:9.3}",
            opp.alpha_deg, opp.forces.cl, opp.forces.cd, lift, drag
        );
    }
    println!("  共 {} 个工况点", task.operating_points().len());

    Ok(())
}
