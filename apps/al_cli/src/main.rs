// apps/al_cli/src/main.rs

//! AeroLattice 命令行界面
//!
//! 提供翼型极曲线与三维格栅分析的命令行工具。
//!
//! # 架构层级
//!
//! 本模块属于应用层：只组合任务层公开接口，
//! 求解线程与消息队列的消费都在这里组织。

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// AeroLattice 气动分析命令行工具
#[derive(Parser)]
#[command(name = "al_cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "AeroLattice vortex-lattice analysis suite", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行二维翼型极曲线分析
    Foil(commands::foil::FoilArgs),
    /// 运行机翼迎角扫掠
    Wing(commands::wing::WingArgs),
    /// 显示信息
    Info(commands::info::InfoArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // 执行命令
    match cli.command {
        Commands::Foil(args) => commands::foil::execute(args),
        Commands::Wing(args) => commands::wing::execute(args),
        Commands::Info(args) => commands::info::execute(args),
    }
}
