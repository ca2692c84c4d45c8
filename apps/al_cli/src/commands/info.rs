// apps/al_cli/src/commands/info.rs

//! 信息命令

use anyhow::Result;
use clap::Args;

use al_solver::kernel::CoreModel;

/// 信息参数
#[derive(Args)]
pub struct InfoArgs {
    /// 显示涡核模型列表
    #[arg(long)]
    pub core_models: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    println!("AeroLattice v{}", env!("CARGO_PKG_VERSION"));
    println!("三维涡格/涡粒子尾流气动分析套件");
    println!();
    println!("组件:");
    println!("  al_foundation  错误类型与数值容差");
    println!("  al_geom        面元几何与翼型/帆装");
    println!("  al_solver      诱导速度核、尾流与影响系数系统");
    println!("  al_workflow    分析任务与消息队列");

    if args.core_models {
        println!();
        println!("涡核正则化模型:");
        for model in CoreModel::ALL {
            let sample = model.factor(0.5, 1.0);
            println!("  {:12} f(0.5·core) = {:.4}", model.name(), sample);
        }
    }

    Ok(())
}
