//! Activity Generator CLI
//!
//! 日志生成器的命令行入口点。

use anyhow::Context;
use clap::Parser;

use activity_generator::cli::{Cli, CommandRunner, Commands};
use activity_shared::config::AppConfig;
use activity_shared::observability;

const SERVICE_NAME: &str = "activity-generator";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config =
        AppConfig::load(SERVICE_NAME, cli.config_dir.as_deref()).context("加载配置失败")?;

    // RUST_LOG 仍然优先于命令行参数
    if let Some(level) = cli.log_level.clone() {
        config.observability.log_level = level;
    }
    // walk / catalog 的标准输出是数据本身
    if matches!(cli.command, Commands::Walk { .. } | Commands::Catalog { .. }) {
        config.observability.log_to_stderr = true;
    }

    let _guard = observability::init(&config.observability)?;
    let runner = CommandRunner::new(config);

    match cli.command {
        Commands::Run(args) => {
            runner.run_simulation(args).await?;
        }
        Commands::Walk {
            steps,
            seed,
            products,
        } => {
            runner.run_walk(steps, seed, products).await?;
        }
        Commands::Catalog {
            products,
            max_quantity,
            seed,
            output,
        } => {
            runner
                .run_catalog(products, max_quantity, seed, output)
                .await?;
        }
    }

    Ok(())
}
