//! 命令执行器
//!
//! 负责执行各 CLI 子命令的具体逻辑。
//! 把配置与命令行参数合并后组装引擎、调度器与输出端。

use std::fs;
use std::io::Write as _;
use std::sync::Arc;

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::watch;
use tracing::{info, warn};

use activity_shared::config::AppConfig;

use super::commands::RunArgs;
use crate::engine::{BehaviorEngine, EngineSettings, RealTime, SimulatedClock};
use crate::generators::{
    FakeNameSupplier, IdGenerator, Population, PopulationConfig, SequentialIdGenerator,
    UuidGenerator,
};
use crate::models::Session;
use crate::scheduler::{Scheduler, SchedulerConfig};
use crate::sink::{self, JsonLinesSink};

/// 命令执行器
///
/// 持有加载完成的配置，各命令在其副本上应用命令行覆盖。
pub struct CommandRunner {
    config: AppConfig,
}

impl CommandRunner {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 执行 run 命令
    ///
    /// 生成用户与库存，按并发上限持续调度，直到 Ctrl+C 或达到步数。
    pub async fn run_simulation(&self, args: RunArgs) -> Result<()> {
        let config = apply_run_args(&self.config, &args)?;
        let sim = &config.simulation;

        info!(
            users = sim.max_users,
            concurrency = sim.simultaneous_logs,
            products = sim.nb_products,
            max_quantity = sim.max_quantities,
            seed = ?sim.seed,
            admission = ?sim.admission,
            sink = ?config.sink.kind,
            delay_unit_ms = config.delays.unit_ms,
            "启动模拟"
        );

        let ids: Arc<dyn IdGenerator> = Arc::new(UuidGenerator);
        let mut rng = seeded_rng(sim.seed);
        let population = Population::generate(
            &PopulationConfig::from(sim),
            &FakeNameSupplier,
            ids.as_ref(),
            &mut rng,
        );
        let initial_stock = population.inventory.total_quantity();

        let engine = Arc::new(BehaviorEngine::new(
            Arc::new(population.inventory),
            sink::from_kind(config.sink.kind),
            ids,
            Arc::new(RealTime),
            EngineSettings::from_config(sim, &config.delays),
        ));
        let scheduler = Scheduler::new(
            Arc::clone(&engine),
            population.sessions,
            SchedulerConfig::from(sim),
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        });

        let report = scheduler.run_with_limit(shutdown_rx, args.steps).await?;
        let final_stock = engine.inventory().total_quantity();

        println!("\n模拟运行结果:");
        println!("{}", "-".repeat(40));
        println!("派生步骤: {}", report.steps_launched);
        println!("成功步骤: {}", report.steps_completed);
        println!("失败步骤: {}", report.steps_failed);
        println!("并发峰值: {}", report.peak_in_flight);
        println!("初始库存: {}", initial_stock);
        println!("剩余库存: {}", final_stock);
        println!("执行耗时: {} ms", report.elapsed.as_millis());
        println!("{}", "-".repeat(40));

        if report.steps_failed > 0 {
            warn!(failed = report.steps_failed, "部分步骤执行失败");
        }

        Ok(())
    }

    /// 执行 walk 命令
    ///
    /// 单个会话顺序执行，逻辑时钟代替真实等待。设置种子时使用自增 ID，
    /// 除时间戳外输出可以复现。
    pub async fn run_walk(
        &self,
        steps: usize,
        seed: Option<u64>,
        products: Option<usize>,
    ) -> Result<()> {
        let mut config = self.config.clone();
        if let Some(products) = products {
            config.simulation.nb_products = products;
        }
        config.validate().context("walk 参数无效")?;

        let ids: Arc<dyn IdGenerator> = match seed {
            Some(_) => Arc::new(SequentialIdGenerator::new("walk")),
            None => Arc::new(UuidGenerator),
        };
        let mut rng = seeded_rng(seed);
        let inventory = Population::generate_inventory(
            &PopulationConfig::from(&config.simulation),
            ids.as_ref(),
            &mut rng,
        );

        let clock = Arc::new(SimulatedClock::new());
        let engine = BehaviorEngine::new(
            Arc::new(inventory),
            Arc::new(JsonLinesSink::stdout()),
            Arc::clone(&ids),
            clock.clone(),
            EngineSettings::from_config(&config.simulation, &config.delays),
        );

        let mut session = Session::new(ids.next_id(), "walker");
        info!(session = %session.id, steps, seed = ?seed, "开始单会话游走");

        for _ in 0..steps {
            engine
                .step(&mut session, &mut rng)
                .await
                .with_context(|| format!("会话在状态 {} 执行失败", session.state.as_str()))?;
        }

        info!(
            final_state = session.state.as_str(),
            cart = session.cart.len(),
            orders = session.orders.len(),
            simulated_ms = clock.elapsed().as_millis() as u64,
            "游走结束"
        );
        Ok(())
    }

    /// 执行 catalog 命令
    ///
    /// 生成初始库存，输出到文件或标准输出。
    pub async fn run_catalog(
        &self,
        products: Option<usize>,
        max_quantity: Option<u32>,
        seed: Option<u64>,
        output: Option<String>,
    ) -> Result<()> {
        let mut config = self.config.clone();
        if let Some(products) = products {
            config.simulation.nb_products = products;
        }
        if let Some(max_quantity) = max_quantity {
            config.simulation.max_quantities = max_quantity;
        }
        config.validate().context("catalog 参数无效")?;

        let ids: Arc<dyn IdGenerator> = match seed {
            Some(_) => Arc::new(SequentialIdGenerator::new("prod")),
            None => Arc::new(UuidGenerator),
        };
        let inventory = Population::generate_inventory(
            &PopulationConfig::from(&config.simulation),
            ids.as_ref(),
            &mut seeded_rng(seed),
        );

        let json = serde_json::to_string_pretty(&inventory.snapshot()).context("序列化库存失败")?;

        match output {
            Some(path) => {
                let mut file = fs::File::create(&path).context("创建输出文件失败")?;
                file.write_all(json.as_bytes()).context("写入文件失败")?;
                info!(
                    path,
                    products = inventory.len(),
                    total_stock = inventory.total_quantity(),
                    "库存已输出到文件"
                );
            }
            None => println!("{json}"),
        }

        Ok(())
    }
}

/// 把 run 命令参数合并进配置并重新校验
pub fn apply_run_args(base: &AppConfig, args: &RunArgs) -> Result<AppConfig> {
    let mut config = base.clone();
    let sim = &mut config.simulation;

    if let Some(users) = args.users {
        sim.max_users = users;
    }
    if let Some(concurrency) = args.concurrency {
        sim.simultaneous_logs = concurrency;
    }
    if let Some(products) = args.products {
        sim.nb_products = products;
    }
    if let Some(max_quantity) = args.max_quantity {
        sim.max_quantities = max_quantity;
    }
    if args.seed.is_some() {
        sim.seed = args.seed;
    }
    if let Some(admission) = args.admission {
        sim.admission = admission.into();
    }
    if let Some(sink) = args.sink {
        config.sink.kind = sink.into();
    }
    if let Some(unit_ms) = args.delay_unit_ms {
        config.delays.unit_ms = unit_ms;
    }

    config.validate().context("run 参数无效")?;
    Ok(config)
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// 等待关闭信号
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("收到关闭信号，正在停止模拟..."),
        Err(e) => {
            warn!(error = %e, "安装 CTRL+C 信号处理器失败，只能等待步数上限");
            std::future::pending::<()>().await;
        }
    }
}
