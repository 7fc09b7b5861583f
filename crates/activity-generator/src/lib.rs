//! Activity Generator
//!
//! 模拟电商用户行为的日志生成器：大量模拟用户在共享库存上做有限状态的随机游走，
//! 每一步产生一条结构化事件。
//!
//! # 主要模块
//!
//! - `models`: 会话、商品、事件
//! - `store`: 共享库存
//! - `generators`: 标识符、名称与初始数据
//! - `engine`: 单步状态转移
//! - `scheduler`: 有界并发调度
//! - `sink`: 事件输出
//!
//! # 使用示例
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use activity_generator::engine::{BehaviorEngine, EngineSettings, SimulatedClock};
//! use activity_generator::generators::{FakeNameSupplier, Population, PopulationConfig, UuidGenerator};
//! use activity_generator::scheduler::{Scheduler, SchedulerConfig};
//! use activity_generator::sink::MemorySink;
//! use rand::SeedableRng;
//!
//! # async fn demo() -> activity_shared::error::Result<()> {
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let population = Population::generate(
//!     &PopulationConfig::default(),
//!     &FakeNameSupplier,
//!     &UuidGenerator,
//!     &mut rng,
//! );
//!
//! let sink = Arc::new(MemorySink::new());
//! let engine = Arc::new(BehaviorEngine::new(
//!     Arc::new(population.inventory),
//!     sink.clone(),
//!     Arc::new(UuidGenerator),
//!     Arc::new(SimulatedClock::new()),
//!     EngineSettings::default(),
//! ));
//!
//! let scheduler = Scheduler::new(engine, population.sessions, SchedulerConfig::default());
//! let report = scheduler.run_steps(1_000).await?;
//! assert_eq!(report.steps_launched, 1_000);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod engine;
pub mod generators;
pub mod models;
pub mod scheduler;
pub mod sink;
pub mod store;
