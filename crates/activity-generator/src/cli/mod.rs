//! CLI 模块
//!
//! 提供命令行接口，支持以下功能：
//!
//! - `run` - 并发模拟大量用户，持续输出事件
//! - `walk` - 单个会话顺序游走，便于观察状态机
//! - `catalog` - 生成初始库存
//!
//! # 使用示例
//!
//! ```bash
//! # 500 个用户、50 并发，跑 10000 步后停止
//! activity-generator run -u 500 -c 50 --steps 10000 --sink json
//!
//! # 可复现的单会话游走
//! activity-generator walk --steps 30 --seed 42
//!
//! # 输出库存
//! activity-generator catalog --products 20 -o stock.json
//! ```

pub mod commands;
pub mod runner;

pub use commands::{AdmissionArg, Cli, Commands, RunArgs, SinkArg};
pub use runner::{CommandRunner, apply_run_args};
