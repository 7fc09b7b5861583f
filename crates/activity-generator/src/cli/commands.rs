//! CLI 命令定义
//!
//! 使用 clap derive 宏定义命令行接口结构。
//! 命令行参数优先于配置文件与环境变量。

use clap::{Args, Parser, Subcommand, ValueEnum};

use activity_shared::config::{AdmissionPolicy, SinkKind};

/// 电商用户行为日志生成器
///
/// 模拟大量用户在共享库存上登录、浏览、加购、下单、支付，输出结构化事件流。
#[derive(Parser, Debug)]
#[command(name = "activity-generator")]
#[command(version, about = "模拟电商用户行为的日志生成器")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)，默认取配置文件
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// 配置目录
    #[arg(long, global = true)]
    pub config_dir: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 启动并发模拟
    ///
    /// 持续运行直到 Ctrl+C，或派生了 `--steps` 个步骤。
    Run(RunArgs),

    /// 单会话顺序游走
    ///
    /// 使用逻辑时钟，不真正等待；每条事件按 JSON 行打印到标准输出。
    Walk {
        /// 步骤数
        #[arg(short, long, default_value = "50")]
        steps: usize,

        /// 随机种子，设置后结果可复现
        #[arg(long)]
        seed: Option<u64>,

        /// 商品数量
        #[arg(long)]
        products: Option<usize>,
    },

    /// 生成初始库存
    Catalog {
        /// 商品数量
        #[arg(long)]
        products: Option<usize>,

        /// 初始库存上限（不含）
        #[arg(long)]
        max_quantity: Option<u32>,

        /// 随机种子
        #[arg(long)]
        seed: Option<u64>,

        /// 输出到文件（JSON 格式），默认打印到标准输出
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// `run` 子命令参数，未指定的项沿用配置
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// 模拟用户数量
    #[arg(short, long)]
    pub users: Option<usize>,

    /// 同时执行的步骤数上限
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// 商品数量
    #[arg(long)]
    pub products: Option<usize>,

    /// 初始库存上限（不含）
    #[arg(long)]
    pub max_quantity: Option<u32>,

    /// 随机种子
    #[arg(long)]
    pub seed: Option<u64>,

    /// 派生指定数量的步骤后停止
    #[arg(long)]
    pub steps: Option<u64>,

    /// 事件输出方式
    #[arg(long, value_enum)]
    pub sink: Option<SinkArg>,

    /// 空闲会话的选取策略
    #[arg(long, value_enum)]
    pub admission: Option<AdmissionArg>,

    /// 一个等待单位的毫秒数，0 表示不等待
    #[arg(long)]
    pub delay_unit_ms: Option<u64>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkArg {
    Tracing,
    Json,
}

impl From<SinkArg> for SinkKind {
    fn from(arg: SinkArg) -> Self {
        match arg {
            SinkArg::Tracing => SinkKind::Tracing,
            SinkArg::Json => SinkKind::JsonLines,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionArg {
    RandomScan,
    IdleQueue,
}

impl From<AdmissionArg> for AdmissionPolicy {
    fn from(arg: AdmissionArg) -> Self {
        match arg {
            AdmissionArg::RandomScan => AdmissionPolicy::RandomScan,
            AdmissionArg::IdleQueue => AdmissionPolicy::IdleQueue,
        }
    }
}

// ============================================================================
// 单元测试
// ============================================================================
