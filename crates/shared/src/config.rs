//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::error::{Result, SimError};
use crate::observability::ObservabilityConfig;

/// 空闲会话的选取策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionPolicy {
    /// 随机挑选下标，直到命中空闲会话
    ///
    /// 高负载下可能让个别会话长期得不到调度，这是可以接受的。
    #[default]
    RandomScan,
    /// 先进先出的空闲队列，结果确定且不会饿死
    IdleQueue,
}

/// 事件输出方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// 通过 tracing 输出结构化日志
    #[default]
    Tracing,
    /// 每行一个 JSON 对象，写到标准输出
    JsonLines,
}

/// 模拟规模配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// 模拟用户数量
    pub max_users: usize,
    /// 同时执行的步骤上限
    pub simultaneous_logs: usize,
    /// 商品数量
    pub nb_products: usize,
    /// 初始库存上限（不含）
    pub max_quantities: u32,
    /// 库存低于该值时输出低库存告警
    pub low_stock_threshold: u32,
    /// 首次查看历史订单时生成的订单数上限（不含）
    pub max_seeded_orders: usize,
    /// 随机种子，为空时使用系统熵
    pub seed: Option<u64>,
    pub admission: AdmissionPolicy,
    /// 为 true 时，查看历史订单事件按 info 级别输出
    pub strict_severity: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_users: 100,
            simultaneous_logs: 20,
            nb_products: 100,
            max_quantities: 20,
            low_stock_threshold: 10,
            max_seeded_orders: 10,
            seed: None,
            admission: AdmissionPolicy::RandomScan,
            strict_severity: false,
        }
    }
}

/// 思考时间配置
///
/// 所有延时都以 `unit_ms` 为单位，0 表示不等待。
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    pub unit_ms: u64,
    /// 等待找回密码邮件
    pub forgot_password_units: u32,
    /// 登录失败后的等待
    pub login_failure_units: u32,
    /// 安全支付的等待
    pub payment_units: u32,
    /// 浏览商店的随机等待上限（不含）
    pub max_browse_units: u32,
    /// 浏览历史订单的随机等待上限（不含）
    pub max_history_units: u32,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            unit_ms: 1000,
            forgot_password_units: 10,
            login_failure_units: 5,
            payment_units: 5,
            max_browse_units: 5,
            max_history_units: 5,
        }
    }
}

/// 事件输出配置
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    pub kind: SinkKind,
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub simulation: SimulationConfig,
    pub delays: DelayConfig,
    pub sink: SinkConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. {config_dir}/default.toml（默认配置）
    /// 2. {config_dir}/{environment}.toml（环境特定配置）
    /// 3. {config_dir}/{service_name}.toml（服务特定配置）
    /// 4. 环境变量（ACTIVITY_ 前缀，嵌套用双下划线，如 ACTIVITY_SIMULATION__MAX_USERS）
    pub fn load(service_name: &str, config_dir: Option<&str>) -> Result<Self> {
        // .env 文件可选
        let _ = dotenvy::dotenv();

        let env = std::env::var("ACTIVITY_ENV").unwrap_or_else(|_| "development".to_string());
        let config_dir = config_dir
            .map(str::to_string)
            .or_else(|| std::env::var("CONFIG_DIR").ok())
            .unwrap_or_else(|| "config".to_string());

        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env.clone())?
            .add_source(File::from(Path::new(&config_dir).join("default.toml")).required(false))
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", env))).required(false),
            )
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", service_name)))
                    .required(false),
            )
            .add_source(
                Environment::with_prefix("ACTIVITY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.observability.service_name = config.service_name.clone();
        config.validate()?;

        Ok(config)
    }

    /// 校验配置的取值范围
    ///
    /// 随机数区间为空会导致采样 panic，因此这里提前拒绝。
    pub fn validate(&self) -> Result<()> {
        let sim = &self.simulation;
        if sim.max_users == 0 {
            return Err(SimError::invalid_config(
                "simulation.max_users",
                "至少需要一个模拟用户",
            ));
        }
        if sim.simultaneous_logs == 0 {
            return Err(SimError::invalid_config(
                "simulation.simultaneous_logs",
                "并发上限必须大于 0",
            ));
        }
        if sim.nb_products == 0 {
            return Err(SimError::invalid_config(
                "simulation.nb_products",
                "至少需要一个商品",
            ));
        }
        if sim.max_quantities == 0 {
            return Err(SimError::invalid_config(
                "simulation.max_quantities",
                "初始库存上限必须大于 0",
            ));
        }
        Ok(())
    }
}
