//! 统一可观测性模块
//!
//! 提供 logging 与 metrics 的统一初始化和管理。
//! 模拟器自身的诊断日志和指标都通过这里配置，与模拟产生的业务事件流相互独立。

pub mod metrics;
pub mod tracing;

use ::tracing::info;
use anyhow::Result;
use serde::Deserialize;

/// 可观测性配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// 服务名称，用于标识日志和指标的来源
    pub service_name: String,

    /// Prometheus 指标导出端口
    /// 为空时只记录指标，不启动 HTTP 端点
    pub metrics_port: Option<u16>,

    /// 日志级别（如 "info", "debug"）
    pub log_level: String,

    /// 是否启用 JSON 格式日志
    pub json_logs: bool,

    /// 诊断日志写到标准错误，标准输出只留给事件数据
    pub log_to_stderr: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "activity-generator".to_string(),
            metrics_port: None,
            log_level: default_log_level(),
            json_logs: false,
            log_to_stderr: false,
        }
    }
}

/// 可观测性资源守卫
///
/// 持有到进程退出为止，Drop 时输出关闭日志。
pub struct ObservabilityGuard {
    service_name: String,
}

impl Drop for ObservabilityGuard {
    fn drop(&mut self) {
        info!(service = %self.service_name, "Shutting down observability...");
    }
}

/// 统一初始化可观测性
///
/// 初始化顺序：
/// 1. Tracing（日志）
/// 2. Metrics（Prometheus 指标，仅在配置了端口时）
///
/// 必须在 tokio 运行时内调用，Prometheus HTTP 监听器依赖它。
pub fn init(config: &ObservabilityConfig) -> Result<ObservabilityGuard> {
    tracing::init(config)?;

    if let Some(port) = config.metrics_port {
        metrics::init(&config.service_name, port)?;
    }

    info!(
        service = %config.service_name,
        metrics_port = ?config.metrics_port,
        json_logs = config.json_logs,
        "Observability initialized"
    );

    Ok(ObservabilityGuard {
        service_name: config.service_name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.service_name, "activity-generator");
        assert_eq!(config.log_level, "info");
        assert!(config.metrics_port.is_none());
        assert!(!config.json_logs);
    }
}
