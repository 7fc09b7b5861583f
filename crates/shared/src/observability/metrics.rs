//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::info;

/// 初始化 Prometheus 指标导出
///
/// 在指定端口启动 HTTP 监听器暴露 `/metrics`，需要处于 tokio 运行时内。
pub fn init(service_name: &str, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    register_common_metrics(service_name);
    info!("Metrics server listening on {}", addr);

    Ok(())
}

/// 注册通用指标描述
fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!(
        "activity_events_total",
        "Total number of simulated activity events"
    );
    metrics::describe_counter!("activity_steps_total", "Total number of engine steps");
    metrics::describe_histogram!(
        "activity_step_duration_seconds",
        "Engine step duration in seconds, think time included"
    );
    metrics::describe_gauge!("activity_steps_in_flight", "Steps currently executing");
    metrics::describe_gauge!("activity_product_stock", "Remaining stock per product");

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

// ============================================================================
// 便捷的指标记录函数
// ============================================================================

/// 记录一条模拟事件
#[inline]
pub fn record_activity_event(kind: &'static str, severity: &'static str) {
    metrics::counter!(
        "activity_events_total",
        "kind" => kind,
        "severity" => severity
    )
    .increment(1);
}

/// 记录一次引擎步骤
#[inline]
pub fn record_step(state: &'static str, status: &'static str, duration_secs: f64) {
    metrics::counter!(
        "activity_steps_total",
        "state" => state,
        "status" => status
    )
    .increment(1);

    metrics::histogram!(
        "activity_step_duration_seconds",
        "state" => state
    )
    .record(duration_secs);
}

/// 更新当前执行中的步骤数
#[inline]
pub fn set_steps_in_flight(count: usize) {
    metrics::gauge!("activity_steps_in_flight").set(count as f64);
}

/// 更新商品库存
#[inline]
pub fn set_product_stock(product_id: &str, stock: u32) {
    metrics::gauge!(
        "activity_product_stock",
        "product" => product_id.to_string()
    )
    .set(f64::from(stock));
}
