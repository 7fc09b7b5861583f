//! tracing 输出端
//!
//! 把事件转成 `activity` target 下的结构化日志，级别与事件级别一致。
//! 配合 JSON 格式的 subscriber，每条事件就是一行 JSON 日志。

use tracing::{error, info, warn};

use super::EventSink;
use crate::models::{ActivityEvent, Severity};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &ActivityEvent) {
        let fields = &event.fields;
        match event.severity {
            Severity::Info => info!(
                target: "activity",
                uuid = %event.user_id,
                evt = event.kind.as_str(),
                device = fields.device.as_deref(),
                product = fields.product.as_deref(),
                stocks = fields.stocks,
                order = fields.order.as_deref(),
                "{}",
                event.message
            ),
            Severity::Warning => warn!(
                target: "activity",
                uuid = %event.user_id,
                evt = event.kind.as_str(),
                device = fields.device.as_deref(),
                product = fields.product.as_deref(),
                stocks = fields.stocks,
                order = fields.order.as_deref(),
                "{}",
                event.message
            ),
            Severity::Error => error!(
                target: "activity",
                uuid = %event.user_id,
                evt = event.kind.as_str(),
                device = fields.device.as_deref(),
                product = fields.product.as_deref(),
                stocks = fields.stocks,
                order = fields.order.as_deref(),
                "{}",
                event.message
            ),
        }
    }
}
