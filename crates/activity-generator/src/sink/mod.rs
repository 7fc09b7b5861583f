//! 事件输出模块
//!
//! 引擎每一步产生的事件都交给 EventSink。输出是即发即弃的，
//! 输出端不向引擎反馈确认，也不施加背压。

mod json;
mod memory;
mod tracing_sink;

pub use json::JsonLinesSink;
pub use memory::MemorySink;
pub use tracing_sink::TracingSink;

use std::sync::Arc;

use activity_shared::config::SinkKind;

use crate::models::ActivityEvent;

/// 事件输出 trait
///
/// 设计为同步接口，实现方需自行保证 emit 不会长时间阻塞。
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &ActivityEvent);
}

impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn emit(&self, event: &ActivityEvent) {
        (**self).emit(event)
    }
}

/// 根据配置创建输出端
pub fn from_kind(kind: SinkKind) -> Arc<dyn EventSink> {
    match kind {
        SinkKind::Tracing => Arc::new(TracingSink),
        SinkKind::JsonLines => Arc::new(JsonLinesSink::stdout()),
    }
}
