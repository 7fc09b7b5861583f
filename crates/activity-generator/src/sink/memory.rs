//! 内存输出端
//!
//! 把事件保存在内存中，供测试断言与 `walk` 命令使用。

use std::collections::HashMap;

use parking_lot::Mutex;

use super::EventSink;
use crate::models::{ActivityEvent, EventKind, Severity};

#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<ActivityEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已收到事件的克隆
    pub fn events(&self) -> Vec<ActivityEvent> {
        self.events.lock().clone()
    }

    /// 取出并清空已收到的事件
    pub fn drain(&self) -> Vec<ActivityEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// 按事件类型计数
    pub fn count_by_kind(&self) -> HashMap<EventKind, usize> {
        let mut counts = HashMap::new();
        for event in self.events.lock().iter() {
            *counts.entry(event.kind).or_insert(0) += 1;
        }
        counts
    }

    /// 按事件级别计数
    pub fn count_by_severity(&self) -> HashMap<Severity, usize> {
        let mut counts = HashMap::new();
        for event in self.events.lock().iter() {
            *counts.entry(event.severity).or_insert(0) += 1;
        }
        counts
    }

    /// 某个用户的全部事件，按发出顺序
    pub fn events_for(&self, user_id: &str) -> Vec<ActivityEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &ActivityEvent) {
        self.events.lock().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_counts() {
        let sink = MemorySink::new();
        sink.emit(&ActivityEvent::info("a", EventKind::ShopBrowse, "visiting shop"));
        sink.emit(&ActivityEvent::info("b", EventKind::ShopBrowse, "visiting shop"));
        sink.emit(&ActivityEvent::error("a", EventKind::PayError, "Cannot Pay unexisting order"));

        assert_eq!(sink.len(), 3);
        assert_eq!(sink.count_by_kind()[&EventKind::ShopBrowse], 2);
        assert_eq!(sink.count_by_severity()[&Severity::Error], 1);
        assert_eq!(sink.events_for("a").len(), 2);

        let drained = sink.drain();
        assert_eq!(drained.len(), 3);
        assert!(sink.is_empty());
    }
}
