//! JSON Lines 输出端
//!
//! 每条事件序列化为一行 JSON，适合直接喂给日志采集管道。

use std::io::{self, Write};

use parking_lot::Mutex;
use tracing::warn;

use super::EventSink;
use crate::models::ActivityEvent;

pub struct JsonLinesSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonLinesSink {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// 写到标准输出
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    fn write_line(&self, event: &ActivityEvent) -> activity_shared::error::Result<()> {
        let line = serde_json::to_string(event)?;
        let mut writer = self.writer.lock();
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

impl EventSink for JsonLinesSink {
    fn emit(&self, event: &ActivityEvent) {
        // 输出失败不影响模拟本身
        if let Err(e) = self.write_line(event) {
            warn!(error = %e, evt = event.kind.as_str(), "事件写出失败");
        }
    }
}
