//! 标识符生成
//!
//! 商品、会话、订单的 ID 都来自注入的 IdGenerator，测试中可以替换为确定性的实现。

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// 订单号长度
pub const SHORT_ID_LEN: usize = 8;

/// 标识符生成器
#[cfg_attr(test, mockall::automock)]
pub trait IdGenerator: Send + Sync {
    /// 生成全局唯一的标识符
    fn next_id(&self) -> String;

    /// 生成短标识符，用作订单号
    fn short_id(&self) -> String {
        self.next_id().chars().take(SHORT_ID_LEN).collect()
    }
}

/// 基于 UUID v4 的生成器
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// 自增序号生成器
///
/// 输出形如 `{prefix}-00000001` 的 ID，结果可复现。
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new("id")
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{:08}", self.prefix, n)
    }

    fn short_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{:08x}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_uuid_generator_unique() {
        let ids: HashSet<String> = (0..100).map(|_| UuidGenerator.next_id()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_uuid_short_id_length() {
        let short = UuidGenerator.short_id();
        assert_eq!(short.len(), SHORT_ID_LEN);
        assert!(short.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_sequential_generator() {
        let ids = SequentialIdGenerator::new("order");
        assert_eq!(ids.next_id(), "order-00000001");
        assert_eq!(ids.next_id(), "order-00000002");
        assert_eq!(ids.short_id(), "00000003");
    }
}
