//! 思考时间
//!
//! 模拟用户等待（输入密码、等邮件、支付）时只挂起当前步骤所在的任务。
//! 测试中用 SimulatedClock 代替真实睡眠，只累计逻辑时间。

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;

/// 挂起能力
#[async_trait]
pub trait ThinkTime: Send + Sync {
    async fn pause(&self, duration: Duration);
}

/// 基于 tokio 定时器的真实等待
#[derive(Debug, Clone, Copy, Default)]
pub struct RealTime;

#[async_trait]
impl ThinkTime for RealTime {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// 逻辑时钟
///
/// 不真正睡眠，只累计请求的等待时长，并让出一次调度以保留并发交错。
#[derive(Debug, Default)]
pub struct SimulatedClock {
    elapsed_ms: AtomicU64,
    pauses: AtomicU64,
}

impl SimulatedClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// 累计的逻辑等待时长
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms.load(Ordering::Relaxed))
    }

    /// 发生过的等待次数
    pub fn pauses(&self) -> u64 {
        self.pauses.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ThinkTime for SimulatedClock {
    async fn pause(&self, duration: Duration) {
        let ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self.elapsed_ms.fetch_add(ms, Ordering::Relaxed);
        self.pauses.fetch_add(1, Ordering::Relaxed);
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simulated_clock_accumulates() {
        let clock = SimulatedClock::new();
        clock.pause(Duration::from_secs(5)).await;
        clock.pause(Duration::from_millis(250)).await;

        assert_eq!(clock.elapsed(), Duration::from_millis(5250));
        assert_eq!(clock.pauses(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_real_time_uses_tokio_timer() {
        let start = tokio::time::Instant::now();
        RealTime.pause(Duration::from_secs(10)).await;
        assert!(start.elapsed() >= Duration::from_secs(10));
    }
}
