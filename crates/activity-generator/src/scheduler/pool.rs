//! 会话池
//!
//! 保存全部会话，并以租约的形式把空闲会话交给步骤任务。
//! 同一时刻一个会话至多被一个租约持有，租约释放（Drop）时会话重新变为空闲。

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::Rng;
use tokio::sync::futures::Notified;
use tokio::sync::{Mutex as SessionMutex, MutexGuard, Notify};

use activity_shared::config::AdmissionPolicy;
use activity_shared::error::{Result, SimError};
use activity_shared::observability::metrics;

use crate::models::Session;

/// 准入控制状态，所有字段在同一把锁下修改
#[derive(Debug)]
struct ControlState {
    in_flight: usize,
    busy: Vec<bool>,
    /// 仅 `IdleQueue` 策略使用，按释放顺序排列
    idle: VecDeque<usize>,
    peak_in_flight: usize,
}

pub struct SessionPool {
    sessions: Vec<SessionMutex<Session>>,
    control: Mutex<ControlState>,
    released: Notify,
    max_in_flight: usize,
    policy: AdmissionPolicy,
}

impl SessionPool {
    /// 创建会话池
    ///
    /// 实际并发上限为 `min(max_in_flight, 会话数)`。
    pub fn new(sessions: Vec<Session>, max_in_flight: usize, policy: AdmissionPolicy) -> Self {
        let count = sessions.len();
        let idle = match policy {
            AdmissionPolicy::IdleQueue => (0..count).collect(),
            AdmissionPolicy::RandomScan => VecDeque::new(),
        };

        Self {
            sessions: sessions.into_iter().map(SessionMutex::new).collect(),
            control: Mutex::new(ControlState {
                in_flight: 0,
                busy: vec![false; count],
                idle,
                peak_in_flight: 0,
            }),
            released: Notify::new(),
            max_in_flight: max_in_flight.min(count),
            policy,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// 实际生效的并发上限
    pub fn capacity(&self) -> usize {
        self.max_in_flight
    }

    pub fn policy(&self) -> AdmissionPolicy {
        self.policy
    }

    pub fn in_flight(&self) -> usize {
        self.control.lock().in_flight
    }

    pub fn peak_in_flight(&self) -> usize {
        self.control.lock().peak_in_flight
    }

    /// 尝试租用一个空闲会话
    ///
    /// 并发已满（或没有会话）时返回 `None`，调用方应等待 [`released`](Self::released)。
    pub fn try_acquire<R>(self: &Arc<Self>, rng: &mut R) -> Option<SessionLease>
    where
        R: Rng + ?Sized,
    {
        let mut control = self.control.lock();
        if self.max_in_flight == 0 || control.in_flight >= self.max_in_flight {
            return None;
        }

        // in_flight < 会话数，所以一定存在空闲会话
        let index = match self.policy {
            AdmissionPolicy::RandomScan => loop {
                let candidate = rng.gen_range(0..self.sessions.len());
                if !control.busy[candidate] {
                    break candidate;
                }
            },
            AdmissionPolicy::IdleQueue => control.idle.pop_front()?,
        };

        control.busy[index] = true;
        control.in_flight += 1;
        control.peak_in_flight = control.peak_in_flight.max(control.in_flight);
        metrics::set_steps_in_flight(control.in_flight);

        Some(SessionLease {
            index,
            pool: Arc::clone(self),
        })
    }

    /// 等待任意租约释放
    ///
    /// 释放先于等待发生时会留下一个许可，不会丢失唤醒。
    pub fn released(&self) -> Notified<'_> {
        self.released.notified()
    }

    /// 全部会话的当前快照
    ///
    /// 会等待正在执行的步骤结束。
    pub async fn snapshot(&self) -> Vec<Session> {
        let mut sessions = Vec::with_capacity(self.sessions.len());
        for session in &self.sessions {
            sessions.push(session.lock().await.clone());
        }
        sessions
    }

    fn release(&self, index: usize) {
        let mut control = self.control.lock();
        control.busy[index] = false;
        control.in_flight = control.in_flight.saturating_sub(1);
        if self.policy == AdmissionPolicy::IdleQueue {
            control.idle.push_back(index);
        }
        metrics::set_steps_in_flight(control.in_flight);
        drop(control);

        self.released.notify_one();
    }
}

/// 会话租约
///
/// 持有期间独占对应会话，Drop 时自动归还。
pub struct SessionLease {
    index: usize,
    pool: Arc<SessionPool>,
}

impl SessionLease {
    pub fn index(&self) -> usize {
        self.index
    }

    /// 锁定租到的会话
    ///
    /// 租约保证独占，锁被占用说明准入状态已经损坏。
    pub fn lock(&self) -> Result<MutexGuard<'_, Session>> {
        self.pool.sessions[self.index].try_lock().map_err(|_| {
            SimError::InvariantViolation(format!("会话 {} 已被其他步骤占用", self.index))
        })
    }
}

impl Drop for SessionLease {
    fn drop(&mut self) {
        self.pool.release(self.index);
    }
}

impl std::fmt::Debug for SessionLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionLease")
            .field("index", &self.index)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn pool(count: usize, cap: usize, policy: AdmissionPolicy) -> Arc<SessionPool> {
        let sessions = (0..count)
            .map(|i| Session::new(format!("user-{i}"), format!("name {i}")))
            .collect();
        Arc::new(SessionPool::new(sessions, cap, policy))
    }

    #[test]
    fn test_capacity_is_bounded_by_sessions() {
        assert_eq!(pool(5, 20, AdmissionPolicy::RandomScan).capacity(), 5);
        assert_eq!(pool(100, 20, AdmissionPolicy::RandomScan).capacity(), 20);
    }

    #[test]
    fn test_acquire_up_to_cap() {
        let pool = pool(10, 3, AdmissionPolicy::RandomScan);
        let mut rng = StdRng::seed_from_u64(1);

        let leases: Vec<_> = (0..3).map(|_| pool.try_acquire(&mut rng).unwrap()).collect();
        assert!(pool.try_acquire(&mut rng).is_none());
        assert_eq!(pool.in_flight(), 3);

        // 租到的会话互不相同
        let distinct: HashSet<_> = leases.iter().map(SessionLease::index).collect();
        assert_eq!(distinct.len(), 3);

        drop(leases);
        assert_eq!(pool.in_flight(), 0);
        assert_eq!(pool.peak_in_flight(), 3);
        assert!(pool.try_acquire(&mut rng).is_some());
    }

    #[test]
    fn test_every_session_can_be_leased_at_once() {
        let pool = pool(4, 4, AdmissionPolicy::RandomScan);
        let mut rng = StdRng::seed_from_u64(2);

        let leases: Vec<_> = (0..4).map(|_| pool.try_acquire(&mut rng).unwrap()).collect();
        let distinct: HashSet<_> = leases.iter().map(SessionLease::index).collect();
        assert_eq!(distinct, (0..4).collect());
    }

    #[test]
    fn test_idle_queue_is_fifo() {
        let pool = pool(3, 2, AdmissionPolicy::IdleQueue);
        let mut rng = StdRng::seed_from_u64(3);

        let first = pool.try_acquire(&mut rng).unwrap();
        let second = pool.try_acquire(&mut rng).unwrap();
        assert_eq!((first.index(), second.index()), (0, 1));

        drop(first);
        let third = pool.try_acquire(&mut rng).unwrap();
        assert_eq!(third.index(), 2);

        drop(second);
        drop(third);
        assert_eq!(pool.try_acquire(&mut rng).unwrap().index(), 0);
    }

    #[test]
    fn test_empty_pool_never_leases() {
        let pool = pool(0, 20, AdmissionPolicy::IdleQueue);
        assert!(pool.is_empty());
        assert!(pool.try_acquire(&mut StdRng::seed_from_u64(4)).is_none());
    }

    #[test]
    fn test_lease_lock_is_exclusive() {
        let pool = pool(1, 1, AdmissionPolicy::RandomScan);
        let lease = pool.try_acquire(&mut StdRng::seed_from_u64(5)).unwrap();

        let guard = lease.lock().unwrap();
        assert_eq!(guard.id, "user-0");
        assert!(lease.lock().unwrap_err().is_step_fault());
    }

    #[tokio::test]
    async fn test_release_wakes_waiter() {
        let pool = pool(1, 1, AdmissionPolicy::RandomScan);
        let lease = pool.try_acquire(&mut StdRng::seed_from_u64(6)).unwrap();

        let waiter = {
            let pool = Arc::clone(&pool);
            tokio::spawn(async move { pool.released().await })
        };
        tokio::task::yield_now().await;
        drop(lease);

        waiter.await.unwrap();
        assert_eq!(pool.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_snapshot_reflects_updates() {
        let pool = pool(2, 2, AdmissionPolicy::IdleQueue);
        {
            let lease = pool.try_acquire(&mut StdRng::seed_from_u64(7)).unwrap();
            lease.lock().unwrap().cart.push(3);
        }

        let sessions = pool.snapshot().await;
        assert_eq!(sessions[0].cart, vec![3]);
        assert!(sessions[1].cart.is_empty());
    }
}
