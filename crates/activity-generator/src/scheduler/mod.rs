//! 并发调度器
//!
//! 不断从会话池租用空闲会话，为每个租约派生一个执行单步的任务。
//! 并发数达到上限时挂起，直到有任务完成归还租约。
//!
//! 调度循环只负责准入，单步中的等待（思考时间）只挂起各自的任务。

mod pool;

pub use pool::{SessionLease, SessionPool};

use std::pin::pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use activity_shared::config::{AdmissionPolicy, SimulationConfig};
use activity_shared::error::Result;

use crate::engine::{BehaviorEngine, StepOutcome};
use crate::models::{Session, UserState};

/// 调度配置
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// 同时执行的步骤数上限
    pub max_in_flight: usize,
    pub policy: AdmissionPolicy,
    /// 种子，未设置时使用系统熵
    pub seed: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 20,
            policy: AdmissionPolicy::default(),
            seed: None,
        }
    }
}

impl From<&SimulationConfig> for SchedulerConfig {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            max_in_flight: config.simultaneous_logs,
            policy: config.admission,
            seed: config.seed,
        }
    }
}

/// 运行统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub steps_launched: u64,
    pub steps_completed: u64,
    pub steps_failed: u64,
    pub peak_in_flight: usize,
    pub elapsed: Duration,
}

impl RunReport {
    fn record(&mut self, result: std::result::Result<Result<StepOutcome>, JoinError>) {
        match result {
            Ok(Ok(_)) => self.steps_completed += 1,
            Ok(Err(_)) => self.steps_failed += 1,
            Err(e) => {
                error!(error = %e, "步骤任务异常退出");
                self.steps_failed += 1;
            }
        }
    }
}

pub struct Scheduler {
    engine: Arc<BehaviorEngine>,
    pool: Arc<SessionPool>,
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(engine: Arc<BehaviorEngine>, sessions: Vec<Session>, config: SchedulerConfig) -> Self {
        let pool = Arc::new(SessionPool::new(
            sessions,
            config.max_in_flight,
            config.policy,
        ));
        Self {
            engine,
            pool,
            config,
        }
    }

    pub fn engine(&self) -> &Arc<BehaviorEngine> {
        &self.engine
    }

    pub fn pool(&self) -> &Arc<SessionPool> {
        &self.pool
    }

    /// 持续运行直到关闭信号变为 `true`
    ///
    /// 收到关闭信号后不再派生新步骤，等待已派生的步骤全部结束后返回。
    pub async fn run(&self, shutdown: watch::Receiver<bool>) -> Result<RunReport> {
        self.run_with_limit(shutdown, None).await
    }

    /// 派生恰好 `steps` 个步骤后停止
    pub async fn run_steps(&self, steps: u64) -> Result<RunReport> {
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        self.run_with_limit(shutdown_rx, Some(steps)).await
    }

    /// 运行直到收到关闭信号或派生了 `max_steps` 个步骤
    pub async fn run_with_limit(
        &self,
        shutdown: watch::Receiver<bool>,
        max_steps: Option<u64>,
    ) -> Result<RunReport> {
        let started = Instant::now();
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut tasks: JoinSet<Result<StepOutcome>> = JoinSet::new();
        let mut report = RunReport::default();

        if self.pool.is_empty() {
            warn!("没有可调度的会话");
        }
        info!(
            sessions = self.pool.len(),
            max_in_flight = self.pool.capacity(),
            policy = ?self.pool.policy(),
            max_steps = ?max_steps,
            "调度器启动"
        );

        let mut shutdown = pin!(wait_for_shutdown(shutdown));

        loop {
            if shutdown.as_mut().now_or_never().is_some() {
                info!("收到关闭信号，停止派生新步骤");
                break;
            }
            if max_steps.is_some_and(|limit| report.steps_launched >= limit) {
                break;
            }
            while let Some(result) = tasks.try_join_next() {
                report.record(result);
            }

            match self.pool.try_acquire(&mut rng) {
                Some(lease) => {
                    let engine = Arc::clone(&self.engine);
                    let task_rng = StdRng::seed_from_u64(rng.next_u64());
                    tasks.spawn(run_step(engine, lease, task_rng));
                    report.steps_launched += 1;
                }
                None if self.pool.capacity() == 0 => {
                    // 没有会话可租：限定步数时直接结束，否则等待关闭
                    if max_steps.is_none() {
                        shutdown.as_mut().await;
                    }
                    break;
                }
                None => {
                    tokio::select! {
                        biased;

                        _ = shutdown.as_mut() => {
                            info!("收到关闭信号，停止派生新步骤");
                            break;
                        }
                        _ = self.pool.released() => {}
                    }
                }
            }
        }

        debug!(pending = tasks.len(), "等待执行中的步骤结束");
        while let Some(result) = tasks.join_next().await {
            report.record(result);
        }

        report.peak_in_flight = self.pool.peak_in_flight();
        report.elapsed = started.elapsed();

        info!(
            launched = report.steps_launched,
            completed = report.steps_completed,
            failed = report.steps_failed,
            peak_in_flight = report.peak_in_flight,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "调度器停止"
        );
        Ok(report)
    }
}

/// 执行一步，失败时把会话重置为登出状态
async fn run_step(
    engine: Arc<BehaviorEngine>,
    lease: SessionLease,
    mut rng: StdRng,
) -> Result<StepOutcome> {
    let mut session = lease.lock()?;

    match engine.step(&mut session, &mut rng).await {
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            error!(
                session = %session.id,
                state = session.state.as_str(),
                code = e.code(),
                error = %e,
                "步骤执行失败，会话重置为登出"
            );
            session.state = UserState::LoggedOut;
            Err(e)
        }
    }
}

/// 关闭信号变为 `true` 时完成；发送端被丢弃后永不完成
async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
