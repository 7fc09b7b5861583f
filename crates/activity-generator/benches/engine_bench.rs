//! 行为引擎性能基准测试
//!
//! 测试覆盖：
//! - 单个状态的转移开销
//! - 连续随机游走的吞吐
//! - 不同并发上限下的调度吞吐

use std::hint::black_box;
use std::sync::Arc;

use activity_generator::engine::{BehaviorEngine, EngineSettings, SimulatedClock};
use activity_generator::generators::{Population, PopulationConfig, SequentialIdGenerator};
use activity_generator::models::{ActivityEvent, OrderHistory, Session, UserState};
use activity_generator::scheduler::{Scheduler, SchedulerConfig};
use activity_generator::sink::EventSink;
use activity_generator::store::Inventory;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// 丢弃全部事件的输出端，只测引擎本身
struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, event: &ActivityEvent) {
        black_box(event);
    }
}

fn create_inventory(products: usize) -> Inventory {
    let config = PopulationConfig {
        user_count: 0,
        product_count: products,
        max_quantity: 1_000,
    };
    Population::generate_inventory(
        &config,
        &SequentialIdGenerator::new("bench"),
        &mut StdRng::seed_from_u64(1),
    )
}

fn create_engine(products: usize) -> Arc<BehaviorEngine> {
    Arc::new(BehaviorEngine::new(
        Arc::new(create_inventory(products)),
        Arc::new(NullSink),
        Arc::new(SequentialIdGenerator::new("order")),
        Arc::new(SimulatedClock::new()),
        EngineSettings::default(),
    ))
}

// ============================================================================
// 基准测试函数
// ============================================================================

/// 各状态单次转移
fn bench_transition_by_state(c: &mut Criterion) {
    let engine = create_engine(100);
    let mut rng = StdRng::seed_from_u64(2);
    let mut group = c.benchmark_group("transition_by_state");

    for state in [
        UserState::LoggedOut,
        UserState::Browsing,
        UserState::Checkout,
        UserState::PayAttempt,
        UserState::ViewOrder,
    ] {
        group.bench_with_input(
            BenchmarkId::from_parameter(state.as_str()),
            &state,
            |b, state| {
                b.iter(|| {
                    let mut session = Session::in_state("bench-user", "bench", *state);
                    session.cart.push(0);
                    session.orders = OrderHistory::Present(vec!["o-1".to_string()]);
                    black_box(engine.transition(&mut session, &mut rng))
                })
            },
        );
    }

    group.finish();
}

/// 单会话连续游走
fn bench_random_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_walk");

    for steps in [100u64, 1_000] {
        group.throughput(Throughput::Elements(steps));
        group.bench_with_input(BenchmarkId::from_parameter(steps), &steps, |b, &steps| {
            let engine = create_engine(100);
            let mut rng = StdRng::seed_from_u64(3);
            b.iter(|| {
                let mut session = Session::new("walker", "walker");
                for _ in 0..steps {
                    match engine.transition(&mut session, &mut rng) {
                        Ok(transition) => session.state = transition.next,
                        Err(_) => session.state = UserState::LoggedOut,
                    }
                }
                black_box(session.state)
            })
        });
    }

    group.finish();
}

/// 调度吞吐（逻辑时钟，不真正等待）
fn bench_scheduler(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap();
    let mut group = c.benchmark_group("scheduler");
    let steps = 2_000u64;
    group.throughput(Throughput::Elements(steps));

    for concurrency in [1usize, 20, 100] {
        group.bench_with_input(
            BenchmarkId::from_parameter(concurrency),
            &concurrency,
            |b, &concurrency| {
                b.iter(|| {
                    runtime.block_on(async {
                        let sessions = (0..200)
                            .map(|i| Session::new(format!("user-{i}"), "bench"))
                            .collect();
                        let scheduler = Scheduler::new(
                            create_engine(100),
                            sessions,
                            SchedulerConfig {
                                max_in_flight: concurrency,
                                seed: Some(4),
                                ..SchedulerConfig::default()
                            },
                        );
                        black_box(scheduler.run_steps(steps).await.unwrap())
                    })
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_transition_by_state,
    bench_random_walk,
    bench_scheduler,
);

criterion_main!(benches);
