//! 行为引擎场景测试
//!
//! 针对单个会话验证各状态的守卫与修改，全部使用确定性的种子和自增 ID。

use std::sync::Arc;
use std::time::Duration;

use activity_generator::engine::{BehaviorEngine, EngineSettings, SimulatedClock};
use activity_generator::engine::transitions::possible_next;
use activity_generator::generators::SequentialIdGenerator;
use activity_generator::models::{EventKind, OrderHistory, Product, Session, Severity, UserState};
use activity_generator::sink::MemorySink;
use activity_generator::store::Inventory;
use rand::SeedableRng;
use rand::rngs::StdRng;

// ==================== 辅助函数 ====================

struct Harness {
    engine: BehaviorEngine,
    sink: Arc<MemorySink>,
    clock: Arc<SimulatedClock>,
}

impl Harness {
    fn new(quantities: &[u32]) -> Self {
        let products = quantities
            .iter()
            .enumerate()
            .map(|(i, q)| Product::new(format!("prod-{i}"), format!("shirt {i}"), *q))
            .collect();
        let sink = Arc::new(MemorySink::new());
        let clock = Arc::new(SimulatedClock::new());
        let engine = BehaviorEngine::new(
            Arc::new(Inventory::new(products)),
            sink.clone(),
            Arc::new(SequentialIdGenerator::new("order")),
            clock.clone(),
            EngineSettings::default(),
        );
        Self {
            engine,
            sink,
            clock,
        }
    }

    fn quantities(&self) -> Vec<u32> {
        self.engine
            .inventory()
            .iter()
            .map(Product::quantity)
            .collect()
    }
}

// ==================== 具体场景 ====================

#[tokio::test]
async fn add_to_cart_out_of_stock_changes_nothing() {
    let h = Harness::new(&[0]);
    let mut rng = StdRng::seed_from_u64(1);
    let mut session = Session::in_state("u-1", "ada", UserState::AddToCart);

    let outcome = h.engine.step(&mut session, &mut rng).await.unwrap();

    assert_eq!(outcome.next, UserState::Browsing);
    assert_eq!(session.state, UserState::Browsing);
    assert_eq!(outcome.severity, Severity::Error);
    assert_eq!(h.sink.len(), 1);
    assert_eq!(h.quantities(), vec![0]);
    assert!(session.cart.is_empty());

    let event = &h.sink.events()[0];
    assert_eq!(event.message, "Product Out of Stock");
    assert_eq!(event.fields.stocks, Some(0));
}

#[tokio::test]
async fn checkout_creates_exactly_one_order() {
    let h = Harness::new(&[5; 10]);
    let mut rng = StdRng::seed_from_u64(2);
    let mut session = Session::in_state("u-2", "grace", UserState::Checkout);
    session.cart = vec![3, 7];

    let outcome = h.engine.step(&mut session, &mut rng).await.unwrap();

    assert_eq!(outcome.next, UserState::PayAttempt);
    assert_eq!(session.orders.len(), 1);
    assert_eq!(session.cart, vec![3, 7]);
    assert_eq!(h.quantities(), vec![5; 10]);

    let event = &h.sink.events()[0];
    assert_eq!(event.kind, EventKind::CartCheckout);
    assert_eq!(event.fields.order.as_deref(), session.orders.latest());
}

#[tokio::test]
async fn pay_without_order_is_rejected() {
    let h = Harness::new(&[5]);
    let mut rng = StdRng::seed_from_u64(3);

    for history in [OrderHistory::Absent, OrderHistory::Present(Vec::new())] {
        let mut session = Session::in_state("u-3", "linus", UserState::PayAttempt);
        session.orders = history.clone();

        let outcome = h.engine.step(&mut session, &mut rng).await.unwrap();

        assert_eq!(outcome.next, UserState::Browsing);
        assert_eq!(outcome.kind, EventKind::PayError);
        assert_eq!(outcome.severity, Severity::Error);
        assert_eq!(session.orders, history);
        assert!(outcome.pause.is_zero());
    }
    assert_eq!(h.sink.len(), 2);
}

#[tokio::test]
async fn remove_from_empty_cart_returns_to_browsing() {
    let h = Harness::new(&[5]);
    let mut rng = StdRng::seed_from_u64(4);
    let mut session = Session::in_state("u-4", "barbara", UserState::RemoveFromCart);

    let outcome = h.engine.step(&mut session, &mut rng).await.unwrap();

    assert_eq!(outcome.next, UserState::Browsing);
    assert!(session.cart.is_empty());
    assert_eq!(h.quantities(), vec![5]);
}

#[tokio::test]
async fn checkout_on_empty_cart_never_creates_order() {
    let h = Harness::new(&[5]);
    let mut rng = StdRng::seed_from_u64(5);

    for _ in 0..20 {
        let mut session = Session::in_state("u-5", "ken", UserState::Checkout);
        h.engine.step(&mut session, &mut rng).await.unwrap();
        assert_eq!(session.orders, OrderHistory::Absent);
    }
    assert_eq!(h.sink.count_by_kind()[&EventKind::CartEmpty], 20);
}

#[tokio::test]
async fn pay_failure_removes_only_latest_order() {
    let h = Harness::new(&[5]);
    let mut rng = StdRng::seed_from_u64(6);
    let mut session = Session::in_state("u-6", "dennis", UserState::PayFailure);
    session.orders = OrderHistory::Present(vec!["first".into(), "second".into()]);

    h.engine.step(&mut session, &mut rng).await.unwrap();

    assert_eq!(session.orders.as_slice(), ["first".to_string()]);
}

#[tokio::test]
async fn payment_round_trip_with_think_time() {
    let h = Harness::new(&[500]);
    let mut rng = StdRng::seed_from_u64(7);
    let mut session = Session::in_state("u-7", "margaret", UserState::AddToCart);

    // 加购直到进入下单
    while session.state != UserState::Checkout {
        session.state = UserState::AddToCart;
        h.engine.step(&mut session, &mut rng).await.unwrap();
    }
    h.engine.step(&mut session, &mut rng).await.unwrap();
    assert_eq!(session.state, UserState::PayAttempt);

    h.engine.step(&mut session, &mut rng).await.unwrap();
    assert!(matches!(
        session.state,
        UserState::PaySuccess | UserState::PayFailure
    ));
    // 支付等待 5 个单位
    assert!(h.clock.elapsed() >= Duration::from_secs(5));
}

// ==================== 性质 ====================

#[tokio::test]
async fn every_step_emits_one_event_and_follows_the_graph() {
    let h = Harness::new(&[3; 20]);
    let mut rng = StdRng::seed_from_u64(8);

    for start in UserState::ALL {
        let mut session = Session::in_state(format!("u-{}", start.code()), "walker", start);
        if start == UserState::PayFailure {
            session.orders = OrderHistory::Present(vec!["pending".to_string()]);
        }

        for _ in 0..300 {
            let before = h.sink.len();
            let outcome = h.engine.step(&mut session, &mut rng).await.unwrap();

            assert_eq!(h.sink.len(), before + 1);
            assert!(possible_next(outcome.previous).contains(&outcome.next));
            assert_eq!(UserState::try_from(outcome.next.code()).unwrap(), outcome.next);
        }
    }
}

#[tokio::test]
async fn view_order_lands_on_logged_out_with_error_severity() {
    let h = Harness::new(&[3]);
    let mut rng = StdRng::seed_from_u64(9);
    let mut session = Session::in_state("u-9", "edsger", UserState::ViewOrder);
    session.orders = OrderHistory::Present(vec!["a1b2c3d4".to_string()]);

    let outcome = h.engine.step(&mut session, &mut rng).await.unwrap();

    assert_eq!(outcome.next, UserState::LoggedOut);
    assert_eq!(outcome.kind, EventKind::OrdersView);
    assert_eq!(outcome.severity, Severity::Error);
    assert_eq!(session.current_order.as_deref(), Some("a1b2c3d4"));
}
