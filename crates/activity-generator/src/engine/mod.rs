//! 用户行为引擎
//!
//! 有限状态的随机游走：根据会话当前状态与共享库存计算下一状态，
//! 同时修改库存/会话并产生恰好一条事件。
//!
//! 所有业务异常（缺货、空购物车、没有订单）都由显式的守卫处理：
//! 跳过修改、输出一条描述拒绝原因的事件、转入安全的恢复状态。
//! 只有破坏不变量的情况（如越界下标、没有可回滚的订单）才返回错误。

pub mod think_time;
pub mod transitions;

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, instrument};

use activity_shared::config::{DelayConfig, SimulationConfig};
use activity_shared::error::{Result, SimError};
use activity_shared::observability::metrics;

use crate::generators::IdGenerator;
use crate::models::{
    ActivityEvent, EventKind, Session, Severity, TakeOutcome,
    UserState::{self, *},
};
use crate::sink::EventSink;
use crate::store::Inventory;

pub use think_time::{RealTime, SimulatedClock, ThinkTime};
use transitions::{
    AFTER_ADD_TO_CART, AFTER_BROWSE, AFTER_CHECKOUT, AFTER_HISTORY, AFTER_LOGIN,
    AFTER_LOGIN_FAILURE, AFTER_PAY_ATTEMPT, AFTER_PAY_FAILURE, BACK_TO_SHOP, pick,
    random_device,
};

/// 引擎参数
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// 剩余库存低于该值时加购事件降为告警
    pub low_stock_threshold: u32,
    /// 懒加载历史订单的数量上限（不含）
    pub max_seeded_orders: usize,
    /// 为 true 时查看历史订单按 info 输出，否则保持 error 级别
    pub strict_severity: bool,
    pub delays: DelayConfig,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default(), &DelayConfig::default())
    }
}

impl EngineSettings {
    pub fn from_config(simulation: &SimulationConfig, delays: &DelayConfig) -> Self {
        Self {
            low_stock_threshold: simulation.low_stock_threshold,
            max_seeded_orders: simulation.max_seeded_orders,
            strict_severity: simulation.strict_severity,
            delays: delays.clone(),
        }
    }

    /// 固定的等待时长
    fn delay(&self, units: u32) -> Duration {
        Duration::from_millis(self.delays.unit_ms.saturating_mul(u64::from(units)))
    }

    /// `[0, max_units)` 个单位的随机等待
    fn random_delay<R>(&self, rng: &mut R, max_units: u32) -> Duration
    where
        R: Rng + ?Sized,
    {
        if max_units == 0 {
            return Duration::ZERO;
        }
        self.delay(rng.gen_range(0..max_units))
    }
}

/// 一次状态转移的结果
#[derive(Debug, Clone)]
pub struct Transition {
    pub next: UserState,
    pub event: ActivityEvent,
    /// 事件输出之后的等待
    pub pause: Duration,
}

impl Transition {
    fn now(next: UserState, event: ActivityEvent) -> Self {
        Self {
            next,
            event,
            pause: Duration::ZERO,
        }
    }

    fn after(next: UserState, event: ActivityEvent, pause: Duration) -> Self {
        Self { next, event, pause }
    }
}

/// 一次完整步骤的摘要
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub previous: UserState,
    pub next: UserState,
    pub kind: EventKind,
    pub severity: Severity,
    pub pause: Duration,
}

/// 用户行为引擎
///
/// 引擎本身无状态，可在所有任务间共享。
pub struct BehaviorEngine {
    inventory: Arc<Inventory>,
    sink: Arc<dyn EventSink>,
    ids: Arc<dyn IdGenerator>,
    think_time: Arc<dyn ThinkTime>,
    settings: EngineSettings,
}

impl BehaviorEngine {
    pub fn new(
        inventory: Arc<Inventory>,
        sink: Arc<dyn EventSink>,
        ids: Arc<dyn IdGenerator>,
        think_time: Arc<dyn ThinkTime>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            inventory,
            sink,
            ids,
            think_time,
            settings,
        }
    }

    pub fn inventory(&self) -> &Arc<Inventory> {
        &self.inventory
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// 执行一步：计算转移、输出事件、等待、更新状态
    ///
    /// 事件在等待之前输出；状态只在整步完成后更新。
    #[instrument(level = "debug", skip_all, fields(session = %session.id, state = session.state.as_str()))]
    pub async fn step<R>(&self, session: &mut Session, rng: &mut R) -> Result<StepOutcome>
    where
        R: Rng + Send + ?Sized,
    {
        let started = Instant::now();
        let previous = session.state;

        let transition = match self.transition(session, rng) {
            Ok(transition) => transition,
            Err(e) => {
                metrics::record_step(previous.as_str(), "failed", started.elapsed().as_secs_f64());
                return Err(e);
            }
        };

        let Transition { next, event, pause } = transition;
        self.sink.emit(&event);
        metrics::record_activity_event(event.kind.as_str(), event.severity.as_str());

        if !pause.is_zero() {
            self.think_time.pause(pause).await;
        }
        session.state = next;

        metrics::record_step(previous.as_str(), "ok", started.elapsed().as_secs_f64());
        debug!(next = next.as_str(), evt = event.kind.as_str(), "步骤完成");

        Ok(StepOutcome {
            previous,
            next,
            kind: event.kind,
            severity: event.severity,
            pause,
        })
    }

    /// 纯状态转移
    ///
    /// 修改会话与库存，返回下一状态、待输出的事件和等待时长，
    /// 不输出事件也不真正等待。
    pub fn transition<R>(&self, session: &mut Session, rng: &mut R) -> Result<Transition>
    where
        R: Rng + ?Sized,
    {
        match session.state {
            PasswordResetComplete => Ok(Transition::now(
                LoggedOut,
                ActivityEvent::info(&session.id, EventKind::LoginReset, "Password reset successful"),
            )),
            ForgotPassword => Ok(Transition::after(
                PasswordResetComplete,
                ActivityEvent::info(
                    &session.id,
                    EventKind::LoginForgotPassword,
                    "user has requested new password",
                ),
                self.settings.delay(self.settings.delays.forgot_password_units),
            )),
            LoggedOut => self.login(session, rng),
            Browsing => Ok(Transition::after(
                pick(rng, AFTER_BROWSE)?,
                ActivityEvent::info(&session.id, EventKind::ShopBrowse, "visiting shop"),
                self.settings
                    .random_delay(rng, self.settings.delays.max_browse_units),
            )),
            AddToCart => self.add_to_cart(session, rng),
            RemoveFromCart => self.remove_from_cart(session, rng),
            Checkout => self.checkout(session, rng),
            PayAttempt => self.pay_attempt(session, rng),
            PaySuccess => {
                let mut event =
                    ActivityEvent::info(&session.id, EventKind::PaySuccess, "Payment Success");
                if let Some(order) = session.orders.latest() {
                    event = event.with_order(order);
                }
                session.cart.clear();
                session.current_order = None;
                Ok(Transition::now(pick(rng, BACK_TO_SHOP)?, event))
            }
            PayFailure => {
                let order = session.orders.pop_latest().ok_or_else(|| {
                    SimError::InvariantViolation(format!(
                        "会话 {} 支付失败时没有可回滚的订单",
                        session.id
                    ))
                })?;
                Ok(Transition::now(
                    pick(rng, AFTER_PAY_FAILURE)?,
                    ActivityEvent::error(&session.id, EventKind::PayFailure, "Payment Failure")
                        .with_order(order),
                ))
            }
            OrderCancelled => Ok(Transition::now(
                pick(rng, BACK_TO_SHOP)?,
                ActivityEvent::error(&session.id, EventKind::OrderCanceled, "Cancelling Payment"),
            )),
            BrowseHistory => Ok(Transition::after(
                pick(rng, AFTER_HISTORY)?,
                ActivityEvent::info(
                    &session.id,
                    EventKind::OrdersBrowse,
                    "browsing old order history",
                ),
                self.settings
                    .random_delay(rng, self.settings.delays.max_history_units),
            )),
            ViewOrder => self.view_order(session, rng),
            Logout => Ok(Transition::now(
                LoggedOut,
                ActivityEvent::info(&session.id, EventKind::UserLogout, "user Logout"),
            )),
        }
    }

    /// 登录：四分之一的概率失败
    fn login<R>(&self, session: &Session, rng: &mut R) -> Result<Transition>
    where
        R: Rng + ?Sized,
    {
        let failed = rng.gen_range(0..4) == 0;
        let device = random_device(rng);

        if failed {
            let event = ActivityEvent::warning(
                &session.id,
                EventKind::LoginFailure,
                format!("{} failed to log", session.name),
            )
            .with_device(device);
            return Ok(Transition::after(
                pick(rng, AFTER_LOGIN_FAILURE)?,
                event,
                self.settings.delay(self.settings.delays.login_failure_units),
            ));
        }

        let event = ActivityEvent::info(
            &session.id,
            EventKind::LoginSuccess,
            format!("{} successfully logged", session.name),
        )
        .with_device(device);
        Ok(Transition::now(pick(rng, AFTER_LOGIN)?, event))
    }

    /// 随机挑选商品加入购物车
    fn add_to_cart<R>(&self, session: &mut Session, rng: &mut R) -> Result<Transition>
    where
        R: Rng + ?Sized,
    {
        if self.inventory.is_empty() {
            return Err(SimError::InvariantViolation("库存中没有任何商品".to_string()));
        }
        let index = rng.gen_range(0..self.inventory.len());
        let product_id = self.inventory.get(index)?.id.clone();

        match self.inventory.take(index)? {
            TakeOutcome::OutOfStock => Ok(Transition::now(
                Browsing,
                ActivityEvent::error(&session.id, EventKind::ProductAdd, "Product Out of Stock")
                    .with_product(product_id)
                    .with_stocks(0),
            )),
            TakeOutcome::Taken { remaining } => {
                session.cart.push(index);
                let event = if remaining < self.settings.low_stock_threshold {
                    ActivityEvent::warning(&session.id, EventKind::ProductAdd, "low product stocks")
                        .with_product(product_id)
                        .with_stocks(remaining)
                } else {
                    ActivityEvent::info(&session.id, EventKind::ProductAdd, "adding product in cart")
                        .with_product(product_id)
                };
                Ok(Transition::now(pick(rng, AFTER_ADD_TO_CART)?, event))
            }
        }
    }

    /// 从购物车随机移除一件商品并归还库存
    fn remove_from_cart<R>(&self, session: &mut Session, rng: &mut R) -> Result<Transition>
    where
        R: Rng + ?Sized,
    {
        if session.cart.is_empty() {
            return Ok(Transition::now(
                Browsing,
                ActivityEvent::warning(
                    &session.id,
                    EventKind::CartEmpty,
                    "Cannot remove from empty cart",
                ),
            ));
        }

        let position = rng.gen_range(0..session.cart.len());
        let index = session.cart[position];
        let product_id = self.inventory.get(index)?.id.clone();
        // 先归还库存，失败时购物车保持不变
        let stocks = self.inventory.restock(index)?;
        // 旧版日志流只归还库存、条目仍留在购物车；这里同时移出条目
        session.cart.remove(position);

        Ok(Transition::now(
            Browsing,
            ActivityEvent::info(&session.id, EventKind::ProductRemove, "Removing from cart")
                .with_product(product_id)
                .with_stocks(stocks),
        ))
    }

    /// 为购物车创建订单
    fn checkout<R>(&self, session: &mut Session, rng: &mut R) -> Result<Transition>
    where
        R: Rng + ?Sized,
    {
        if session.cart.is_empty() {
            return Ok(Transition::now(
                pick(rng, BACK_TO_SHOP)?,
                ActivityEvent::warning(
                    &session.id,
                    EventKind::CartEmpty,
                    "Cannot checkout on empty cart",
                ),
            ));
        }

        let order = self.ids.short_id();
        session.orders.push(order.clone());

        Ok(Transition::now(
            pick(rng, AFTER_CHECKOUT)?,
            ActivityEvent::info(&session.id, EventKind::CartCheckout, "Checking out")
                .with_order(order),
        ))
    }

    /// 为最近一笔订单发起支付
    fn pay_attempt<R>(&self, session: &mut Session, rng: &mut R) -> Result<Transition>
    where
        R: Rng + ?Sized,
    {
        let Some(order) = session.orders.latest() else {
            return Ok(Transition::now(
                Browsing,
                ActivityEvent::error(&session.id, EventKind::PayError, "Cannot Pay unexisting order"),
            ));
        };

        let event = ActivityEvent::info(&session.id, EventKind::PaySecure, "Starting Secure Payment")
            .with_order(order);
        Ok(Transition::after(
            pick(rng, AFTER_PAY_ATTEMPT)?,
            event,
            self.settings.delay(self.settings.delays.payment_units),
        ))
    }

    /// 查看一笔历史订单
    ///
    /// 成功查看后回到登出状态，且事件级别为 error；这两点都沿用了日志下游
    /// 已经依赖的行为，`strict_severity` 只调整级别。
    fn view_order<R>(&self, session: &mut Session, rng: &mut R) -> Result<Transition>
    where
        R: Rng + ?Sized,
    {
        let max_seeded = self.settings.max_seeded_orders;
        let ids = &self.ids;
        let orders = session.orders.get_or_populate(|| {
            let count = if max_seeded == 0 {
                0
            } else {
                rng.gen_range(0..max_seeded)
            };
            (0..count).map(|_| ids.short_id()).collect()
        });

        if orders.is_empty() {
            return Ok(Transition::now(
                Browsing,
                ActivityEvent::info(&session.id, EventKind::OrdersEmpty, "no past orders"),
            ));
        }

        let order = orders[rng.gen_range(0..orders.len())].clone();
        session.current_order = Some(order.clone());

        let severity = if self.settings.strict_severity {
            Severity::Info
        } else {
            Severity::Error
        };
        Ok(Transition::now(
            LoggedOut,
            ActivityEvent::new(&session.id, EventKind::OrdersView, severity, "checking old order")
                .with_order(order),
        ))
    }
}
