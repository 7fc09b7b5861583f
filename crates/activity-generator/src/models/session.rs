//! 模拟用户会话
//!
//! 会话在启动时创建并伴随整个进程生命周期。会话字段只会被当前持有该会话的
//! 步骤修改，互斥由调度器的租约保证。

use activity_shared::error::SimError;
use serde::Serialize;

/// 用户所处的状态
///
/// 数值编码与日志下游约定一致，负数表示找回密码流程。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum UserState {
    PasswordResetComplete = -2,
    ForgotPassword = -1,
    LoggedOut = 0,
    Browsing = 1,
    AddToCart = 2,
    RemoveFromCart = 3,
    Checkout = 4,
    PayAttempt = 5,
    PaySuccess = 6,
    PayFailure = 7,
    OrderCancelled = 8,
    BrowseHistory = 10,
    ViewOrder = 11,
    Logout = 12,
}

impl UserState {
    /// 所有合法状态
    pub const ALL: [UserState; 14] = [
        Self::PasswordResetComplete,
        Self::ForgotPassword,
        Self::LoggedOut,
        Self::Browsing,
        Self::AddToCart,
        Self::RemoveFromCart,
        Self::Checkout,
        Self::PayAttempt,
        Self::PaySuccess,
        Self::PayFailure,
        Self::OrderCancelled,
        Self::BrowseHistory,
        Self::ViewOrder,
        Self::Logout,
    ];

    /// 数值编码
    pub fn code(self) -> i32 {
        self as i32
    }

    /// 指标标签
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PasswordResetComplete => "password_reset_complete",
            Self::ForgotPassword => "forgot_password",
            Self::LoggedOut => "logged_out",
            Self::Browsing => "browsing",
            Self::AddToCart => "add_to_cart",
            Self::RemoveFromCart => "remove_from_cart",
            Self::Checkout => "checkout",
            Self::PayAttempt => "pay_attempt",
            Self::PaySuccess => "pay_success",
            Self::PayFailure => "pay_failure",
            Self::OrderCancelled => "order_cancelled",
            Self::BrowseHistory => "browse_history",
            Self::ViewOrder => "view_order",
            Self::Logout => "logout",
        }
    }
}

impl TryFrom<i32> for UserState {
    type Error = SimError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|state| state.code() == code)
            .ok_or(SimError::UnknownState(code))
    }
}

/// 历史订单
///
/// `Absent` 表示从未加载过历史，首次查看时会懒加载一批模拟订单；
/// `Present` 即使为空也表示已经加载过。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderHistory {
    #[default]
    Absent,
    Present(Vec<String>),
}

impl OrderHistory {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Absent => true,
            Self::Present(orders) => orders.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Absent => 0,
            Self::Present(orders) => orders.len(),
        }
    }

    /// 最近一笔订单
    pub fn latest(&self) -> Option<&str> {
        match self {
            Self::Absent => None,
            Self::Present(orders) => orders.last().map(String::as_str),
        }
    }

    /// 追加订单，`Absent` 会转为 `Present`
    pub fn push(&mut self, order_id: String) {
        match self {
            Self::Absent => *self = Self::Present(vec![order_id]),
            Self::Present(orders) => orders.push(order_id),
        }
    }

    /// 移除并返回最近一笔订单
    pub fn pop_latest(&mut self) -> Option<String> {
        match self {
            Self::Absent => None,
            Self::Present(orders) => orders.pop(),
        }
    }

    /// 返回已加载的历史，`Absent` 时先用 `populate` 生成
    pub fn get_or_populate<F>(&mut self, populate: F) -> &[String]
    where
        F: FnOnce() -> Vec<String>,
    {
        if let Self::Absent = self {
            *self = Self::Present(populate());
        }
        match self {
            Self::Present(orders) => orders,
            Self::Absent => &[],
        }
    }

    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::Absent => &[],
            Self::Present(orders) => orders,
        }
    }
}

/// 模拟用户会话
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: String,
    pub name: String,
    pub state: UserState,
    /// 购物车中的商品下标，允许重复，按加入顺序排列
    pub cart: Vec<usize>,
    pub orders: OrderHistory,
    pub current_order: Option<String>,
}

impl Session {
    /// 创建处于登出状态的新会话
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            state: UserState::LoggedOut,
            cart: Vec::new(),
            orders: OrderHistory::Absent,
            current_order: None,
        }
    }

    /// 以指定状态创建会话
    pub fn in_state(id: impl Into<String>, name: impl Into<String>, state: UserState) -> Self {
        Self {
            state,
            ..Self::new(id, name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_codes_round_trip() {
        for state in UserState::ALL {
            assert_eq!(UserState::try_from(state.code()).unwrap(), state);
        }
        assert_eq!(UserState::ViewOrder.code(), 11);
        assert_eq!(UserState::PasswordResetComplete.code(), -2);
    }

    #[test]
    fn test_unknown_state_code() {
        let err = UserState::try_from(9).unwrap_err();
        assert!(matches!(err, SimError::UnknownState(9)));
        assert!(UserState::try_from(-3).is_err());
    }

    #[test]
    fn test_new_session_is_logged_out() {
        let session = Session::new("s-1", "bold turing");
        assert_eq!(session.state, UserState::LoggedOut);
        assert!(session.cart.is_empty());
        assert_eq!(session.orders, OrderHistory::Absent);
        assert!(session.current_order.is_none());
    }

    #[test]
    fn test_order_history_push_and_pop() {
        let mut history = OrderHistory::Absent;
        assert!(history.is_empty());
        assert!(history.pop_latest().is_none());

        history.push("a".to_string());
        history.push("b".to_string());
        assert_eq!(history.latest(), Some("b"));
        assert_eq!(history.pop_latest().as_deref(), Some("b"));
        assert_eq!(history.as_slice(), ["a".to_string()]);
    }

    #[test]
    fn test_order_history_populates_once() {
        let mut history = OrderHistory::Absent;
        assert_eq!(history.get_or_populate(|| vec!["x".to_string()]).len(), 1);
        // 已加载后不会再次生成
        assert_eq!(
            history.get_or_populate(|| vec!["y".to_string(), "z".to_string()]),
            ["x".to_string()]
        );

        let mut empty = OrderHistory::Present(Vec::new());
        assert!(empty.get_or_populate(|| vec!["never".to_string()]).is_empty());
    }
}
