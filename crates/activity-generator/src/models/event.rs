//! 模拟事件模型
//!
//! 每一步状态转移都会产生恰好一条事件，事件一经创建即不可变，
//! 直接交给 EventSink 输出。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 事件级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// 事件类型
///
/// 序列化为点分形式的标签，如 `login.success`，便于下游按前缀聚合。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "login.reset")]
    LoginReset,
    #[serde(rename = "login.forget_password")]
    LoginForgotPassword,
    #[serde(rename = "login.failure")]
    LoginFailure,
    #[serde(rename = "login.success")]
    LoginSuccess,
    #[serde(rename = "shop.browse")]
    ShopBrowse,
    #[serde(rename = "product.add")]
    ProductAdd,
    #[serde(rename = "product.remove")]
    ProductRemove,
    #[serde(rename = "cart.empty")]
    CartEmpty,
    #[serde(rename = "cart.checkout")]
    CartCheckout,
    #[serde(rename = "pay.error")]
    PayError,
    #[serde(rename = "pay.secure")]
    PaySecure,
    #[serde(rename = "pay.success")]
    PaySuccess,
    #[serde(rename = "pay.failure")]
    PayFailure,
    #[serde(rename = "order.canceled")]
    OrderCanceled,
    #[serde(rename = "orders.browse")]
    OrdersBrowse,
    #[serde(rename = "orders.view")]
    OrdersView,
    #[serde(rename = "orders.empty")]
    OrdersEmpty,
    #[serde(rename = "user.logout")]
    UserLogout,
}

impl EventKind {
    /// 获取事件标签
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoginReset => "login.reset",
            Self::LoginForgotPassword => "login.forget_password",
            Self::LoginFailure => "login.failure",
            Self::LoginSuccess => "login.success",
            Self::ShopBrowse => "shop.browse",
            Self::ProductAdd => "product.add",
            Self::ProductRemove => "product.remove",
            Self::CartEmpty => "cart.empty",
            Self::CartCheckout => "cart.checkout",
            Self::PayError => "pay.error",
            Self::PaySecure => "pay.secure",
            Self::PaySuccess => "pay.success",
            Self::PayFailure => "pay.failure",
            Self::OrderCanceled => "order.canceled",
            Self::OrdersBrowse => "orders.browse",
            Self::OrdersView => "orders.view",
            Self::OrdersEmpty => "orders.empty",
            Self::UserLogout => "user.logout",
        }
    }
}

/// 事件的结构化字段
///
/// 不同事件类型携带的字段不同，未设置的字段不参与序列化。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stocks: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
}

/// 模拟活动事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// 事件主体（会话 ID）
    #[serde(rename = "uuid")]
    pub user_id: String,
    #[serde(rename = "evt")]
    pub kind: EventKind,
    #[serde(rename = "level")]
    pub severity: Severity,
    #[serde(flatten)]
    pub fields: EventFields,
    #[serde(rename = "msg")]
    pub message: String,
    #[serde(rename = "time")]
    pub timestamp: DateTime<Utc>,
}

impl ActivityEvent {
    /// 创建不带附加字段的事件
    pub fn new(
        user_id: impl Into<String>,
        kind: EventKind,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            kind,
            severity,
            fields: EventFields::default(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn info(user_id: impl Into<String>, kind: EventKind, message: impl Into<String>) -> Self {
        Self::new(user_id, kind, Severity::Info, message)
    }

    pub fn warning(
        user_id: impl Into<String>,
        kind: EventKind,
        message: impl Into<String>,
    ) -> Self {
        Self::new(user_id, kind, Severity::Warning, message)
    }

    pub fn error(user_id: impl Into<String>, kind: EventKind, message: impl Into<String>) -> Self {
        Self::new(user_id, kind, Severity::Error, message)
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.fields.device = Some(device.into());
        self
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.fields.product = Some(product.into());
        self
    }

    pub fn with_stocks(mut self, stocks: u32) -> Self {
        self.fields.stocks = Some(stocks);
        self
    }

    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.fields.order = Some(order.into());
        self
    }
}
