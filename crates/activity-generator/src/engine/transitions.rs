//! 状态转移表
//!
//! 每张表列出下一状态及其权重，按权重随机选取。

use rand::Rng;
use rand::seq::SliceRandom;

use activity_shared::error::{Result, SimError};

use crate::models::UserState::{self, *};

/// 带权重的转移表
pub type TransitionTable = &'static [(UserState, u32)];

/// 登录成功后：浏览商店或历史订单
pub const AFTER_LOGIN: TransitionTable = &[(Browsing, 1), (BrowseHistory, 1)];

/// 登录失败后：重试或找回密码
pub const AFTER_LOGIN_FAILURE: TransitionTable = &[(LoggedOut, 1), (ForgotPassword, 1)];

/// 浏览商店后：倾向于继续浏览或加购
pub const AFTER_BROWSE: TransitionTable = &[
    (Browsing, 4),
    (AddToCart, 4),
    (RemoveFromCart, 1),
    (BrowseHistory, 1),
];

/// 加购成功后
pub const AFTER_ADD_TO_CART: TransitionTable = &[
    (Browsing, 3),
    (AddToCart, 2),
    (RemoveFromCart, 1),
    (Checkout, 3),
];

/// 下单后总是进入支付
pub const AFTER_CHECKOUT: TransitionTable = &[(PayAttempt, 1)];

/// 支付结果：九成成功
pub const AFTER_PAY_ATTEMPT: TransitionTable = &[(PaySuccess, 9), (PayFailure, 1)];

/// 支付失败后：重新下单或取消
pub const AFTER_PAY_FAILURE: TransitionTable = &[(Checkout, 4), (OrderCancelled, 1)];

/// 回到商店或历史订单
pub const BACK_TO_SHOP: TransitionTable = &[(Browsing, 1), (BrowseHistory, 1)];

/// 浏览历史订单后：查看某笔订单或登出
pub const AFTER_HISTORY: TransitionTable = &[(ViewOrder, 1), (Logout, 1)];

/// 按权重选取下一状态
pub fn pick<R>(rng: &mut R, table: TransitionTable) -> Result<UserState>
where
    R: Rng + ?Sized,
{
    table
        .choose_weighted(rng, |(_, weight)| *weight)
        .map(|(state, _)| *state)
        .map_err(|e| SimError::InvariantViolation(format!("转移表无效: {e}")))
}

/// 某状态一步之内可能到达的全部状态
pub fn possible_next(state: UserState) -> &'static [UserState] {
    match state {
        PasswordResetComplete => &[LoggedOut],
        ForgotPassword => &[PasswordResetComplete],
        LoggedOut => &[LoggedOut, ForgotPassword, Browsing, BrowseHistory],
        Browsing => &[Browsing, AddToCart, RemoveFromCart, BrowseHistory],
        AddToCart => &[Browsing, AddToCart, RemoveFromCart, Checkout],
        RemoveFromCart => &[Browsing],
        Checkout => &[Browsing, BrowseHistory, PayAttempt],
        PayAttempt => &[Browsing, PaySuccess, PayFailure],
        PaySuccess => &[Browsing, BrowseHistory],
        PayFailure => &[Checkout, OrderCancelled],
        OrderCancelled => &[Browsing, BrowseHistory],
        BrowseHistory => &[ViewOrder, Logout],
        ViewOrder => &[Browsing, LoggedOut],
        Logout => &[LoggedOut],
    }
}

/// 随机生成浏览器标识
///
/// 四分之三为 chrome-89..=108，其余为 safari-14..=16 的小版本。
pub fn random_device<R>(rng: &mut R) -> String
where
    R: Rng + ?Sized,
{
    if rng.gen_range(0..4) == 3 {
        format!("safari-{}.{}", 14 + rng.gen_range(0..3), rng.gen_range(0..5))
    } else {
        format!("chrome-{}", 89 + rng.gen_range(0..20))
    }
}
