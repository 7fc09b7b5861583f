//! 模拟数据模型
//!
//! 包含商品、用户会话与模拟事件等数据结构。

pub mod event;
pub mod product;
pub mod session;

pub use event::{ActivityEvent, EventFields, EventKind, Severity};
pub use product::{Product, ProductSnapshot, TakeOutcome};
pub use session::{OrderHistory, Session, UserState};
