//! 共享存储
//!
//! 库存是所有模拟用户唯一共享的业务数据。

pub mod inventory;

pub use inventory::Inventory;
