//! 商品模型
//!
//! 库存数量使用原子整数保存，所有模拟用户可以并发读写同一个商品，
//! 扣减通过 CAS 完成，不会出现负库存或读到过期值。

use serde::Serialize;
use std::sync::atomic::{AtomicU32, Ordering};

/// 商品
#[derive(Debug)]
pub struct Product {
    pub id: String,
    pub name: String,
    quantity: AtomicU32,
}

/// 扣减库存的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TakeOutcome {
    /// 扣减成功，携带扣减后的剩余数量
    Taken { remaining: u32 },
    /// 库存为 0，未做任何修改
    OutOfStock,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, quantity: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            quantity: AtomicU32::new(quantity),
        }
    }

    /// 当前库存
    pub fn quantity(&self) -> u32 {
        self.quantity.load(Ordering::Acquire)
    }

    /// 库存大于等于 1 时扣减 1
    pub fn try_take(&self) -> TakeOutcome {
        match self
            .quantity
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |q| q.checked_sub(1))
        {
            Ok(previous) => TakeOutcome::Taken {
                remaining: previous - 1,
            },
            Err(_) => TakeOutcome::OutOfStock,
        }
    }

    /// 归还 1 件库存，返回归还后的数量
    pub fn restock(&self) -> u32 {
        self.quantity.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// 生成可序列化的快照
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            quantity: self.quantity(),
        }
    }
}

/// 商品快照，用于输出目录和统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSnapshot {
    pub id: String,
    pub name: String,
    pub quantity: u32,
}
