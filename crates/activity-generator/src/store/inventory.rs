//! 共享库存
//!
//! 固定长度的商品数组，按稳定下标寻址。所有步骤通过 `Arc<Inventory>` 共享，
//! 并发修改只发生在单个商品的原子库存上，数组本身创建后不再变化。

use activity_shared::error::{Result, SimError};
use activity_shared::observability::metrics;

use crate::models::{Product, ProductSnapshot, TakeOutcome};

/// 库存
#[derive(Debug)]
pub struct Inventory {
    products: Vec<Product>,
}

impl Inventory {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// 按下标获取商品
    ///
    /// 下标越界说明购物车或采样逻辑有缺陷，作为不变量错误返回。
    pub fn get(&self, index: usize) -> Result<&Product> {
        self.products.get(index).ok_or(SimError::ProductOutOfRange {
            index,
            len: self.products.len(),
        })
    }

    /// 扣减 1 件库存
    pub fn take(&self, index: usize) -> Result<TakeOutcome> {
        let product = self.get(index)?;
        let outcome = product.try_take();
        if let TakeOutcome::Taken { remaining } = outcome {
            metrics::set_product_stock(&product.id, remaining);
        }
        Ok(outcome)
    }

    /// 归还 1 件库存，返回归还后的数量
    pub fn restock(&self, index: usize) -> Result<u32> {
        let product = self.get(index)?;
        let quantity = product.restock();
        metrics::set_product_stock(&product.id, quantity);
        Ok(quantity)
    }

    /// 全部库存之和
    pub fn total_quantity(&self) -> u64 {
        self.products.iter().map(|p| u64::from(p.quantity())).sum()
    }

    /// 当前库存快照
    pub fn snapshot(&self) -> Vec<ProductSnapshot> {
        self.products.iter().map(Product::snapshot).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }
}
