//! 初始数据生成
//!
//! 启动时一次性生成库存与全部模拟用户会话。

use rand::Rng;
use tracing::debug;

use activity_shared::config::SimulationConfig;

use super::ids::IdGenerator;
use super::names::{NameSupplier, product_names};
use crate::models::{Product, Session};
use crate::store::Inventory;

/// 数据生成配置
#[derive(Debug, Clone)]
pub struct PopulationConfig {
    /// 用户数量
    pub user_count: usize,
    /// 商品数量
    pub product_count: usize,
    /// 初始库存上限（不含）
    pub max_quantity: u32,
}

impl Default for PopulationConfig {
    /// 默认配置：100 用户，100 商品，每个商品 0-19 件库存
    fn default() -> Self {
        Self {
            user_count: 100,
            product_count: 100,
            max_quantity: 20,
        }
    }
}

impl From<&SimulationConfig> for PopulationConfig {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            user_count: config.max_users,
            product_count: config.nb_products,
            max_quantity: config.max_quantities,
        }
    }
}

/// 生成结果
#[derive(Debug)]
pub struct Population {
    pub inventory: Inventory,
    pub sessions: Vec<Session>,
}

impl Population {
    /// 生成库存与会话
    ///
    /// `max_quantity` 为 0 时所有商品库存为 0。
    pub fn generate<R>(
        config: &PopulationConfig,
        names: &dyn NameSupplier,
        ids: &dyn IdGenerator,
        rng: &mut R,
    ) -> Self
    where
        R: Rng + ?Sized,
    {
        let inventory = Self::generate_inventory(config, ids, rng);

        let sessions: Vec<Session> = (0..config.user_count)
            .map(|_| Session::new(ids.next_id(), names.next_name()))
            .collect();

        debug!(
            users = sessions.len(),
            products = inventory.len(),
            total_stock = inventory.total_quantity(),
            "初始数据生成完成"
        );

        Self {
            inventory,
            sessions,
        }
    }

    /// 只生成库存
    pub fn generate_inventory<R>(
        config: &PopulationConfig,
        ids: &dyn IdGenerator,
        rng: &mut R,
    ) -> Inventory
    where
        R: Rng + ?Sized,
    {
        let products = product_names(config.product_count)
            .into_iter()
            .map(|name| {
                let quantity = if config.max_quantity == 0 {
                    0
                } else {
                    rng.gen_range(0..config.max_quantity)
                };
                Product::new(ids.next_id(), name, quantity)
            })
            .collect();

        Inventory::new(products)
    }
}
