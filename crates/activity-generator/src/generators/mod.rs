//! 生成器模块
//!
//! 提供标识符、名称以及启动数据的生成。

pub mod ids;
pub mod names;
pub mod population;

pub use ids::{IdGenerator, SequentialIdGenerator, UuidGenerator};
pub use names::{FakeNameSupplier, NameSupplier, product_catalog, product_names};
pub use population::{Population, PopulationConfig};
