//! 名称生成
//!
//! 用户显示名由注入的 NameSupplier 提供；商品名来自固定的服装目录，
//! 由品类、颜色、人群三者组合而成。

use fake::Fake;
use fake::faker::name::en::Name;

/// 用户显示名提供者
#[cfg_attr(test, mockall::automock)]
pub trait NameSupplier: Send + Sync {
    fn next_name(&self) -> String;
}

/// 使用 fake crate 生成英文姓名
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeNameSupplier;

impl NameSupplier for FakeNameSupplier {
    fn next_name(&self) -> String {
        Name().fake()
    }
}

const GARMENTS: [&str; 11] = [
    "trousers", "tee-shirt", "coat", "shirt", "scarf", "shoes", "socks", "boots", "beanie",
    "gloves", "glasses",
];

const AUDIENCES: [&str; 4] = ["men", "women", "girl", "boy"];

const COLORS: [&str; 9] = [
    "blue", "white", "red", "green", "black", "grey", "yellow", "purple", "pink",
];

/// 商品目录中的全部名称
///
/// 顺序为品类优先、人群其次、颜色最后，形如 `coat black women`。
pub fn product_catalog() -> Vec<String> {
    GARMENTS
        .iter()
        .flat_map(|garment| {
            AUDIENCES.iter().flat_map(move |audience| {
                COLORS
                    .iter()
                    .map(move |color| format!("{garment} {color} {audience}"))
            })
        })
        .collect()
}

/// 生成指定数量的商品名，超过目录大小时循环使用
pub fn product_names(count: usize) -> Vec<String> {
    let catalog = product_catalog();
    catalog.iter().cycle().take(count).cloned().collect()
}
