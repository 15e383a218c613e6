//! 全文搜尋
//!
//! 以關鍵字同時搜尋物料（任一名稱或描述）與產品（名稱或描述），不分大小寫。
//! 結果保留輸入順序，各類別最多回傳 `limit` 筆。

use bom_core::{Material, Product};
use serde::{Deserialize, Serialize};

use crate::filter::{material_contains, normalize_query};

/// 未指定時每個類別回傳的筆數
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// 搜尋結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub materials: Vec<Material>,
    pub products: Vec<Product>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty() && self.products.is_empty()
    }

    pub fn len(&self) -> usize {
        self.materials.len() + self.products.len()
    }
}

/// 解析表單輸入的筆數上限，無效或 0 時使用預設值
pub fn parse_search_limit(raw: &str) -> usize {
    match raw.trim().parse::<usize>() {
        Ok(limit) if limit > 0 => limit,
        _ => DEFAULT_SEARCH_LIMIT,
    }
}

/// 搜尋物料
pub fn search_materials(materials: &[Material], query: &str, limit: usize) -> Vec<Material> {
    let Some(needle) = normalize_query(Some(query)) else {
        return Vec::new();
    };
    materials
        .iter()
        .filter(|m| material_contains(m, &needle))
        .take(limit)
        .cloned()
        .collect()
}

/// 搜尋產品
pub fn search_products(products: &[Product], query: &str, limit: usize) -> Vec<Product> {
    let Some(needle) = normalize_query(Some(query)) else {
        return Vec::new();
    };
    products
        .iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&needle)
                || p.description.to_lowercase().contains(&needle)
        })
        .take(limit)
        .cloned()
        .collect()
}

/// 同時搜尋物料與產品
pub fn search(
    materials: &[Material],
    products: &[Product],
    query: &str,
    limit: usize,
) -> SearchResults {
    let results = SearchResults {
        materials: search_materials(materials, query, limit),
        products: search_products(products, query, limit),
    };
    tracing::debug!(
        "搜尋 {:?}: {} 個物料、{} 個產品",
        query,
        results.materials.len(),
        results.products.len()
    );
    results
}
