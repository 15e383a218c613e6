//! 物料與產品排序

use std::cmp::Ordering;

use bom_core::{Material, Product, Quantity};
use rayon::slice::ParallelSliceMut;
use serde::{Deserialize, Serialize};

/// 排序欄位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Name,
    Unit,
    Quantity,
    Id,
}

impl SortField {
    /// 解析排序欄位，無法辨識時回到名稱
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "unit" => SortField::Unit,
            "quantity" => SortField::Quantity,
            "id" => SortField::Id,
            _ => SortField::Name,
        }
    }
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// 只有 `desc` 表示遞減，其餘皆為遞增
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("desc") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }

    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// 排序設定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortConfig {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortConfig {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }

    /// 由欄位與方向字串建立
    pub fn from_parts(field: &str, order: &str) -> Self {
        Self::new(SortField::parse(field), SortOrder::parse(order))
    }

    /// 解析 `-quantity` 形式的排序字串（前置 `-` 表示遞減）
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.strip_prefix('-') {
            Some(field) => Self::new(SortField::parse(field), SortOrder::Desc),
            None => Self::new(SortField::parse(raw), SortOrder::Asc),
        }
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// 遞增方向的用量比較：可計算的用量排在無法計算的之前
fn compare_quantities(a: Option<&Quantity>, b: Option<&Quantity>) -> Ordering {
    let value = |q: Option<&Quantity>| q.and_then(Quantity::value);
    let text = |q: Option<&Quantity>| q.map(|q| q.to_string()).unwrap_or_default();

    match (value(a), value(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => compare_text(&text(a), &text(b)),
    }
}

fn compare_materials(a: &Material, b: &Material, field: SortField) -> Ordering {
    match field {
        SortField::Name => compare_text(a.display_name(), b.display_name()),
        SortField::Unit => compare_text(&a.unit.name, &b.unit.name),
        SortField::Quantity => compare_quantities(a.quantity.as_ref(), b.quantity.as_ref()),
        SortField::Id => a.id.cmp(&b.id),
    }
}

fn compare_products(a: &Product, b: &Product, field: SortField) -> Ordering {
    match field {
        // 產品沒有單位，依名稱排序
        SortField::Name | SortField::Unit => compare_text(&a.name, &b.name),
        SortField::Quantity => compare_quantities(a.quantity.as_ref(), b.quantity.as_ref()),
        SortField::Id => a.id.cmp(&b.id),
    }
}

/// 穩定排序物料
///
/// 遞減時整個比較反轉，因此無法計算的用量在遞增時排最後、遞減時排最前。
pub fn sort_materials(materials: &mut [Material], config: SortConfig) {
    tracing::debug!("排序物料: {:?} {:?}", config.field, config.order);
    materials.par_sort_by(|a, b| config.order.apply(compare_materials(a, b, config.field)));
}

/// 穩定排序產品
pub fn sort_products(products: &mut [Product], config: SortConfig) {
    tracing::debug!("排序產品: {:?} {:?}", config.field, config.order);
    products.par_sort_by(|a, b| config.order.apply(compare_products(a, b, config.field)));
}
