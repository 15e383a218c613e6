//! 關聯資料聚合
//!
//! 將扁平的關聯查詢結果收斂為不重複的物料/產品聚合物件。

use std::collections::HashMap;

use bom_core::{BomError, Material, Product, Quantity, Result, Unit};

use crate::row::{
    resolve_quantity, MaterialHeader, MaterialProductRow, MaterialRow, NameRow, ProductHeader,
    ProductMaterialRow, ProductRow,
};

/// 依首次出現順序累積聚合物件
struct Accumulator<T> {
    items: Vec<T>,
    index: HashMap<i64, usize>,
}

impl<T> Accumulator<T> {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// 取得既有項目，不存在時以 `init` 建立
    fn entry(&mut self, id: i64, init: impl FnOnce() -> T) -> &mut T {
        let items = &mut self.items;
        let slot = *self.index.entry(id).or_insert_with(|| {
            items.push(init());
            items.len() - 1
        });
        &mut self.items[slot]
    }

    fn into_items(self) -> Vec<T> {
        self.items
    }
}

/// 文字欄位與解析後的用量一致時保留原始字串，供顯示使用
fn quantity_input(quantity: &Option<Quantity>, text: Option<&str>) -> Option<String> {
    let text = text?.trim();
    let consistent = quantity.is_some() && Quantity::from_input(text).as_ref() == quantity.as_ref();
    consistent.then(|| text.to_string())
}

/// 關聯資料聚合器
pub struct RelationAggregator;

impl RelationAggregator {
    /// 聚合物料清單查詢結果
    ///
    /// 每個物料ID輸出一筆；單位、描述、用量取自第一次出現的資料列。
    /// 名稱以字串相等去重（區分大小寫），產品以ID去重。
    pub fn materials(rows: &[MaterialRow]) -> Result<Vec<Material>> {
        tracing::debug!("聚合物料資料列: {} 筆", rows.len());
        let mut acc = Accumulator::new();

        for row in rows {
            // 先解析可能格式錯誤的欄位，再觸碰累積器
            let quantity = resolve_quantity(&row.quantity, row.quantity_text.as_deref())?;
            let input = quantity_input(&quantity, row.quantity_text.as_deref());
            let product_id = row.product_id.as_id("product_id")?;
            let product_name = match (product_id, &row.product_name) {
                (Some(_), None) => {
                    return Err(BomError::Internal(format!(
                        "物料 {} 的資料列缺少產品名稱",
                        row.material_id
                    )))
                }
                (_, name) => name.clone().unwrap_or_default(),
            };

            let material = acc.entry(row.material_id, || {
                let mut material =
                    Material::new(row.material_id, Unit::new(row.unit_id, row.unit_name.clone()))
                        .with_description(row.description.clone().unwrap_or_default())
                        .with_quantity(quantity.clone());
                material.quantity_input = input;
                material
            });

            if let Some(name) = &row.name {
                Self::merge_name(material, name, row.is_primary);
            }

            if let Some(product_id) = product_id {
                material.add_product(
                    Product::reference(product_id, product_name).with_quantity(quantity),
                );
            }
        }

        let materials = acc.into_items();
        tracing::debug!("聚合完成: {} 個物料", materials.len());
        Ok(materials)
    }

    /// 聚合產品清單查詢結果
    ///
    /// 每個產品ID輸出一筆；物料以ID去重，保留第一次出現時的用量。
    pub fn products(rows: &[ProductRow]) -> Result<Vec<Product>> {
        tracing::debug!("聚合產品資料列: {} 筆", rows.len());
        let mut acc = Accumulator::new();

        for row in rows {
            let material = Self::product_row_material(row)?;
            let product = acc.entry(row.product_id, || {
                Product::new(row.product_id, row.name.clone())
                    .with_description(row.description.clone().unwrap_or_default())
            });

            if let Some(material) = material {
                if product.material(material.id).is_none() {
                    product.materials.push(material);
                }
            }
        }

        let products = acc.into_items();
        tracing::debug!("聚合完成: {} 個產品", products.len());
        Ok(products)
    }

    /// 由單一物料查詢的結果組出物料
    pub fn material(
        header: &MaterialHeader,
        names: &[NameRow],
        products: &[MaterialProductRow],
    ) -> Result<Material> {
        let mut material = Material::new(
            header.material_id,
            Unit::new(header.unit_id, header.unit_name.clone()),
        )
        .with_description(header.description.clone().unwrap_or_default());

        for row in names {
            Self::merge_name(&mut material, &row.name, row.is_primary);
        }

        for row in products {
            let quantity = resolve_quantity(&row.quantity, row.quantity_text.as_deref())?;
            material.add_product(
                Product::reference(row.product_id, row.name.clone())
                    .with_description(row.description.clone().unwrap_or_default())
                    .with_quantity(quantity),
            );
        }

        Ok(material)
    }

    /// 由單一產品查詢的結果組出產品
    pub fn product(header: &ProductHeader, materials: &[ProductMaterialRow]) -> Result<Product> {
        let mut product = Product::new(header.product_id, header.name.clone())
            .with_description(header.description.clone().unwrap_or_default());

        for row in materials {
            if product.material(row.material_id).is_some() {
                continue;
            }
            let quantity = resolve_quantity(&row.quantity, row.quantity_text.as_deref())?;
            let mut material =
                Material::new(row.material_id, Unit::new(row.unit_id, row.unit_name.clone()))
                    .with_primary_name(row.material_name.clone())
                    .with_description(row.description.clone().unwrap_or_default());
            material.quantity_input = quantity_input(&quantity, row.quantity_text.as_deref());
            material.quantity = quantity;
            product.materials.push(material);
        }

        Ok(product)
    }

    fn merge_name(material: &mut Material, name: &str, is_primary: bool) {
        if name.is_empty() {
            return;
        }
        material.add_name(name.to_string());
        if is_primary {
            if !material.has_primary_name() {
                material.primary_name = name.to_string();
            } else if material.primary_name != name {
                tracing::warn!(
                    "物料 {} 有多個主名稱，保留第一個: {}",
                    material.id,
                    material.primary_name
                );
            }
        }
    }

    fn product_row_material(row: &ProductRow) -> Result<Option<Material>> {
        let Some(material_id) = row.material_id.as_id("material_id")? else {
            return Ok(None);
        };
        let unit_id = row.unit_id.as_id("unit_id")?.ok_or_else(|| {
            BomError::Internal(format!("產品 {} 的物料 {} 缺少單位", row.product_id, material_id))
        })?;
        let quantity = resolve_quantity(&row.quantity, row.quantity_text.as_deref())?;
        let input = quantity_input(&quantity, row.quantity_text.as_deref());

        let mut material = Material::new(
            material_id,
            Unit::new(unit_id, row.unit_name.clone().unwrap_or_default()),
        )
        .with_quantity(quantity);
        material.quantity_input = input;
        if let Some(name) = &row.material_name {
            material = material.with_primary_name(name.clone());
        }
        Ok(Some(material))
    }
}

/// 聚合物料清單查詢結果
pub fn aggregate_materials(rows: &[MaterialRow]) -> Result<Vec<Material>> {
    RelationAggregator::materials(rows)
}

/// 聚合產品清單查詢結果
pub fn aggregate_products(rows: &[ProductRow]) -> Result<Vec<Product>> {
    RelationAggregator::products(rows)
}

/// 由單一物料查詢的結果組出物料
pub fn assemble_material(
    header: &MaterialHeader,
    names: &[NameRow],
    products: &[MaterialProductRow],
) -> Result<Material> {
    RelationAggregator::material(header, names, products)
}

/// 由單一產品查詢的結果組出產品
pub fn assemble_product(
    header: &ProductHeader,
    materials: &[ProductMaterialRow],
) -> Result<Product> {
    RelationAggregator::product(header, materials)
}
