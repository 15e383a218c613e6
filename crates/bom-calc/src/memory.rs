//! 記憶體內的目錄儲存
//!
//! 以正規化的表格保存資料，查詢時產生與關聯式資料庫 LEFT JOIN 相同形狀的資料列。
//! 刪除物料或產品時一併刪除名稱、關聯與附件；仍被物料引用的單位不可刪除。

use std::collections::{BTreeMap, HashMap};

use bom_core::file::{is_allowed_mime, validate_upload};
use bom_core::validation;
use bom_core::{Attachments, BomError, File, FileOwner, Material, Product, Quantity, Result, Unit};

use crate::row::{
    ColumnValue, MaterialHeader, MaterialProductRow, MaterialRow, NameRow, ProductHeader,
    ProductMaterialRow, ProductRow,
};
use crate::store::CatalogStore;

#[derive(Debug, Clone)]
struct MaterialRecord {
    unit_id: i64,
    description: String,
}

#[derive(Debug, Clone)]
struct ProductRecord {
    name: String,
    description: String,
}

#[derive(Debug, Clone)]
struct LinkRecord {
    product_id: i64,
    material_id: i64,
    /// 使用者輸入的原始字串（已去除前後空白）
    input: String,
    quantity: Option<Quantity>,
}

/// 記憶體內的目錄儲存
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    units: BTreeMap<i64, Unit>,
    materials: BTreeMap<i64, MaterialRecord>,
    names: BTreeMap<i64, Vec<NameRow>>,
    products: BTreeMap<i64, ProductRecord>,
    links: Vec<LinkRecord>,
    attachments: HashMap<FileOwner, Attachments>,
    next_id: i64,
}

/// 用量轉為資料列欄位：數值另存一份在原生欄位，文字欄位保留原始輸入
fn quantity_columns(link: &LinkRecord) -> (ColumnValue, Option<String>) {
    match &link.quantity {
        Some(Quantity::Numeric(v)) => (ColumnValue::Real(*v), Some(link.input.clone())),
        Some(Quantity::Text(t)) => (ColumnValue::Null, Some(t.clone())),
        None => (ColumnValue::Null, None),
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn require_unit(&self, unit_id: i64) -> Result<&Unit> {
        self.units
            .get(&unit_id)
            .ok_or_else(|| BomError::NotFound(format!("單位 {}", unit_id)))
    }

    fn require_material(&self, material_id: i64) -> Result<&MaterialRecord> {
        self.materials
            .get(&material_id)
            .ok_or_else(|| BomError::NotFound(format!("物料 {}", material_id)))
    }

    fn require_product(&self, product_id: i64) -> Result<&ProductRecord> {
        self.products
            .get(&product_id)
            .ok_or_else(|| BomError::NotFound(format!("產品 {}", product_id)))
    }

    fn require_owner(&self, owner: FileOwner) -> Result<()> {
        match owner {
            FileOwner::Material(id) => self.require_material(id).map(|_| ()),
            FileOwner::Product(id) => self.require_product(id).map(|_| ()),
        }
    }

    fn display_name(&self, material_id: i64) -> String {
        let names = self.names.get(&material_id).map(Vec::as_slice).unwrap_or(&[]);
        names
            .iter()
            .find(|n| n.is_primary)
            .or_else(|| names.first())
            .map(|n| n.name.clone())
            .unwrap_or_default()
    }

    fn name_rows(primary_name: &str, names: &[String]) -> Vec<NameRow> {
        names
            .iter()
            .map(|name| NameRow {
                name: name.clone(),
                is_primary: name == primary_name,
            })
            .collect()
    }

    // ===== 單位 =====

    /// 新增單位，名稱不可重複
    pub fn insert_unit(&mut self, name: &str) -> Result<i64> {
        validation::validate_required("單位名稱", name)?;
        let name = name.trim();
        if self.units.values().any(|u| u.name == name) {
            return Err(BomError::AlreadyExists(format!("單位 {}", name)));
        }
        let id = self.allocate_id();
        self.units.insert(id, Unit::new(id, name));
        tracing::debug!("新增單位 {}: {}", id, name);
        Ok(id)
    }

    pub fn rename_unit(&mut self, unit_id: i64, name: &str) -> Result<()> {
        validation::validate_required("單位名稱", name)?;
        let name = name.trim();
        if self.units.values().any(|u| u.id != unit_id && u.name == name) {
            return Err(BomError::AlreadyExists(format!("單位 {}", name)));
        }
        let unit = self
            .units
            .get_mut(&unit_id)
            .ok_or_else(|| BomError::NotFound(format!("單位 {}", unit_id)))?;
        unit.name = name.to_string();
        Ok(())
    }

    /// 刪除單位（仍被物料引用時拒絕）
    pub fn delete_unit(&mut self, unit_id: i64) -> Result<()> {
        self.require_unit(unit_id)?;
        let in_use = self.materials.values().filter(|m| m.unit_id == unit_id).count();
        if in_use > 0 {
            return Err(BomError::IncorrectValue(format!(
                "單位 {} 仍被 {} 個物料使用",
                unit_id, in_use
            )));
        }
        self.units.remove(&unit_id);
        Ok(())
    }

    // ===== 物料 =====

    /// 新增物料，回傳新ID
    ///
    /// 名稱、單位、描述取自 `material`；其 `id`、用量與產品清單不使用。
    pub fn insert_material(&mut self, material: &Material) -> Result<i64> {
        validation::validate_names(&material.names)?;
        self.require_unit(material.unit.id)?;

        let id = self.allocate_id();
        self.materials.insert(
            id,
            MaterialRecord {
                unit_id: material.unit.id,
                description: material.description.clone(),
            },
        );
        self.names
            .insert(id, Self::name_rows(&material.primary_name, &material.names));
        tracing::debug!("新增物料 {}: {}", id, material.display_name());
        Ok(id)
    }

    /// 替換物料的所有名稱
    pub fn set_material_names(
        &mut self,
        material_id: i64,
        primary_name: &str,
        names: Vec<String>,
    ) -> Result<()> {
        let record = self.require_material(material_id)?;
        let mut material = Material::new(material_id, Unit::new(record.unit_id, ""));
        material.set_names(primary_name, names)?;
        self.names.insert(
            material_id,
            Self::name_rows(&material.primary_name, &material.names),
        );
        Ok(())
    }

    pub fn set_material_unit(&mut self, material_id: i64, unit_id: i64) -> Result<()> {
        self.require_unit(unit_id)?;
        let record = self
            .materials
            .get_mut(&material_id)
            .ok_or_else(|| BomError::NotFound(format!("物料 {}", material_id)))?;
        record.unit_id = unit_id;
        Ok(())
    }

    pub fn set_material_description(&mut self, material_id: i64, description: &str) -> Result<()> {
        validation::validate_description(description)?;
        let record = self
            .materials
            .get_mut(&material_id)
            .ok_or_else(|| BomError::NotFound(format!("物料 {}", material_id)))?;
        record.description = description.to_string();
        Ok(())
    }

    /// 刪除物料及其名稱、產品關聯與附件
    pub fn delete_material(&mut self, material_id: i64) -> Result<()> {
        self.require_material(material_id)?;
        self.materials.remove(&material_id);
        self.names.remove(&material_id);
        self.links.retain(|l| l.material_id != material_id);
        self.attachments.remove(&FileOwner::Material(material_id));
        tracing::debug!("刪除物料 {}", material_id);
        Ok(())
    }

    // ===== 產品 =====

    /// 新增產品及其物料清單，回傳新ID
    pub fn insert_product(&mut self, product: &Product) -> Result<i64> {
        validation::validate_required("產品名稱", &product.name)?;
        validation::validate_description(&product.description)?;
        for material in &product.materials {
            self.require_material(material.id)?;
        }

        let id = self.allocate_id();
        self.products.insert(
            id,
            ProductRecord {
                name: product.name.clone(),
                description: product.description.clone(),
            },
        );
        for material in &product.materials {
            self.set_product_material(id, material.id, &material.quantity_display())?;
        }
        tracing::debug!("新增產品 {}: {}", id, product.name);
        Ok(id)
    }

    pub fn update_product(&mut self, product_id: i64, name: &str, description: &str) -> Result<()> {
        validation::validate_required("產品名稱", name)?;
        validation::validate_description(description)?;
        let record = self
            .products
            .get_mut(&product_id)
            .ok_or_else(|| BomError::NotFound(format!("產品 {}", product_id)))?;
        record.name = name.to_string();
        record.description = description.to_string();
        Ok(())
    }

    /// 設置產品使用的物料數量
    ///
    /// `quantity` 為表單輸入的字串，可為數值或文字備註，空白表示未設定。
    /// 同一產品與物料只保留一筆關聯，重複設置時以最後一次為準。
    pub fn set_product_material(
        &mut self,
        product_id: i64,
        material_id: i64,
        quantity: &str,
    ) -> Result<()> {
        self.require_product(product_id)?;
        self.require_material(material_id)?;

        let input = quantity.trim().to_string();
        let quantity = Quantity::from_input(&input);
        match self
            .links
            .iter_mut()
            .find(|l| l.product_id == product_id && l.material_id == material_id)
        {
            Some(link) => {
                link.input = input;
                link.quantity = quantity;
            }
            None => self.links.push(LinkRecord {
                product_id,
                material_id,
                input,
                quantity,
            }),
        }
        Ok(())
    }

    /// 移除產品的物料，回傳是否有移除
    pub fn remove_product_material(&mut self, product_id: i64, material_id: i64) -> Result<bool> {
        self.require_product(product_id)?;
        let before = self.links.len();
        self.links
            .retain(|l| !(l.product_id == product_id && l.material_id == material_id));
        Ok(self.links.len() != before)
    }

    /// 刪除產品及其物料關聯與附件
    pub fn delete_product(&mut self, product_id: i64) -> Result<()> {
        self.require_product(product_id)?;
        self.products.remove(&product_id);
        self.links.retain(|l| l.product_id != product_id);
        self.attachments.remove(&FileOwner::Product(product_id));
        tracing::debug!("刪除產品 {}", product_id);
        Ok(())
    }

    // ===== 附件 =====

    /// 附加檔案，回傳新的附件ID
    pub fn insert_file(
        &mut self,
        owner: FileOwner,
        name: &str,
        path: &str,
        mime_type: &str,
        size_bytes: u64,
    ) -> Result<i64> {
        self.require_owner(owner)?;
        validate_upload(mime_type, size_bytes)?;

        let id = self.allocate_id();
        self.attachments
            .entry(owner)
            .or_insert_with(|| Attachments::new(owner))
            .attach(File::new(id, name, path, mime_type));
        Ok(id)
    }

    /// 設置主圖
    pub fn set_profile_picture(&mut self, owner: FileOwner, file_id: i64) -> Result<()> {
        self.require_owner(owner)?;
        let attachments = self
            .attachments
            .get_mut(&owner)
            .ok_or_else(|| BomError::NotFound(format!("附件 {}", file_id)))?;
        let is_image = attachments
            .files
            .iter()
            .find(|f| f.id == file_id)
            .map(File::is_image);
        if is_image == Some(false) {
            return Err(BomError::IncorrectValue(format!("附件 {} 不是圖片", file_id)));
        }
        attachments.set_profile_picture(file_id)
    }

    pub fn delete_file(&mut self, owner: FileOwner, file_id: i64) -> Result<File> {
        self.attachments
            .get_mut(&owner)
            .and_then(|a| a.detach(file_id))
            .ok_or_else(|| BomError::NotFound(format!("附件 {}", file_id)))
    }

    /// 檔案類型是否可作為附件
    pub fn accepts_mime(mime_type: &str) -> bool {
        is_allowed_mime(mime_type)
    }
}

impl CatalogStore for MemoryStore {
    fn material_rows(&self) -> Result<Vec<MaterialRow>> {
        let mut rows = Vec::new();
        for (&material_id, record) in &self.materials {
            let unit = self.require_unit(record.unit_id)?;
            let mut base = MaterialRow::new(material_id, unit);
            base.description = Some(record.description.clone());

            let names: Vec<Option<&NameRow>> = match self.names.get(&material_id) {
                Some(names) if !names.is_empty() => names.iter().map(Some).collect(),
                _ => vec![None],
            };
            let links: Vec<Option<&LinkRecord>> = {
                let found: Vec<_> = self
                    .links
                    .iter()
                    .filter(|l| l.material_id == material_id)
                    .map(Some)
                    .collect();
                if found.is_empty() {
                    vec![None]
                } else {
                    found
                }
            };

            for name in &names {
                for link in &links {
                    let mut row = base.clone();
                    if let Some(name) = name {
                        row = row.with_name(name.name.clone(), name.is_primary);
                    }
                    if let Some(link) = link {
                        let product = self.require_product(link.product_id)?;
                        let (quantity, quantity_text) = quantity_columns(link);
                        row = row.with_product(link.product_id, product.name.clone());
                        row.quantity = quantity;
                        row.quantity_text = quantity_text;
                    }
                    rows.push(row);
                }
            }
        }
        Ok(rows)
    }

    fn product_rows(&self) -> Result<Vec<ProductRow>> {
        let mut rows = Vec::new();
        for (&product_id, record) in &self.products {
            let base = ProductRow::new(product_id, record.name.clone())
                .with_description(record.description.clone());

            let mut has_links = false;
            for link in self.links.iter().filter(|l| l.product_id == product_id) {
                has_links = true;
                let material = self.require_material(link.material_id)?;
                let unit = self.require_unit(material.unit_id)?;
                let (quantity, quantity_text) = quantity_columns(link);
                let mut row = base
                    .clone()
                    .with_material(link.material_id, self.display_name(link.material_id), unit);
                row.quantity = quantity;
                row.quantity_text = quantity_text;
                rows.push(row);
            }
            if !has_links {
                rows.push(base);
            }
        }
        Ok(rows)
    }

    fn material_header(&self, material_id: i64) -> Result<MaterialHeader> {
        let record = self.require_material(material_id)?;
        let unit = self.require_unit(record.unit_id)?;
        Ok(MaterialHeader {
            material_id,
            unit_id: unit.id,
            unit_name: unit.name.clone(),
            description: Some(record.description.clone()),
        })
    }

    fn material_names(&self, material_id: i64) -> Result<Vec<NameRow>> {
        self.require_material(material_id)?;
        Ok(self.names.get(&material_id).cloned().unwrap_or_default())
    }

    fn material_products(&self, material_id: i64) -> Result<Vec<MaterialProductRow>> {
        self.require_material(material_id)?;
        self.links
            .iter()
            .filter(|l| l.material_id == material_id)
            .map(|link| {
                let product = self.require_product(link.product_id)?;
                let (quantity, quantity_text) = quantity_columns(link);
                Ok(MaterialProductRow {
                    product_id: link.product_id,
                    name: product.name.clone(),
                    description: Some(product.description.clone()),
                    quantity,
                    quantity_text,
                })
            })
            .collect()
    }

    fn product_header(&self, product_id: i64) -> Result<ProductHeader> {
        let record = self.require_product(product_id)?;
        Ok(ProductHeader {
            product_id,
            name: record.name.clone(),
            description: Some(record.description.clone()),
        })
    }

    fn product_materials(&self, product_id: i64) -> Result<Vec<ProductMaterialRow>> {
        self.require_product(product_id)?;
        self.links
            .iter()
            .filter(|l| l.product_id == product_id)
            .map(|link| {
                let material = self.require_material(link.material_id)?;
                let unit = self.require_unit(material.unit_id)?;
                let (quantity, quantity_text) = quantity_columns(link);
                Ok(ProductMaterialRow {
                    material_id: link.material_id,
                    material_name: self.display_name(link.material_id),
                    unit_id: unit.id,
                    unit_name: unit.name.clone(),
                    description: Some(material.description.clone()),
                    quantity,
                    quantity_text,
                })
            })
            .collect()
    }

    fn unit(&self, unit_id: i64) -> Result<Unit> {
        self.require_unit(unit_id).cloned()
    }

    fn units(&self) -> Result<Vec<Unit>> {
        Ok(self.units.values().cloned().collect())
    }

    fn attachments(&self, owner: FileOwner) -> Result<Attachments> {
        self.require_owner(owner)?;
        Ok(self
            .attachments
            .get(&owner)
            .cloned()
            .unwrap_or_else(|| Attachments::new(owner)))
    }
}
