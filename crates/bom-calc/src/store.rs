//! 目錄資料存取介面
//!
//! 儲存層只回傳扁平資料列，聚合、篩選、排序與需求計算都在這一層完成。

use std::collections::HashMap;

use bom_core::{Attachments, FileOwner, Material, Product, Result, Unit};

use crate::aggregate::RelationAggregator;
use crate::filter::{filter_materials, filter_products, MaterialFilter, ProductFilter};
use crate::requirements::{RequirementsCalculator, RequirementsReport};
use crate::search::{search, SearchResults};
use crate::row::{
    MaterialHeader, MaterialProductRow, MaterialRow, NameRow, ProductHeader, ProductMaterialRow,
    ProductRow,
};
use crate::sort::{sort_materials, sort_products, SortConfig};

/// 目錄儲存層
///
/// 單筆查詢找不到資料時必須回傳 `BomError::NotFound`，不得回傳零值。
pub trait CatalogStore {
    /// 物料 × 名稱 × 產品 × 單位 的關聯資料列
    fn material_rows(&self) -> Result<Vec<MaterialRow>>;

    /// 產品 × 物料 × 單位 的關聯資料列
    fn product_rows(&self) -> Result<Vec<ProductRow>>;

    fn material_header(&self, material_id: i64) -> Result<MaterialHeader>;

    fn material_names(&self, material_id: i64) -> Result<Vec<NameRow>>;

    fn material_products(&self, material_id: i64) -> Result<Vec<MaterialProductRow>>;

    fn product_header(&self, product_id: i64) -> Result<ProductHeader>;

    fn product_materials(&self, product_id: i64) -> Result<Vec<ProductMaterialRow>>;

    fn unit(&self, unit_id: i64) -> Result<Unit>;

    fn units(&self) -> Result<Vec<Unit>>;

    fn attachments(&self, owner: FileOwner) -> Result<Attachments>;
}

/// 目錄服務
pub struct Catalog<S> {
    store: S,
}

impl<S: CatalogStore> Catalog<S> {
    /// 創建新的目錄服務
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// 所有物料
    pub fn materials(&self) -> Result<Vec<Material>> {
        RelationAggregator::materials(&self.store.material_rows()?)
    }

    /// 所有產品
    pub fn products(&self) -> Result<Vec<Product>> {
        RelationAggregator::products(&self.store.product_rows()?)
    }

    /// 單一物料
    pub fn material(&self, material_id: i64) -> Result<Material> {
        let header = self.store.material_header(material_id)?;
        let names = self.store.material_names(material_id)?;
        let products = self.store.material_products(material_id)?;
        RelationAggregator::material(&header, &names, &products)
    }

    /// 單一產品
    pub fn product(&self, product_id: i64) -> Result<Product> {
        let header = self.store.product_header(product_id)?;
        let materials = self.store.product_materials(product_id)?;
        RelationAggregator::product(&header, &materials)
    }

    pub fn unit(&self, unit_id: i64) -> Result<Unit> {
        self.store.unit(unit_id)
    }

    pub fn units(&self) -> Result<Vec<Unit>> {
        self.store.units()
    }

    pub fn attachments(&self, owner: FileOwner) -> Result<Attachments> {
        self.store.attachments(owner)
    }

    /// 篩選並排序物料清單
    pub fn browse_materials(
        &self,
        filter: &MaterialFilter,
        sort: SortConfig,
    ) -> Result<Vec<Material>> {
        let mut materials = filter_materials(&self.materials()?, filter);
        sort_materials(&mut materials, sort);
        Ok(materials)
    }

    /// 篩選並排序產品清單
    pub fn browse_products(&self, filter: &ProductFilter, sort: SortConfig) -> Result<Vec<Product>> {
        let mut products = filter_products(&self.products()?, filter);
        sort_products(&mut products, sort);
        Ok(products)
    }

    /// 以關鍵字搜尋物料與產品，各類別最多 `limit` 筆
    pub fn search(&self, query: &str, limit: usize) -> Result<SearchResults> {
        Ok(search(&self.materials()?, &self.products()?, query, limit))
    }

    /// 計算產品的物料需求
    pub fn requirements(
        &self,
        product_id: i64,
        desired_count: u32,
        remaining: &HashMap<i64, f64>,
    ) -> Result<RequirementsReport> {
        let product = self.product(product_id)?;
        RequirementsCalculator::calculate_for_product(&product, desired_count, remaining)
    }
}
