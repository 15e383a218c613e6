//! 物料與產品篩選

use bom_core::{parse_quantity, BomError, Material, Product, Result};
use serde::{Deserialize, Serialize};

/// 用量範圍（上下限皆可省略，包含端點）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuantityRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl QuantityRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// 解析表單輸入的上下限
    ///
    /// 空字串表示不限；其他無法解析的值回傳 `IncorrectValue`。
    pub fn parse(min: &str, max: &str) -> Result<Self> {
        let bound = |raw: &str, label: &str| -> Result<Option<f64>> {
            if raw.trim().is_empty() {
                return Ok(None);
            }
            parse_quantity(raw)
                .map(Some)
                .ok_or_else(|| BomError::IncorrectValue(format!("{}無法解析: {}", label, raw)))
        };
        Ok(Self::new(bound(min, "用量下限")?, bound(max, "用量上限")?))
    }

    /// 是否有任一端點
    pub fn is_active(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// 解析以逗號分隔的ID清單（忽略空白項）
pub fn parse_id_list(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| BomError::IncorrectValue(format!("無效的ID: {}", s)))
        })
        .collect()
}

/// 整理搜尋字串：去除前後空白並轉小寫，空白字串回傳 `None`
pub(crate) fn normalize_query(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

/// 任一名稱或描述包含關鍵字（`needle` 需已轉小寫）
pub(crate) fn material_contains(material: &Material, needle: &str) -> bool {
    material
        .names
        .iter()
        .chain(std::iter::once(&material.primary_name))
        .chain(std::iter::once(&material.description))
        .any(|text| text.to_lowercase().contains(needle))
}

/// 物料篩選條件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialFilter {
    /// 名稱或描述包含（不分大小寫）
    pub query: Option<String>,

    /// 只保留有主名稱的物料
    pub primary_only: bool,

    /// 被其中任一產品使用
    pub product_ids: Vec<i64>,

    /// 單位在此集合中
    pub unit_ids: Vec<i64>,

    /// 用量範圍
    pub quantity_range: Option<QuantityRange>,
}

impl MaterialFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置關鍵字
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// 建構器模式：只保留有主名稱的物料
    pub fn with_primary_only(mut self, primary_only: bool) -> Self {
        self.primary_only = primary_only;
        self
    }

    /// 建構器模式：設置產品ID集合
    pub fn with_product_ids(mut self, product_ids: Vec<i64>) -> Self {
        self.product_ids = product_ids;
        self
    }

    /// 建構器模式：設置單位ID集合
    pub fn with_unit_ids(mut self, unit_ids: Vec<i64>) -> Self {
        self.unit_ids = unit_ids;
        self
    }

    /// 建構器模式：設置用量範圍
    pub fn with_quantity_range(mut self, range: QuantityRange) -> Self {
        self.quantity_range = Some(range);
        self
    }

    /// 沒有任何啟用的條件
    pub fn is_empty(&self) -> bool {
        normalize_query(self.query.as_deref()).is_none()
            && !self.primary_only
            && self.product_ids.is_empty()
            && self.unit_ids.is_empty()
            && !self.quantity_range.is_some_and(|r| r.is_active())
    }

    /// 所有啟用的條件以 AND 組合
    pub fn matches(&self, material: &Material) -> bool {
        if let Some(needle) = normalize_query(self.query.as_deref()) {
            if !material_contains(material, &needle) {
                return false;
            }
        }
        if self.primary_only && !material.has_primary_name() {
            return false;
        }
        if !self.product_ids.is_empty() && !material.is_used_in_any(&self.product_ids) {
            return false;
        }
        if !self.unit_ids.is_empty() && !self.unit_ids.contains(&material.unit.id) {
            return false;
        }
        if let Some(range) = self.quantity_range.filter(QuantityRange::is_active) {
            // 無法解析的用量不納入範圍篩選結果
            return material.quantity_value().is_some_and(|v| range.contains(v));
        }
        true
    }
}

/// 產品篩選條件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    /// 名稱包含（不分大小寫）
    pub name_contains: Option<String>,

    /// 使用其中任一物料
    pub material_ids: Vec<i64>,
}

impl ProductFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置名稱關鍵字
    pub fn with_name_contains(mut self, needle: impl Into<String>) -> Self {
        self.name_contains = Some(needle.into());
        self
    }

    /// 建構器模式：設置物料ID集合
    pub fn with_material_ids(mut self, material_ids: Vec<i64>) -> Self {
        self.material_ids = material_ids;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.needle().is_none() && self.material_ids.is_empty()
    }

    pub fn matches(&self, product: &Product) -> bool {
        if let Some(needle) = self.needle() {
            if !product.name.to_lowercase().contains(&needle) {
                return false;
            }
        }
        self.material_ids.is_empty() || product.uses_any(&self.material_ids)
    }

    fn needle(&self) -> Option<String> {
        normalize_query(self.name_contains.as_deref())
    }
}

/// 篩選物料，保留原順序
pub fn filter_materials(materials: &[Material], filter: &MaterialFilter) -> Vec<Material> {
    if filter.is_empty() {
        return materials.to_vec();
    }
    let kept: Vec<Material> = materials
        .iter()
        .filter(|m| filter.matches(m))
        .cloned()
        .collect();
    tracing::debug!("物料篩選: {} -> {}", materials.len(), kept.len());
    kept
}

/// 篩選產品，保留原順序
pub fn filter_products(products: &[Product], filter: &ProductFilter) -> Vec<Product> {
    if filter.is_empty() {
        return products.to_vec();
    }
    let kept: Vec<Product> = products
        .iter()
        .filter(|p| filter.matches(p))
        .cloned()
        .collect();
    tracing::debug!("產品篩選: {} -> {}", products.len(), kept.len());
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use bom_core::{Quantity, Unit};
    use rstest::rstest;

    fn material(id: i64, unit_id: i64, quantity: &str, product_ids: &[i64]) -> Material {
        let mut m = Material::new(id, Unit::new(unit_id, format!("U{}", unit_id)))
            .with_name(format!("M{}", id))
            .with_quantity(Quantity::from_input(quantity));
        for &pid in product_ids {
            m.add_product(Product::reference(pid, format!("P{}", pid)));
        }
        m
    }

    fn catalog() -> Vec<Material> {
        vec![
            material(1, 1, "2", &[7]),
            material(2, 1, "as needed", &[7, 8]),
            material(3, 2, "10,5", &[8]),
            material(4, 2, "", &[]).with_primary_name("Primary"),
        ]
    }

    fn ids(materials: &[Material]) -> Vec<i64> {
        materials.iter().map(|m| m.id).collect()
    }

    #[test]
    fn test_empty_filter_returns_input_unchanged() {
        let input = catalog();
        assert_eq!(filter_materials(&input, &MaterialFilter::new()), input);
    }

    #[test]
    fn test_filter_by_product_id() {
        let result = filter_materials(&catalog(), &MaterialFilter::new().with_product_ids(vec![7]));
        assert_eq!(ids(&result), vec![1, 2]);
    }

    #[test]
    fn test_product_ids_are_or_combined() {
        let result =
            filter_materials(&catalog(), &MaterialFilter::new().with_product_ids(vec![7, 8]));
        assert_eq!(ids(&result), vec![1, 2, 3]);
    }

    #[test]
    fn test_criteria_are_and_combined() {
        let filter = MaterialFilter::new()
            .with_product_ids(vec![8])
            .with_unit_ids(vec![1]);
        assert_eq!(ids(&filter_materials(&catalog(), &filter)), vec![2]);
    }

    #[test]
    fn test_primary_only() {
        let filter = MaterialFilter::new().with_primary_only(true);
        assert_eq!(ids(&filter_materials(&catalog(), &filter)), vec![4]);
    }

    #[test]
    fn test_query_matches_names_and_description() {
        let materials = vec![
            material(1, 1, "2", &[]).with_name("Сталь"),
            material(2, 1, "2", &[]).with_description("Stainless sheet"),
            material(3, 1, "2", &[]),
        ];

        let by_name = MaterialFilter::new().with_query("СТАЛЬ");
        assert_eq!(ids(&filter_materials(&materials, &by_name)), vec![1]);

        let by_description = MaterialFilter::new().with_query(" stainless ");
        assert_eq!(ids(&filter_materials(&materials, &by_description)), vec![2]);

        // 與其他條件以 AND 組合
        let combined = MaterialFilter::new().with_query("m").with_unit_ids(vec![2]);
        assert!(filter_materials(&materials, &combined).is_empty());

        let blank = MaterialFilter::new().with_query("   ");
        assert!(blank.is_empty());
        assert_eq!(filter_materials(&materials, &blank), materials);
    }

    #[test]
    fn test_quantity_range_excludes_unparseable() {
        let filter = MaterialFilter::new().with_quantity_range(QuantityRange::new(Some(0.0), None));
        // "as needed" 與未設定的用量都被排除
        assert_eq!(ids(&filter_materials(&catalog(), &filter)), vec![1, 3]);

        let filter = MaterialFilter::new().with_quantity_range(QuantityRange::new(None, Some(5.0)));
        assert_eq!(ids(&filter_materials(&catalog(), &filter)), vec![1]);
    }

    #[test]
    fn test_inactive_range_is_ignored() {
        let filter = MaterialFilter::new().with_quantity_range(QuantityRange::default());
        assert!(filter.is_empty());
        assert_eq!(filter_materials(&catalog(), &filter).len(), 4);
    }

    #[rstest]
    #[case("", "", None, None)]
    #[case("1,5", "", Some(1.5), None)]
    #[case(" ", "10", None, Some(10.0))]
    fn test_quantity_range_parse(
        #[case] min: &str,
        #[case] max: &str,
        #[case] expected_min: Option<f64>,
        #[case] expected_max: Option<f64>,
    ) {
        let range = QuantityRange::parse(min, max).unwrap();
        assert_eq!(range, QuantityRange::new(expected_min, expected_max));
    }

    #[test]
    fn test_quantity_range_parse_rejects_text() {
        assert!(matches!(
            QuantityRange::parse("many", ""),
            Err(BomError::IncorrectValue(_))
        ));
    }

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("1, 2,,3 ").unwrap(), vec![1, 2, 3]);
        assert!(parse_id_list("").unwrap().is_empty());
        assert!(parse_id_list("1,x").is_err());
    }

    #[test]
    fn test_filter_products() {
        let steel = Material::new(1, Unit::new(1, "kg"));
        let bolt = Material::new(2, Unit::new(2, "pcs"));
        let products = vec![
            Product::new(10, "City Bike").with_material(steel.clone()),
            Product::new(11, "Cargo bike").with_material(bolt.clone()),
            Product::new(12, "Lamp").with_material(steel).with_material(bolt),
        ];

        let by_name = filter_products(&products, &ProductFilter::new().with_name_contains("BIKE"));
        assert_eq!(by_name.iter().map(|p| p.id).collect::<Vec<_>>(), vec![10, 11]);

        let filter = ProductFilter::new()
            .with_name_contains("bike")
            .with_material_ids(vec![2]);
        let both = filter_products(&products, &filter);
        assert_eq!(both.iter().map(|p| p.id).collect::<Vec<_>>(), vec![11]);

        let blank = ProductFilter::new().with_name_contains("  ");
        assert_eq!(filter_products(&products, &blank), products);
    }
}
