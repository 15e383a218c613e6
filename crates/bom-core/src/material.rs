//! 物料模型

use serde::{Deserialize, Serialize};

use crate::product::Product;
use crate::quantity::Quantity;
use crate::validation;
use crate::Result;

/// 計量單位
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// 單位ID
    pub id: i64,

    /// 單位名稱
    pub name: String,
}

impl Unit {
    /// 創建新的計量單位
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// 物料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// 物料ID
    pub id: i64,

    /// 所有名稱（依出現順序，不重複）
    pub names: Vec<String>,

    /// 主名稱（可能為空，見 [`Material::display_name`]）
    pub primary_name: String,

    /// 計量單位
    pub unit: Unit,

    /// 描述
    pub description: String,

    /// 依情境而定的用量
    /// - 從產品查看：每單位產品所需數量
    /// - 單獨查看：通常未設定
    pub quantity: Option<Quantity>,

    /// 用量保存時的原始字串（例如 "2,5"），顯示時優先使用
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_input: Option<String>,

    /// 使用此物料的產品（每筆帶有該產品所需的用量）
    pub products: Vec<Product>,
}

impl Material {
    /// 創建新的物料
    pub fn new(id: i64, unit: Unit) -> Self {
        Self {
            id,
            names: Vec::new(),
            primary_name: String::new(),
            unit,
            description: String::new(),
            quantity: None,
            quantity_input: None,
            products: Vec::new(),
        }
    }

    /// 由表單輸入建立物料並驗證名稱
    ///
    /// 主名稱不在名稱清單中時會被加入清單。
    pub fn from_input(
        primary_name: &str,
        other_names: Vec<String>,
        unit: Unit,
        description: &str,
    ) -> Result<Self> {
        let mut material = Self::new(0, unit).with_description(description);
        material.set_names(primary_name, other_names)?;
        Ok(material)
    }

    /// 建構器模式：設置描述
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// 建構器模式：設置用量
    pub fn with_quantity(mut self, quantity: Option<Quantity>) -> Self {
        self.quantity = quantity;
        self.quantity_input = None;
        self
    }

    /// 建構器模式：由使用者輸入設置用量，並保留原始字串
    pub fn with_quantity_input(mut self, raw: &str) -> Self {
        self.quantity = Quantity::from_input(raw);
        self.quantity_input = self.quantity.as_ref().map(|_| raw.trim().to_string());
        self
    }

    /// 建構器模式：設置主名稱（同時加入名稱清單）
    pub fn with_primary_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.add_name(name.clone());
        self.primary_name = name;
        self
    }

    /// 建構器模式：添加名稱
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.add_name(name.into());
        self
    }

    /// 添加名稱（完全相同的名稱不重複加入，區分大小寫）
    pub fn add_name(&mut self, name: String) -> bool {
        if name.is_empty() || self.names.contains(&name) {
            return false;
        }
        self.names.push(name);
        true
    }

    /// 替換整組名稱
    pub fn set_names(&mut self, primary_name: &str, names: Vec<String>) -> Result<()> {
        let mut all = Vec::with_capacity(names.len() + 1);
        for name in names {
            if !name.is_empty() && !all.contains(&name) {
                all.push(name);
            }
        }
        if !primary_name.is_empty() && !all.iter().any(|n| n == primary_name) {
            all.push(primary_name.to_string());
        }
        validation::validate_names(&all)?;

        self.names = all;
        self.primary_name = primary_name.to_string();
        Ok(())
    }

    /// 顯示名稱：主名稱為空時以第一個名稱代替
    pub fn display_name(&self) -> &str {
        if self.primary_name.is_empty() {
            self.names.first().map(String::as_str).unwrap_or("")
        } else {
            &self.primary_name
        }
    }

    /// 是否有明確標記的主名稱
    pub fn has_primary_name(&self) -> bool {
        !self.primary_name.is_empty()
    }

    /// 添加使用此物料的產品（同一產品ID只保留第一筆）
    pub fn add_product(&mut self, product: Product) -> bool {
        if self.products.iter().any(|p| p.id == product.id) {
            return false;
        }
        self.products.push(product);
        true
    }

    /// 檢查是否被指定產品之一使用
    pub fn is_used_in_any(&self, product_ids: &[i64]) -> bool {
        self.products.iter().any(|p| product_ids.contains(&p.id))
    }

    /// 用量數值（未設定或文字用量回傳 `None`）
    pub fn quantity_value(&self) -> Option<f64> {
        self.quantity.as_ref().and_then(Quantity::value)
    }

    /// 用量的顯示字串：原始字串優先，未設定時為空字串
    pub fn quantity_display(&self) -> String {
        match (&self.quantity, &self.quantity_input) {
            (Some(_), Some(raw)) => raw.clone(),
            (Some(quantity), None) => quantity.to_string(),
            (None, _) => String::new(),
        }
    }
}
