//! 產品模型

use serde::{Deserialize, Serialize};

use crate::material::Material;
use crate::quantity::Quantity;
use crate::validation;
use crate::Result;

/// 產品（由物料組成的組件）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// 產品ID
    pub id: i64,

    /// 名稱（必填）
    pub name: String,

    /// 描述
    pub description: String,

    /// 從物料查看時，此產品使用該物料的數量
    pub quantity: Option<Quantity>,

    /// 物料清單（每筆物料的 `quantity` 為每單位產品所需數量）
    pub materials: Vec<Material>,
}

impl Product {
    /// 創建新的產品
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            quantity: None,
            materials: Vec::new(),
        }
    }

    /// 僅含 ID 與名稱的產品引用（用於物料的反向引用）
    pub fn reference(id: i64, name: impl Into<String>) -> Self {
        Self::new(id, name)
    }

    /// 由表單輸入建立產品並驗證
    pub fn from_input(name: &str, description: &str) -> Result<Self> {
        validation::validate_required("產品名稱", name)?;
        validation::validate_description(description)?;
        Ok(Self::new(0, name).with_description(description))
    }

    /// 建構器模式：設置描述
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// 建構器模式：設置用量
    pub fn with_quantity(mut self, quantity: Option<Quantity>) -> Self {
        self.quantity = quantity;
        self
    }

    /// 建構器模式：設置物料
    pub fn with_material(mut self, material: Material) -> Self {
        self.set_material(material);
        self
    }

    /// 設置物料
    ///
    /// 物料ID 在清單中唯一：重複加入同一物料時以最後一次為準，
    /// 原位置保留。回傳是否取代了既有項目。
    pub fn set_material(&mut self, material: Material) -> bool {
        match self.materials.iter_mut().find(|m| m.id == material.id) {
            Some(existing) => {
                *existing = material;
                true
            }
            None => {
                self.materials.push(material);
                false
            }
        }
    }

    /// 移除物料
    pub fn remove_material(&mut self, material_id: i64) -> Option<Material> {
        let index = self.materials.iter().position(|m| m.id == material_id)?;
        Some(self.materials.remove(index))
    }

    /// 查找物料
    pub fn material(&self, material_id: i64) -> Option<&Material> {
        self.materials.iter().find(|m| m.id == material_id)
    }

    /// 檢查是否使用指定物料之一
    pub fn uses_any(&self, material_ids: &[i64]) -> bool {
        self.materials.iter().any(|m| material_ids.contains(&m.id))
    }
}
