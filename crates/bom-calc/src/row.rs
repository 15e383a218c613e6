//! 關聯查詢的扁平資料列
//!
//! 儲存層不支援巢狀結構，多對多關聯以每個「物料 × 名稱 × 產品 × 單位」組合一列的方式回傳。
//! LEFT JOIN 另一側的欄位可能為 NULL，且資料庫採動態型別，故以 [`ColumnValue`] 表示。

use bom_core::{BomError, Quantity, Result, Unit};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 動態型別欄位值
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum ColumnValue {
    #[default]
    Null,
    Integer(i64),
    Real(f64),
    Decimal(Decimal),
    Text(String),
}

impl ColumnValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }

    /// 將欄位解讀為ID
    ///
    /// NULL 回傳 `None`；整數或可解析為整數的文字回傳ID；其餘視為資料列格式錯誤。
    pub fn as_id(&self, column: &str) -> Result<Option<i64>> {
        match self {
            ColumnValue::Null => Ok(None),
            ColumnValue::Integer(id) => Ok(Some(*id)),
            ColumnValue::Text(raw) => raw.trim().parse::<i64>().map(Some).map_err(|_| {
                BomError::Internal(format!("欄位 {} 的ID無法解析: {:?}", column, raw))
            }),
            ColumnValue::Decimal(d) if d.fract().is_zero() => i64::try_from(*d)
                .map(Some)
                .map_err(|_| BomError::Internal(format!("欄位 {} 的ID超出範圍: {}", column, d))),
            other => Err(BomError::Internal(format!(
                "欄位 {} 的ID型別不正確: {:?}",
                column, other
            ))),
        }
    }

    /// 將欄位解讀為原生數值用量
    ///
    /// 資料庫可能以文字回傳數值欄位，此時依使用者輸入規則解析。
    pub fn as_native_quantity(&self, column: &str) -> Result<Option<Quantity>> {
        match self {
            ColumnValue::Null => Ok(None),
            ColumnValue::Integer(v) => Ok(Some(Quantity::Numeric(*v as f64))),
            ColumnValue::Real(v) if v.is_finite() => Ok(Some(Quantity::Numeric(*v))),
            ColumnValue::Real(v) => Err(BomError::Internal(format!(
                "欄位 {} 的數值無效: {}",
                column, v
            ))),
            ColumnValue::Decimal(d) => Quantity::from_decimal(*d).map(Some).ok_or_else(|| {
                BomError::Internal(format!("欄位 {} 的數值無法轉換: {}", column, d))
            }),
            ColumnValue::Text(raw) => Ok(Quantity::from_input(raw)),
        }
    }
}

impl From<i64> for ColumnValue {
    fn from(value: i64) -> Self {
        ColumnValue::Integer(value)
    }
}

impl From<f64> for ColumnValue {
    fn from(value: f64) -> Self {
        ColumnValue::Real(value)
    }
}

impl From<Decimal> for ColumnValue {
    fn from(value: Decimal) -> Self {
        ColumnValue::Decimal(value)
    }
}

impl From<&str> for ColumnValue {
    fn from(value: &str) -> Self {
        ColumnValue::Text(value.to_string())
    }
}

impl<T: Into<ColumnValue>> From<Option<T>> for ColumnValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ColumnValue::Null)
    }
}

/// 決定用量：優先使用原生數值欄位，沒有時才使用文字欄位
pub fn resolve_quantity(native: &ColumnValue, text: Option<&str>) -> Result<Option<Quantity>> {
    match native.as_native_quantity("quantity")? {
        Some(quantity) => Ok(Some(quantity)),
        None => Ok(text.and_then(Quantity::from_input)),
    }
}

/// 物料清單查詢的資料列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRow {
    pub material_id: i64,
    pub unit_id: i64,
    pub unit_name: String,
    pub description: Option<String>,
    pub name: Option<String>,
    pub is_primary: bool,
    pub product_id: ColumnValue,
    pub product_name: Option<String>,
    pub quantity: ColumnValue,
    pub quantity_text: Option<String>,
}

impl MaterialRow {
    /// 創建只含物料與單位的資料列
    pub fn new(material_id: i64, unit: &Unit) -> Self {
        Self {
            material_id,
            unit_id: unit.id,
            unit_name: unit.name.clone(),
            description: None,
            name: None,
            is_primary: false,
            product_id: ColumnValue::Null,
            product_name: None,
            quantity: ColumnValue::Null,
            quantity_text: None,
        }
    }

    /// 建構器模式：設置名稱
    pub fn with_name(mut self, name: impl Into<String>, is_primary: bool) -> Self {
        self.name = Some(name.into());
        self.is_primary = is_primary;
        self
    }

    /// 建構器模式：設置描述
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// 建構器模式：設置關聯產品
    pub fn with_product(mut self, product_id: i64, product_name: impl Into<String>) -> Self {
        self.product_id = ColumnValue::Integer(product_id);
        self.product_name = Some(product_name.into());
        self
    }

    /// 建構器模式：設置原生數值用量
    pub fn with_quantity(mut self, quantity: impl Into<ColumnValue>) -> Self {
        self.quantity = quantity.into();
        self
    }

    /// 建構器模式：設置文字用量
    pub fn with_quantity_text(mut self, text: impl Into<String>) -> Self {
        self.quantity_text = Some(text.into());
        self
    }
}

/// 產品清單查詢的資料列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRow {
    pub product_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub material_id: ColumnValue,
    pub material_name: Option<String>,
    pub unit_id: ColumnValue,
    pub unit_name: Option<String>,
    pub quantity: ColumnValue,
    pub quantity_text: Option<String>,
}

impl ProductRow {
    /// 創建只含產品的資料列
    pub fn new(product_id: i64, name: impl Into<String>) -> Self {
        Self {
            product_id,
            name: name.into(),
            description: None,
            material_id: ColumnValue::Null,
            material_name: None,
            unit_id: ColumnValue::Null,
            unit_name: None,
            quantity: ColumnValue::Null,
            quantity_text: None,
        }
    }

    /// 建構器模式：設置描述
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// 建構器模式：設置關聯物料
    pub fn with_material(
        mut self,
        material_id: i64,
        material_name: impl Into<String>,
        unit: &Unit,
    ) -> Self {
        self.material_id = ColumnValue::Integer(material_id);
        self.material_name = Some(material_name.into());
        self.unit_id = ColumnValue::Integer(unit.id);
        self.unit_name = Some(unit.name.clone());
        self
    }

    /// 建構器模式：設置原生數值用量
    pub fn with_quantity(mut self, quantity: impl Into<ColumnValue>) -> Self {
        self.quantity = quantity.into();
        self
    }

    /// 建構器模式：設置文字用量
    pub fn with_quantity_text(mut self, text: impl Into<String>) -> Self {
        self.quantity_text = Some(text.into());
        self
    }
}

/// 單一物料查詢：物料本身
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialHeader {
    pub material_id: i64,
    pub unit_id: i64,
    pub unit_name: String,
    pub description: Option<String>,
}

/// 單一物料查詢：名稱
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRow {
    pub name: String,
    pub is_primary: bool,
}

/// 單一物料查詢：使用該物料的產品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialProductRow {
    pub product_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub quantity: ColumnValue,
    pub quantity_text: Option<String>,
}

/// 單一產品查詢：產品本身
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductHeader {
    pub product_id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// 單一產品查詢：產品使用的物料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMaterialRow {
    pub material_id: i64,
    pub material_name: String,
    pub unit_id: i64,
    pub unit_name: String,
    pub description: Option<String>,
    pub quantity: ColumnValue,
    pub quantity_text: Option<String>,
}
