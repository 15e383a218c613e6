//! 用量模型
//!
//! 用量在資料庫中以字串保存：可能是小數（允許逗號作為小數點），
//! 也可能是任意文字備註（例如「適量」）。是否可計算由解析結果決定，不另外保存旗標。

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 解析用量字串
///
/// 去除前後空白、將逗號替換為小數點後以 f64 解析。
/// 空字串、非數字或非有限值（NaN、inf）回傳 `None`，這是分類結果而非錯誤。
pub fn parse_quantity(s: &str) -> Option<f64> {
    let cleaned = s.trim().replace(',', ".");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// 檢查用量是否可計算
pub fn is_calculable(s: &str) -> bool {
    parse_quantity(s).is_some()
}

/// 格式化用量：整數不帶小數部分，其餘固定兩位小數
pub fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

/// 用量（數值或文字）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Quantity {
    /// 可計算的數值
    Numeric(f64),
    /// 文字備註
    Text(String),
}

impl Quantity {
    /// 由使用者輸入建立用量，空白輸入視為未設定
    pub fn from_input(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match parse_quantity(trimmed) {
            Some(value) => Quantity::Numeric(value),
            None => Quantity::Text(trimmed.to_string()),
        })
    }

    /// 由資料庫原生 NUMERIC 值建立用量
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        value
            .to_f64()
            .filter(|v| v.is_finite())
            .map(Quantity::Numeric)
    }

    /// 數值（文字用量回傳 `None`）
    pub fn value(&self) -> Option<f64> {
        match self {
            Quantity::Numeric(value) => Some(*value),
            Quantity::Text(_) => None,
        }
    }

    /// 是否可計算
    pub fn is_calculable(&self) -> bool {
        matches!(self, Quantity::Numeric(_))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Numeric(value) => write!(f, "{}", format_quantity(*value)),
            Quantity::Text(text) => write!(f, "{}", text),
        }
    }
}
