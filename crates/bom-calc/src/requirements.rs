//! 物料需求計算
//!
//! 依產品的物料清單、欲生產數量與現有庫存，計算每個物料的總需求、
//! 尚需補充量，以及僅憑該物料可生產的數量。庫存由呼叫端提供，結果僅供參考。

use std::collections::HashMap;

use bom_core::{format_quantity, parse_quantity, BomError, Material, Product, Result};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// 單一物料的計算結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub material_id: i64,
    pub material_name: String,
    pub unit_name: String,
    /// 每單位產品用量（保存時的原始字串，例如 "2,5"）
    pub per_unit_input: String,
    /// 每單位產品用量
    pub per_unit: f64,
    /// 總需求
    pub total_required: f64,
    /// 現有庫存
    pub remaining: f64,
    /// 尚需補充
    pub additional_needed: f64,
    /// 僅憑此物料可生產的數量
    pub can_produce: u64,
}

impl CalculationResult {
    /// 每單位用量照原樣顯示
    pub fn required_per_unit_display(&self) -> &str {
        &self.per_unit_input
    }

    pub fn total_required_display(&self) -> String {
        format_quantity(self.total_required)
    }

    pub fn remaining_display(&self) -> String {
        format_quantity(self.remaining)
    }

    pub fn additional_needed_display(&self) -> String {
        format_quantity(self.additional_needed)
    }

    /// 庫存不足
    pub fn is_short(&self) -> bool {
        self.additional_needed > 0.0
    }

    /// 每單位用量為正，可參與可生產數量的計算
    pub fn limits_production(&self) -> bool {
        self.per_unit > 0.0
    }
}

/// 需求計算報表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementsReport {
    pub product_id: i64,
    pub desired_count: u32,
    /// 可計算的物料結果
    pub calculable: Vec<CalculationResult>,
    /// 無法計算的物料（原樣保留供顯示）
    pub non_calculable: Vec<Material>,
}

impl RequirementsReport {
    /// 以現有庫存最多可生產的數量（沒有可限制生產的物料時回傳 `None`）
    pub fn max_producible(&self) -> Option<u64> {
        self.calculable
            .iter()
            .filter(|r| r.limits_production())
            .map(|r| r.can_produce)
            .min()
    }

    /// 庫存不足的物料
    pub fn shortfalls(&self) -> impl Iterator<Item = &CalculationResult> {
        self.calculable.iter().filter(|r| r.is_short())
    }

    pub fn is_fully_stocked(&self) -> bool {
        self.shortfalls().next().is_none()
    }
}

/// 需求計算器
pub struct RequirementsCalculator;

impl RequirementsCalculator {
    /// 計算產品的物料需求
    pub fn calculate_for_product(
        product: &Product,
        desired_count: u32,
        remaining: &HashMap<i64, f64>,
    ) -> Result<RequirementsReport> {
        Self::calculate(product.id, &product.materials, desired_count, remaining)
    }

    /// 計算物料需求
    ///
    /// # 參數
    /// * `materials` - 物料清單，`quantity` 為每單位產品用量
    /// * `desired_count` - 欲生產數量（必須為正）
    /// * `remaining` - 物料ID 對應的現有庫存，未提供時視為 0
    pub fn calculate(
        product_id: i64,
        materials: &[Material],
        desired_count: u32,
        remaining: &HashMap<i64, f64>,
    ) -> Result<RequirementsReport> {
        if desired_count == 0 {
            return Err(BomError::IncorrectValue("生產數量必須大於 0".to_string()));
        }
        tracing::info!("開始需求計算: 產品 {} × {}", product_id, desired_count);

        // Step 1: 分類物料
        let (calculable, non_calculable): (Vec<&Material>, Vec<&Material>) =
            materials.iter().partition(|m| m.quantity_value().is_some());
        tracing::debug!(
            "Step 1: 可計算 {} 個，無法計算 {} 個",
            calculable.len(),
            non_calculable.len()
        );

        // Step 2: 逐一計算
        let mut results = Vec::with_capacity(calculable.len());
        let mut non_calculable: Vec<Material> = non_calculable.into_iter().cloned().collect();
        for material in calculable {
            let Some(per_unit) = material.quantity_value() else {
                continue;
            };
            let stock = remaining.get(&material.id).copied().unwrap_or(0.0);
            match Self::calculate_material(material, per_unit, desired_count, stock)? {
                Some(result) => results.push(result),
                None => {
                    tracing::warn!(
                        "物料 {} 的總需求超出數值範圍，改列為無法計算",
                        material.id
                    );
                    non_calculable.push(material.clone());
                }
            }
        }
        tracing::debug!("Step 2: 完成 {} 個物料的需求計算", results.len());

        let report = RequirementsReport {
            product_id,
            desired_count,
            calculable: results,
            non_calculable,
        };

        tracing::info!(
            "需求計算完成: {} 個物料不足，最多可生產 {:?}",
            report.shortfalls().count(),
            report.max_producible()
        );
        Ok(report)
    }

    /// 計算單一物料
    ///
    /// 數值在 `Decimal` 範圍內時以十進位精確計算，否則改用浮點數。
    /// 浮點數總需求也溢位時回傳 `None`。
    fn calculate_material(
        material: &Material,
        per_unit: f64,
        desired_count: u32,
        stock: f64,
    ) -> Result<Option<CalculationResult>> {
        if !stock.is_finite() || stock < 0.0 {
            return Err(BomError::IncorrectValue(format!(
                "物料 {} 的庫存無效: {}",
                material.id, stock
            )));
        }

        let figures = match Self::decimal_figures(per_unit, desired_count, stock) {
            Some(figures) => figures,
            None => {
                tracing::debug!("物料 {} 超出十進位範圍，改用浮點數計算", material.id);
                match Self::float_figures(per_unit, desired_count, stock) {
                    Some(figures) => figures,
                    None => return Ok(None),
                }
            }
        };
        let (total_required, additional_needed, can_produce) = figures;

        Ok(Some(CalculationResult {
            material_id: material.id,
            material_name: material.display_name().to_string(),
            unit_name: material.unit.name.clone(),
            per_unit_input: material.quantity_display(),
            per_unit,
            total_required,
            remaining: stock,
            additional_needed,
            can_produce,
        }))
    }

    /// (總需求, 尚需補充, 可生產數量)
    fn decimal_figures(per_unit: f64, desired_count: u32, stock: f64) -> Option<(f64, f64, u64)> {
        let per_unit = Decimal::from_f64(per_unit)?;
        let stock = Decimal::from_f64(stock)?;
        let total = per_unit.checked_mul(Decimal::from(desired_count))?;
        let additional = total.checked_sub(stock)?.max(Decimal::ZERO);

        // 每單位用量不為正時不參與可生產數量計算
        let can_produce = if per_unit > Decimal::ZERO {
            stock
                .checked_div(per_unit)
                .map(|n| n.floor().to_u64().unwrap_or(u64::MAX))
                .unwrap_or(u64::MAX)
        } else {
            0
        };
        Some((total.to_f64()?, additional.to_f64()?, can_produce))
    }

    fn float_figures(per_unit: f64, desired_count: u32, stock: f64) -> Option<(f64, f64, u64)> {
        let total = per_unit * f64::from(desired_count);
        if !total.is_finite() {
            return None;
        }
        let additional = (total - stock).max(0.0);
        // `as` 轉型在超出範圍時飽和
        let can_produce = if per_unit > 0.0 {
            (stock / per_unit).floor() as u64
        } else {
            0
        };
        Some((total, additional, can_produce))
    }
}

/// 計算物料需求
pub fn calculate_requirements(
    product_id: i64,
    materials: &[Material],
    desired_count: u32,
    remaining: &HashMap<i64, f64>,
) -> Result<RequirementsReport> {
    RequirementsCalculator::calculate(product_id, materials, desired_count, remaining)
}

/// 解析表單輸入的庫存值，無效或負值視為 0
pub fn parse_remaining_inputs<'a, I>(inputs: I) -> HashMap<i64, f64>
where
    I: IntoIterator<Item = (i64, &'a str)>,
{
    inputs
        .into_iter()
        .map(|(id, raw)| {
            let value = parse_quantity(raw).filter(|v| *v >= 0.0).unwrap_or(0.0);
            (id, value)
        })
        .collect()
}
