//! 欄位驗證

use crate::{BomError, Result};

/// 名稱最短長度（字元）
pub const NAME_MIN_CHARS: usize = 2;

/// 名稱最長長度（字元）
pub const NAME_MAX_CHARS: usize = 200;

/// 產品描述最長長度（字元）
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// 驗證物料名稱清單：至少一個名稱，每個名稱 2..=200 字元
pub fn validate_names(names: &[String]) -> Result<()> {
    if names.is_empty() {
        return Err(BomError::MustBeFilled("至少需要一個名稱".to_string()));
    }
    for name in names {
        validate_name_length(name)?;
    }
    Ok(())
}

/// 驗證單一名稱長度
pub fn validate_name_length(name: &str) -> Result<()> {
    let len = name.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
        return Err(BomError::IncorrectValue(format!(
            "名稱長度必須介於 {} 到 {} 字元: {:?}",
            NAME_MIN_CHARS, NAME_MAX_CHARS, name
        )));
    }
    Ok(())
}

/// 驗證必填名稱
pub fn validate_required(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BomError::MustBeFilled(field.to_string()));
    }
    Ok(())
}

/// 驗證描述長度
pub fn validate_description(description: &str) -> Result<()> {
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(BomError::IncorrectValue(format!(
            "描述過長（上限 {} 字元）",
            DESCRIPTION_MAX_CHARS
        )));
    }
    Ok(())
}
