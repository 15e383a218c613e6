//! # BOM Core
//!
//! 核心資料模型與類型定義

pub mod config;
pub mod file;
pub mod material;
pub mod product;
pub mod quantity;
pub mod validation;

// Re-export 主要類型
pub use config::{AppConfig, LogLevel, MAX_SESSION_TTL_HOURS};
pub use file::{Attachments, File, FileKind, FileOwner};
pub use material::{Material, Unit};
pub use product::Product;
pub use quantity::{format_quantity, is_calculable, parse_quantity, Quantity};

/// BOM 錯誤類型
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BomError {
    #[error("找不到資料: {0}")]
    NotFound(String),

    #[error("資料已存在: {0}")]
    AlreadyExists(String),

    #[error("必填欄位未填寫: {0}")]
    MustBeFilled(String),

    #[error("輸入值不正確: {0}")]
    IncorrectValue(String),

    #[error("內部錯誤: {0}")]
    Internal(String),

    #[error("認證失敗")]
    AuthenticationFailed,
}

impl BomError {
    /// 是否為可直接顯示給使用者的錯誤（內部錯誤除外）
    pub fn is_client_error(&self) -> bool {
        !matches!(self, BomError::Internal(_))
    }
}

pub type Result<T> = std::result::Result<T, BomError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(BomError::NotFound("material 1".to_string()).is_client_error());
        assert!(BomError::AuthenticationFailed.is_client_error());
        assert!(!BomError::Internal("db".to_string()).is_client_error());
    }

    #[test]
    fn test_error_messages_carry_context() {
        let err = BomError::MustBeFilled("product name".to_string());
        assert!(err.to_string().contains("product name"));
    }
}
