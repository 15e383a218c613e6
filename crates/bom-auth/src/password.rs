//! 密碼雜湊

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use bom_core::{BomError, Result};

/// 產生密碼雜湊（PHC 字串格式），寫入配置的 `web_ui_password`
pub fn hash_password(password: &str) -> Result<String> {
    if password.is_empty() {
        return Err(BomError::MustBeFilled("密碼".to_string()));
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!("密碼雜湊失敗: {}", e);
            BomError::Internal("密碼雜湊失敗".to_string())
        })
}

/// 檢查雜湊字串格式
pub fn check_hash_format(hash: &str) -> Result<()> {
    PasswordHash::new(hash)
        .map(|_| ())
        .map_err(|_| BomError::IncorrectValue("密碼雜湊格式錯誤".to_string()))
}

/// 以常數時間比對密碼與雜湊
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        tracing::error!("無法解析密碼雜湊: {}", e);
        BomError::Internal("無法解析密碼雜湊".to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
