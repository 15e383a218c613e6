//! 會話認證管理器
//!
//! 未設定密碼時為公開存取模式：所有請求皆通過，不需要登入。

use bom_core::{AppConfig, BomError, Result, MAX_SESSION_TTL_HOURS};
use chrono::{DateTime, Duration, Utc};

use crate::password::{check_hash_format, verify_password};
use crate::session::{SessionStore, SessionToken, DEFAULT_SESSION_TTL_HOURS};

/// 登入結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// 已發出新會話
    Session(SessionToken),
    /// 公開存取模式，不需要會話
    PublicAccess,
}

impl LoginOutcome {
    pub fn token(&self) -> Option<&SessionToken> {
        match self {
            LoginOutcome::Session(token) => Some(token),
            LoginOutcome::PublicAccess => None,
        }
    }
}

/// 會話認證管理器
///
/// 擁有整個會話存放區；以 `Arc` 在請求之間共用。
pub struct SessionAuthManager {
    password_hash: Option<String>,
    sessions: SessionStore,
}

impl SessionAuthManager {
    /// 創建新的管理器
    ///
    /// `password_hash` 為 `None` 或空字串時為公開存取模式。
    pub fn new(password_hash: Option<String>, ttl: Duration) -> Result<Self> {
        let password_hash = password_hash.filter(|h| !h.is_empty());
        if let Some(hash) = &password_hash {
            check_hash_format(hash)?;
        }
        if ttl <= Duration::zero() {
            return Err(BomError::IncorrectValue("會話有效時間必須為正".to_string()));
        }
        if ttl > Duration::hours(i64::from(MAX_SESSION_TTL_HOURS)) {
            return Err(BomError::IncorrectValue(format!(
                "會話有效時間不可超過 {} 小時",
                MAX_SESSION_TTL_HOURS
            )));
        }
        tracing::info!(
            "認證管理器啟動: {}",
            if password_hash.is_some() { "需要登入" } else { "公開存取" }
        );
        Ok(Self {
            password_hash,
            sessions: SessionStore::new(ttl),
        })
    }

    /// 由應用程式配置建立
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let hours = match config.session.ttl_hours {
            0 => DEFAULT_SESSION_TTL_HOURS,
            hours => hours,
        };
        Self::new(
            config.password_hash().map(str::to_string),
            Duration::hours(i64::from(hours)),
        )
    }

    /// 公開存取模式
    pub fn public() -> Self {
        Self {
            password_hash: None,
            sessions: SessionStore::default(),
        }
    }

    pub fn is_public(&self) -> bool {
        self.password_hash.is_none()
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// 登入
    pub fn login(&self, password: &str) -> Result<LoginOutcome> {
        self.login_at(password, Utc::now())
    }

    /// 以指定時間登入
    ///
    /// 密碼比對在取得會話鎖之前完成。
    pub fn login_at(&self, password: &str, now: DateTime<Utc>) -> Result<LoginOutcome> {
        let Some(hash) = &self.password_hash else {
            return Ok(LoginOutcome::PublicAccess);
        };

        if password.is_empty() {
            tracing::warn!("登入失敗: 空密碼");
            return Err(BomError::AuthenticationFailed);
        }
        if !verify_password(password, hash)? {
            tracing::warn!("登入失敗: 密碼錯誤");
            return Err(BomError::AuthenticationFailed);
        }

        let token = self.sessions.issue_at(now)?;
        tracing::info!("使用者登入成功，目前會話數 {}", self.sessions.len());
        Ok(LoginOutcome::Session(token))
    }

    /// 檢查權杖是否可存取
    pub fn authorize(&self, token: &str) -> bool {
        self.authorize_at(token, Utc::now())
    }

    /// 以指定時間檢查權杖
    pub fn authorize_at(&self, token: &str, now: DateTime<Utc>) -> bool {
        if self.is_public() {
            return true;
        }
        self.sessions.is_valid_at(token, now)
    }

    /// 登出；重複登出或未知權杖不是錯誤
    pub fn logout(&self, token: &str) {
        if self.sessions.revoke(token) {
            tracing::info!("使用者登出");
        }
    }

    /// 清除過期會話
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let purged = self.sessions.purge_expired_at(now);
        if purged > 0 {
            tracing::debug!("清除 {} 個過期會話", purged);
        }
        purged
    }
}
