//! 會話存放區

use std::collections::HashMap;
use std::fmt;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use bom_core::{BomError, Result};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use rand::{rngs::OsRng, RngCore};

/// 預設會話有效時數
pub const DEFAULT_SESSION_TTL_HOURS: u32 = 24;

/// 會話權杖的隨機位元組數（256 位元）
const TOKEN_BYTES: usize = 32;

/// 不透明的會話權杖
///
/// `Debug` 不輸出內容，避免權杖出現在日誌中。
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// 產生新的隨機權杖
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

/// 會話存放區：權杖對應到期時間
///
/// 讀取可並行；新增、刪除只在單次 map 操作期間持有寫鎖。
pub struct SessionStore {
    sessions: RwLock<HashMap<String, DateTime<Utc>>>,
    ttl: Duration,
}

impl SessionStore {
    /// 創建新的會話存放區
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn with_ttl_hours(hours: u32) -> Self {
        Self::new(Duration::hours(i64::from(hours)))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 發出新會話，到期時間為 `now + ttl`
    ///
    /// 到期時間超出可表示的日期範圍時回傳 `Internal`，不發出會話。
    pub fn issue_at(&self, now: DateTime<Utc>) -> Result<SessionToken> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| BomError::Internal(format!("會話到期時間溢位: {}", self.ttl)))?;
        let token = SessionToken::generate();
        self.sessions
            .write()
            .insert(token.as_str().to_string(), expires_at);
        Ok(token)
    }

    /// 檢查會話是否有效，過期的會話會被刪除
    pub fn is_valid_at(&self, token: &str, now: DateTime<Utc>) -> bool {
        let expires_at = match self.sessions.read().get(token) {
            Some(&expires_at) => expires_at,
            None => return false,
        };
        if now < expires_at {
            return true;
        }

        let mut sessions = self.sessions.write();
        // 取得寫鎖前可能已被重新檢查或刪除
        if sessions.get(token).is_some_and(|&t| now >= t) {
            sessions.remove(token);
            tracing::debug!("刪除過期會話");
        }
        false
    }

    /// 到期時間
    pub fn expires_at(&self, token: &str) -> Option<DateTime<Utc>> {
        self.sessions.read().get(token).copied()
    }

    /// 撤銷會話，回傳是否存在
    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.write().remove(token).is_some()
    }

    /// 清除所有過期會話，回傳清除數量
    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, expires_at| now < *expires_at);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl_hours(DEFAULT_SESSION_TTL_HOURS)
    }
}
