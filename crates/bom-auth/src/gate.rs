//! 請求閘門與會話 Cookie

use std::sync::Arc;

use chrono::Duration;

use crate::manager::SessionAuthManager;

/// 會話 Cookie 名稱
pub const SESSION_COOKIE_NAME: &str = "session";

/// 閘門判定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// 放行
    Allow,
    /// 需要登入
    RequireLogin,
}

/// 請求閘門
///
/// 登入頁與靜態資源不需要會話；其餘路徑需要有效的 `session` Cookie。
#[derive(Clone)]
pub struct RequestGate {
    manager: Arc<SessionAuthManager>,
}

impl RequestGate {
    pub fn new(manager: Arc<SessionAuthManager>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &SessionAuthManager {
        &self.manager
    }

    /// 不需要會話的路徑
    pub fn is_exempt(path: &str) -> bool {
        path == "/login" || path.starts_with("/static/")
    }

    /// 依路徑與 `Cookie` 標頭判定
    pub fn check(&self, path: &str, cookie_header: Option<&str>) -> GateDecision {
        if self.manager.is_public() || Self::is_exempt(path) {
            return GateDecision::Allow;
        }
        match cookie_header.and_then(session_token_from_cookie) {
            Some(token) if self.manager.authorize(token) => GateDecision::Allow,
            _ => {
                tracing::debug!("未登入的請求: {}", path);
                GateDecision::RequireLogin
            }
        }
    }
}

/// 從 `Cookie` 標頭取出會話權杖
pub fn session_token_from_cookie(header: &str) -> Option<&str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| name.trim() == SESSION_COOKIE_NAME)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// 產生設定會話的 `Set-Cookie` 值
pub fn session_cookie(token: &str, max_age: Duration) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE_NAME,
        token,
        max_age.num_seconds().max(0)
    )
}

/// 產生清除會話的 `Set-Cookie` 值
pub fn clear_session_cookie() -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        SESSION_COOKIE_NAME
    )
}
