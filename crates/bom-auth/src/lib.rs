//! # BOM Auth
//!
//! 網頁介面的密碼驗證與會話管理

pub mod gate;
pub mod manager;
pub mod password;
pub mod session;

// Re-export 主要類型
pub use gate::{
    clear_session_cookie, session_cookie, session_token_from_cookie, GateDecision, RequestGate,
    SESSION_COOKIE_NAME,
};
pub use manager::{LoginOutcome, SessionAuthManager};
pub use password::{hash_password, verify_password};
pub use session::{SessionStore, SessionToken, DEFAULT_SESSION_TTL_HOURS};
