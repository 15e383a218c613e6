//! 應用程式配置模型

use serde::{Deserialize, Serialize};

use crate::{BomError, Result};

/// 日誌等級
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// 解析日誌等級字串，無法辨識時回傳 INFO
    pub fn parse(level: &str) -> Self {
        Self::parse_strict(level).unwrap_or_default()
    }

    /// 嚴格解析：無法辨識時回傳 `None`
    pub fn parse_strict(level: &str) -> Option<Self> {
        match level.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Some(LogLevel::Debug),
            "INFO" => Some(LogLevel::Info),
            "WARN" | "WARNING" => Some(LogLevel::Warn),
            "ERROR" => Some(LogLevel::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    /// 對應的 tracing 等級
    pub fn as_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// 伺服器配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 監聽埠（0 表示由作業系統選擇）
    #[serde(default)]
    pub server_port: u16,

    /// 上傳目錄（相對於基礎目錄）
    #[serde(default)]
    pub uploads_directory: String,
}

/// 資料庫配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub database_name: String,
}

/// 日誌配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub log_level: String,
}

/// 會話有效時數上限（一年）
pub const MAX_SESSION_TTL_HOURS: u32 = 24 * 365;

/// 會話配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// 會話有效時數
    pub ttl_hours: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { ttl_hours: 24 }
    }
}

/// 應用程式配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 基礎目錄（資料庫、上傳檔案、日誌都在此目錄下）
    #[serde(default)]
    pub base_directory: String,

    /// 網頁介面密碼雜湊（空字串表示公開存取模式）
    #[serde(default)]
    pub web_ui_password: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

impl AppConfig {
    /// 創建帶預設值的配置
    pub fn new() -> Self {
        let mut config = Self::default();
        config.set_defaults();
        config
    }

    /// 從 JSON 字串載入，缺少的欄位補上預設值
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let mut config: AppConfig = serde_json::from_str(raw)
            .map_err(|e| BomError::IncorrectValue(format!("配置格式錯誤: {}", e)))?;
        if config.set_defaults() {
            tracing::debug!("配置缺少欄位，已補上預設值");
        }
        config.validate()?;
        Ok(config)
    }

    /// 輸出為 JSON 字串
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| BomError::Internal(format!("無法序列化配置: {}", e)))
    }

    /// 建構器模式：設置密碼雜湊
    pub fn with_password_hash(mut self, hash: impl Into<String>) -> Self {
        self.web_ui_password = hash.into();
        self
    }

    /// 建構器模式：設置監聽埠
    pub fn with_server_port(mut self, port: u16) -> Self {
        self.server.server_port = port;
        self
    }

    /// 建構器模式：設置日誌等級
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log.log_level = level.as_str().to_string();
        self
    }

    /// 建構器模式：設置會話有效時數
    pub fn with_session_ttl_hours(mut self, hours: u32) -> Self {
        self.session.ttl_hours = hours;
        self
    }

    /// 補上空欄位的預設值，回傳是否有變更
    pub fn set_defaults(&mut self) -> bool {
        let mut changed = false;
        let mut fill = |field: &mut String, value: &str| {
            if field.is_empty() {
                *field = value.to_string();
                changed = true;
            }
        };

        fill(&mut self.base_directory, "data");
        fill(&mut self.database.database_name, "database.db");
        fill(&mut self.server.uploads_directory, "uploads");
        fill(&mut self.log.log_level, "INFO");

        if self.session.ttl_hours == 0 {
            self.session.ttl_hours = SessionConfig::default().ttl_hours;
            changed = true;
        }

        changed
    }

    /// 驗證配置值
    pub fn validate(&self) -> Result<()> {
        let port = self.server.server_port;
        if port != 0 && !(1024..=49151).contains(&port) {
            return Err(BomError::IncorrectValue(format!(
                "伺服器埠必須為 0 或介於 1024 到 49151: {}",
                port
            )));
        }
        if LogLevel::parse_strict(&self.log.log_level).is_none() {
            return Err(BomError::IncorrectValue(format!(
                "不支援的日誌等級: {}",
                self.log.log_level
            )));
        }
        if self.session.ttl_hours > MAX_SESSION_TTL_HOURS {
            return Err(BomError::IncorrectValue(format!(
                "會話有效時數不可超過 {}: {}",
                MAX_SESSION_TTL_HOURS, self.session.ttl_hours
            )));
        }
        Ok(())
    }

    /// 將單一欄位重設為預設值，未知欄位不做任何事
    pub fn reset_field(&mut self, field: &str) {
        tracing::debug!("重設配置欄位: {}", field);
        let defaults = AppConfig::new();
        match field.trim().to_lowercase().as_str() {
            "base_directory" => self.base_directory = defaults.base_directory,
            "web_ui_password" => self.web_ui_password = defaults.web_ui_password,
            "log_level" => self.log.log_level = defaults.log.log_level,
            "server_port" => self.server.server_port = defaults.server.server_port,
            "uploads_directory" => {
                self.server.uploads_directory = defaults.server.uploads_directory
            }
            "database_name" => self.database.database_name = defaults.database.database_name,
            "ttl_hours" => self.session.ttl_hours = defaults.session.ttl_hours,
            _ => {}
        }
    }

    /// 日誌等級
    pub fn log_level(&self) -> LogLevel {
        LogLevel::parse(&self.log.log_level)
    }

    /// 密碼雜湊（公開存取模式回傳 `None`）
    pub fn password_hash(&self) -> Option<&str> {
        if self.web_ui_password.is_empty() {
            None
        } else {
            Some(&self.web_ui_password)
        }
    }

    /// 上傳目錄完整路徑
    pub fn uploads_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.base_directory).join(&self.server.uploads_directory)
    }

    /// 資料庫完整路徑
    pub fn database_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.base_directory).join(&self.database.database_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_create_config() {
        let config = AppConfig::new();

        assert_eq!(config.base_directory, "data");
        assert_eq!(config.database.database_name, "database.db");
        assert_eq!(config.server.uploads_directory, "uploads");
        assert_eq!(config.log_level(), LogLevel::Info);
        assert_eq!(config.session.ttl_hours, 24);
        assert_eq!(config.password_hash(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = AppConfig::new()
            .with_password_hash("$argon2id$v=19$...")
            .with_server_port(8080)
            .with_log_level(LogLevel::Debug)
            .with_session_ttl_hours(1);

        assert_eq!(config.password_hash(), Some("$argon2id$v=19$..."));
        assert_eq!(config.server.server_port, 8080);
        assert_eq!(config.log_level(), LogLevel::Debug);
        assert_eq!(config.session.ttl_hours, 1);
    }

    #[test]
    fn test_set_defaults_reports_changes() {
        let mut config = AppConfig::default();
        assert!(config.set_defaults());
        assert!(!config.set_defaults());
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let config = AppConfig::from_json_str(r#"{"server":{"server_port":8081}}"#).unwrap();
        assert_eq!(config.server.server_port, 8081);
        assert_eq!(config.server.uploads_directory, "uploads");
        assert_eq!(config.log.log_level, "INFO");

        let round_trip = AppConfig::from_json_str(&config.to_json_string().unwrap()).unwrap();
        assert_eq!(round_trip, config);
    }

    #[rstest]
    #[case(0, true)]
    #[case(80, false)]
    #[case(1024, true)]
    #[case(49151, true)]
    #[case(50000, false)]
    fn test_port_validation(#[case] port: u16, #[case] ok: bool) {
        let config = AppConfig::new().with_server_port(port);
        assert_eq!(config.validate().is_ok(), ok);
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut config = AppConfig::new();
        config.log.log_level = "TRACE".to_string();
        assert!(matches!(config.validate(), Err(BomError::IncorrectValue(_))));
        // 寬鬆解析仍回到 INFO
        assert_eq!(config.log_level(), LogLevel::Info);
    }

    #[rstest]
    #[case("DEBUG", LogLevel::Debug)]
    #[case("warning", LogLevel::Warn)]
    #[case("ERROR", LogLevel::Error)]
    #[case("", LogLevel::Info)]
    fn test_log_level_parse(#[case] raw: &str, #[case] expected: LogLevel) {
        assert_eq!(LogLevel::parse(raw), expected);
    }

    #[test]
    fn test_reset_field() {
        let mut config = AppConfig::new()
            .with_password_hash("hash")
            .with_server_port(8080);

        config.reset_field("web_ui_password");
        config.reset_field("SERVER_PORT");
        config.reset_field("unknown");

        assert_eq!(config.password_hash(), None);
        assert_eq!(config.server.server_port, 0);
    }

    #[rstest]
    #[case(1, true)]
    #[case(MAX_SESSION_TTL_HOURS, true)]
    #[case(MAX_SESSION_TTL_HOURS + 1, false)]
    #[case(u32::MAX, false)]
    fn test_session_ttl_validation(#[case] hours: u32, #[case] ok: bool) {
        let config = AppConfig::new().with_session_ttl_hours(hours);
        assert_eq!(config.validate().is_ok(), ok);
    }

    #[test]
    fn test_oversized_ttl_rejected_on_load() {
        let err = AppConfig::from_json_str(r#"{"session":{"ttl_hours":4294967295}}"#).unwrap_err();
        assert!(matches!(err, BomError::IncorrectValue(_)));
    }

    #[test]
    fn test_malformed_json_is_incorrect_value() {
        assert!(matches!(
            AppConfig::from_json_str("{not json"),
            Err(BomError::IncorrectValue(_))
        ));
    }
}
