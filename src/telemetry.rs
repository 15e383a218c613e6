//! 日誌初始化

use bom_core::LogLevel;

/// 初始化全域 tracing subscriber
///
/// 重複呼叫不會出錯；已有 subscriber 時回傳 `false`。
pub fn init_tracing(level: LogLevel) -> bool {
    let installed = tracing_subscriber::fmt()
        .with_max_level(level.as_tracing_level())
        .with_target(false)
        .try_init()
        .is_ok();
    if installed {
        tracing::info!("日誌已啟用，等級 {}", level.as_str());
    } else {
        tracing::debug!("已有全域 subscriber，略過初始化");
    }
    installed
}
