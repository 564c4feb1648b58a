//! 日志初始化

use std::str::FromStr;

use tracing::Level;

use crate::config::LoggingConfig;

/// 解析日志级别，无法识别时回退到 info
pub fn parse_level(level: &str) -> Level {
    Level::from_str(level.trim()).unwrap_or(Level::INFO)
}

/// 初始化全局 tracing 订阅者
///
/// 重复调用时保留第一次的设置。
pub fn init(config: &LoggingConfig) {
    let level = parse_level(&config.level);
    let result = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
    match result {
        Ok(()) => tracing::info!("[Logger] 日志级别: {}", level),
        Err(_) => tracing::debug!("[Logger] 订阅者已初始化，跳过"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level("WARN"), Level::WARN);
        assert_eq!(parse_level("verbose"), Level::INFO);
    }

    #[test]
    fn test_init_twice() {
        init(&LoggingConfig::default());
        init(&LoggingConfig {
            level: "trace".to_string(),
        });
    }
}
