//! 配置管理模块
//!
//! 提供 YAML 配置文件支持，文件不存在时使用默认配置

mod types;
mod yaml;

pub use types::{Config, ImageExportConfig, LoggingConfig, TextExportConfig};
pub use yaml::{default_config_path, load_config, save_config, ConfigError};

#[cfg(test)]
mod tests;
