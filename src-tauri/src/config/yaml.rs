//! YAML 配置读写

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::types::Config;

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("无法获取用户主目录")]
    NoHomeDir,
    #[error("读取配置文件失败: {0}")]
    Read(#[source] std::io::Error),
    #[error("写入配置文件失败: {0}")]
    Write(#[source] std::io::Error),
    #[error("解析配置文件失败: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// 默认配置文件路径 ~/.docgrant/config.yaml
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(".docgrant").join("config.yaml"))
}

/// 加载配置，文件不存在时返回默认配置
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        tracing::debug!("[Config] 配置文件不存在，使用默认配置: {:?}", path);
        return Ok(Config::default());
    }
    let content = fs::read_to_string(path).map_err(ConfigError::Read)?;
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(&content)?)
}

/// 保存配置
pub fn save_config(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(ConfigError::Write)?;
    }
    let content = serde_yaml::to_string(config)?;
    fs::write(path, content).map_err(ConfigError::Write)
}
