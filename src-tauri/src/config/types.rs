//! 配置类型定义

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::documents::{CollisionPolicy, WriteOptions};

/// 应用配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 授权文件路径，未设置时使用 ~/.docgrant/grants.json
    pub grants_file: Option<PathBuf>,
    /// 重名处理策略
    pub collision: CollisionPolicy,
    /// 写入失败时删除未写完的文件
    pub remove_partial_on_failure: bool,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 文本导出
    pub text_export: TextExportConfig,
    /// 图片导出
    pub image_export: ImageExportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grants_file: None,
            collision: CollisionPolicy::default(),
            remove_partial_on_failure: true,
            logging: LoggingConfig::default(),
            text_export: TextExportConfig::default(),
            image_export: ImageExportConfig::default(),
        }
    }
}

impl Config {
    /// 写入选项
    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            collision: self.collision,
            remove_partial_on_failure: self.remove_partial_on_failure,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别（trace, debug, info, warn, error）
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// 文本导出配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextExportConfig {
    pub file_name: String,
    pub mime_type: String,
    pub content: String,
}

impl Default for TextExportConfig {
    fn default() -> Self {
        Self {
            file_name: "errors.txt".to_string(),
            mime_type: "text/plain".to_string(),
            content: "Ciao Mamma!".to_string(),
        }
    }
}

/// 图片导出配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageExportConfig {
    pub file_name: String,
    pub mime_type: String,
}

impl Default for ImageExportConfig {
    fn default() -> Self {
        Self {
            file_name: "img.png".to_string(),
            mime_type: "image/png".to_string(),
        }
    }
}
