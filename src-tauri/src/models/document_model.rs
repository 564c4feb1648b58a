use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 待写入的文件（每次用户操作创建，写完即丢弃）
#[derive(Debug, Clone)]
pub struct PendingWrite {
    pub file_name: String,
    pub mime_type: String,
    pub content: Vec<u8>,
}

impl PendingWrite {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            content: content.into(),
        }
    }
}

/// 授权目录中的文档条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEntry {
    /// 条目 URI
    pub uri: String,
    /// 显示名称（可能因重名而被重命名）
    pub name: String,
    /// MIME 类型
    pub mime_type: String,
    /// 文件大小（字节）
    pub size: u64,
    /// 文件路径
    pub path: PathBuf,
    /// 修改时间（Unix 时间戳，毫秒）
    pub modified_at: i64,
}

/// 文件选择器返回的文档
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedDocument {
    pub uri: String,
    pub name: String,
    pub path: PathBuf,
    pub mime_type: String,
}
