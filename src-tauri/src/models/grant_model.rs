use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 授权权限位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantFlags {
    pub read: bool,
    pub write: bool,
}

impl GrantFlags {
    pub const READ_WRITE: GrantFlags = GrantFlags {
        read: true,
        write: true,
    };

    pub const READ_ONLY: GrantFlags = GrantFlags {
        read: true,
        write: false,
    };

    /// 合并两组权限
    pub fn union(self, other: GrantFlags) -> GrantFlags {
        GrantFlags {
            read: self.read || other.read,
            write: self.write || other.write,
        }
    }
}

/// 已授权目录句柄
///
/// 由用户通过目录选择器授予，持久化在授权存储中。
/// 句柄随时可能被外部撤销，每次写入前都要重新对照授权列表。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryHandle {
    /// 授权 URI（file:// 目录地址）
    pub uri: String,
    /// 目录路径
    pub path: PathBuf,
    /// 授予的权限
    pub permissions: GrantFlags,
    /// 授权时间（Unix 时间戳，毫秒）
    pub granted_at: i64,
}

impl DirectoryHandle {
    /// 目录显示名称
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.to_string_lossy().to_string())
    }
}
