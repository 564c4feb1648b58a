//! 目录访问错误类型

use thiserror::Error;

/// 目录访问与导出过程中的错误
///
/// 所有错误都只影响单次操作，不会终止进程。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// 没有唯一的已授权目录（零个或多个授权）
    #[error("没有可用的已授权目录")]
    NoAuthorizedDirectory,
    /// 授权已被撤销或目录不可写
    #[error("目录访问被拒绝: {0}")]
    AccessDenied(String),
    /// 无法在目标目录中创建条目
    #[error("创建文件失败: {0}")]
    CreateFailed(String),
    /// 写入字节时发生 I/O 错误
    #[error("写入文件失败: {0}")]
    WriteFailed(String),
    /// 授权存储读写失败
    #[error("授权存储错误: {0}")]
    GrantStore(String),
    /// 图像数据无效
    #[error("图像数据无效: {0}")]
    InvalidImage(String),
}

impl AccessError {
    /// 错误类别名称（供前端区分处理）
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoAuthorizedDirectory => "NoAuthorizedDirectory",
            Self::AccessDenied(_) => "AccessDenied",
            Self::CreateFailed(_) => "CreateFailed",
            Self::WriteFailed(_) => "WriteFailed",
            Self::GrantStore(_) => "GrantStore",
            Self::InvalidImage(_) => "InvalidImage",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_and_message() {
        let err = AccessError::CreateFailed("errors.txt 已存在".to_string());
        assert_eq!(err.kind(), "CreateFailed");
        assert_eq!(err.to_string(), "创建文件失败: errors.txt 已存在");
        assert_eq!(AccessError::NoAuthorizedDirectory.kind(), "NoAuthorizedDirectory");
    }
}
