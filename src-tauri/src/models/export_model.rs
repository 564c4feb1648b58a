use serde::{Deserialize, Serialize};

use super::document_model::DocumentEntry;

/// 单次导出操作所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportPhase {
    Idle,
    AcquiringDirectory,
    DirectoryReady,
    AwaitingUserGrant,
    Writing,
    Done,
    Failed,
}

impl std::fmt::Display for ExportPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::AcquiringDirectory => write!(f, "AcquiringDirectory"),
            Self::DirectoryReady => write!(f, "DirectoryReady"),
            Self::AwaitingUserGrant => write!(f, "AwaitingUserGrant"),
            Self::Writing => write!(f, "Writing"),
            Self::Done => write!(f, "Done"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// 导出结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ExportOutcome {
    /// 已创建并完整写入
    Written { entry: DocumentEntry },
    /// 用户取消了目录选择，未尝试写入
    Cancelled,
}
