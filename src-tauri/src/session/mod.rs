//! 目录访问会话模块
//!
//! 提供以下功能：
//! - 唯一授权目录的获取与持久化
//! - 单槽目录选择请求（回调结果转为 future）
//! - 串行化的后台导出与结果通知

mod directory_session;
mod pending;

pub use directory_session::{
    Authorization, Collaborators, DirectoryAccessSession, EXPORT_SUCCESS_MESSAGE,
    FILE_SELECTED_MESSAGE,
};
pub use pending::PendingGrant;
