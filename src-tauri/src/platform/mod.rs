//! Tauri 平台协作者
//!
//! 目录/文件选择器基于 tauri-plugin-dialog，通知通过事件发送到前端。

mod tauri_bridge;

pub use tauri_bridge::{
    collaborators, TauriDirectoryPicker, TauriDocumentPicker, TauriNotifier, TOAST_EVENT,
};
