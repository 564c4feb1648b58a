//! 目录访问 Tauri 命令
//!
//! 对应界面上的三个操作：选择文件、写入文本、写入图片。

use std::sync::Arc;

use tauri::State;

use crate::capture::png_from_data_url;
use crate::config::Config;
use crate::models::{DirectoryHandle, DocumentEntry, ExportOutcome, SelectedDocument};
use crate::session::DirectoryAccessSession;

/// 目录访问状态
pub struct DocGrantState {
    pub session: Arc<DirectoryAccessSession>,
    pub config: Config,
}

// ============================================================================
// 界面操作
// ============================================================================

/// 选择任意已有文件
#[tauri::command]
pub async fn select_file(
    state: State<'_, DocGrantState>,
    mime_types: Option<Vec<String>>,
) -> Result<Option<SelectedDocument>, String> {
    let mime_types = mime_types.unwrap_or_else(|| vec!["*/*".to_string()]);
    Ok(state.session.select_file(&mime_types).await)
}

/// 写入文本文件
#[tauri::command]
pub async fn write_text(state: State<'_, DocGrantState>) -> Result<ExportOutcome, String> {
    state
        .session
        .export_text(&state.config.text_export)
        .await
        .map_err(|e| e.to_string())
}

/// 写入前端画布导出的 PNG（data URL）
#[tauri::command]
pub async fn write_image(
    state: State<'_, DocGrantState>,
    data_url: String,
) -> Result<ExportOutcome, String> {
    let png = png_from_data_url(&data_url).map_err(|e| e.to_string())?;
    state
        .session
        .export_png(&state.config.image_export, png)
        .await
        .map_err(|e| e.to_string())
}

// ============================================================================
// 目录管理
// ============================================================================

/// 获取当前目录
#[tauri::command]
pub fn get_directory(state: State<'_, DocGrantState>) -> Result<Option<DirectoryHandle>, String> {
    Ok(state.session.current_directory())
}

/// 放弃当前目录授权
#[tauri::command]
pub fn forget_directory(state: State<'_, DocGrantState>) -> Result<bool, String> {
    state.session.forget_directory().map_err(|e| e.to_string())
}

/// 列出当前目录内容
#[tauri::command]
pub async fn list_directory(
    state: State<'_, DocGrantState>,
) -> Result<Vec<DocumentEntry>, String> {
    state
        .session
        .list_directory()
        .await
        .map_err(|e| e.to_string())
}

/// 在系统文件管理器中打开当前目录
#[tauri::command]
pub fn reveal_directory(state: State<'_, DocGrantState>) -> Result<bool, String> {
    let Some(handle) = state.session.current_directory() else {
        return Ok(false);
    };
    open::that(&handle.path).map_err(|e| e.to_string())?;
    Ok(true)
}
