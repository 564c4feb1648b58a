use std::sync::Arc;

use tauri::{AppHandle, Emitter};
use tauri_plugin_dialog::{DialogExt, FilePath};

use crate::documents::extensions_for_patterns;
use crate::picker::{DirectoryPicker, DocumentPicker, Notifier, PickerResponder};
use crate::session::Collaborators;

/// 前端 toast 事件名
pub const TOAST_EVENT: &str = "docgrant://toast";

fn into_path(choice: Option<FilePath>) -> Option<std::path::PathBuf> {
    match choice?.into_path() {
        Ok(path) => Some(path),
        Err(e) => {
            tracing::warn!("[Dialog] 无法解析所选路径: {}", e);
            None
        }
    }
}

/// 系统目录选择对话框
pub struct TauriDirectoryPicker {
    app: AppHandle,
}

impl TauriDirectoryPicker {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl DirectoryPicker for TauriDirectoryPicker {
    fn launch(&self, responder: PickerResponder) {
        self.app
            .dialog()
            .file()
            .set_title("Choose an export folder")
            .pick_folder(move |folder| responder.respond(into_path(folder)));
    }
}

/// 系统文件打开对话框
pub struct TauriDocumentPicker {
    app: AppHandle,
}

impl TauriDocumentPicker {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl DocumentPicker for TauriDocumentPicker {
    fn launch(&self, mime_types: &[String], responder: PickerResponder) {
        let extensions = extensions_for_patterns(mime_types);
        let mut dialog = self.app.dialog().file();
        if !extensions.is_empty() {
            dialog = dialog.add_filter("Documents", &extensions);
        }
        dialog.pick_file(move |file| responder.respond(into_path(file)));
    }
}

/// 通过事件在前端显示 toast
pub struct TauriNotifier {
    app: AppHandle,
}

impl TauriNotifier {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl Notifier for TauriNotifier {
    fn notify(&self, message: &str) {
        if let Err(e) = self.app.emit(TOAST_EVENT, message.to_string()) {
            tracing::warn!("[Notifier] 发送通知失败: {}", e);
        }
    }
}

/// 组装 Tauri 协作者
pub fn collaborators(app: &AppHandle) -> Collaborators {
    Collaborators {
        directory_picker: Arc::new(TauriDirectoryPicker::new(app.clone())),
        document_picker: Arc::new(TauriDocumentPicker::new(app.clone())),
        notifier: Arc::new(TauriNotifier::new(app.clone())),
    }
}
