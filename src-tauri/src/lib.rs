//! docgrant：对用户选定目录的持久写入
//!
//! 首次导出时请求用户选择目录并持久化授权，之后的导出直接写入该目录。

pub mod capture;
pub mod config;
pub mod documents;
pub mod error;
pub mod grants;
pub mod logger;
pub mod models;
pub mod picker;
pub mod session;

#[cfg(feature = "desktop")]
pub mod commands;
#[cfg(feature = "desktop")]
pub mod platform;

use std::sync::Arc;

pub use config::Config;
pub use error::AccessError;
pub use session::{Collaborators, DirectoryAccessSession};

use documents::DocumentProvider;
use grants::JsonGrantStore;

/// 按配置组装目录访问会话
pub fn build_session(
    config: &Config,
    collaborators: Collaborators,
) -> Result<DirectoryAccessSession, AccessError> {
    let grants = match &config.grants_file {
        Some(path) => JsonGrantStore::with_path(path.clone())?,
        None => JsonGrantStore::new()?,
    };
    tracing::info!("[App] 授权文件: {:?}", grants.path());
    Ok(DirectoryAccessSession::new(
        Arc::new(grants),
        DocumentProvider::new(config.write_options()),
        collaborators,
    ))
}

#[cfg(feature = "desktop")]
pub fn run() {
    use tauri::Manager;

    let config = config::default_config_path()
        .and_then(|path| config::load_config(&path))
        .unwrap_or_else(|e| {
            eprintln!("[Config] 加载配置失败，使用默认配置: {}", e);
            Config::default()
        });
    logger::init(&config.logging);

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .setup(move |app| {
            let session = build_session(&config, platform::collaborators(app.handle()))?;
            app.manage(commands::DocGrantState {
                session: Arc::new(session),
                config: config.clone(),
            });
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::select_file,
            commands::write_text,
            commands::write_image,
            commands::get_directory,
            commands::forget_directory,
            commands::list_directory,
            commands::reveal_directory,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picker::{DirectoryPicker, DocumentPicker, LogNotifier, PickerResponder};
    use tempfile::TempDir;

    struct CancellingPicker;

    impl DirectoryPicker for CancellingPicker {
        fn launch(&self, responder: PickerResponder) {
            responder.cancel();
        }
    }

    impl DocumentPicker for CancellingPicker {
        fn launch(&self, _mime_types: &[String], responder: PickerResponder) {
            responder.cancel();
        }
    }

    #[tokio::test]
    async fn test_build_session_from_config() {
        let temp = TempDir::new().unwrap();
        let config = Config {
            grants_file: Some(temp.path().join("grants.json")),
            ..Config::default()
        };
        let session = build_session(
            &config,
            Collaborators {
                directory_picker: Arc::new(CancellingPicker),
                document_picker: Arc::new(CancellingPicker),
                notifier: Arc::new(LogNotifier),
            },
        )
        .unwrap();

        let outcome = session.export_text(&config.text_export).await.unwrap();
        assert_eq!(outcome, models::ExportOutcome::Cancelled);
        assert!(session.select_file(&["*/*".to_string()]).await.is_none());
    }
}
