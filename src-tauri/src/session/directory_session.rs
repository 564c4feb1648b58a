//! 目录访问会话
//!
//! 在界面操作与平台授权/文件创建接口之间做协调：
//! - 确认唯一的已授权目录，没有时请求用户选择
//! - 首次授权时持久化权限
//! - 在阻塞线程池中写入文件，结果通过通知反馈

use std::path::Path;
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::{Mutex, RwLock};

use super::pending::{PendingGrant, PendingSlot};
use crate::capture::{decode_png, Snapshot};
use crate::config::{ImageExportConfig, TextExportConfig};
use crate::documents::{mime_type_for_name, DocumentProvider};
use crate::error::AccessError;
use crate::grants::GrantStore;
use crate::models::{
    DirectoryHandle, DocumentEntry, ExportOutcome, ExportPhase, GrantFlags, PendingWrite,
    SelectedDocument,
};
use crate::picker::{DirectoryPicker, DocumentPicker, Notifier, PickerResponder};

/// 导出成功提示
pub const EXPORT_SUCCESS_MESSAGE: &str = "Exported successfully!";
/// 文件选择成功提示
pub const FILE_SELECTED_MESSAGE: &str = "Path read successfully!";

/// 目录授权状态
#[derive(Debug)]
pub enum Authorization {
    /// 已有唯一授权目录
    Ready(DirectoryHandle),
    /// 已请求用户选择目录，等待响应
    Pending(PendingGrant),
}

/// 平台协作者
#[derive(Clone)]
pub struct Collaborators {
    pub directory_picker: Arc<dyn DirectoryPicker>,
    pub document_picker: Arc<dyn DocumentPicker>,
    pub notifier: Arc<dyn Notifier>,
}

/// 目录访问会话
pub struct DirectoryAccessSession {
    grants: Arc<dyn GrantStore>,
    provider: DocumentProvider,
    collaborators: Collaborators,
    /// 当前使用的目录
    active: RwLock<Option<DirectoryHandle>>,
    /// 进行中的目录请求
    pending: PendingSlot,
    /// 同一时刻只允许一个导出
    export_lock: tokio::sync::Mutex<()>,
    phase: Mutex<ExportPhase>,
    /// 最近一次通过文件选择器选中的文件
    selected: RwLock<Option<SelectedDocument>>,
}

impl DirectoryAccessSession {
    pub fn new(
        grants: Arc<dyn GrantStore>,
        provider: DocumentProvider,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            grants,
            provider,
            collaborators,
            active: RwLock::new(None),
            pending: PendingSlot::default(),
            export_lock: tokio::sync::Mutex::new(()),
            phase: Mutex::new(ExportPhase::Idle),
            selected: RwLock::new(None),
        }
    }

    /// 当前导出阶段
    ///
    /// 只由 [`export`](Self::export) 流程更新；导出互斥执行，阶段不会被并发调用覆盖。
    pub fn phase(&self) -> ExportPhase {
        *self.phase.lock()
    }

    fn set_phase(&self, phase: ExportPhase) {
        let mut current = self.phase.lock();
        if *current != phase {
            tracing::debug!("[DirectoryAccess] 阶段 {} -> {}", *current, phase);
            *current = phase;
        }
    }

    /// 当前使用的目录（可能已被外部撤销）
    pub fn current_directory(&self) -> Option<DirectoryHandle> {
        self.active.read().clone()
    }

    /// 是否有等待用户响应的目录请求
    pub fn is_request_pending(&self) -> bool {
        self.pending.is_pending()
    }

    pub fn selected_file(&self) -> Option<SelectedDocument> {
        self.selected.read().clone()
    }

    // ========================================================================
    // 目录授权
    // ========================================================================

    /// 查询授权列表：恰好一个时采用；多个时全部释放
    fn adopt_single_grant(&self) -> Result<Option<DirectoryHandle>, AccessError> {
        let mut grants = self.grants.persisted_grants()?;
        for grant in &grants {
            tracing::debug!("[DirectoryAccess] 发现授权: {}", grant.uri);
        }

        if grants.len() == 1 {
            let handle = grants.remove(0);
            *self.active.write() = Some(handle.clone());
            return Ok(Some(handle));
        }

        if grants.len() > 1 {
            tracing::warn!(
                "[DirectoryAccess] 存在 {} 个授权目录，全部释放后重新选择",
                grants.len()
            );
            for grant in &grants {
                self.grants.release_grant(&grant.uri)?;
            }
        }

        *self.active.write() = None;
        Ok(None)
    }

    /// 确保存在唯一的授权目录
    ///
    /// 没有或有多个授权时启动目录选择器并返回等待中的请求。
    pub fn ensure_authorized_directory(&self) -> Result<Authorization, AccessError> {
        match self.adopt_single_grant()? {
            Some(handle) => Ok(Authorization::Ready(handle)),
            None => Ok(Authorization::Pending(self.request_directory())),
        }
    }

    fn request_directory(&self) -> PendingGrant {
        self.pending.join_or_start(|| {
            let (responder, rx) = PickerResponder::channel();
            tracing::info!("[DirectoryAccess] 请求用户选择目录");
            self.collaborators.directory_picker.launch(responder);

            let grants = Arc::clone(&self.grants);
            async move {
                let Some(directory) = rx.await.ok().flatten() else {
                    tracing::info!("[DirectoryAccess] 用户取消了目录选择");
                    return Ok(None);
                };
                let handle = grants.take_persistable_grant(&directory, GrantFlags::READ_WRITE)?;
                tracing::info!(
                    "[DirectoryAccess] 已获得目录写权限: {} ({})",
                    handle.display_name(),
                    handle.uri
                );
                Ok(Some(handle))
            }
            .boxed()
        })
    }

    /// 获取授权目录，必要时等待用户选择
    ///
    /// 用户取消时返回 `None`。不影响导出阶段。
    pub async fn acquire_directory(&self) -> Result<Option<DirectoryHandle>, AccessError> {
        self.acquire(|_| {}).await
    }

    async fn acquire(
        &self,
        track: impl Fn(ExportPhase),
    ) -> Result<Option<DirectoryHandle>, AccessError> {
        track(ExportPhase::AcquiringDirectory);
        let pending = match self.ensure_authorized_directory()? {
            Authorization::Ready(handle) => {
                track(ExportPhase::DirectoryReady);
                return Ok(Some(handle));
            }
            Authorization::Pending(pending) => pending,
        };

        track(ExportPhase::AwaitingUserGrant);
        if pending.wait().await?.is_none() {
            return Ok(None);
        }

        // 用户授权后重新查询授权列表
        track(ExportPhase::AcquiringDirectory);
        match self.adopt_single_grant()? {
            Some(handle) => {
                track(ExportPhase::DirectoryReady);
                Ok(Some(handle))
            }
            None => Err(AccessError::NoAuthorizedDirectory),
        }
    }

    /// 释放当前目录授权
    ///
    /// 没有当前目录时释放所有已持久化的授权。返回是否释放了授权。
    pub fn forget_directory(&self) -> Result<bool, AccessError> {
        let released = match self.active.write().take() {
            Some(handle) => vec![handle],
            None => self.grants.persisted_grants()?,
        };
        for handle in &released {
            self.grants.release_grant(&handle.uri)?;
            tracing::info!("[DirectoryAccess] 已放弃目录: {}", handle.uri);
        }
        Ok(!released.is_empty())
    }

    /// 对照授权列表重新校验句柄，撤销时清除当前目录
    fn revalidate(&self, handle: &DirectoryHandle) -> Result<DirectoryHandle, AccessError> {
        match self.grants.find_grant(&handle.uri)? {
            Some(current) => Ok(current),
            None => {
                let mut active = self.active.write();
                if active.as_ref().map(|h| h.uri == handle.uri).unwrap_or(false) {
                    *active = None;
                }
                Err(AccessError::AccessDenied(format!(
                    "{} 的授权已被撤销",
                    handle.uri
                )))
            }
        }
    }

    fn authorized_directory(&self) -> Result<DirectoryHandle, AccessError> {
        let handle = match self.current_directory() {
            Some(handle) => handle,
            None => self
                .adopt_single_grant()?
                .ok_or(AccessError::NoAuthorizedDirectory)?,
        };
        self.revalidate(&handle)
    }

    // ========================================================================
    // 写入
    // ========================================================================

    /// 在授权目录中创建文件并写入全部内容
    pub async fn write_file(
        &self,
        handle: &DirectoryHandle,
        file_name: &str,
        mime_type: &str,
        content: Vec<u8>,
    ) -> Result<DocumentEntry, AccessError> {
        self.write_pending(handle, PendingWrite::new(file_name, mime_type, content))
            .await
    }

    async fn write_pending(
        &self,
        handle: &DirectoryHandle,
        write: PendingWrite,
    ) -> Result<DocumentEntry, AccessError> {
        let handle = self.revalidate(handle)?;
        let provider = self.provider.clone();
        tokio::task::spawn_blocking(move || provider.write_document(&handle, &write))
            .await
            .map_err(|e| AccessError::WriteFailed(format!("后台写入任务中断: {}", e)))?
    }

    /// 完整的导出流程：获取目录 -> 写入 -> 通知
    pub async fn export(&self, write: PendingWrite) -> Result<ExportOutcome, AccessError> {
        let _guard = self.export_lock.lock().await;
        let file_name = write.file_name.clone();
        let result = self.run_export(write).await;

        match &result {
            Ok(ExportOutcome::Written { entry }) => {
                self.set_phase(ExportPhase::Done);
                tracing::info!("[DirectoryAccess] 导出完成: {}", entry.uri);
                self.collaborators.notifier.notify(EXPORT_SUCCESS_MESSAGE);
            }
            Ok(ExportOutcome::Cancelled) => {
                self.set_phase(ExportPhase::Idle);
                tracing::info!("[DirectoryAccess] 未选择目录，跳过写入 {}", file_name);
            }
            Err(e) => {
                self.set_phase(ExportPhase::Failed);
                tracing::error!("[DirectoryAccess] 导出 {} 失败: {}", file_name, e);
                self.collaborators
                    .notifier
                    .notify(&format!("Export failed: {}", e));
            }
        }

        result
    }

    async fn run_export(&self, write: PendingWrite) -> Result<ExportOutcome, AccessError> {
        let Some(handle) = self.acquire(|phase| self.set_phase(phase)).await? else {
            return Ok(ExportOutcome::Cancelled);
        };
        self.set_phase(ExportPhase::Writing);
        let entry = self.write_pending(&handle, write).await?;
        Ok(ExportOutcome::Written { entry })
    }

    /// 导出文本文件
    pub async fn export_text(
        &self,
        config: &TextExportConfig,
    ) -> Result<ExportOutcome, AccessError> {
        self.export(PendingWrite::new(
            config.file_name.as_str(),
            config.mime_type.as_str(),
            config.content.as_bytes(),
        ))
        .await
    }

    /// 导出 PNG 图片，写入前校验数据
    pub async fn export_png(
        &self,
        config: &ImageExportConfig,
        png: Vec<u8>,
    ) -> Result<ExportOutcome, AccessError> {
        decode_png(&png)?;
        self.export(PendingWrite::new(
            config.file_name.as_str(),
            config.mime_type.as_str(),
            png,
        ))
        .await
    }

    /// 导出画面快照
    pub async fn export_snapshot(
        &self,
        config: &ImageExportConfig,
        snapshot: &Snapshot,
    ) -> Result<ExportOutcome, AccessError> {
        let png = snapshot.to_png()?;
        self.export(PendingWrite::new(
            config.file_name.as_str(),
            config.mime_type.as_str(),
            png,
        ))
        .await
    }

    // ========================================================================
    // 读取
    // ========================================================================

    /// 列出授权目录内容
    pub async fn list_directory(&self) -> Result<Vec<DocumentEntry>, AccessError> {
        let handle = self.authorized_directory()?;
        let provider = self.provider.clone();
        tokio::task::spawn_blocking(move || provider.list_children(&handle))
            .await
            .map_err(|e| AccessError::AccessDenied(format!("后台读取任务中断: {}", e)))?
    }

    /// 读取授权目录中的文件
    pub async fn read_document(&self, file_name: &str) -> Result<Vec<u8>, AccessError> {
        let handle = self.authorized_directory()?;
        let provider = self.provider.clone();
        let file_name = file_name.to_string();
        tokio::task::spawn_blocking(move || provider.read_document(&handle, &file_name))
            .await
            .map_err(|e| AccessError::AccessDenied(format!("后台读取任务中断: {}", e)))?
    }

    /// 通过文件选择器选择任意已有文件
    ///
    /// 只记录所选路径，不参与写入流程。
    pub async fn select_file(&self, mime_types: &[String]) -> Option<SelectedDocument> {
        let (responder, rx) = PickerResponder::channel();
        self.collaborators
            .document_picker
            .launch(mime_types, responder);

        let Some(path) = rx.await.ok().flatten() else {
            tracing::debug!("[DirectoryAccess] 用户取消了文件选择");
            return None;
        };

        let document = selected_document(&path);
        tracing::info!("[DirectoryAccess] 已选择文件: {:?}", document.path);
        *self.selected.write() = Some(document.clone());
        self.collaborators.notifier.notify(FILE_SELECTED_MESSAGE);
        Some(document)
    }
}

fn selected_document(path: &Path) -> SelectedDocument {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let uri = url::Url::from_file_path(path)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| path.to_string_lossy().to_string());
    SelectedDocument {
        uri,
        mime_type: mime_type_for_name(&name),
        name,
        path: path.to_path_buf(),
    }
}
