//! 文档提供者
//!
//! 负责在授权目录中创建条目并写入字节。创建的文件句柄在任何退出路径上都会被关闭。

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use scopeguard::ScopeGuard;
use serde::{Deserialize, Serialize};

use super::mime::{essence, is_valid_mime_type, mime_type_for_name, DIRECTORY_MIME};
use crate::error::AccessError;
use crate::models::{DirectoryHandle, DocumentEntry, PendingWrite};

/// 重名时最多尝试的编号
const MAX_RENAME_ATTEMPTS: u32 = 99;

/// 重名处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// 追加编号，如 `errors (1).txt`
    #[default]
    Rename,
    /// 拒绝创建
    Reject,
}

/// 写入选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    pub collision: CollisionPolicy,
    /// 写入失败时删除未写完的文件
    pub remove_partial_on_failure: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            collision: CollisionPolicy::Rename,
            remove_partial_on_failure: true,
        }
    }
}

/// 文档提供者
#[derive(Debug, Clone, Default)]
pub struct DocumentProvider {
    options: WriteOptions,
}

impl DocumentProvider {
    pub fn new(options: WriteOptions) -> Self {
        Self { options }
    }

    /// 解析授权目录的子条目位置
    ///
    /// 目录不存在或不再是目录时视为授权失效。
    pub fn children_location(&self, handle: &DirectoryHandle) -> Result<PathBuf, AccessError> {
        let metadata = fs::metadata(&handle.path)
            .map_err(|e| AccessError::AccessDenied(format!("{}: {}", handle.uri, e)))?;
        if !metadata.is_dir() {
            return Err(AccessError::AccessDenied(format!(
                "{} 不是目录",
                handle.uri
            )));
        }
        Ok(handle.path.clone())
    }

    fn writable_location(&self, handle: &DirectoryHandle) -> Result<PathBuf, AccessError> {
        if !handle.permissions.write {
            return Err(AccessError::AccessDenied(format!(
                "{} 未授予写权限",
                handle.uri
            )));
        }
        self.children_location(handle)
    }

    fn readable_location(&self, handle: &DirectoryHandle) -> Result<PathBuf, AccessError> {
        if !handle.permissions.read {
            return Err(AccessError::AccessDenied(format!(
                "{} 未授予读权限",
                handle.uri
            )));
        }
        self.children_location(handle)
    }

    // ========================================================================
    // 创建与写入
    // ========================================================================

    /// 在授权目录下创建空条目
    pub fn create_document(
        &self,
        handle: &DirectoryHandle,
        mime_type: &str,
        display_name: &str,
    ) -> Result<DocumentEntry, AccessError> {
        let parent = self.writable_location(handle)?;
        let (path, _file) = self.create_entry(&parent, mime_type, display_name)?;
        entry_for(&path, mime_type)
    }

    /// 创建条目并写入全部字节
    pub fn write_document(
        &self,
        handle: &DirectoryHandle,
        write: &PendingWrite,
    ) -> Result<DocumentEntry, AccessError> {
        let parent = self.writable_location(handle)?;

        if essence(&write.mime_type) == DIRECTORY_MIME && !write.content.is_empty() {
            return Err(AccessError::CreateFailed(format!(
                "{} 是目录，不能写入内容",
                write.file_name
            )));
        }

        let (path, file) = self.create_entry(&parent, &write.mime_type, &write.file_name)?;
        let Some(file) = file else {
            return entry_for(&path, &write.mime_type);
        };

        tracing::debug!("[DocumentProvider] 创建条目: {:?}", path);

        let path = self.fill_entry(path, BufWriter::new(file), &write.content, |writer| {
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()
        })?;
        tracing::debug!(
            "[DocumentProvider] 写入 {} 字节 -> {:?}",
            write.content.len(),
            path
        );
        entry_for(&path, &write.mime_type)
    }

    /// 向新建条目写入全部字节，失败时按选项删除未写完的文件
    fn fill_entry<W: Write>(
        &self,
        path: PathBuf,
        mut writer: W,
        content: &[u8],
        commit: impl FnOnce(W) -> io::Result<()>,
    ) -> Result<PathBuf, AccessError> {
        let cleanup = self.options.remove_partial_on_failure;
        let guard = scopeguard::guard(path, move |path| {
            if !cleanup {
                tracing::warn!("[DocumentProvider] 保留未写完的文件: {:?}", path);
                return;
            }
            match fs::remove_file(&path) {
                Ok(()) => tracing::warn!("[DocumentProvider] 已删除未写完的文件: {:?}", path),
                Err(e) => tracing::warn!("[DocumentProvider] 删除未写完的文件失败: {:?}: {}", path, e),
            }
        });

        writer
            .write_all(content)
            .and_then(|_| commit(writer))
            .map_err(|e| AccessError::WriteFailed(format!("{:?}: {}", *guard, e)))?;

        Ok(ScopeGuard::into_inner(guard))
    }

    /// 创建文件或目录条目，按重名策略选择名称
    fn create_entry(
        &self,
        parent: &Path,
        mime_type: &str,
        display_name: &str,
    ) -> Result<(PathBuf, Option<File>), AccessError> {
        validate_display_name(display_name).map_err(AccessError::CreateFailed)?;
        if !is_valid_mime_type(mime_type) {
            return Err(AccessError::CreateFailed(format!(
                "不支持的 MIME 类型: {}",
                mime_type
            )));
        }

        let is_directory = essence(mime_type) == DIRECTORY_MIME;

        for attempt in 0..=MAX_RENAME_ATTEMPTS {
            let path = parent.join(candidate_name(display_name, attempt));
            let result = if is_directory {
                fs::create_dir(&path).map(|_| None)
            } else {
                OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(&path)
                    .map(Some)
            };

            match result {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    if self.options.collision == CollisionPolicy::Reject {
                        return Err(AccessError::CreateFailed(format!(
                            "{} 已存在",
                            display_name
                        )));
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                    return Err(AccessError::AccessDenied(format!("{:?}: {}", path, e)));
                }
                Err(e) => {
                    return Err(AccessError::CreateFailed(format!("{:?}: {}", path, e)));
                }
            }
        }

        Err(AccessError::CreateFailed(format!(
            "{} 的重名条目过多",
            display_name
        )))
    }

    // ========================================================================
    // 读取
    // ========================================================================

    /// 列出授权目录下的条目（按名称排序）
    pub fn list_children(&self, handle: &DirectoryHandle) -> Result<Vec<DocumentEntry>, AccessError> {
        let location = self.readable_location(handle)?;
        let entries = fs::read_dir(&location)
            .map_err(|e| AccessError::AccessDenied(format!("{}: {}", handle.uri, e)))?;

        let mut children = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let mime_type = if path.is_dir() {
                DIRECTORY_MIME.to_string()
            } else {
                mime_type_for_name(&entry.file_name().to_string_lossy())
            };
            if let Ok(child) = entry_for(&path, &mime_type) {
                children.push(child);
            }
        }

        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    /// 读取授权目录下某个条目的内容
    pub fn read_document(
        &self,
        handle: &DirectoryHandle,
        file_name: &str,
    ) -> Result<Vec<u8>, AccessError> {
        validate_display_name(file_name).map_err(AccessError::AccessDenied)?;
        let location = self.readable_location(handle)?;
        fs::read(location.join(file_name))
            .map_err(|e| AccessError::AccessDenied(format!("{}: {}", file_name, e)))
    }
}

/// 检查显示名称：不能为空，不能包含路径分隔符
fn validate_display_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("文件名为空".to_string());
    }
    if name == "." || name == ".." {
        return Err(format!("无效的文件名: {}", name));
    }
    if name.contains(['/', '\\', '\0']) {
        return Err(format!("文件名不能包含路径分隔符: {}", name));
    }
    Ok(())
}

/// 第 n 次尝试使用的名称：`name`、`stem (1).ext`、`stem (2).ext` ...
fn candidate_name(name: &str, attempt: u32) -> String {
    if attempt == 0 {
        return name.to_string();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{} ({}).{}", stem, attempt, ext),
        _ => format!("{} ({})", name, attempt),
    }
}

fn entry_for(path: &Path, mime_type: &str) -> Result<DocumentEntry, AccessError> {
    let metadata = fs::metadata(path)
        .map_err(|e| AccessError::AccessDenied(format!("{:?}: {}", path, e)))?;
    let modified_at = metadata
        .modified()
        .map(|t| {
            t.duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as i64)
                .unwrap_or(0)
        })
        .unwrap_or(0);
    let uri = if metadata.is_dir() {
        url::Url::from_directory_path(path)
    } else {
        url::Url::from_file_path(path)
    }
    .map(|u| u.to_string())
    .unwrap_or_else(|_| path.to_string_lossy().to_string());

    Ok(DocumentEntry {
        uri,
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        mime_type: mime_type.to_string(),
        size: if metadata.is_dir() { 0 } else { metadata.len() },
        path: path.to_path_buf(),
        modified_at,
    })
}
