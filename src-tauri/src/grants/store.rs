//! 持久化授权存储
//!
//! 授权列表是目录访问的唯一事实来源：会话每次获取目录和每次写入前都重新查询。

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::Utc;
use fs2::FileExt;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::AccessError;
use crate::models::{DirectoryHandle, GrantFlags};

/// 平台授权存储
pub trait GrantStore: Send + Sync {
    /// 列出当前所有持久授权
    fn persisted_grants(&self) -> Result<Vec<DirectoryHandle>, AccessError>;

    /// 获取持久授权（重启后仍有效），已存在时合并权限
    fn take_persistable_grant(
        &self,
        directory: &Path,
        flags: GrantFlags,
    ) -> Result<DirectoryHandle, AccessError>;

    /// 释放授权，不存在时忽略
    fn release_grant(&self, uri: &str) -> Result<(), AccessError>;

    /// 按 URI 查找授权
    fn find_grant(&self, uri: &str) -> Result<Option<DirectoryHandle>, AccessError> {
        Ok(self.persisted_grants()?.into_iter().find(|g| g.uri == uri))
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct GrantFile {
    #[serde(default)]
    grants: Vec<DirectoryHandle>,
}

/// 基于 JSON 文件的授权存储
pub struct JsonGrantStore {
    /// 授权文件路径
    path: PathBuf,
    /// 进程内写锁
    write_lock: Mutex<()>,
}

impl JsonGrantStore {
    /// 使用默认路径 ~/.docgrant/grants.json
    pub fn new() -> Result<Self, AccessError> {
        let home = dirs::home_dir()
            .ok_or_else(|| AccessError::GrantStore("无法获取用户主目录".to_string()))?;
        Self::with_path(home.join(".docgrant").join("grants.json"))
    }

    /// 使用指定的授权文件
    pub fn with_path(path: PathBuf) -> Result<Self, AccessError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AccessError::GrantStore(format!("创建授权目录失败: {}", e)))?;
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }

    fn load(&self) -> Result<GrantFile, AccessError> {
        if !self.path.exists() {
            return Ok(GrantFile::default());
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| AccessError::GrantStore(format!("读取授权文件失败: {}", e)))?;
        if content.trim().is_empty() {
            return Ok(GrantFile::default());
        }
        serde_json::from_str(&content)
            .map_err(|e| AccessError::GrantStore(format!("解析授权文件失败: {}", e)))
    }

    fn save(&self, file: &GrantFile) -> Result<(), AccessError> {
        let content = serde_json::to_string_pretty(file)
            .map_err(|e| AccessError::GrantStore(format!("序列化授权失败: {}", e)))?;
        let mut tmp = self.path.as_os_str().to_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, content)
            .map_err(|e| AccessError::GrantStore(format!("写入授权文件失败: {}", e)))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| AccessError::GrantStore(format!("替换授权文件失败: {}", e)))
    }

    /// 在进程内锁和跨进程文件锁保护下修改授权列表
    fn update<T>(
        &self,
        f: impl FnOnce(&mut GrantFile) -> Result<T, AccessError>,
    ) -> Result<T, AccessError> {
        let _guard = self.write_lock.lock();
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())
            .map_err(|e| AccessError::GrantStore(format!("打开锁文件失败: {}", e)))?;
        lock_file
            .lock_exclusive()
            .map_err(|e| AccessError::GrantStore(format!("获取授权锁失败: {}", e)))?;

        let result = self.load().and_then(|mut file| {
            let value = f(&mut file)?;
            self.save(&file)?;
            Ok(value)
        });

        unlock(&lock_file);
        result
    }
}

fn unlock(file: &File) {
    if let Err(e) = FileExt::unlock(file) {
        tracing::warn!("[GrantStore] 释放授权锁失败: {}", e);
    }
}

/// 由目录路径生成授权 URI
fn directory_uri(directory: &Path) -> Result<String, AccessError> {
    url::Url::from_directory_path(directory)
        .map(|u| u.to_string())
        .map_err(|_| AccessError::GrantStore(format!("无法生成目录 URI: {:?}", directory)))
}

impl GrantStore for JsonGrantStore {
    fn persisted_grants(&self) -> Result<Vec<DirectoryHandle>, AccessError> {
        Ok(self.load()?.grants)
    }

    fn take_persistable_grant(
        &self,
        directory: &Path,
        flags: GrantFlags,
    ) -> Result<DirectoryHandle, AccessError> {
        let directory = directory
            .canonicalize()
            .map_err(|e| AccessError::AccessDenied(format!("{:?}: {}", directory, e)))?;
        if !directory.is_dir() {
            return Err(AccessError::AccessDenied(format!(
                "{:?} 不是目录",
                directory
            )));
        }
        let uri = directory_uri(&directory)?;

        let handle = self.update(|file| {
            if let Some(existing) = file.grants.iter_mut().find(|g| g.uri == uri) {
                existing.permissions = existing.permissions.union(flags);
                return Ok(existing.clone());
            }
            let handle = DirectoryHandle {
                uri: uri.clone(),
                path: directory.clone(),
                permissions: flags,
                granted_at: Utc::now().timestamp_millis(),
            };
            file.grants.push(handle.clone());
            Ok(handle)
        })?;

        tracing::info!("[GrantStore] 已持久化目录授权: {}", handle.uri);
        Ok(handle)
    }

    fn release_grant(&self, uri: &str) -> Result<(), AccessError> {
        let removed = self.update(|file| {
            let before = file.grants.len();
            file.grants.retain(|g| g.uri != uri);
            Ok(before != file.grants.len())
        })?;
        if removed {
            tracing::info!("[GrantStore] 已释放目录授权: {}", uri);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (JsonGrantStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonGrantStore::with_path(temp_dir.path().join("state").join("grants.json"))
            .unwrap();
        (store, temp_dir)
    }

    #[test]
    fn test_empty_store() {
        let (store, _temp) = create_test_store();
        assert!(store.persisted_grants().unwrap().is_empty());
    }

    #[test]
    fn test_grant_survives_restart() {
        let (store, temp) = create_test_store();
        let dir = temp.path().join("exports");
        fs::create_dir_all(&dir).unwrap();

        let handle = store
            .take_persistable_grant(&dir, GrantFlags::READ_WRITE)
            .unwrap();
        assert!(handle.uri.starts_with("file://"));
        assert!(handle.uri.ends_with('/'));
        assert_eq!(handle.permissions, GrantFlags::READ_WRITE);

        // 模拟进程重启：重新打开同一个授权文件
        let reopened = JsonGrantStore::with_path(store.path().to_path_buf()).unwrap();
        let grants = reopened.persisted_grants().unwrap();
        assert_eq!(grants, vec![handle]);
    }

    #[test]
    fn test_grant_same_directory_twice_merges() {
        let (store, temp) = create_test_store();
        let dir = temp.path().join("exports");
        fs::create_dir_all(&dir).unwrap();

        store
            .take_persistable_grant(&dir, GrantFlags::READ_ONLY)
            .unwrap();
        let merged = store
            .take_persistable_grant(&dir, GrantFlags::READ_WRITE)
            .unwrap();

        assert_eq!(merged.permissions, GrantFlags::READ_WRITE);
        assert_eq!(store.persisted_grants().unwrap().len(), 1);
    }

    #[test]
    fn test_release_grant() {
        let (store, temp) = create_test_store();
        let dir = temp.path().join("exports");
        fs::create_dir_all(&dir).unwrap();

        let handle = store
            .take_persistable_grant(&dir, GrantFlags::READ_WRITE)
            .unwrap();
        assert!(store.find_grant(&handle.uri).unwrap().is_some());

        store.release_grant(&handle.uri).unwrap();
        assert!(store.find_grant(&handle.uri).unwrap().is_none());

        // 再次释放不报错
        store.release_grant(&handle.uri).unwrap();
    }

    #[test]
    fn test_grant_missing_directory_denied() {
        let (store, temp) = create_test_store();
        let err = store
            .take_persistable_grant(&temp.path().join("missing"), GrantFlags::READ_WRITE)
            .unwrap_err();
        assert_eq!(err.kind(), "AccessDenied");
    }

    #[test]
    fn test_grant_file_is_rejected() {
        let (store, temp) = create_test_store();
        let file = temp.path().join("plain.txt");
        fs::write(&file, "x").unwrap();
        let err = store
            .take_persistable_grant(&file, GrantFlags::READ_WRITE)
            .unwrap_err();
        assert_eq!(err.kind(), "AccessDenied");
    }

    #[test]
    fn test_corrupt_file_reports_store_error() {
        let (store, _temp) = create_test_store();
        fs::write(store.path(), "{ not json").unwrap();
        let err = store.persisted_grants().unwrap_err();
        assert_eq!(err.kind(), "GrantStore");
    }
}
