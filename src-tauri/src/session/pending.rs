//! 单槽目录请求
//!
//! 同一时刻最多只有一个目录选择请求；请求未完成时再次请求会加入同一个请求。
//! 槽位只保存弱引用，请求完成或所有等待方都放弃后，下一次请求会重新启动选择器。

use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::error::AccessError;
use crate::models::DirectoryHandle;

pub(crate) type GrantResult = Result<Option<DirectoryHandle>, AccessError>;

type GrantRequest = BoxFuture<'static, GrantResult>;
type GrantFuture = Shared<GrantRequest>;

#[derive(Default)]
pub(crate) struct PendingSlot {
    next_id: AtomicU64,
    current: Mutex<Option<(u64, WeakShared<GrantRequest>)>>,
}

/// 仍在等待用户响应的请求
fn live_request(current: &Option<(u64, WeakShared<GrantRequest>)>) -> Option<(u64, GrantFuture)> {
    let (id, weak) = current.as_ref()?;
    let future = weak.upgrade()?;
    future.peek().is_none().then_some((*id, future))
}

/// 可以加入的请求
///
/// 用户已响应但后台任务尚未处理时，先在此处完成请求：
/// 得到授权则直接加入，取消或失败则视为没有请求。
fn joinable_request(
    current: &Option<(u64, WeakShared<GrantRequest>)>,
) -> Option<(u64, GrantFuture)> {
    let (id, future) = live_request(current)?;
    match future.clone().now_or_never() {
        None | Some(Ok(Some(_))) => Some((id, future)),
        Some(_) => None,
    }
}

impl PendingSlot {
    pub(crate) fn is_pending(&self) -> bool {
        live_request(&self.current.lock()).is_some()
    }

    /// 加入当前请求；没有请求时调用 `start` 发起新请求
    ///
    /// 在 tokio 运行时中，新请求会立即派生为后台任务，
    /// 这样即使调用方不等待，用户的选择也会被持久化。
    /// `start` 在锁外调用，选择器可以同步回调会话。
    pub(crate) fn join_or_start(&self, start: impl FnOnce() -> GrantRequest) -> PendingGrant {
        let (id, future, request_tx) = {
            let mut current = self.current.lock();
            if let Some((id, future)) = joinable_request(&current) {
                tracing::debug!("[DirectoryAccess] 加入进行中的目录请求 #{}", id);
                return PendingGrant { id, future };
            }

            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            let (request_tx, request_rx) = oneshot::channel::<GrantRequest>();
            let future = async move {
                match request_rx.await {
                    Ok(request) => request.await,
                    Err(_) => Err(AccessError::GrantStore("目录授权请求未能启动".to_string())),
                }
            }
            .boxed()
            .shared();

            *current = future.downgrade().map(|weak| (id, weak));
            (id, future, request_tx)
        };

        if request_tx.send(start()).is_err() {
            tracing::warn!("[DirectoryAccess] 目录请求 #{} 已无人等待", id);
        }
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(future.clone());
        }

        PendingGrant { id, future }
    }
}

/// 等待用户选择目录的请求
///
/// 丢弃后不会阻塞后续请求。
pub struct PendingGrant {
    id: u64,
    future: GrantFuture,
}

impl PendingGrant {
    /// 等待用户响应
    ///
    /// 返回新授权的目录，用户取消时返回 `None`。
    pub async fn wait(self) -> GrantResult {
        self.future.await
    }
}

impl std::fmt::Debug for PendingGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingGrant").field("id", &self.id).finish()
    }
}
