//! 平台协作者接口
//!
//! 目录选择器、文件选择器和通知都由宿主平台提供，结果通过回调异步送达。

use std::path::PathBuf;

use tokio::sync::oneshot;

/// 选择器回调
///
/// 只能回复一次；未回复就被丢弃等同于用户取消。
#[derive(Debug)]
pub struct PickerResponder {
    tx: oneshot::Sender<Option<PathBuf>>,
}

impl PickerResponder {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<Option<PathBuf>>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// 回传用户的选择，`None` 表示取消
    pub fn respond(self, choice: Option<PathBuf>) {
        if self.tx.send(choice).is_err() {
            tracing::debug!("[Picker] 请求方已放弃等待，忽略选择结果");
        }
    }

    pub fn cancel(self) {
        self.respond(None);
    }
}

/// 目录选择器
pub trait DirectoryPicker: Send + Sync {
    /// 启动选择器，结果稍后通过 `responder` 送达
    fn launch(&self, responder: PickerResponder);
}

/// 文件选择器
pub trait DocumentPicker: Send + Sync {
    /// 启动选择器；`mime_types` 为可接受的 MIME 模式，如 `*/*`
    fn launch(&self, mime_types: &[String], responder: PickerResponder);
}

/// 瞬时通知（如 toast）
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// 只记录日志的通知实现
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        tracing::info!("[Notifier] {}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_responder_delivers_choice() {
        let (responder, rx) = PickerResponder::channel();
        responder.respond(Some(PathBuf::from("/tmp/exports")));
        assert_eq!(rx.await.unwrap(), Some(PathBuf::from("/tmp/exports")));
    }

    #[tokio::test]
    async fn test_dropped_responder_closes_channel() {
        let (responder, rx) = PickerResponder::channel();
        drop(responder);
        assert!(rx.await.is_err());
    }

    #[test]
    fn test_respond_after_receiver_dropped() {
        let (responder, rx) = PickerResponder::channel();
        drop(rx);
        responder.cancel();
    }
}
