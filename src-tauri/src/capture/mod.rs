//! 画面快照编码模块
//!
//! 屏幕捕获由宿主完成（如 webview 画布），这里只负责像素与 PNG 之间的转换。

mod png;

pub use png::{decode_png, png_from_data_url, Snapshot};
