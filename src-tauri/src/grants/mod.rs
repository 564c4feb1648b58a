//! 目录授权存储模块
//!
//! 保存用户授予的目录访问权限，使其在进程重启后依然有效。
//!
//! ## 文件格式
//! ```text
//! ~/.docgrant/
//! ├── grants.json        # 授权列表
//! └── grants.json.lock   # 跨进程写锁
//! ```

pub mod store;

pub use store::{GrantStore, JsonGrantStore};
