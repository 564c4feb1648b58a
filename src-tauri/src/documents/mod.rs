//! 授权目录文档操作模块
//!
//! 在已授权目录下创建、写入、列出和读取文档条目。

pub mod mime;
pub mod provider;

pub use mime::{extensions_for_patterns, is_valid_mime_type, mime_type_for_name, DIRECTORY_MIME};
pub use provider::{CollisionPolicy, DocumentProvider, WriteOptions};
