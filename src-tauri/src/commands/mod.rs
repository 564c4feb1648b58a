//! Tauri 命令模块

pub mod directory_cmd;

pub use directory_cmd::*;
