//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 加载核心的错误（`ImageError`）在核心边界内被折叠为“无图片”，
//! 不会到达这里；`AppError` 只承载应用外围的失败：读取设置、终端 I/O。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `ImageError` 与 `std::io::Error` 提供 `From` 转换，调用侧直接 `?`。

use crate::image_loader::ImageError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 配置值非法（例如目标尺寸为 0、未知重采样档位）
    #[error("{0}")]
    Image(#[from] ImageError),

    /// 文件系统或终端 I/O 错误
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 设置文件不可用或无法解析
    #[error("设置错误: {0}")]
    Settings(String),
}
