//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载加载链路中的所有失败来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//!
//! 所有分支都是“终止但非致命”的：加载器在边界处记录日志并折叠为“无图片”。

/// 图片加载统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// 定位符无法打开为可读流（文件不存在、权限被撤销、定位符格式错误）。
    #[error("无法打开图片流：{0}")]
    StreamOpen(String),

    /// 元数据或像素解码没有产出可用结果。
    #[error("解码错误：{0}")]
    Decode(String),

    /// 内容不是可识别的图片，或配置值非法。
    #[error("格式错误：{0}")]
    InvalidFormat(String),

    /// 文件体积、像素数量或解码内存超出上限。
    #[error("资源限制：{0}")]
    ResourceLimit(String),
}

