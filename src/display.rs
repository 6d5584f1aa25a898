//! 显示槽模块
//!
//! `ImageView` 是调用方持有的唯一输出槽：加载核心只返回值，由调用方决定是否替换。
//!
//! # 设计思路
//!
//! - 成功结果替换当前图片；失败结果（`None`）保持原图不变。
//! - 失败只用于诊断日志，不向用户展示。

use std::fmt;

use crate::image_loader::DecodedImage;

/// 单图显示区域。
#[derive(Debug, Default)]
pub struct ImageView {
    current: Option<DecodedImage>,
}

impl ImageView {
    pub fn new() -> Self {
        Self::default()
    }

    /// 应用一次加载结果，返回显示内容是否发生变化。
    pub fn show(&mut self, image: Option<DecodedImage>) -> bool {
        match image {
            Some(image) => {
                self.current = Some(image);
                true
            }
            None => false,
        }
    }

    pub fn current(&self) -> Option<&DecodedImage> {
        self.current.as_ref()
    }
}

impl fmt::Display for ImageView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.current {
            Some(image) => {
                let natural = image.natural();
                write!(
                    f,
                    "显示中：{}x{}（原始 {}x{}，倍率 {}）",
                    image.width(),
                    image.height(),
                    natural.width,
                    natural.height,
                    image.factor()
                )
            }
            None => f.write_str("未显示图片"),
        }
    }
}
