//! # 尺寸探测
//!
//! 只读取图片头信息获取原始宽高，不分配像素缓冲。
//! 流在 `ImageReader` 被消费或提前返回时随之释放。

use image::ImageReader;

use super::{BoundedImageLoader, ContentResolver, ImageError, ImageLocator, ProbedDimensions};

impl<R: ContentResolver> BoundedImageLoader<R> {
    /// 打开独立的流并读取图片头中的宽高。
    ///
    /// 失败时返回错误，由 `try_load` 折叠为未知尺寸 `(0, 0)`。
    pub fn probe_dimensions(&self, locator: &ImageLocator) -> Result<ProbedDimensions, ImageError> {
        let stream = self.resolver.open(locator)?;

        let reader = ImageReader::new(stream)
            .with_guessed_format()
            .map_err(|e| ImageError::Decode(format!("读取图片头失败：{}", e)))?;

        if reader.format().is_none() {
            return Err(ImageError::InvalidFormat("无法识别图片格式".to_string()));
        }

        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| ImageError::Decode(format!("无法读取图片尺寸：{}", e)))?;

        log::debug!("🔍 尺寸探测完成 - {}x{}", width, height);

        Ok(ProbedDimensions::new(width, height))
    }
}
