//! # 受限解码模块
//!
//! ## 设计思路
//!
//! 把“字节流 → 按倍率缩小的 RGBA”集中管理，并在关键节点做资源上限控制。
//! JPEG 与 PNG 在解码途中直接缩小（见 `scaled`），上限按输出尺寸校验；
//! 其他格式无法缩小解码，只能整图解码后立即缩小，上限按原始尺寸校验。
//!
//! ## 实现思路
//!
//! 1. 重新打开一条独立的流（探测流已被消费）
//! 2. 猜测格式；倍率大于 1 且格式支持时走缩小解码
//! 3. 否则设置解码内存上限，读取头部尺寸按像素上限快速拒绝，完整解码
//! 4. 倍率大于 1 时缩小到 `原始尺寸 / 倍率`

use fast_image_resize as fr;
use image::imageops::FilterType;
use image::{
    DynamicImage, ImageBuffer, ImageDecoder, ImageFormat, ImageReader, Limits, Rgba, RgbaImage,
};

use super::{
    BoundedImageLoader, ContentResolver, DecodedImage, DownsampleFactor, ImageError, ImageLocator,
    ProbedDimensions,
};

impl<R: ContentResolver> BoundedImageLoader<R> {
    /// 按倍率解码图片。
    ///
    /// 流在本函数作用域内独占持有，任意返回路径都会释放。
    pub fn decode_bounded(
        &self,
        locator: &ImageLocator,
        factor: DownsampleFactor,
    ) -> Result<DecodedImage, ImageError> {
        let stream = self.resolver.open(locator)?;

        let reader = ImageReader::new(stream)
            .with_guessed_format()
            .map_err(|e| ImageError::Decode(format!("读取图片头失败：{}", e)))?;

        let format = reader
            .format()
            .ok_or_else(|| ImageError::InvalidFormat("无法识别图片格式".to_string()))?;

        let (pixels, natural) = match format {
            ImageFormat::Jpeg if factor > DownsampleFactor::ONE => {
                self.decode_jpeg_scaled(reader.into_inner(), factor)?
            }
            ImageFormat::Png if factor > DownsampleFactor::ONE => {
                self.decode_png_rows(reader.into_inner(), factor)?
            }
            _ => self.decode_full_then_reduce(reader, factor)?,
        };

        log::info!(
            "✅ 图片解码成功 - 格式: {:?} 原始尺寸: {}x{} 倍率: {} 输出尺寸: {}x{}",
            format,
            natural.width,
            natural.height,
            factor,
            pixels.width(),
            pixels.height()
        );

        Ok(DecodedImage::new(pixels, natural, factor))
    }

    /// 整图解码后缩小，上限按原始尺寸校验。
    fn decode_full_then_reduce(
        &self,
        mut reader: ImageReader<R::Stream>,
        factor: DownsampleFactor,
    ) -> Result<(RgbaImage, ProbedDimensions), ImageError> {
        let mut limits = Limits::default();
        limits.max_alloc = Some(self.config.max_decoded_bytes);
        reader.limits(limits);

        let decoder = reader.into_decoder().map_err(map_codec_error)?;
        let (width, height) = decoder.dimensions();
        self.validate_pixel_limits(width, height)?;

        let decoded = DynamicImage::from_decoder(decoder).map_err(map_codec_error)?;
        let pixels = self.reduce_by_factor(decoded, factor)?;

        Ok((pixels, ProbedDimensions::new(width, height)))
    }

    /// 校验即将分配的像素数量与 RGBA 字节数是否超过配置上限。
    pub(super) fn validate_pixel_limits(&self, width: u32, height: u32) -> Result<(), ImageError> {
        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| ImageError::ResourceLimit("图片像素数溢出".to_string()))?;

        if pixels > self.config.max_decoded_pixels {
            return Err(ImageError::ResourceLimit(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, self.config.max_decoded_pixels
            )));
        }

        let bytes = pixels.saturating_mul(4);
        if bytes > self.config.max_decoded_bytes {
            return Err(ImageError::ResourceLimit(format!(
                "解码缓冲过大：{} bytes（限制：{} bytes）",
                bytes, self.config.max_decoded_bytes
            )));
        }

        Ok(())
    }

    fn reduce_by_factor(
        &self,
        image: DynamicImage,
        factor: DownsampleFactor,
    ) -> Result<RgbaImage, ImageError> {
        let rgba = image.into_rgba8();
        let (width, height) = rgba.dimensions();
        self.resize_rgba(rgba, factor.apply(width), factor.apply(height))
    }

    /// 缩小到指定尺寸；尺寸已一致时原样返回。
    pub(super) fn resize_rgba(
        &self,
        rgba: RgbaImage,
        target_width: u32,
        target_height: u32,
    ) -> Result<RgbaImage, ImageError> {
        let (width, height) = rgba.dimensions();
        if (width, height) == (target_width, target_height) {
            return Ok(rgba);
        }

        let filter = self.config.resize_filter;

        log::debug!(
            "🧩 缩小：{}x{} -> {}x{}（filter={:?}）",
            width,
            height,
            target_width,
            target_height,
            filter
        );

        match Self::resize_with_fast_image_resize(&rgba, target_width, target_height, filter) {
            Ok(resized) => Ok(resized),
            Err(err) => {
                log::warn!("⚠️ fast_image_resize 缩小失败，回退 image::imageops::resize：{}", err);
                Ok(image::imageops::resize(&rgba, target_width, target_height, filter))
            }
        }
    }

    fn resize_with_fast_image_resize(
        src: &RgbaImage,
        target_width: u32,
        target_height: u32,
        filter: FilterType,
    ) -> Result<RgbaImage, ImageError> {
        let (src_width, src_height) = src.dimensions();

        let src_image = fr::images::ImageRef::new(src_width, src_height, src.as_raw(), fr::PixelType::U8x4)
            .map_err(|e| ImageError::Decode(format!("构建源图像缓冲失败：{}", e)))?;

        let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

        let mut resizer = fr::Resizer::new();
        let options = fr::ResizeOptions::new().resize_alg(Self::to_fast_alg(filter));

        resizer
            .resize(&src_image, &mut dst_image, Some(&options))
            .map_err(|e| ImageError::Decode(format!("fast_image_resize 执行失败：{}", e)))?;

        ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(target_width, target_height, dst_image.into_vec())
            .ok_or_else(|| ImageError::Decode("fast_image_resize 输出缓冲长度异常".to_string()))
    }

    /// `Nearest` 对应按倍率直接抽样，其余滤镜走卷积。
    fn to_fast_alg(filter: FilterType) -> fr::ResizeAlg {
        match filter {
            FilterType::Nearest => fr::ResizeAlg::Nearest,
            FilterType::Triangle => fr::ResizeAlg::Convolution(fr::FilterType::Bilinear),
            FilterType::CatmullRom => fr::ResizeAlg::Convolution(fr::FilterType::CatmullRom),
            FilterType::Gaussian => fr::ResizeAlg::Convolution(fr::FilterType::Mitchell),
            FilterType::Lanczos3 => fr::ResizeAlg::Convolution(fr::FilterType::Lanczos3),
        }
    }
}

/// 将编解码库错误映射到加载错误分支。
fn map_codec_error(err: image::ImageError) -> ImageError {
    match err {
        image::ImageError::Limits(e) => ImageError::ResourceLimit(format!("解码内存超出上限：{}", e)),
        image::ImageError::Unsupported(e) => ImageError::InvalidFormat(format!("不支持的图片格式：{}", e)),
        other => ImageError::Decode(format!("图片解码失败：{}", other)),
    }
}
