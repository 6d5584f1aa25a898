//! # 缩小解码模块
//!
//! ## 设计思路
//!
//! 对能在解码途中缩小的格式，不分配原始尺寸的整图缓冲：
//! - JPEG：DCT 缩放解码（1/2、1/4、1/8），倍率超过 8 时余下部分再常规缩小
//! - PNG：逐行读取，每凑满 `factor` 行产出一行输出像素
//!
//! 像素与内存上限按缩小后的尺寸校验，大图只会得到更大的倍率而不会被拒绝。
//!
//! ## 实现思路
//!
//! - `RowSampler` 维护一行输出的累加器，`Nearest` 取块左上角像素，其余滤镜取块均值
//! - 隔行 PNG 需要整帧去隔行，先按原始尺寸校验上限，再把整帧逐行喂给 `RowSampler`

use std::io::{BufRead, Read, Seek};

use image::RgbaImage;
use image::imageops::FilterType;
use jpeg_decoder::PixelFormat;

use super::{BoundedImageLoader, ContentResolver, DownsampleFactor, ImageError, ProbedDimensions};

impl<R: ContentResolver> BoundedImageLoader<R> {
    /// JPEG 按 DCT 缩放解码。
    pub(super) fn decode_jpeg_scaled<S: Read>(
        &self,
        stream: S,
        factor: DownsampleFactor,
    ) -> Result<(RgbaImage, ProbedDimensions), ImageError> {
        let mut decoder = jpeg_decoder::Decoder::new(stream);
        decoder.read_info().map_err(map_jpeg_error)?;
        let info = decoder
            .info()
            .ok_or_else(|| ImageError::Decode("JPEG 头信息缺失".to_string()))?;

        let natural = ProbedDimensions::new(u32::from(info.width), u32::from(info.height));
        let target_width = factor.apply(natural.width);
        let target_height = factor.apply(natural.height);

        // 目标尺寸不超过原始尺寸，必然落在 u16 范围内
        let (scaled_width, scaled_height) = decoder
            .scale(
                u16::try_from(target_width).unwrap_or(u16::MAX),
                u16::try_from(target_height).unwrap_or(u16::MAX),
            )
            .map_err(map_jpeg_error)?;
        let (scaled_width, scaled_height) = (u32::from(scaled_width), u32::from(scaled_height));

        self.validate_pixel_limits(scaled_width, scaled_height)?;
        decoder.set_max_decoding_buffer_size(
            usize::try_from(self.config.max_decoded_bytes).unwrap_or(usize::MAX),
        );

        log::debug!(
            "🧩 JPEG 缩放解码：{}x{} -> {}x{}（factor={}）",
            natural.width,
            natural.height,
            scaled_width,
            scaled_height,
            factor
        );

        let raw = decoder.decode().map_err(map_jpeg_error)?;
        let scaled = jpeg_to_rgba(&raw, info.pixel_format, scaled_width, scaled_height)?;

        let pixels = self.resize_rgba(scaled, target_width, target_height)?;
        Ok((pixels, natural))
    }

    /// PNG 逐行解码并归并到倍率块。
    pub(super) fn decode_png_rows<S: BufRead + Seek>(
        &self,
        stream: S,
        factor: DownsampleFactor,
    ) -> Result<(RgbaImage, ProbedDimensions), ImageError> {
        let limits = png::Limits {
            bytes: usize::try_from(self.config.max_decoded_bytes).unwrap_or(usize::MAX),
        };
        let mut decoder = png::Decoder::new_with_limits(stream, limits);
        decoder.set_transformations(
            png::Transformations::EXPAND | png::Transformations::STRIP_16 | png::Transformations::ALPHA,
        );

        let mut reader = decoder.read_info().map_err(map_png_error)?;
        let (width, height, interlaced) = {
            let info = reader.info();
            (info.width, info.height, info.interlaced)
        };
        let natural = ProbedDimensions::new(width, height);

        let channels = match reader.output_color_type() {
            (png::ColorType::Rgba, png::BitDepth::Eight) => 4,
            (png::ColorType::GrayscaleAlpha, png::BitDepth::Eight) => 2,
            (color, depth) => {
                return Err(ImageError::InvalidFormat(format!(
                    "不支持的 PNG 输出格式：{:?} {:?}",
                    color, depth
                )));
            }
        };

        self.validate_pixel_limits(factor.apply(width), factor.apply(height))?;
        let mut sampler = RowSampler::new(
            natural,
            factor,
            channels,
            self.config.resize_filter == FilterType::Nearest,
        );

        if interlaced {
            self.validate_pixel_limits(width, height)?;
            log::debug!("🧩 PNG 为隔行扫描，整帧解码后归并：{}x{}", width, height);

            let size = reader
                .output_buffer_size()
                .ok_or_else(|| ImageError::ResourceLimit("PNG 帧缓冲过大".to_string()))?;
            let mut frame = vec![0u8; size];
            let output = reader.next_frame(&mut frame).map_err(map_png_error)?;
            for row in frame[..output.buffer_size()].chunks_exact(output.line_size) {
                sampler.push_row(row);
            }
        } else {
            log::debug!(
                "🧩 PNG 逐行解码：{}x{} -> {}x{}（factor={}）",
                width,
                height,
                sampler.out_width,
                sampler.out_height,
                factor
            );

            while let Some(row) = reader.next_row().map_err(map_png_error)? {
                sampler.push_row(row.data());
            }
        }

        Ok((sampler.finish()?, natural))
    }
}

/// 把源图逐行归并为 `factor × factor` 块的输出图。
///
/// 只持有一行输出的累加器与最终输出缓冲。
struct RowSampler {
    src_width: u32,
    src_height: u32,
    factor: u32,
    channels: usize,
    nearest: bool,
    out_width: u32,
    out_height: u32,
    sums: Vec<u64>,
    next_row: u32,
    pixels: Vec<u8>,
}

impl RowSampler {
    fn new(natural: ProbedDimensions, factor: DownsampleFactor, channels: usize, nearest: bool) -> Self {
        let out_width = factor.apply(natural.width);
        let out_height = factor.apply(natural.height);
        Self {
            src_width: natural.width,
            src_height: natural.height,
            factor: factor.get(),
            channels,
            nearest,
            out_width,
            out_height,
            sums: vec![0; out_width as usize * 4],
            next_row: 0,
            pixels: Vec::with_capacity(out_width as usize * out_height as usize * 4),
        }
    }

    /// 输出列 `ox` 覆盖的源列区间。
    fn column_span(&self, ox: u32) -> (u32, u32) {
        let start = ox * self.factor;
        (start, start.saturating_add(self.factor).min(self.src_width))
    }

    fn pixel_at(&self, row: &[u8], x: u32) -> [u8; 4] {
        let offset = x as usize * self.channels;
        match row.get(offset..offset + self.channels) {
            Some(&[r, g, b, a]) => [r, g, b, a],
            Some(&[l, a]) => [l, l, l, a],
            _ => [0, 0, 0, 0],
        }
    }

    fn push_row(&mut self, row: &[u8]) {
        let y = self.next_row;
        self.next_row = self.next_row.saturating_add(1);

        let block_row = y / self.factor;
        if block_row >= self.out_height {
            return;
        }

        if self.nearest {
            if y % self.factor == 0 {
                for ox in 0..self.out_width {
                    let (start, _) = self.column_span(ox);
                    let pixel = self.pixel_at(row, start);
                    self.pixels.extend_from_slice(&pixel);
                }
            }
            return;
        }

        for ox in 0..self.out_width {
            let (start, end) = self.column_span(ox);
            for x in start..end {
                let pixel = self.pixel_at(row, x);
                let acc = &mut self.sums[ox as usize * 4..ox as usize * 4 + 4];
                for (sum, value) in acc.iter_mut().zip(pixel) {
                    *sum += u64::from(value);
                }
            }
        }

        let block_start = block_row * self.factor;
        let block_end = (block_row + 1).saturating_mul(self.factor).min(self.src_height);
        if y + 1 == block_end {
            self.flush_block(u64::from(block_end - block_start));
        }
    }

    fn flush_block(&mut self, rows: u64) {
        for ox in 0..self.out_width {
            let (start, end) = self.column_span(ox);
            let count = (rows * u64::from(end - start)).max(1);
            let acc = &mut self.sums[ox as usize * 4..ox as usize * 4 + 4];
            for sum in acc.iter_mut() {
                self.pixels.push((*sum / count) as u8);
                *sum = 0;
            }
        }
    }

    fn finish(self) -> Result<RgbaImage, ImageError> {
        RgbaImage::from_raw(self.out_width, self.out_height, self.pixels)
            .ok_or_else(|| ImageError::Decode("PNG 行数据不完整".to_string()))
    }
}

fn jpeg_to_rgba(raw: &[u8], format: PixelFormat, width: u32, height: u32) -> Result<RgbaImage, ImageError> {
    let rgba: Vec<u8> = match format {
        PixelFormat::L8 => raw.iter().flat_map(|&l| [l, l, l, 255]).collect(),
        // 16 位灰度为大端序，取高字节
        PixelFormat::L16 => raw.chunks_exact(2).flat_map(|p| [p[0], p[0], p[0], 255]).collect(),
        PixelFormat::RGB24 => raw.chunks_exact(3).flat_map(|p| [p[0], p[1], p[2], 255]).collect(),
        // 解码器输出的是反相 CMYK
        PixelFormat::CMYK32 => raw
            .chunks_exact(4)
            .flat_map(|p| {
                let k = u16::from(p[3]);
                let channel = |c: u8| (u16::from(c) * k / 255) as u8;
                [channel(p[0]), channel(p[1]), channel(p[2]), 255]
            })
            .collect(),
    };

    RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| ImageError::Decode("JPEG 输出缓冲长度异常".to_string()))
}

fn map_jpeg_error(err: jpeg_decoder::Error) -> ImageError {
    match err {
        jpeg_decoder::Error::Unsupported(feature) => {
            ImageError::InvalidFormat(format!("不支持的 JPEG 特性：{:?}", feature))
        }
        other => ImageError::Decode(format!("JPEG 解码失败：{}", other)),
    }
}

fn map_png_error(err: png::DecodingError) -> ImageError {
    match err {
        png::DecodingError::LimitsExceeded => ImageError::ResourceLimit("PNG 解码内存超出上限".to_string()),
        other => ImageError::Decode(format!("PNG 解码失败：{}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampler(width: u32, height: u32, factor: u32, nearest: bool) -> RowSampler {
        let mut f = DownsampleFactor::ONE;
        while f.get() < factor {
            f = f.doubled();
        }
        RowSampler::new(ProbedDimensions::new(width, height), f, 4, nearest)
    }

    fn row(values: &[u8]) -> Vec<u8> {
        values.iter().flat_map(|&v| [v, v, v, 255]).collect()
    }

    #[test]
    fn box_average_covers_each_block() {
        let mut s = sampler(4, 2, 2, false);
        s.push_row(&row(&[0, 10, 100, 200]));
        s.push_row(&row(&[20, 30, 100, 100]));

        let image = s.finish().expect("complete image");

        // (0+10+20+30)/4 = 15，(100+200+100+100)/4 = 125
        assert_eq!(image.dimensions(), (2, 1));
        assert_eq!(image.get_pixel(0, 0).0, [15, 15, 15, 255]);
        assert_eq!(image.get_pixel(1, 0).0, [125, 125, 125, 255]);
    }

    #[test]
    fn nearest_takes_block_origin() {
        let mut s = sampler(4, 4, 2, true);
        for y in 0..4u8 {
            s.push_row(&row(&[y * 10, y * 10 + 1, y * 10 + 2, y * 10 + 3]));
        }

        let image = s.finish().expect("complete image");

        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.get_pixel(1, 0).0[0], 2);
        assert_eq!(image.get_pixel(0, 1).0[0], 20);
    }

    #[test]
    fn trailing_rows_and_columns_are_dropped() {
        let mut s = sampler(5, 3, 2, false);
        for _ in 0..3 {
            s.push_row(&row(&[50, 50, 50, 50, 250]));
        }

        let image = s.finish().expect("complete image");

        assert_eq!(image.dimensions(), (2, 1));
        assert_eq!(image.get_pixel(1, 0).0, [50, 50, 50, 255]);
    }

    #[test]
    fn axis_smaller_than_factor_is_one_pixel() {
        let mut s = sampler(8, 2, 4, false);
        s.push_row(&row(&[0, 0, 0, 0, 40, 40, 40, 40]));
        s.push_row(&row(&[0, 0, 0, 0, 40, 40, 40, 40]));

        let image = s.finish().expect("complete image");

        assert_eq!(image.dimensions(), (2, 1));
        assert_eq!(image.get_pixel(1, 0).0, [40, 40, 40, 255]);
    }

    #[test]
    fn gray_alpha_rows_expand_to_rgba() {
        let mut s = RowSampler::new(ProbedDimensions::new(1, 1), DownsampleFactor::ONE, 2, true);
        s.push_row(&[90, 128]);

        let image = s.finish().expect("complete image");

        assert_eq!(image.get_pixel(0, 0).0, [90, 90, 90, 128]);
    }

    #[test]
    fn missing_rows_are_reported() {
        let mut s = sampler(4, 4, 2, false);
        s.push_row(&row(&[1, 2, 3, 4]));

        assert!(matches!(s.finish(), Err(ImageError::Decode(_))));
    }

    #[test]
    fn png_limit_error_maps_to_resource_limit() {
        assert!(matches!(
            map_png_error(png::DecodingError::LimitsExceeded),
            ImageError::ResourceLimit(_)
        ));
    }
}
