//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入”和“流水线中间结果”解耦：
//! - `ImageLocator` 表示选图器给出的不透明引用
//! - `ProbedDimensions` 表示仅读取头信息得到的原始尺寸
//! - `DownsampleFactor` 表示本次加载的降采样倍率
//! - `DecodedImage` 表示可直接显示的 RGBA 像素数据

use std::fmt;

use image::RgbaImage;

/// 用户所选图片的不透明引用（类 URI 字符串）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLocator(String);

impl ImageLocator {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageLocator {
    /// 日志中只输出前缀，避免把整段 data URI 打进日志。
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MAX_LOG_CHARS: usize = 96;
        if self.0.chars().count() > MAX_LOG_CHARS {
            let head: String = self.0.chars().take(MAX_LOG_CHARS).collect();
            write!(f, "{}…", head)
        } else {
            f.write_str(&self.0)
        }
    }
}

/// 图片的原始像素尺寸，仅由头信息得出。
///
/// `(0, 0)` 表示探测失败时的“未知尺寸”。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProbedDimensions {
    pub width: u32,
    pub height: u32,
}

impl ProbedDimensions {
    pub const UNKNOWN: Self = Self {
        width: 0,
        height: 0,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_unknown(self) -> bool {
        self == Self::UNKNOWN
    }
}

/// 降采样倍率，恒为 2 的幂且不小于 1。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DownsampleFactor(u32);

impl DownsampleFactor {
    pub const ONE: Self = Self(1);

    pub fn get(self) -> u32 {
        self.0
    }

    /// 倍率翻倍。只由倍率计算循环调用，循环条件保证不会越过 `u32` 上限。
    pub(crate) fn doubled(self) -> Self {
        Self(self.0.saturating_mul(2))
    }

    /// 按倍率缩小单边长度，结果至少为 1 像素。
    pub fn apply(self, length: u32) -> u32 {
        (length / self.0).max(1)
    }
}

impl fmt::Display for DownsampleFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "1/{}", self.0)
    }
}

/// 解码阶段输出：按倍率缩小后的 RGBA 图像。
///
/// 返回后由调用方独占持有。
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pixels: RgbaImage,
    natural: ProbedDimensions,
    factor: DownsampleFactor,
}

impl DecodedImage {
    pub(crate) fn new(pixels: RgbaImage, natural: ProbedDimensions, factor: DownsampleFactor) -> Self {
        Self {
            pixels,
            natural,
            factor,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// 解码器读到的原始尺寸。
    pub fn natural(&self) -> ProbedDimensions {
        self.natural
    }

    pub fn factor(&self) -> DownsampleFactor {
        self.factor
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_dimensions_are_zero_by_zero() {
        assert!(ProbedDimensions::UNKNOWN.is_unknown());
        assert!(ProbedDimensions::default().is_unknown());
        assert!(!ProbedDimensions::new(0, 1).is_unknown());
    }

    #[test]
    fn factor_apply_floors_and_clamps() {
        let four = DownsampleFactor::ONE.doubled().doubled();

        assert_eq!(four.apply(4000), 1000);
        assert_eq!(four.apply(3001), 750);
        assert_eq!(four.apply(3), 1);
        assert_eq!(four.to_string(), "1/4");
    }
}
