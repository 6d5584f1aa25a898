//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `LoaderConfig`，保证加载行为可观测、可测试。
//! 其中重采样档位（quality / balanced / speed）作为高层语义，映射到缩小阶段使用的滤镜。
//!
//! ## 实现思路
//!
//! - `TargetSize` 在构造时拒绝 0，后续计算无需再判空。
//! - `Default` 提供可直接使用的配置（目标 400x400，最近邻缩小）。
//! - `ResampleProfile` 负责档位字符串解析与反向输出。
//! - `apply_resample_profile` / `infer_resample_profile` 负责档位与滤镜的双向映射。

use image::imageops::FilterType;

use super::ImageError;

/// 显示区域的最大尺寸（像素）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSize {
    width: u32,
    height: u32,
}

impl TargetSize {
    /// 创建目标尺寸，任一边为 0 时返回错误。
    ///
    /// # 示例
    /// ```rust
    /// use gallery_viewer::image_loader::TargetSize;
    ///
    /// let target = TargetSize::new(400, 300)?;
    /// assert_eq!(target.width(), 400);
    /// assert!(TargetSize::new(0, 300).is_err());
    /// # Ok::<(), gallery_viewer::image_loader::ImageError>(())
    /// ```
    pub fn new(width: u32, height: u32) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidFormat(format!(
                "目标尺寸必须为正整数：{}x{}",
                width, height
            )));
        }

        Ok(Self { width, height })
    }

    pub fn width(self) -> u32 {
        self.width
    }

    pub fn height(self) -> u32 {
        self.height
    }
}

/// 图片加载配置。
///
/// 字段覆盖了打开流、解码上限与缩小滤镜三个阶段。
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// 显示区域尺寸，决定降采样倍率。
    pub target_size: TargetSize,
    /// 打开流时允许的最大文件体积（字节）。
    pub max_file_size: u64,
    /// 单次解码允许分配的像素上限（`width * height`）。
    ///
    /// JPEG/PNG 按缩小后的尺寸校验，其他格式按原始尺寸校验。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的内存上限（字节），透传给解码器的分配限制。
    pub max_decoded_bytes: u64,
    /// 按倍率缩小时使用的滤镜。
    pub resize_filter: FilterType,
    /// 打开流后是否按文件签名校验是否为图片。
    pub validate_signature: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            target_size: TargetSize {
                width: 400,
                height: 400,
            },
            max_file_size: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            resize_filter: FilterType::Nearest,
            validate_signature: true,
        }
    }
}

/// 缩小阶段的重采样档位。
///
/// - `Quality`：平滑缩小，耗时最高
/// - `Balanced`：质量与速度平衡
/// - `Speed`：按倍率直接抽样像素（默认）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResampleProfile {
    Quality,
    Balanced,
    Speed,
}

impl ResampleProfile {
    /// 从外部字符串解析档位。
    ///
    /// # 示例
    /// ```rust
    /// use gallery_viewer::image_loader::ResampleProfile;
    ///
    /// let p = ResampleProfile::parse(" Balanced ")?;
    /// assert_eq!(p.as_str(), "balanced");
    /// # Ok::<(), gallery_viewer::image_loader::ImageError>(())
    /// ```
    pub fn parse(profile: &str) -> Result<Self, ImageError> {
        match profile.trim().to_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            "speed" => Ok(Self::Speed),
            other => Err(ImageError::InvalidFormat(format!(
                "未知重采样档位：{}（可选：quality / balanced / speed）",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Balanced => "balanced",
            Self::Speed => "speed",
        }
    }
}

impl LoaderConfig {
    /// 使用指定目标尺寸创建配置，其余字段取默认值。
    pub fn with_target(target_size: TargetSize) -> Self {
        Self {
            target_size,
            ..Self::default()
        }
    }

    /// 基于当前滤镜反推档位。
    pub fn infer_resample_profile(&self) -> ResampleProfile {
        match self.resize_filter {
            FilterType::Nearest => ResampleProfile::Speed,
            FilterType::Triangle => ResampleProfile::Balanced,
            _ => ResampleProfile::Quality,
        }
    }

    /// 应用指定档位到实际滤镜。
    pub fn apply_resample_profile(&mut self, profile: ResampleProfile) {
        self.resize_filter = match profile {
            ResampleProfile::Quality => FilterType::CatmullRom,
            ResampleProfile::Balanced => FilterType::Triangle,
            ResampleProfile::Speed => FilterType::Nearest,
        };
    }
}
