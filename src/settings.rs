//! 应用设置
//!
//! 设置以 JSON 文件提供，路径由命令行第一个参数指定；未指定时使用默认值。
//! 所有字段都有默认值，文件里只需写要覆盖的部分。

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::AppError;
use crate::image_loader::{LoaderConfig, ResampleProfile, TargetSize};

/// 设置文件内容。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// 显示区域宽度（像素）
    pub target_width: u32,
    /// 显示区域高度（像素）
    pub target_height: u32,
    /// 重采样档位：quality / balanced / speed
    pub resample_profile: String,
    pub max_file_size: u64,
    pub max_decoded_pixels: u64,
    pub max_decoded_bytes: u64,
    pub validate_signature: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        let config = LoaderConfig::default();
        Self {
            target_width: config.target_size.width(),
            target_height: config.target_size.height(),
            resample_profile: config.infer_resample_profile().as_str().to_string(),
            max_file_size: config.max_file_size,
            max_decoded_pixels: config.max_decoded_pixels,
            max_decoded_bytes: config.max_decoded_bytes,
            validate_signature: config.validate_signature,
        }
    }
}

impl AppSettings {
    /// 转换为加载器配置，并校验目标尺寸与档位。
    pub fn to_loader_config(&self) -> Result<LoaderConfig, AppError> {
        let mut config = LoaderConfig::with_target(TargetSize::new(self.target_width, self.target_height)?);
        config.apply_resample_profile(ResampleProfile::parse(&self.resample_profile)?);
        config.max_file_size = self.max_file_size;
        config.max_decoded_pixels = self.max_decoded_pixels;
        config.max_decoded_bytes = self.max_decoded_bytes;
        config.validate_signature = self.validate_signature;
        Ok(config)
    }
}

/// 读取设置文件；`path` 为 `None` 时返回默认设置。
pub fn load_settings(path: Option<&Path>) -> Result<AppSettings, AppError> {
    let Some(path) = path else {
        return Ok(AppSettings::default());
    };

    let content = fs::read_to_string(path)
        .map_err(|e| AppError::Settings(format!("读取设置文件失败 {}: {}", path.display(), e)))?;

    serde_json::from_str::<AppSettings>(&content)
        .map_err(|e| AppError::Settings(format!("解析设置文件失败: {}", e)))
}
