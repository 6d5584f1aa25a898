//! # 受限尺寸图片加载模块（image_loader）
//!
//! ## 设计思路
//!
//! 该模块将“定位符解析 → 尺寸探测 → 倍率计算 → 受限解码”按职责拆分为多个子模块，
//! 避免单文件膨胀与耦合。
//!
//! - `resolver`：定位符到字节流（本地文件 / data URI），含体积与签名校验
//! - `probe`：只读图片头获取原始尺寸
//! - `sample`：纯函数计算 2 的幂降采样倍率
//! - `decoder`：按倍率解码并缩小，含像素与内存上限
//! - `scaled`：JPEG/PNG 在解码途中缩小，不分配原始尺寸缓冲
//! - `loader`：编排整条流程 + 阶段耗时日志
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 调用链
//!
//! ```text
//! GalleryApp::on_select_image
//!    ↓
//! loader.rs（统一编排，失败折叠为 None）
//!    ├─ probe.rs（探测流，失败按 (0, 0) 继续）
//!    ├─ sample.rs（计算倍率）
//!    └─ decoder.rs（解码流 + 缩小）
//!         └─ scaled.rs（JPEG DCT 缩放 / PNG 逐行归并）
//!    ↓
//! Option<DecodedImage> 交给 ImageView
//! ```
//!
//! 每次加载打开两条独立的流，均在各自阶段结束时释放。

mod config;
mod decoder;
mod error;
mod loader;
mod probe;
mod resolver;
mod sample;
mod scaled;
mod source;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{LoaderConfig, ResampleProfile, TargetSize};
pub use error::ImageError;
pub use loader::{BoundedImageLoader, LoadStage};
pub use resolver::{ContentResolver, ImageStream, LocalContentResolver};
pub use sample::calculate_downsample_factor;
pub use source::{DecodedImage, DownsampleFactor, ImageLocator, ProbedDimensions};
