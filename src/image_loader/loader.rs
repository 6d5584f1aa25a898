//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `BoundedImageLoader` 只负责流程编排，不接触显示层。处理链路固定为：
//! 1. 打开流并探测原始尺寸（失败时按未知尺寸 `(0, 0)` 继续）
//! 2. 计算降采样倍率
//! 3. 重新打开流并按倍率解码
//!
//! 状态流转：
//!
//! ```text
//! Idle → StreamOpen → (DimensionsProbed | ProbeFailed) → FactorComputed
//!      → StreamReopen → (DecodeSucceeded | DecodeFailed) → Idle
//! ```
//!
//! ## 实现思路
//!
//! - 配置在构造时固定，单次加载之间没有共享的可变状态。
//! - `try_load` 返回显式 `Result`；`load` 在边界处记录日志并折叠为 `Option`。
//! - 记录 `probe/decode/total` 阶段耗时，便于性能诊断。

use std::fmt;
use std::time::Instant;

use super::{
    ContentResolver, DecodedImage, ImageError, ImageLocator, LoaderConfig, LocalContentResolver,
    ProbedDimensions, calculate_downsample_factor,
};

/// 单次加载的状态节点。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    Idle,
    StreamOpen,
    DimensionsProbed,
    ProbeFailed,
    FactorComputed,
    StreamReopen,
    DecodeSucceeded,
    DecodeFailed,
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "空闲",
            Self::StreamOpen => "打开探测流",
            Self::DimensionsProbed => "尺寸已探测",
            Self::ProbeFailed => "尺寸探测失败",
            Self::FactorComputed => "倍率已计算",
            Self::StreamReopen => "重新打开解码流",
            Self::DecodeSucceeded => "解码成功",
            Self::DecodeFailed => "解码失败",
        };
        f.write_str(name)
    }
}

/// 受限尺寸图片加载器。
///
/// 持有固定配置与内容解析器，每次加载相互独立。
pub struct BoundedImageLoader<R: ContentResolver = LocalContentResolver> {
    pub(super) config: LoaderConfig,
    pub(super) resolver: R,
}

impl BoundedImageLoader<LocalContentResolver> {
    /// 使用本地解析器创建加载器。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use gallery_viewer::image_loader::{BoundedImageLoader, ImageLocator, LoaderConfig};
    ///
    /// let loader = BoundedImageLoader::new(LoaderConfig::default());
    /// if let Some(image) = loader.load(&ImageLocator::new("/tmp/photo.jpg")) {
    ///     println!("{}x{}", image.width(), image.height());
    /// }
    /// ```
    pub fn new(config: LoaderConfig) -> Self {
        let resolver = LocalContentResolver::new(&config);
        Self { config, resolver }
    }
}

impl<R: ContentResolver> BoundedImageLoader<R> {
    pub fn with_resolver(config: LoaderConfig, resolver: R) -> Self {
        Self { config, resolver }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// 加载主入口：失败记录日志并返回 `None`，不向调用方传播错误。
    pub fn load(&self, locator: &ImageLocator) -> Option<DecodedImage> {
        match self.try_load(locator) {
            Ok(image) => Some(image),
            Err(err) => {
                log::error!("❌ 图片加载失败 - 阶段: {} 定位符: {} 原因: {}", LoadStage::DecodeFailed, locator, err);
                None
            }
        }
    }

    pub fn try_load(&self, locator: &ImageLocator) -> Result<DecodedImage, ImageError> {
        self.try_load_with_hooks(locator, |_| {})
    }

    /// 执行完整加载流程，并在每次状态变化时回调 `on_stage`。
    ///
    /// 探测失败只记录警告，按未知尺寸继续；解码失败以 `Err` 返回。
    pub fn try_load_with_hooks<S>(
        &self,
        locator: &ImageLocator,
        mut on_stage: S,
    ) -> Result<DecodedImage, ImageError>
    where
        S: FnMut(LoadStage),
    {
        let mut enter = |stage: LoadStage| {
            log::debug!("🔁 加载阶段：{}", stage);
            on_stage(stage);
        };

        let total_start = Instant::now();
        enter(LoadStage::Idle);

        enter(LoadStage::StreamOpen);
        let probe_start = Instant::now();
        let natural = match self.probe_dimensions(locator) {
            Ok(dims) => {
                enter(LoadStage::DimensionsProbed);
                dims
            }
            Err(err) => {
                log::warn!(
                    "⚠️ 尺寸探测失败，按未知尺寸继续 - 阶段: {} 定位符: {} 原因: {}",
                    LoadStage::ProbeFailed,
                    locator,
                    err
                );
                enter(LoadStage::ProbeFailed);
                ProbedDimensions::UNKNOWN
            }
        };
        let probe_elapsed = probe_start.elapsed();

        let factor = calculate_downsample_factor(natural, self.config.target_size);
        enter(LoadStage::FactorComputed);
        if natural.is_unknown() {
            log::debug!("📐 原始尺寸未知，按倍率 {} 直接解码", factor);
        } else {
            log::debug!(
                "📐 原始尺寸 {}x{} 目标 {}x{} → 倍率 {}",
                natural.width,
                natural.height,
                self.config.target_size.width(),
                self.config.target_size.height(),
                factor
            );
        }

        enter(LoadStage::StreamReopen);
        let decode_start = Instant::now();
        let result = self.decode_bounded(locator, factor);
        let decode_elapsed = decode_start.elapsed();

        match &result {
            Ok(_) => enter(LoadStage::DecodeSucceeded),
            Err(_) => enter(LoadStage::DecodeFailed),
        }
        enter(LoadStage::Idle);

        if result.is_ok() {
            log::info!(
                "✅ 图片加载完成 - probe={}ms decode={}ms total={}ms",
                probe_elapsed.as_millis(),
                decode_elapsed.as_millis(),
                total_start.elapsed().as_millis()
            );
        }

        result
    }
}
