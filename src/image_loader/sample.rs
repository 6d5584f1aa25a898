//! # 降采样倍率计算
//!
//! 纯函数：根据原始尺寸与显示区域尺寸计算 2 的幂倍率，无任何隐藏状态。
//!
//! # 实现思路
//!
//! - 两个方向都不超过目标时直接返回 1。
//! - 否则取原始尺寸的一半，只要两个方向的 `half / factor` 仍 `>=` 目标就继续翻倍。
//! - 全程整数（向下取整）除法；任一方向跌破目标即停止。

use super::{DownsampleFactor, ProbedDimensions, TargetSize};

/// 计算最小的 2 的幂降采样倍率。
///
/// 未知尺寸 `(0, 0)` 恒返回 1。
///
/// # 示例
/// ```rust
/// use gallery_viewer::image_loader::{calculate_downsample_factor, ProbedDimensions, TargetSize};
///
/// let target = TargetSize::new(400, 400)?;
/// let factor = calculate_downsample_factor(ProbedDimensions::new(4000, 3000), target);
/// assert_eq!(factor.get(), 4);
/// # Ok::<(), gallery_viewer::image_loader::ImageError>(())
/// ```
pub fn calculate_downsample_factor(natural: ProbedDimensions, target: TargetSize) -> DownsampleFactor {
    let mut factor = DownsampleFactor::ONE;

    if natural.height > target.height() || natural.width > target.width() {
        let half_height = natural.height / 2;
        let half_width = natural.width / 2;

        // target >= 1，half / factor 最终必然跌破目标
        while half_height / factor.get() >= target.height()
            && half_width / factor.get() >= target.width()
        {
            factor = factor.doubled();
        }
    }

    factor
}
