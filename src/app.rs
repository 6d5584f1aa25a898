//! 应用编排模块
//!
//! 把“选图按钮”这一个用户动作串起来：选图 → 加载 → 交给显示槽。
//!
//! # 设计思路
//!
//! - 同一时刻只处理一次选择，调用同步完成并返回单一结果。
//! - 取消选择时不调用加载核心，不写日志，不改变显示。
//! - 加载失败只影响本次操作，应用随时可进行下一次选择。

use crate::display::ImageView;
use crate::image_loader::{BoundedImageLoader, ContentResolver, LocalContentResolver};
use crate::picker::{ImagePicker, PickOutcome};

/// 一次选图操作的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// 用户取消，未调用加载核心。
    Cancelled,
    /// 新图片已替换显示内容。
    Displayed,
    /// 加载失败，显示内容保持不变。
    Unchanged,
}

/// 单屏看图应用：一个选图动作 + 一个显示区域。
pub struct GalleryApp<P: ImagePicker, R: ContentResolver = LocalContentResolver> {
    picker: P,
    loader: BoundedImageLoader<R>,
    view: ImageView,
}

impl<P: ImagePicker, R: ContentResolver> GalleryApp<P, R> {
    pub fn new(picker: P, loader: BoundedImageLoader<R>) -> Self {
        Self {
            picker,
            loader,
            view: ImageView::new(),
        }
    }

    /// 响应“选择图片”动作。
    pub fn on_select_image(&mut self) -> SelectionOutcome {
        let locator = match self.picker.pick() {
            PickOutcome::Selected(locator) => locator,
            PickOutcome::Cancelled => return SelectionOutcome::Cancelled,
        };

        log::info!("🖼️ 已选择图片: {}", locator);

        if self.view.show(self.loader.load(&locator)) {
            SelectionOutcome::Displayed
        } else {
            SelectionOutcome::Unchanged
        }
    }

    pub fn picker(&self) -> &P {
        &self.picker
    }

    pub fn loader(&self) -> &BoundedImageLoader<R> {
        &self.loader
    }

    pub fn view(&self) -> &ImageView {
        &self.view
    }
}
