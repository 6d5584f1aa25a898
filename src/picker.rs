//! 选图器模块
//!
//! 选图器是加载核心之外的协作方：用户完成选择时给出不透明定位符，取消时给出取消信号。
//!
//! # 设计思路
//!
//! - 取消不是错误，调用方据此直接结束本次操作，不调用加载核心。
//! - 以 trait 隔离具体交互方式，终端、测试或其他前端各自实现。
//!
//! # 实现思路
//!
//! `LinePicker` 每次选择读取一行：空行视为取消；输入结束视为取消并标记为已关闭。

use std::io::BufRead;

use crate::image_loader::ImageLocator;

/// 一次选择的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    /// 用户选中了一张图片。
    Selected(ImageLocator),
    /// 用户取消了选择。
    Cancelled,
}

/// 图片选择器。
pub trait ImagePicker {
    fn pick(&mut self) -> PickOutcome;
}

/// 从行输入读取定位符的选择器。
pub struct LinePicker<R: BufRead> {
    input: R,
    closed: bool,
}

impl<R: BufRead> LinePicker<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            closed: false,
        }
    }

    /// 输入已结束（EOF 或读取失败），不会再产生选择。
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<R: BufRead> ImagePicker for LinePicker<R> {
    fn pick(&mut self) -> PickOutcome {
        if self.closed {
            return PickOutcome::Cancelled;
        }

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => {
                self.closed = true;
                PickOutcome::Cancelled
            }
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    PickOutcome::Cancelled
                } else {
                    PickOutcome::Selected(ImageLocator::new(trimmed))
                }
            }
            Err(err) => {
                log::warn!("读取选择输入失败，停止选图: {}", err);
                self.closed = true;
                PickOutcome::Cancelled
            }
        }
    }
}
