//! 单元测试共用的内存解析器与图片构造函数。

use std::cell::Cell;
use std::collections::HashMap;
use std::io::{self, BufRead, Cursor, Read, Seek, SeekFrom};
use std::rc::Rc;

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};

use super::{ContentResolver, ImageError, ImageLocator};

pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encoded_bytes(width, height, ImageFormat::Png)
}

/// 渐变图编码为指定格式；JPEG/BMP 编码器不接受透明通道，统一转 RGB。
pub(crate) fn encoded_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(ImageBuffer::from_fn(width, height, |x, y| {
        let r = (x % 255) as u8;
        let g = (y % 255) as u8;
        let b = ((x + y) % 255) as u8;
        Rgba([r, g, b, 255])
    }));
    let img = match format {
        ImageFormat::Png => img,
        _ => DynamicImage::ImageRgb8(img.into_rgb8()),
    };

    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, format)
        .expect("failed to encode test image");
    cursor.into_inner()
}

/// 按名称返回内存字节的解析器，统计打开与释放次数。
#[derive(Default)]
pub(crate) struct MemoryResolver {
    images: HashMap<String, Vec<u8>>,
    opened: Rc<Cell<usize>>,
    released: Rc<Cell<usize>>,
}

impl MemoryResolver {
    pub(crate) fn with_image(name: &str, bytes: Vec<u8>) -> Self {
        let mut resolver = Self::default();
        resolver.images.insert(name.to_string(), bytes);
        resolver
    }

    pub(crate) fn opened(&self) -> usize {
        self.opened.get()
    }

    pub(crate) fn released(&self) -> usize {
        self.released.get()
    }
}

impl ContentResolver for MemoryResolver {
    type Stream = CountingStream;

    fn open(&self, locator: &ImageLocator) -> Result<Self::Stream, ImageError> {
        let bytes = self
            .images
            .get(locator.as_str())
            .cloned()
            .ok_or_else(|| ImageError::StreamOpen(format!("未知定位符：{}", locator)))?;

        self.opened.set(self.opened.get() + 1);
        Ok(CountingStream {
            inner: Cursor::new(bytes),
            released: Rc::clone(&self.released),
        })
    }
}

pub(crate) struct CountingStream {
    inner: Cursor<Vec<u8>>,
    released: Rc<Cell<usize>>,
}

impl Drop for CountingStream {
    fn drop(&mut self) {
        self.released.set(self.released.get() + 1);
    }
}

impl Read for CountingStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl BufRead for CountingStream {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt)
    }
}

impl Seek for CountingStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}
