//! # 内容解析模块
//!
//! ## 设计思路
//!
//! 把“定位符 → 可读字节流”抽象为 `ContentResolver`，加载器只依赖该 trait。
//! 每次 `open` 返回一个独占的流值，作用域结束即释放，探测与解码各自打开一次。
//!
//! ## 实现思路
//!
//! `LocalContentResolver` 支持三种定位符：
//! - `file://<path>`：去掉前缀后按本地路径处理
//! - `data:image/<kind>;base64,<payload>`：解码前先按长度估算体积
//! - 其他字符串：视为本地路径
//!
//! 本地文件先做存在性与 metadata 体积校验，再打开带缓冲的句柄；
//! 签名校验只 `fill_buf` 窥探头部字节，不消费流。

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Seek};
use std::path::Path;

use base64::{Engine as _, engine::general_purpose};

use super::{ImageError, ImageLocator, LoaderConfig};

const FILE_SCHEME: &str = "file://";
const DATA_URI_PREFIX: &str = "data:image/";
const BASE64_MARKER: &str = ";base64,";

/// 可供图片解码器读取的字节流。
pub trait ImageStream: BufRead + Seek {}

impl<T: BufRead + Seek> ImageStream for T {}

/// 定位符到字节流的解析器。
///
/// 实现方必须保证每次调用返回一个全新的流，调用方丢弃该值即视为关闭。
pub trait ContentResolver {
    type Stream: BufRead + Seek + 'static;

    fn open(&self, locator: &ImageLocator) -> Result<Self::Stream, ImageError>;
}

/// 本地文件与 data URI 解析器。
#[derive(Debug, Clone)]
pub struct LocalContentResolver {
    max_file_size: u64,
    validate_signature: bool,
}

impl LocalContentResolver {
    pub fn new(config: &LoaderConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
            validate_signature: config.validate_signature,
        }
    }

    fn open_file(&self, path: &str) -> Result<Box<dyn ImageStream>, ImageError> {
        log::debug!("📁 打开本地图片 - 路径: {}", path);

        let file_path = Path::new(path);
        if !file_path.exists() {
            return Err(ImageError::StreamOpen(format!("文件不存在：{}", path)));
        }

        let metadata = std::fs::metadata(file_path)
            .map_err(|e| ImageError::StreamOpen(format!("无法读取文件信息：{}", e)))?;

        if !metadata.is_file() {
            return Err(ImageError::StreamOpen(format!("不是普通文件：{}", path)));
        }

        if metadata.len() > self.max_file_size {
            return Err(ImageError::ResourceLimit(format!(
                "文件过大：{:.2} MB（限制：{:.2} MB）",
                metadata.len() as f64 / 1024.0 / 1024.0,
                self.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }

        let file = File::open(file_path)
            .map_err(|e| ImageError::StreamOpen(format!("无法打开图片文件：{}", e)))?;
        let mut reader = BufReader::new(file);

        if self.validate_signature {
            let head = reader
                .fill_buf()
                .map_err(|e| ImageError::StreamOpen(format!("无法读取文件头：{}", e)))?;
            validate_image_signature(head)?;
        }

        Ok(Box::new(reader))
    }

    fn open_data_uri(&self, data: &str) -> Result<Box<dyn ImageStream>, ImageError> {
        let bytes = parse_base64_with_limit(data, self.max_file_size)?;

        if self.validate_signature {
            validate_image_signature(&bytes)?;
        }

        log::debug!("📝 data URI 解码完成 - {} bytes", bytes.len());
        Ok(Box::new(Cursor::new(bytes)))
    }
}

impl ContentResolver for LocalContentResolver {
    type Stream = Box<dyn ImageStream>;

    fn open(&self, locator: &ImageLocator) -> Result<Self::Stream, ImageError> {
        let raw = locator.as_str().trim();
        if raw.is_empty() {
            return Err(ImageError::StreamOpen("定位符为空".to_string()));
        }

        if raw.starts_with("data:") {
            return self.open_data_uri(raw);
        }

        let path = raw.strip_prefix(FILE_SCHEME).unwrap_or(raw);
        self.open_file(path)
    }
}

/// 解析 `data:image/...;base64,` 定位符，在解码前按编码长度估算体积。
fn parse_base64_with_limit(data: &str, max_bytes: u64) -> Result<Vec<u8>, ImageError> {
    if !data.starts_with(DATA_URI_PREFIX) {
        return Err(ImageError::StreamOpen("data URI 不是图片类型".to_string()));
    }

    let marker = data
        .find(BASE64_MARKER)
        .ok_or_else(|| ImageError::StreamOpen("缺少 base64 标记".to_string()))?;
    let payload = data[marker + BASE64_MARKER.len()..].trim();

    let estimated = estimate_decoded_upper_bound(payload)?;
    if estimated > max_bytes {
        return Err(ImageError::ResourceLimit(format!(
            "data URI 过大：约 {:.2} MB（限制：{:.2} MB）",
            estimated as f64 / 1024.0 / 1024.0,
            max_bytes as f64 / 1024.0 / 1024.0
        )));
    }

    general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| ImageError::Decode(format!("Base64 解码失败：{}", e)))
}

/// base64 解码体积上界：按 4 字符一组向上取整。
fn estimate_decoded_upper_bound(payload: &str) -> Result<u64, ImageError> {
    let groups = (payload.len() as u64)
        .checked_add(3)
        .ok_or_else(|| ImageError::ResourceLimit("base64 输入长度溢出".to_string()))?
        / 4;

    groups
        .checked_mul(3)
        .ok_or_else(|| ImageError::ResourceLimit("base64 解码体积估算溢出".to_string()))
}

/// 按魔数判断内容是否为图片。
fn validate_image_signature(bytes: &[u8]) -> Result<(), ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::InvalidFormat("图片内容为空".to_string()));
    }

    let kind = infer::get(bytes)
        .ok_or_else(|| ImageError::InvalidFormat("无法识别图片类型".to_string()))?;

    if kind.matcher_type() != infer::MatcherType::Image {
        return Err(ImageError::InvalidFormat(format!(
            "文件签名不是图片类型：{}",
            kind.mime_type()
        )));
    }

    Ok(())
}
