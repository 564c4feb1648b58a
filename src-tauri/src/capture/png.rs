use std::io::Cursor;

use base64::Engine;
use image::{ImageFormat, RgbaImage};

use crate::error::AccessError;

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// RGBA 像素快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub width: u32,
    pub height: u32,
    /// 行优先的 RGBA8 像素
    pub rgba: Vec<u8>,
}

impl Snapshot {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, AccessError> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 {
            return Err(AccessError::InvalidImage("快照尺寸为 0".to_string()));
        }
        if rgba.len() != expected {
            return Err(AccessError::InvalidImage(format!(
                "像素长度 {} 与尺寸 {}x{} 不符",
                rgba.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// 编码为 PNG
    pub fn to_png(&self) -> Result<Vec<u8>, AccessError> {
        let image = RgbaImage::from_raw(self.width, self.height, self.rgba.clone())
            .ok_or_else(|| AccessError::InvalidImage("像素缓冲区尺寸不符".to_string()))?;
        let mut bytes = Cursor::new(Vec::new());
        image
            .write_to(&mut bytes, ImageFormat::Png)
            .map_err(|e| AccessError::InvalidImage(format!("PNG 编码失败: {}", e)))?;
        Ok(bytes.into_inner())
    }
}

/// 解码 PNG 为快照
pub fn decode_png(bytes: &[u8]) -> Result<Snapshot, AccessError> {
    let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map_err(|e| AccessError::InvalidImage(format!("PNG 解码失败: {}", e)))?
        .to_rgba8();
    Ok(Snapshot {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

/// 从画布导出的 data URL 中取出 PNG 字节并校验
///
/// 也接受不带前缀的 base64 字符串。
pub fn png_from_data_url(data_url: &str) -> Result<Vec<u8>, AccessError> {
    let encoded = data_url
        .trim()
        .strip_prefix(PNG_DATA_URL_PREFIX)
        .unwrap_or(data_url.trim());
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| AccessError::InvalidImage(format!("base64 解码失败: {}", e)))?;
    let snapshot = decode_png(&bytes)?;
    tracing::debug!(
        "[Capture] 收到 {}x{} 快照 ({} 字节)",
        snapshot.width,
        snapshot.height,
        bytes.len()
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_keeps_pixels() {
        let snapshot = Snapshot::new(2, 1, vec![255, 0, 0, 255, 0, 128, 255, 64]).unwrap();
        let png = snapshot.to_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");
        assert_eq!(decode_png(&png).unwrap(), snapshot);
    }

    #[test]
    fn test_snapshot_size_mismatch() {
        let err = Snapshot::new(2, 2, vec![0; 4]).unwrap_err();
        assert_eq!(err.kind(), "InvalidImage");
        assert!(Snapshot::new(0, 1, Vec::new()).is_err());
    }

    #[test]
    fn test_png_from_data_url() {
        let png = Snapshot::new(1, 1, vec![10, 20, 30, 255])
            .unwrap()
            .to_png()
            .unwrap();
        let encoded = base64::engine::general_purpose::STANDARD.encode(&png);

        let with_prefix = format!("{}{}", PNG_DATA_URL_PREFIX, encoded);
        assert_eq!(png_from_data_url(&with_prefix).unwrap(), png);
        assert_eq!(png_from_data_url(&encoded).unwrap(), png);
    }

    #[test]
    fn test_png_from_data_url_rejects_garbage() {
        assert!(png_from_data_url("data:image/png;base64,!!!").is_err());
        let not_png = base64::engine::general_purpose::STANDARD.encode(b"hello");
        let err = png_from_data_url(&not_png).unwrap_err();
        assert_eq!(err.kind(), "InvalidImage");
    }
}
