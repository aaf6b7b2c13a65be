//! OCR 입력 전처리.
//!
//! 빠른 인식 수준에서는 큰 프레임을 축소해 처리 시간을 줄인다.
//! 인식 결과 좌표를 프레임 좌표로 되돌리기 위한 배율을 함께 반환한다.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use sightline_core::config::RecognitionLevel;
use sightline_core::error::CoreError;
use sightline_core::models::frame::RawImage;
use tracing::debug;

/// 빠른 인식 시 최대 처리 너비
pub const FAST_MAX_WIDTH: u32 = 1920;

/// OCR에 넘길 이미지
#[derive(Debug)]
pub struct PreparedImage {
    pub image: RgbaImage,
    /// 처리 이미지 좌표 → 프레임 좌표 배율
    pub scale: f64,
}

/// 인식 수준에 맞게 프레임 준비
pub fn prepare(raw: &RawImage, level: RecognitionLevel) -> Result<PreparedImage, CoreError> {
    let image = RgbaImage::from_raw(raw.width, raw.height, raw.rgba.clone())
        .ok_or_else(|| CoreError::OcrError("RGBA 버퍼 크기 불일치".to_string()))?;

    if level == RecognitionLevel::Fast && raw.width > FAST_MAX_WIDTH {
        let ratio = FAST_MAX_WIDTH as f64 / raw.width as f64;
        let height = ((raw.height as f64 * ratio).round() as u32).max(1);
        let resized = imageops::resize(&image, FAST_MAX_WIDTH, height, FilterType::Triangle);
        debug!(
            "OCR 입력 축소: {}x{} → {}x{}",
            raw.width, raw.height, FAST_MAX_WIDTH, height
        );
        return Ok(PreparedImage {
            image: resized,
            scale: raw.width as f64 / FAST_MAX_WIDTH as f64,
        });
    }

    Ok(PreparedImage { image, scale: 1.0 })
}
