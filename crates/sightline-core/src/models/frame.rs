//! 캡처 프레임 모델.
//!
//! 캡처 소스가 생성하는 래스터 이미지와 저비용 메타데이터를 정의한다.
//! 프레임은 해당 사이클이 독점하며, 캐시된 `ScreenContext`만 TTL 동안 원본을 참조한다.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::geometry::Point;

/// RGBA8 래스터 이미지 (행 우선, 픽셀당 4바이트)
#[derive(Clone, PartialEq, Eq)]
pub struct RawImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl RawImage {
    /// 새 이미지 생성. 버퍼 길이가 `width * height * 4`와 다르면 None.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        let expected = width as usize * height as usize * 4;
        (rgba.len() == expected).then_some(Self {
            width,
            height,
            rgba,
        })
    }

    /// 단색 이미지 (테스트/더미 프레임용)
    pub fn filled(width: u32, height: u32, pixel: [u8; 4]) -> Self {
        let rgba = pixel
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            rgba,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Debug for RawImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

/// 캡처 메타데이터 (캡처 시각, 포인터, 전경 앱)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureMetadata {
    /// 캡처 시각
    pub timestamp: DateTime<Utc>,
    /// 프레임 좌표계 기준 포인터 위치. 탐지 실패 시 None
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer: Option<Point>,
    /// 전경 애플리케이션 식별자 (번들 ID 또는 프로세스 이름)
    pub app_id: String,
    /// 전경 창 제목
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_title: Option<String>,
    /// 전경 프로세스 ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
}

/// 캡처된 프레임 (이미지 + 메타데이터)
#[derive(Debug, Clone)]
pub struct Frame {
    /// 캡처 소스가 부여한 단조 증가 시퀀스
    pub sequence: u64,
    pub image: Arc<RawImage>,
    pub metadata: CaptureMetadata,
}

impl Frame {
    pub fn new(sequence: u64, image: RawImage, metadata: CaptureMetadata) -> Self {
        Self {
            sequence,
            image: Arc::new(image),
            metadata,
        }
    }

    /// 해상도 (width, height)
    pub fn resolution(&self) -> (u32, u32) {
        (self.image.width, self.image.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_image_rejects_wrong_buffer_len() {
        assert!(RawImage::new(2, 2, vec![0; 15]).is_none());
        assert!(RawImage::new(2, 2, vec![0; 16]).is_some());
    }

    #[test]
    fn filled_image_has_expected_len() {
        let img = RawImage::filled(3, 2, [1, 2, 3, 255]);
        assert_eq!(img.rgba.len(), 24);
        assert_eq!(&img.rgba[4..8], &[1, 2, 3, 255]);
    }

    #[test]
    fn metadata_serde_skips_missing_title() {
        let meta = CaptureMetadata {
            timestamp: Utc::now(),
            pointer: Some(Point::new(10.0, 20.0)),
            app_id: "com.apple.Safari".to_string(),
            window_title: None,
            pid: None,
        };
        let json = serde_json::to_string(&meta).unwrap();
        assert!(!json.contains("window_title"));
        let back: CaptureMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
    }

    #[test]
    fn unknown_pointer_is_omitted_and_restored_as_none() {
        let meta = CaptureMetadata {
            timestamp: Utc::now(),
            pointer: None,
            app_id: "org.gnome.Terminal".to_string(),
            window_title: None,
            pid: None,
        };
        let json = serde_json::to_string(&meta).unwrap();
        assert!(!json.contains("pointer"));
        let back: CaptureMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back.pointer, None);
    }
}
