//! 스크린 캡처.
//!
//! xcap 기반 모니터 캡처 + 전경 탐지기로 메타데이터를 채워
//! `FrameSource` 포트를 구현한다.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use image::RgbaImage;
use sightline_core::error::CoreError;
use sightline_core::models::frame::{CaptureMetadata, Frame, RawImage};
use sightline_core::models::geometry::Point;
use sightline_core::ports::capture::{ForegroundInfo, ForegroundProbe, FrameSource};
use tracing::{debug, warn};
use xcap::Monitor;

/// 전경 앱을 알 수 없을 때의 식별자
pub const UNKNOWN_APP_ID: &str = "unknown";

/// 캡처된 모니터 영역
#[derive(Debug)]
pub struct MonitorShot {
    pub image: RgbaImage,
    /// 전역 좌표계 기준 모니터 원점
    pub origin: Point,
    /// 논리 좌표 기준 모니터 크기
    pub logical_width: f64,
    pub logical_height: f64,
}

/// 스크린 캡처: xcap 기반
pub struct ScreenCapture {
    /// 캡처 모니터 인덱스 (None이면 주 모니터)
    monitor_index: Option<usize>,
    probe: Arc<dyn ForegroundProbe>,
    sequence: AtomicU64,
}

impl ScreenCapture {
    pub fn new(monitor_index: Option<usize>, probe: Arc<dyn ForegroundProbe>) -> Self {
        Self {
            monitor_index,
            probe,
            sequence: AtomicU64::new(0),
        }
    }

    /// 모니터 캡처 (블로킹)
    pub fn capture_monitor(index: Option<usize>) -> Result<MonitorShot, CoreError> {
        let monitors = Monitor::all()
            .map_err(|e| CoreError::Capture(format!("모니터 목록 조회 실패: {e}")))?;

        let monitor = match index {
            Some(i) => monitors
                .into_iter()
                .nth(i)
                .ok_or_else(|| CoreError::Capture(format!("모니터 인덱스 {i} 없음")))?,
            None => {
                let mut monitors = monitors;
                let primary = monitors
                    .iter()
                    .position(|m| m.is_primary().unwrap_or(false))
                    .unwrap_or(0);
                if monitors.is_empty() {
                    return Err(CoreError::Capture("모니터를 찾을 수 없음".to_string()));
                }
                monitors.swap_remove(primary)
            }
        };

        let image = monitor
            .capture_image()
            .map_err(|e| CoreError::Capture(format!("스크린 캡처 실패: {e}")))?;

        let origin = Point::new(
            monitor.x().unwrap_or(0) as f64,
            monitor.y().unwrap_or(0) as f64,
        );
        let logical_width = monitor.width().map(f64::from).unwrap_or(image.width() as f64);
        let logical_height = monitor
            .height()
            .map(f64::from)
            .unwrap_or(image.height() as f64);

        debug!("스크린 캡처 완료: {}x{}", image.width(), image.height());

        Ok(MonitorShot {
            image,
            origin,
            logical_width,
            logical_height,
        })
    }

    /// 사용 가능한 모니터 수
    pub fn monitor_count() -> Result<usize, CoreError> {
        Monitor::all()
            .map(|m| m.len())
            .map_err(|e| CoreError::Capture(format!("모니터 목록 조회 실패: {e}")))
    }
}

/// 전역 좌표 포인터 → 프레임 픽셀 좌표 (HiDPI 배율 반영)
pub fn pointer_to_frame(global: Point, shot: &MonitorShot) -> Point {
    let sx = if shot.logical_width > 0.0 {
        shot.image.width() as f64 / shot.logical_width
    } else {
        1.0
    };
    let sy = if shot.logical_height > 0.0 {
        shot.image.height() as f64 / shot.logical_height
    } else {
        1.0
    };
    Point::new((global.x - shot.origin.x) * sx, (global.y - shot.origin.y) * sy)
}

/// 탐지 결과 → 캡처 메타데이터
fn build_metadata(foreground: Option<ForegroundInfo>, pointer: Option<Point>) -> CaptureMetadata {
    let (app_id, window_title, pid) = match foreground {
        Some(info) => (info.app_id, info.window_title, info.pid),
        None => (UNKNOWN_APP_ID.to_string(), None, None),
    };
    CaptureMetadata {
        timestamp: Utc::now(),
        pointer,
        app_id,
        window_title,
        pid,
    }
}

#[async_trait]
impl FrameSource for ScreenCapture {
    async fn capture(&self) -> Result<Frame, CoreError> {
        let index = self.monitor_index;
        let probe = Arc::clone(&self.probe);

        let (shot, foreground, pointer) = tokio::task::spawn_blocking(move || {
            let shot = Self::capture_monitor(index)?;
            let foreground = probe.foreground().unwrap_or_else(|e| {
                warn!("전경 앱 탐지 실패: {e}");
                None
            });
            let pointer = probe.pointer().map(|p| pointer_to_frame(p, &shot));
            Ok::<_, CoreError>((shot, foreground, pointer))
        })
        .await
        .map_err(|e| CoreError::Internal(format!("캡처 작업 조인 실패: {e}")))??;

        let (width, height) = shot.image.dimensions();
        let image = RawImage::new(width, height, shot.image.into_raw())
            .ok_or_else(|| CoreError::Capture("캡처 버퍼 크기 불일치".to_string()))?;

        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(Frame::new(sequence, image, build_metadata(foreground, pointer)))
    }

    fn name(&self) -> &str {
        "xcap"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shot(w: u32, h: u32, origin: Point, lw: f64, lh: f64) -> MonitorShot {
        MonitorShot {
            image: RgbaImage::new(w, h),
            origin,
            logical_width: lw,
            logical_height: lh,
        }
    }

    #[test]
    fn pointer_is_translated_to_monitor_origin() {
        let s = shot(1920, 1080, Point::new(1920.0, 0.0), 1920.0, 1080.0);
        assert_eq!(pointer_to_frame(Point::new(2020.0, 50.0), &s), Point::new(100.0, 50.0));
    }

    #[test]
    fn pointer_is_scaled_on_hidpi() {
        let s = shot(2880, 1800, Point::default(), 1440.0, 900.0);
        assert_eq!(pointer_to_frame(Point::new(100.0, 30.0), &s), Point::new(200.0, 60.0));
    }

    #[test]
    fn missing_foreground_uses_unknown_app() {
        let meta = build_metadata(None, Some(Point::new(1.0, 2.0)));
        assert_eq!(meta.app_id, UNKNOWN_APP_ID);
        assert_eq!(meta.pointer, Some(Point::new(1.0, 2.0)));
        assert!(meta.window_title.is_none());

        let meta = build_metadata(
            Some(ForegroundInfo {
                app_id: "Code".into(),
                window_title: Some("main.rs".into()),
                pid: Some(42),
            }),
            None,
        );
        assert_eq!(meta.app_id, "Code");
        assert_eq!(meta.pid, Some(42));
        // 포인터를 모르면 원점으로 채우지 않는다
        assert_eq!(meta.pointer, None);
    }
}
