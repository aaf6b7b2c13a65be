//! 전경 창 + 포인터 탐지.
//!
//! `ForegroundProbe` 포트 구현. 플랫폼별 모듈로 분기한다.

use sightline_core::error::CoreError;
use sightline_core::models::geometry::Point;
use sightline_core::ports::capture::{ForegroundInfo, ForegroundProbe};

/// 플랫폼 네이티브 전경 탐지기
///
/// - macOS: System Events + CoreGraphics
/// - Windows: Win32 GetForegroundWindow / GetCursorPos
/// - Linux: xdotool (X11/XWayland)
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformForegroundProbe;

impl PlatformForegroundProbe {
    pub fn new() -> Self {
        Self
    }
}

impl ForegroundProbe for PlatformForegroundProbe {
    fn foreground(&self) -> Result<Option<ForegroundInfo>, CoreError> {
        #[cfg(target_os = "macos")]
        {
            crate::macos::foreground_macos()
        }
        #[cfg(target_os = "windows")]
        {
            crate::windows::foreground_windows()
        }
        #[cfg(target_os = "linux")]
        {
            crate::linux::foreground_linux()
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
        {
            Ok(None)
        }
    }

    fn pointer(&self) -> Option<Point> {
        #[cfg(target_os = "macos")]
        {
            crate::macos::pointer_macos()
        }
        #[cfg(target_os = "windows")]
        {
            crate::windows::pointer_windows()
        }
        #[cfg(target_os = "linux")]
        {
            crate::linux::pointer_linux()
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
        {
            None
        }
    }
}
