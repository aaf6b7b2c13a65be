//! macOS 플랫폼: 활성 앱 감지, 마우스 위치.
//!
//! System Events(osascript) + CoreGraphics 기반.

use std::process::Command;

use core_graphics::event::CGEvent;
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use sightline_core::error::CoreError;
use sightline_core::models::geometry::Point;
use sightline_core::ports::capture::ForegroundInfo;
use tracing::debug;

const FRONT_APP_SCRIPT: &str = r#"tell application "System Events"
    set frontApp to first application process whose frontmost is true
    set appId to ""
    try
        set appId to bundle identifier of frontApp
    end try
    set winTitle to ""
    try
        set winTitle to name of front window of frontApp
    end try
    return (name of frontApp) & "|" & appId & "|" & (unix id of frontApp) & "|" & winTitle
end tell"#;

/// macOS 전경 애플리케이션 조회
pub fn foreground_macos() -> Result<Option<ForegroundInfo>, CoreError> {
    let output = Command::new("osascript")
        .arg("-e")
        .arg(FRONT_APP_SCRIPT)
        .output()
        .map_err(|e| CoreError::Internal(format!("osascript 실행 실패: {e}")))?;

    if !output.status.success() {
        debug!("활성 앱 감지 실패 (osascript)");
        return Ok(None);
    }

    let info = parse_front_app(&String::from_utf8_lossy(&output.stdout));
    if let Some(ref info) = info {
        debug!("활성 앱: {}: {:?}", info.app_id, info.window_title);
    }
    Ok(info)
}

/// `name|bundle_id|pid|title` 형식 파싱. 번들 ID가 없으면 앱 이름 사용
pub fn parse_front_app(output: &str) -> Option<ForegroundInfo> {
    let mut parts = output.trim().splitn(4, '|');
    let name = parts.next().filter(|s| !s.is_empty())?;
    let bundle_id = parts.next().unwrap_or_default();
    let pid = parts.next().and_then(|s| s.trim().parse::<u32>().ok());
    let title = parts.next().map(str::trim).filter(|s| !s.is_empty());

    Some(ForegroundInfo {
        app_id: if bundle_id.is_empty() {
            name.to_string()
        } else {
            bundle_id.to_string()
        },
        window_title: title.map(String::from),
        pid,
    })
}

/// macOS 마우스 커서 위치 조회 (전역 논리 좌표)
///
/// HIDSystemState 이벤트 소스로 synthetic 이벤트를 생성하면 현재 위치를 포함한다.
pub fn pointer_macos() -> Option<Point> {
    let source = CGEventSource::new(CGEventSourceStateID::HIDSystemState).ok()?;
    let event = CGEvent::new(source).ok()?;
    let location = event.location();
    Some(Point::new(location.x, location.y))
}
