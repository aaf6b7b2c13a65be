//! Linux 플랫폼 지원.
//!
//! X11 환경에서 활성 창과 포인터 위치를 감지한다.
//!
//! ## X11 지원
//! - `xdotool`을 통한 활성 창 / 마우스 위치 감지
//!
//! ## Wayland 지원
//! Wayland는 보안상 이유로 표준 API가 제한적이다.
//! 현재는 X11 fallback (XWayland)에 의존한다.

use std::process::Command;

use sightline_core::error::CoreError;
use sightline_core::models::geometry::Point;
use sightline_core::ports::capture::ForegroundInfo;
use tracing::{debug, warn};

/// 현재 디스플레이 서버 유형
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayServer {
    X11,
    Wayland,
    Unknown,
}

/// 현재 사용 중인 디스플레이 서버 감지
pub fn detect_display_server() -> DisplayServer {
    // XDG_SESSION_TYPE 환경변수 확인 (systemd 기반 시스템)
    if let Ok(session_type) = std::env::var("XDG_SESSION_TYPE") {
        match session_type.to_lowercase().as_str() {
            "x11" => return DisplayServer::X11,
            "wayland" => return DisplayServer::Wayland,
            _ => {}
        }
    }

    if std::env::var("WAYLAND_DISPLAY").is_ok() {
        return DisplayServer::Wayland;
    }

    if std::env::var("DISPLAY").is_ok() {
        return DisplayServer::X11;
    }

    DisplayServer::Unknown
}

/// Linux 전경 애플리케이션 조회
pub fn foreground_linux() -> Result<Option<ForegroundInfo>, CoreError> {
    match detect_display_server() {
        DisplayServer::X11 => foreground_x11(),
        DisplayServer::Wayland => {
            debug!("Wayland 감지됨 - XWayland fallback 시도");
            foreground_x11().or_else(|_| {
                warn!("Wayland에서 활성 창 감지 제한됨 - X11 앱만 지원");
                Ok(None)
            })
        }
        DisplayServer::Unknown => {
            debug!("디스플레이 서버 감지 실패");
            Ok(None)
        }
    }
}

/// xdotool 실행 후 성공 시 stdout 반환
fn xdotool(args: &[&str]) -> Option<String> {
    match Command::new("xdotool").args(args).output() {
        Ok(output) if output.status.success() => {
            Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
        }
        Ok(output) => {
            debug!(
                "xdotool {:?} 실패: {}",
                args,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            None
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::NotFound {
                debug!("xdotool 미설치 - 'sudo apt install xdotool' 실행 필요");
            } else {
                debug!("xdotool 실행 실패: {}", e);
            }
            None
        }
    }
}

/// X11에서 xdotool로 활성 창 정보 조회
fn foreground_x11() -> Result<Option<ForegroundInfo>, CoreError> {
    let Some(window_id) = xdotool(&["getactivewindow"]).filter(|id| !id.is_empty()) else {
        return Ok(None);
    };

    let title = xdotool(&["getwindowname", &window_id]).filter(|t| !t.is_empty());
    let pid = xdotool(&["getwindowpid", &window_id]).and_then(|s| s.parse::<u32>().ok());
    let app_id = pid
        .and_then(process_name)
        .unwrap_or_else(|| format!("x11-window-{window_id}"));

    debug!("활성 창: {} - {:?} (PID: {:?})", app_id, title, pid);

    Ok(Some(ForegroundInfo {
        app_id,
        window_title: title,
        pid,
    }))
}

/// PID로부터 프로세스 이름 조회 (/proc/{pid}/comm)
pub fn process_name(pid: u32) -> Option<String> {
    std::fs::read_to_string(format!("/proc/{pid}/comm"))
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Linux 마우스 커서 위치 조회 (전역 좌표)
pub fn pointer_linux() -> Option<Point> {
    match detect_display_server() {
        DisplayServer::X11 | DisplayServer::Wayland => {
            xdotool(&["getmouselocation"]).and_then(|out| parse_mouse_location(&out))
        }
        DisplayServer::Unknown => None,
    }
}

/// `x:1234 y:567 screen:0 window:12345678` 형식 파싱
pub fn parse_mouse_location(output: &str) -> Option<Point> {
    let mut x: Option<f64> = None;
    let mut y: Option<f64> = None;

    for part in output.split_whitespace() {
        if let Some(val) = part.strip_prefix("x:") {
            x = val.parse().ok();
        } else if let Some(val) = part.strip_prefix("y:") {
            y = val.parse().ok();
        }
    }

    Some(Point::new(x?, y?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_display_server_works() {
        let server = detect_display_server();
        assert!(matches!(
            server,
            DisplayServer::X11 | DisplayServer::Wayland | DisplayServer::Unknown
        ));
    }

    #[test]
    fn process_name_from_proc() {
        // PID 1은 항상 존재 (init/systemd)
        let name = process_name(1);
        assert!(name.is_some_and(|n| !n.is_empty()));
    }

    #[test]
    fn foreground_returns_ok_without_xdotool() {
        assert!(foreground_linux().is_ok());
    }

    #[test]
    fn parses_mouse_location() {
        assert_eq!(
            parse_mouse_location("x:1234 y:567 screen:0 window:12345678"),
            Some(Point::new(1234.0, 567.0))
        );
        assert_eq!(parse_mouse_location("screen:0"), None);
        assert_eq!(parse_mouse_location("x:abc y:1"), None);
    }
}
