//! Windows 플랫폼: 활성 창 감지 및 마우스 위치.
//!
//! Win32 API `GetForegroundWindow` + `GetWindowTextW` + `GetCursorPos` 기반.

#![cfg(target_os = "windows")]

use sightline_core::error::CoreError;
use sightline_core::models::geometry::Point;
use sightline_core::ports::capture::ForegroundInfo;
use tracing::debug;
use windows_sys::Win32::Foundation::{HWND, POINT};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    GetCursorPos, GetForegroundWindow, GetWindowTextW, GetWindowThreadProcessId,
};

/// Windows 전경 애플리케이션 조회
pub fn foreground_windows() -> Result<Option<ForegroundInfo>, CoreError> {
    unsafe {
        let hwnd: HWND = GetForegroundWindow();
        if hwnd.is_null() {
            debug!("활성 창 없음 (GetForegroundWindow → null)");
            return Ok(None);
        }

        let mut title_buf = [0u16; 512];
        let len = GetWindowTextW(hwnd, title_buf.as_mut_ptr(), title_buf.len() as i32);
        let title = (len > 0).then(|| String::from_utf16_lossy(&title_buf[..len as usize]));

        let mut pid: u32 = 0;
        GetWindowThreadProcessId(hwnd, &mut pid);
        let pid = (pid > 0).then_some(pid);

        let app_id = pid
            .and_then(process_name)
            .unwrap_or_else(|| "unknown".to_string());

        debug!("활성 창: {app_id}: {title:?} (PID: {pid:?})");

        Ok(Some(ForegroundInfo {
            app_id,
            window_title: title,
            pid,
        }))
    }
}

/// PID로 프로세스 이름 조회
fn process_name(pid: u32) -> Option<String> {
    use sysinfo::{Pid, System};

    let mut sys = System::new();
    sys.refresh_processes(
        sysinfo::ProcessesToUpdate::Some(&[Pid::from_u32(pid)]),
        true,
    );

    sys.process(Pid::from_u32(pid))
        .map(|p| p.name().to_string_lossy().to_string())
}

/// Windows 마우스 커서 위치 조회 (전역 좌표)
pub fn pointer_windows() -> Option<Point> {
    unsafe {
        let mut point: POINT = std::mem::zeroed();
        if GetCursorPos(&mut point) != 0 {
            Some(Point::new(point.x as f64, point.y as f64))
        } else {
            None
        }
    }
}
