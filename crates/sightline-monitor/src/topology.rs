//! 디스플레이/애플리케이션/창 토폴로지.
//!
//! `TopologyProvider` 포트 구현. xcap으로 모니터와 창 목록을,
//! sysinfo로 창 소유 프로세스 이름을 조회한다.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sightline_core::blocking::SingleFlight;
use sightline_core::error::CoreError;
use sightline_core::models::geometry::{Point, Rect};
use sightline_core::models::topology::{ApplicationInfo, DisplayInfo, WindowInfo, WindowStructure};
use sightline_core::ports::capture::ForegroundProbe;
use sightline_core::ports::topology::TopologyProvider;
use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::{debug, warn};
use xcap::{Monitor, Window};

use crate::accessibility::CoordinateTransform;

/// xcap에서 읽은 창 원시 정보
#[derive(Debug, Clone, PartialEq)]
pub struct RawWindow {
    pub id: u32,
    pub pid: u32,
    pub app_name: String,
    pub title: String,
    pub bounds: Rect,
    pub minimized: bool,
}

/// 원시 창 목록 → 토폴로지 스냅샷.
///
/// 앱 식별자는 프로세스 이름을 우선하고, 없으면 xcap 앱 이름을 쓴다.
/// 애플리케이션 목록은 창 소유 PID별 최초 등장 순서를 따른다.
pub fn build_structure(
    displays: Vec<DisplayInfo>,
    raw_windows: Vec<RawWindow>,
    process_names: &HashMap<u32, String>,
    active_pid: Option<u32>,
    active_app_id: Option<&str>,
) -> WindowStructure {
    let mut windows = Vec::with_capacity(raw_windows.len());
    let mut applications: Vec<ApplicationInfo> = Vec::new();

    for raw in raw_windows {
        let app_id = process_names
            .get(&raw.pid)
            .filter(|n| !n.is_empty())
            .cloned()
            .unwrap_or_else(|| raw.app_name.clone());

        if !applications.iter().any(|a| a.pid == raw.pid) {
            let is_active = active_pid == Some(raw.pid) || active_app_id == Some(app_id.as_str());
            applications.push(ApplicationInfo {
                app_id: app_id.clone(),
                name: if raw.app_name.is_empty() {
                    app_id.clone()
                } else {
                    raw.app_name.clone()
                },
                pid: raw.pid,
                is_active,
            });
        }

        windows.push(WindowInfo {
            window_id: raw.id,
            title: raw.title,
            app_id,
            pid: raw.pid,
            on_screen: !raw.minimized && !raw.bounds.is_empty(),
            bounds: raw.bounds,
        });
    }

    WindowStructure {
        displays,
        applications,
        windows,
    }
}

fn list_displays() -> Vec<DisplayInfo> {
    let monitors = match Monitor::all() {
        Ok(m) => m,
        Err(e) => {
            warn!("모니터 목록 조회 실패: {e}");
            return Vec::new();
        }
    };

    monitors
        .iter()
        .enumerate()
        .map(|(idx, m)| DisplayInfo {
            id: m.id().unwrap_or(idx as u32),
            name: m.name().unwrap_or_default(),
            bounds: Rect::new(
                m.x().unwrap_or(0) as f64,
                m.y().unwrap_or(0) as f64,
                m.width().unwrap_or(0) as f64,
                m.height().unwrap_or(0) as f64,
            ),
            scale_factor: m.scale_factor().map(f64::from).unwrap_or(1.0),
            is_primary: m.is_primary().unwrap_or(false),
        })
        .collect()
}

fn list_windows() -> Result<Vec<RawWindow>, CoreError> {
    let windows =
        Window::all().map_err(|e| CoreError::Topology(format!("창 목록 조회 실패: {e}")))?;

    Ok(windows
        .iter()
        .filter_map(|w| {
            Some(RawWindow {
                id: w.id().ok()?,
                pid: w.pid().unwrap_or(0),
                app_name: w.app_name().unwrap_or_default(),
                title: w.title().unwrap_or_default(),
                bounds: Rect::new(
                    w.x().unwrap_or(0) as f64,
                    w.y().unwrap_or(0) as f64,
                    w.width().unwrap_or(0) as f64,
                    w.height().unwrap_or(0) as f64,
                ),
                minimized: w.is_minimized().unwrap_or(false),
            })
        })
        .collect())
}

/// 캡처 모니터 기준 접근성 좌표 변환.
///
/// macOS 접근성 좌표는 논리 좌표이므로 배율을 곱한다.
pub fn display_transform(monitor_index: Option<usize>) -> Result<CoordinateTransform, CoreError> {
    let monitors =
        Monitor::all().map_err(|e| CoreError::Topology(format!("모니터 목록 조회 실패: {e}")))?;
    let monitor = match monitor_index {
        Some(i) => monitors.get(i),
        None => monitors
            .iter()
            .find(|m| m.is_primary().unwrap_or(false))
            .or_else(|| monitors.first()),
    }
    .ok_or_else(|| CoreError::Topology("모니터를 찾을 수 없음".to_string()))?;

    let scale = if cfg!(target_os = "macos") {
        monitor.scale_factor().map(f64::from).unwrap_or(1.0)
    } else {
        1.0
    };

    Ok(CoordinateTransform {
        origin: Point::new(
            monitor.x().unwrap_or(0) as f64,
            monitor.y().unwrap_or(0) as f64,
        ),
        scale_x: scale,
        scale_y: scale,
    })
}

/// 시스템 토폴로지 제공자: `TopologyProvider` 포트 구현.
///
/// 스냅샷 수집은 한 번에 하나만 실행한다. 이전 수집이 끝나지 않았으면
/// 마지막 스냅샷을 돌려준다.
pub struct SystemTopologyProvider {
    sys: Arc<Mutex<System>>,
    probe: Option<Arc<dyn ForegroundProbe>>,
    gate: SingleFlight,
    last: Arc<Mutex<WindowStructure>>,
}

impl SystemTopologyProvider {
    pub fn new(probe: Option<Arc<dyn ForegroundProbe>>) -> Self {
        Self {
            sys: Arc::new(Mutex::new(System::new())),
            probe,
            gate: SingleFlight::new("topology"),
            last: Arc::new(Mutex::new(WindowStructure::empty())),
        }
    }

    fn last_snapshot(&self) -> Result<WindowStructure, CoreError> {
        self.last
            .lock()
            .map(|last| last.clone())
            .map_err(|e| CoreError::Internal(format!("스냅샷 잠금 실패: {e}")))
    }
}

#[async_trait]
impl TopologyProvider for SystemTopologyProvider {
    async fn snapshot(&self) -> Result<WindowStructure, CoreError> {
        let sys = Arc::clone(&self.sys);
        let probe = self.probe.clone();
        let last = Arc::clone(&self.last);

        let collected = self.gate.run(move || {
            let displays = list_displays();
            let raw_windows = list_windows()?;

            let pids: Vec<Pid> = raw_windows
                .iter()
                .filter(|w| w.pid > 0)
                .map(|w| Pid::from_u32(w.pid))
                .collect();
            let process_names: HashMap<u32, String> = {
                let mut sys = sys
                    .lock()
                    .map_err(|e| CoreError::Internal(format!("시스템 잠금 실패: {e}")))?;
                sys.refresh_processes(ProcessesToUpdate::Some(&pids), true);
                pids.iter()
                    .filter_map(|pid| {
                        sys.process(*pid)
                            .map(|p| (pid.as_u32(), p.name().to_string_lossy().to_string()))
                    })
                    .collect()
            };

            let foreground = probe.and_then(|p| p.foreground().ok().flatten());
            let structure = build_structure(
                displays,
                raw_windows,
                &process_names,
                foreground.as_ref().and_then(|f| f.pid),
                foreground.as_ref().map(|f| f.app_id.as_str()),
            );

            debug!(
                "토폴로지 스냅샷: 디스플레이 {}개, 앱 {}개, 창 {}개",
                structure.displays.len(),
                structure.applications.len(),
                structure.windows.len()
            );
            if let Ok(mut last) = last.lock() {
                *last = structure.clone();
            }
            Ok(structure)
        })
        .await?;

        match collected {
            Some(result) => result,
            None => {
                debug!("이전 토폴로지 수집 진행 중, 마지막 스냅샷 사용");
                self.last_snapshot()
            }
        }
    }
}
