//! 디스플레이/애플리케이션/창 토폴로지 스냅샷.
//!
//! 설명 생성의 맥락 정보로만 사용되며 공간 상관 계산에는 쓰이지 않는다.

use serde::{Deserialize, Serialize};

use super::geometry::Rect;

/// 디스플레이 정보
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayInfo {
    pub id: u32,
    pub name: String,
    /// 전역 좌표계 기준 디스플레이 영역
    pub bounds: Rect,
    pub scale_factor: f64,
    pub is_primary: bool,
}

/// 실행 중인 애플리케이션 정보
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationInfo {
    /// 애플리케이션 식별자
    pub app_id: String,
    /// 표시 이름
    pub name: String,
    pub pid: u32,
    /// 전경 애플리케이션 여부
    pub is_active: bool,
}

/// 화면상의 창 정보
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowInfo {
    pub window_id: u32,
    pub title: String,
    /// 소유 애플리케이션 식별자
    pub app_id: String,
    pub pid: u32,
    pub bounds: Rect,
    /// 화면에 표시 중인지 (최소화/숨김이면 false)
    pub on_screen: bool,
}

/// 한 시점의 토폴로지 스냅샷
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowStructure {
    pub displays: Vec<DisplayInfo>,
    pub applications: Vec<ApplicationInfo>,
    pub windows: Vec<WindowInfo>,
}

impl WindowStructure {
    /// 빈 스냅샷 (조회 실패 시 대체값)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.displays.is_empty() && self.applications.is_empty() && self.windows.is_empty()
    }

    /// 화면에 보이는 창 목록
    pub fn visible_windows(&self) -> impl Iterator<Item = &WindowInfo> {
        self.windows.iter().filter(|w| w.on_screen)
    }

    /// 특정 앱의 첫 번째 표시 창
    pub fn window_for_app(&self, app_id: &str) -> Option<&WindowInfo> {
        self.visible_windows().find(|w| w.app_id == app_id)
    }

    /// 전경 애플리케이션
    pub fn active_application(&self) -> Option<&ApplicationInfo> {
        self.applications.iter().find(|a| a.is_active)
    }

    pub fn primary_display(&self) -> Option<&DisplayInfo> {
        self.displays
            .iter()
            .find(|d| d.is_primary)
            .or_else(|| self.displays.first())
    }
}
