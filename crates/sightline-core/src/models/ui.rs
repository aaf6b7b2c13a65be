//! 접근성 트리에서 추출한 UI 요소 모델.

use serde::{Deserialize, Serialize};

use super::geometry::Rect;

/// UI 요소 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiRole {
    Button,
    TextInput,
    Checkbox,
    Radio,
    Dropdown,
    Menu,
    MenuItem,
    Link,
    Tab,
    Slider,
    StaticText,
    Image,
    List,
    Toolbar,
    Group,
    Window,
    Other,
}

impl UiRole {
    /// 사용자가 직접 조작할 수 있는 역할인지
    pub fn is_interactive(&self) -> bool {
        matches!(
            self,
            UiRole::Button
                | UiRole::TextInput
                | UiRole::Checkbox
                | UiRole::Radio
                | UiRole::Dropdown
                | UiRole::Menu
                | UiRole::MenuItem
                | UiRole::Link
                | UiRole::Tab
                | UiRole::Slider
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UiRole::Button => "button",
            UiRole::TextInput => "text-input",
            UiRole::Checkbox => "checkbox",
            UiRole::Radio => "radio",
            UiRole::Dropdown => "dropdown",
            UiRole::Menu => "menu",
            UiRole::MenuItem => "menu-item",
            UiRole::Link => "link",
            UiRole::Tab => "tab",
            UiRole::Slider => "slider",
            UiRole::StaticText => "static-text",
            UiRole::Image => "image",
            UiRole::List => "list",
            UiRole::Toolbar => "toolbar",
            UiRole::Group => "group",
            UiRole::Window => "window",
            UiRole::Other => "other",
        }
    }
}

/// 접근성 트리의 평탄화된 노드 하나. 생성 후 불변.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiElement {
    /// 요소 역할
    pub role: UiRole,
    /// 플랫폼 원본 역할 문자열 (예: "AXButton")
    #[serde(default)]
    pub platform_role: String,
    /// 접근성 레이블
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// 현재 값 (입력 필드 내용 등)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// 프레임 픽셀 좌표 기준 경계
    pub bounds: Rect,
    /// 활성화 여부. None이면 플랫폼이 알려주지 않음
    #[serde(default)]
    pub enabled: Option<bool>,
    /// 트리 깊이 (루트 = 0)
    pub depth: u32,
    /// 구조 경로 (예: "AXWindow[0]/AXGroup[1]/AXButton[0]")
    pub path: String,
}

impl UiElement {
    /// 레이블 또는 값 중 표시 가능한 텍스트
    pub fn display_text(&self) -> Option<&str> {
        self.label
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.value.as_deref().filter(|s| !s.trim().is_empty()))
    }

    /// 명시적으로 비활성화된 요소인지
    pub fn is_disabled(&self) -> bool {
        self.enabled == Some(false)
    }
}
