//! 플랫폼 접근성 역할 문자열 → `UiRole` 매핑.
//!
//! macOS AX (`AXButton`), AT-SPI (`push button`), UI Automation (`Button`)
//! 표기를 모두 받는다.

use sightline_core::models::ui::UiRole;

/// 플랫폼 역할 문자열을 도메인 역할로 변환
pub fn map_platform_role(platform_role: &str) -> UiRole {
    let raw = platform_role.trim();

    // AT-SPI "text"는 편집 가능한 텍스트, UIA "Text"는 정적 텍스트
    match raw {
        "text" => return UiRole::TextInput,
        "Text" => return UiRole::StaticText,
        _ => {}
    }

    let stripped = raw.strip_prefix("AX").unwrap_or(raw);
    let key: String = stripped
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect();

    match key.as_str() {
        "button" | "pushbutton" | "togglebutton" | "splitbutton" | "menubutton"
        | "disclosuretriangle" => UiRole::Button,
        "textfield" | "textarea" | "searchfield" | "securetextfield" | "entry"
        | "passwordtext" | "edit" | "editabletext" => UiRole::TextInput,
        "checkbox" | "checkmenuitem" | "switch" => UiRole::Checkbox,
        "radiobutton" | "radiomenuitem" => UiRole::Radio,
        "popupbutton" | "combobox" | "dropdown" => UiRole::Dropdown,
        "menu" | "menubar" | "popupmenu" => UiRole::Menu,
        "menuitem" | "menubaritem" => UiRole::MenuItem,
        "link" | "hyperlink" => UiRole::Link,
        "tab" | "pagetab" | "tabitem" => UiRole::Tab,
        "slider" | "incrementor" | "spinner" | "spinbutton" => UiRole::Slider,
        "statictext" | "label" | "static" | "heading" | "paragraph" => UiRole::StaticText,
        "image" | "icon" => UiRole::Image,
        "list" | "table" | "outline" | "datagrid" | "tree" | "treetable" => UiRole::List,
        "toolbar" => UiRole::Toolbar,
        "group" | "panel" | "pane" | "splitgroup" | "scrollarea" | "filler" | "section"
        | "tabgroup" | "pagetablist" => UiRole::Group,
        "window" | "frame" | "dialog" | "sheet" | "application" => UiRole::Window,
        _ => UiRole::Other,
    }
}
