//! 설명 문자열 생성.
//!
//! - Fast: 인식 텍스트 목록만
//! - Base: 전경 앱 헤더 + 토폴로지 요약 + 상호작용 후보 서술 + 텍스트 목록
//!
//! Enrich 설명은 보강 어댑터가 Base 설명을 확장해서 만든다.

use std::fmt::Write as _;

use sightline_core::models::frame::CaptureMetadata;
use sightline_core::models::fused::FusedElement;
use sightline_core::models::text::TextElement;
use sightline_core::models::topology::WindowStructure;

/// 서술에 포함할 상호작용 후보 최대 개수
const MAX_NARRATED_ELEMENTS: usize = 5;

/// 텍스트 목록 최대 줄 수
const MAX_TEXT_LINES: usize = 40;

pub fn fast_description(text_elements: &[TextElement]) -> String {
    let mut out = String::from("## Text\n");
    push_text_listing(&mut out, text_elements);
    out
}

pub fn base_description(
    metadata: &CaptureMetadata,
    topology: &WindowStructure,
    fused: &[FusedElement],
    text_elements: &[TextElement],
) -> String {
    let mut out = String::from("## Foreground\n");
    out.push_str(&metadata.app_id);
    if let Some(title) = metadata.window_title.as_deref().filter(|t| !t.is_empty()) {
        let _ = write!(out, ": \"{title}\"");
    }

    let _ = write!(
        out,
        "\n\n## Topology\n{} display(s), {} application(s), {} visible window(s)",
        topology.displays.len(),
        topology.applications.len(),
        topology.visible_windows().count()
    );

    out.push_str("\n\n## Interactive elements\n");
    let narrated: Vec<&FusedElement> = fused
        .iter()
        .filter(|f| !f.is_standalone_text())
        .take(MAX_NARRATED_ELEMENTS)
        .collect();
    if narrated.is_empty() {
        out.push_str("(none)\n");
    }
    for (rank, element) in narrated.iter().enumerate() {
        let role = element
            .ui_element
            .as_ref()
            .map(|ui| ui.role.as_str())
            .unwrap_or("text");
        let label = element.label();
        let _ = write!(out, "{}. {role}", rank + 1);
        if !label.is_empty() {
            let _ = write!(out, " \"{label}\"");
        }
        match element.distance_to_pointer {
            Some(distance) => {
                let _ = writeln!(
                    out,
                    " (p={:.2}, {:.0}px from pointer)",
                    element.interaction_probability, distance
                );
            }
            None => {
                let _ = writeln!(out, " (p={:.2})", element.interaction_probability);
            }
        }
    }

    out.push_str("\n## Text\n");
    push_text_listing(&mut out, text_elements);
    out
}

fn push_text_listing(out: &mut String, text_elements: &[TextElement]) {
    if text_elements.is_empty() {
        out.push_str("(none)\n");
        return;
    }
    for text in text_elements.iter().take(MAX_TEXT_LINES) {
        let _ = writeln!(out, "- {}", text.text);
    }
    if text_elements.len() > MAX_TEXT_LINES {
        let _ = writeln!(out, "... ({} more)", text_elements.len() - MAX_TEXT_LINES);
    }
}
