//! 융합 결과 모델.

use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use super::text::TextElement;
use super::ui::UiElement;

/// UI 요소(선택)와 주변 텍스트를 묶은 상호작용 후보.
///
/// 사이클마다 통째로 교체되며 수정되지 않는다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedElement {
    /// 대응 UI 요소. None이면 독립 텍스트
    pub ui_element: Option<UiElement>,
    /// 근접 텍스트 조각
    pub associated_text: Vec<TextElement>,
    /// 포인터에서 요소 중심까지 거리 (픽셀). 포인터 위치를 모르면 None
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_to_pointer: Option<f64>,
    /// 상호작용 확률 (0.0 ~ 1.0)
    pub interaction_probability: f64,
}

impl FusedElement {
    /// 요소 경계. 독립 텍스트는 첫 텍스트의 경계
    pub fn bounds(&self) -> Option<Rect> {
        self.ui_element
            .as_ref()
            .map(|ui| ui.bounds)
            .or_else(|| self.associated_text.first().map(|t| t.bounds))
    }

    /// 사람이 읽을 수 있는 레이블
    pub fn label(&self) -> String {
        if let Some(text) = self.ui_element.as_ref().and_then(|ui| ui.display_text()) {
            return text.to_string();
        }
        self.associated_text
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_standalone_text(&self) -> bool {
        self.ui_element.is_none()
    }
}
