//! 융합 엔진.
//!
//! UI 요소와 근접 텍스트를 공간적으로 연결하고, 각 후보의
//! 상호작용 확률을 추정해 내림차순으로 정렬한다.
//!
//! 1. 면적이 있는 UI 요소마다 사각형 거리 ≤ 임계값인 텍스트를 연결
//! 2. 포인터-요소 중심 거리 계산 (포인터를 모르면 거리 없음, 근접 보너스 0)
//! 3. 역할 가중치 + 활성 상태 + 실행 가능 레이블 + 포인터 근접 보너스 합산 후 [0,1] 클램프
//! 4. 어느 UI 요소에도 연결되지 않은 텍스트는 독립 후보
//! 5. 안정 정렬 (동률이면 UI 요소가 독립 텍스트보다 앞)

use sightline_core::config::FusionConfig;
use sightline_core::models::fused::FusedElement;
use sightline_core::models::geometry::Point;
use sightline_core::models::text::TextElement;
use sightline_core::models::ui::UiElement;
use tracing::trace;

use crate::actionable::is_actionable_label;

/// 융합 엔진
#[derive(Debug, Clone, Default)]
pub struct FusionEngine {
    config: FusionConfig,
}

impl FusionEngine {
    pub fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// UI 요소 + 텍스트 + 포인터 → 확률 내림차순 후보 목록
    pub fn fuse(
        &self,
        ui_elements: &[UiElement],
        text_elements: &[TextElement],
        pointer: impl Into<Option<Point>>,
    ) -> Vec<FusedElement> {
        let pointer: Option<Point> = pointer.into();
        let mut claimed = vec![false; text_elements.len()];
        let mut fused = Vec::with_capacity(ui_elements.len() + text_elements.len());

        for ui in ui_elements.iter().filter(|ui| !ui.bounds.is_empty()) {
            let mut associated = Vec::new();
            for (idx, text) in text_elements.iter().enumerate() {
                if ui.bounds.distance_to(&text.bounds) <= self.config.proximity_threshold_px {
                    claimed[idx] = true;
                    associated.push(text.clone());
                }
            }

            let distance = pointer.map(|p| p.distance_to(ui.bounds.center()));
            let probability = self.score_ui(ui, &associated, distance);
            trace!(
                role = ui.role.as_str(),
                texts = associated.len(),
                ?distance,
                probability,
                "UI 후보"
            );

            fused.push(FusedElement {
                ui_element: Some(ui.clone()),
                associated_text: associated,
                distance_to_pointer: distance,
                interaction_probability: probability,
            });
        }

        for (text, _) in text_elements
            .iter()
            .zip(claimed.iter())
            .filter(|(_, claimed)| !**claimed)
        {
            let probability = if self.is_actionable(text) {
                self.config.standalone_actionable_probability
            } else {
                self.config.standalone_probability
            };
            fused.push(FusedElement {
                ui_element: None,
                associated_text: vec![text.clone()],
                distance_to_pointer: pointer.map(|p| p.distance_to(text.bounds.center())),
                interaction_probability: probability.clamp(0.0, 1.0),
            });
        }

        // sort_by는 안정 정렬
        fused.sort_by(|a, b| {
            b.interaction_probability
                .total_cmp(&a.interaction_probability)
        });
        fused
    }

    /// UI 요소 후보 점수
    fn score_ui(&self, ui: &UiElement, associated: &[TextElement], distance: Option<f64>) -> f64 {
        let cfg = &self.config;
        let mut score = cfg.role_weights.weight(ui.role);

        score += match ui.enabled {
            Some(true) => cfg.enabled_bonus,
            Some(false) => -cfg.disabled_penalty,
            None => 0.0,
        };

        for text in associated.iter().filter(|t| self.is_actionable(t)) {
            score += cfg.actionable_label_bonus;
            if text.confidence > cfg.high_confidence_threshold {
                score += cfg.high_confidence_bonus;
            }
        }

        score += distance.map_or(0.0, |d| self.pointer_bonus(d));
        score.clamp(0.0, 1.0)
    }

    /// max(0, (반경 - 거리) / 반경) × 가중치
    fn pointer_bonus(&self, distance: f64) -> f64 {
        let radius = self.config.pointer_radius_px;
        ((radius - distance) / radius).max(0.0) * self.config.pointer_weight
    }

    fn is_actionable(&self, text: &TextElement) -> bool {
        is_actionable_label(&text.text, self.config.max_label_chars)
    }
}
