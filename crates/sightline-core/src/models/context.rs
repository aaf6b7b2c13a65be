//! 사이클 결과 집계 모델.
//!
//! `ScreenContext`는 캐시 단위이자 구독자에게 발행되는 단위다.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::frame::{CaptureMetadata, RawImage};
use super::fused::FusedElement;
use super::text::TextElement;
use super::topology::WindowStructure;
use super::ui::UiElement;

/// 설명 생성 전략 (예산 컨트롤러가 선택)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptionStrategy {
    /// 구조화 설명 + 보강
    Enrich,
    /// 구조화 설명만
    Base,
    /// 텍스트 목록만
    Fast,
}

impl fmt::Display for DescriptionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DescriptionStrategy::Enrich => "enrich",
            DescriptionStrategy::Base => "base",
            DescriptionStrategy::Fast => "fast",
        };
        f.write_str(s)
    }
}

/// 보강 생략 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// 예산 컨트롤러가 Base 선택
    BudgetBase,
    /// 예산 컨트롤러가 Fast 선택
    BudgetFast,
    /// 설정으로 비활성화
    Disabled,
    /// 보강 어댑터 미구성
    Unavailable,
    /// 캐시 적중으로 사이클 생략
    CacheHit,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::BudgetBase => "budget_base",
            SkipReason::BudgetFast => "budget_fast",
            SkipReason::Disabled => "disabled",
            SkipReason::Unavailable => "unavailable",
            SkipReason::CacheHit => "cache_hit",
        };
        f.write_str(s)
    }
}

/// 보강 실패 사유
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// 마이크로 타임아웃 초과
    TimedOut { timeout_ms: u64 },
    /// 어댑터 에러
    Error { message: String },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::TimedOut { timeout_ms } => write!(f, "timed_out({timeout_ms}ms)"),
            FailureReason::Error { message } => write!(f, "error({message})"),
        }
    }
}

/// 보강 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EnrichmentOutcome {
    Enriched { description: String },
    Skipped { reason: SkipReason },
    Failed { reason: FailureReason },
}

impl EnrichmentOutcome {
    pub fn is_enriched(&self) -> bool {
        matches!(self, EnrichmentOutcome::Enriched { .. })
    }
}

/// 한 사이클의 집계 결과
#[derive(Clone, Serialize, Deserialize)]
pub struct ScreenContext {
    /// 컨텍스트 고유 ID
    pub context_id: String,
    /// 생성 사이클 번호
    pub cycle_id: u64,
    /// 생성 완료 시각
    pub timestamp: DateTime<Utc>,
    /// 캡처 메타데이터
    pub metadata: CaptureMetadata,
    /// 최종 설명 문자열
    pub description: String,
    /// 사용된 설명 전략
    pub strategy: DescriptionStrategy,
    /// 보강 결과
    pub enrichment: EnrichmentOutcome,
    /// 인식된 텍스트 원본
    pub text_elements: Vec<TextElement>,
    /// 추출된 UI 요소 원본
    pub ui_elements: Vec<UiElement>,
    /// 토폴로지 스냅샷
    pub topology: WindowStructure,
    /// 확률 내림차순으로 정렬된 융합 요소
    pub fused_elements: Vec<FusedElement>,
    /// 사이클 처리 시간 (밀리초)
    pub processing_ms: f64,
    /// 원본 프레임 (직렬화 제외)
    #[serde(skip)]
    pub frame: Option<Arc<RawImage>>,
}

impl ScreenContext {
    /// 가장 상호작용 가능성이 높은 요소
    pub fn top_element(&self) -> Option<&FusedElement> {
        self.fused_elements.first()
    }
}

impl fmt::Debug for ScreenContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenContext")
            .field("context_id", &self.context_id)
            .field("cycle_id", &self.cycle_id)
            .field("app_id", &self.metadata.app_id)
            .field("strategy", &self.strategy)
            .field("text_elements", &self.text_elements.len())
            .field("ui_elements", &self.ui_elements.len())
            .field("fused_elements", &self.fused_elements.len())
            .field("processing_ms", &self.processing_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enrichment_outcome_is_tagged() {
        let outcome = EnrichmentOutcome::Failed {
            reason: FailureReason::TimedOut { timeout_ms: 300 },
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"status\":\"failed\""));
        assert!(json.contains("\"kind\":\"timed_out\""));
        let back: EnrichmentOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outcome);
    }

    #[test]
    fn strategy_display() {
        assert_eq!(DescriptionStrategy::Enrich.to_string(), "enrich");
        assert_eq!(SkipReason::BudgetFast.to_string(), "budget_fast");
        assert_eq!(
            FailureReason::Error {
                message: "boom".into()
            }
            .to_string(),
            "error(boom)"
        );
    }
}
