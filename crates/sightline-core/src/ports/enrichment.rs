//! 설명 보강(enrichment) 포트.
//!
//! 기본 설명과 보조 신호를 받아 의미적으로 보강된 설명을 만든다.
//! 최선 노력(best-effort)이며 시간 압박 시 통째로 생략될 수 있다.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::frame::{CaptureMetadata, RawImage};
use crate::models::text::TextElement;
use crate::models::topology::WindowStructure;
use crate::models::ui::UiElement;

/// 보강 요청 (읽기 전용 입력)
#[derive(Debug, Clone, Copy)]
pub struct EnrichmentRequest<'a> {
    pub base_description: &'a str,
    pub image: &'a Arc<RawImage>,
    pub metadata: &'a CaptureMetadata,
    pub text_elements: &'a [TextElement],
    pub windows: &'a WindowStructure,
    pub ui_elements: &'a [UiElement],
}

/// 설명 보강기
///
/// 구현체는 자체적으로 지연 시간을 제한해야 한다.
#[async_trait]
pub trait Enricher: Send + Sync {
    /// 보강된 설명 반환
    async fn enhance(&self, request: EnrichmentRequest<'_>) -> Result<String, CoreError>;

    /// 보강기 이름 (예: "heuristic")
    fn name(&self) -> &str;
}
