//! UI 트리 추출 포트.
//!
//! OS 접근성 API에서 상호작용/구조 노드를 평탄화된 목록으로 가져온다.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::ui::UiElement;

/// UI 트리 추출기
///
/// 구현체: `AccessibilityTreeExtractor` (`sightline-monitor`)
#[async_trait]
pub trait UiTreeExtractor: Send + Sync {
    /// 애플리케이션의 UI 노드 목록 추출.
    ///
    /// 접근 가능한 트리가 없는 앱은 빈 목록을 반환한다 (에러 아님).
    async fn extract(&self, app_id: &str) -> Result<Vec<UiElement>, CoreError>;

    /// 추출기 이름 (예: "accessibility")
    fn name(&self) -> &str;
}
