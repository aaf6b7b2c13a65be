//! 텍스트 인식 포트.
//!
//! 내장 Tesseract 등 OCR 엔진을 추상화한다. 인식 수준(빠름/정확)과
//! 단어 단위 박스 여부는 `TextRecognitionConfig` 플래그로 구분하며,
//! 별도 타입을 두지 않는다.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::RecognitionLevel;
use crate::error::CoreError;
use crate::models::frame::RawImage;
use crate::models::text::TextElement;

/// 텍스트 인식기
///
/// 구현체: `OcrTextRecognizer` (Tesseract)
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// 프레임에서 텍스트 + 바운딩 박스 추출.
    ///
    /// 읽을 수 있는 텍스트가 없으면 빈 목록을 반환한다 (에러 아님).
    async fn recognize(&self, image: Arc<RawImage>) -> Result<Vec<TextElement>, CoreError>;

    /// 제공자 이름 (예: "local-tesseract")
    fn provider_name(&self) -> &str;

    /// 현재 인식 수준
    fn level(&self) -> RecognitionLevel;
}
