//! 로컬 텍스트 인식기: Tesseract 래퍼.
//!
//! 인식 결과를 `TextElement`로 변환한다. 신뢰도 필터, 줄 병합,
//! 프레임 좌표 복원, 문자 체계 분류를 여기서 처리한다.
//! `ocr` feature 비활성화 시 항상 빈 목록을 반환한다.

use std::sync::Arc;

use async_trait::async_trait;
use sightline_core::config::{RecognitionLevel, TextRecognitionConfig};
use sightline_core::error::CoreError;
use sightline_core::models::frame::RawImage;
use sightline_core::models::geometry::Rect;
use sightline_core::models::text::TextElement;
use sightline_core::ports::text_recognizer::TextRecognizer;
use tracing::debug;

use crate::script::classify_script;
use crate::tsv::{merge_lines, OcrWord};

/// 로컬 텍스트 인식기 (Tesseract 기반)
pub struct OcrTextRecognizer {
    config: TextRecognitionConfig,
    #[cfg(feature = "ocr")]
    engine: crate::ocr::TesseractEngine,
}

impl OcrTextRecognizer {
    pub fn new(config: TextRecognitionConfig) -> Self {
        Self {
            #[cfg(feature = "ocr")]
            engine: crate::ocr::TesseractEngine::new(&config),
            config,
        }
    }
}

#[async_trait]
impl TextRecognizer for OcrTextRecognizer {
    async fn recognize(&self, image: Arc<RawImage>) -> Result<Vec<TextElement>, CoreError> {
        if image.is_empty() {
            return Ok(Vec::new());
        }

        #[cfg(feature = "ocr")]
        {
            let prepared = crate::preprocess::prepare(&image, self.config.level)?;
            let scale = prepared.scale;
            let Some(tsv) = self.engine.recognize_tsv(prepared).await? else {
                debug!("이전 텍스트 인식 진행 중, 이번 프레임은 빈 결과");
                return Ok(Vec::new());
            };
            let words = crate::tsv::parse_tsv(&tsv);
            let elements = to_text_elements(words, &self.config, scale);
            debug!(
                "텍스트 인식 완료: {}개 요소 (level={:?})",
                elements.len(),
                self.config.level
            );
            Ok(elements)
        }

        #[cfg(not(feature = "ocr"))]
        {
            debug!(
                "ocr feature 비활성화, 빈 결과 반환 ({}x{})",
                image.width, image.height
            );
            Ok(Vec::new())
        }
    }

    fn provider_name(&self) -> &str {
        "local-tesseract"
    }

    fn level(&self) -> RecognitionLevel {
        self.config.level
    }
}

/// OCR 단어 목록 → `TextElement` 변환.
///
/// `word_level_boxes`가 false면 줄 단위로 병합한 뒤 필터링한다.
/// `scale`은 처리 이미지 좌표를 프레임 좌표로 되돌리는 배율.
pub fn to_text_elements(
    words: Vec<OcrWord>,
    config: &TextRecognitionConfig,
    scale: f64,
) -> Vec<TextElement> {
    let units = if config.word_level_boxes {
        words
    } else {
        merge_lines(words)
    };

    units
        .into_iter()
        .filter(|w| w.confidence >= config.min_confidence)
        .map(|w| {
            let text = w.text.trim().to_string();
            TextElement {
                language: classify_script(&text),
                text,
                confidence: w.confidence,
                bounds: Rect::new(
                    w.bounds.x * scale,
                    w.bounds.y * scale,
                    w.bounds.width * scale,
                    w.bounds.height * scale,
                ),
            }
        })
        .filter(|t| !t.text.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sightline_core::models::text::ScriptTag;

    fn word(text: &str, conf: f64, x: f64, line: u32) -> OcrWord {
        OcrWord {
            text: text.to_string(),
            confidence: conf,
            bounds: Rect::new(x, 10.0, 40.0, 20.0),
            line: (1, 1, 1, line),
        }
    }

    #[test]
    fn provider_name_and_level() {
        let recognizer = OcrTextRecognizer::new(TextRecognitionConfig {
            level: RecognitionLevel::Accurate,
            ..Default::default()
        });
        assert_eq!(recognizer.provider_name(), "local-tesseract");
        assert_eq!(recognizer.level(), RecognitionLevel::Accurate);
    }

    #[tokio::test]
    async fn empty_frame_yields_empty_list() {
        let recognizer = OcrTextRecognizer::new(TextRecognitionConfig::default());
        let image = Arc::new(RawImage::filled(0, 0, [0, 0, 0, 0]));
        let result = recognizer.recognize(image).await.unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn line_mode_merges_then_filters() {
        let words = vec![
            word("Sign", 0.9, 10.0, 1),
            word("in", 0.8, 55.0, 1),
            word("~~", 0.1, 10.0, 2),
        ];
        let config = TextRecognitionConfig::default();
        let elements = to_text_elements(words, &config, 1.0);

        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].text, "Sign in");
        assert_eq!(elements[0].language, ScriptTag::Latin);
        assert_eq!(elements[0].bounds, Rect::new(10.0, 10.0, 85.0, 20.0));
    }

    #[test]
    fn word_mode_keeps_words_and_scales_boxes() {
        let words = vec![word("저장", 0.95, 10.0, 1), word("OK", 0.95, 60.0, 1)];
        let config = TextRecognitionConfig {
            word_level_boxes: true,
            ..Default::default()
        };
        let elements = to_text_elements(words, &config, 2.0);

        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].language, ScriptTag::Hangul);
        assert_eq!(elements[1].bounds, Rect::new(120.0, 20.0, 80.0, 40.0));
    }
}
