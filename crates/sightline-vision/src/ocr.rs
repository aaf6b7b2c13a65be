//! Tesseract OCR 엔진 래퍼.
//!
//! `leptess` 기반. `ocr` feature flag 활성화 시에만 빌드된다.
//! Tesseract 호출은 블로킹이므로 블로킹 스레드에서 실행하고,
//! 한 번에 하나의 인식 작업만 돌린다. 엔진 인스턴스는 첫 호출에 만들어
//! 이후 호출에서 재사용한다.

use std::path::PathBuf;
use std::sync::Arc;

use leptess::LepTess;
use parking_lot::Mutex;
use sightline_core::blocking::SingleFlight;
use sightline_core::config::{RecognitionLevel, TextRecognitionConfig};
use sightline_core::error::CoreError;
use thiserror::Error;
use tracing::{debug, info};

use crate::preprocess::PreparedImage;

/// OCR 에러 타입
#[derive(Debug, Error)]
pub enum OcrError {
    /// Tesseract 초기화 실패
    #[error("OCR 초기화 실패: {0}")]
    Init(String),

    /// 이미지 설정 실패
    #[error("OCR 이미지 설정 실패: {0}")]
    ImageSetup(String),

    /// 텍스트 추출 실패
    #[error("OCR 텍스트 추출 실패: {0}")]
    Extraction(String),

    /// 빈 이미지 입력
    #[error("빈 이미지: 너비 또는 높이가 0")]
    EmptyImage,

    /// 비동기 작업 실패
    #[error("OCR 비동기 작업 실패: {0}")]
    Async(String),
}

impl From<OcrError> for CoreError {
    fn from(e: OcrError) -> Self {
        CoreError::OcrError(e.to_string())
    }
}

/// Tesseract 페이지 분할 모드
fn page_seg_mode(level: RecognitionLevel) -> &'static str {
    match level {
        // 화면 캡처는 흩어진 짧은 텍스트가 대부분
        RecognitionLevel::Fast => "11",
        RecognitionLevel::Accurate => "3",
    }
}

/// Tesseract 엔진
pub struct TesseractEngine {
    /// Tesseract 데이터 경로 (None이면 시스템 기본값)
    tessdata_path: Option<PathBuf>,
    /// "eng+kor" 형식 언어 코드
    languages: String,
    level: RecognitionLevel,
    /// 재사용하는 Tesseract 인스턴스. 첫 인식 때 생성
    api: Arc<Mutex<Option<LepTess>>>,
    gate: SingleFlight,
}

impl TesseractEngine {
    pub fn new(config: &TextRecognitionConfig) -> Self {
        let languages = if config.languages.is_empty() {
            "eng".to_string()
        } else {
            config.languages.join("+")
        };
        Self {
            tessdata_path: config.tessdata_path.clone(),
            languages,
            level: config.level,
            api: Arc::new(Mutex::new(None)),
            gate: SingleFlight::new("ocr"),
        }
    }

    pub fn languages(&self) -> &str {
        &self.languages
    }

    /// 이미지에서 TSV 출력 추출 (비동기).
    ///
    /// 이전 인식이 아직 끝나지 않았으면 `Ok(None)`.
    pub async fn recognize_tsv(&self, prepared: PreparedImage) -> Result<Option<String>, OcrError> {
        let (w, h) = prepared.image.dimensions();
        if w == 0 || h == 0 {
            return Err(OcrError::EmptyImage);
        }

        let tessdata = self
            .tessdata_path
            .as_ref()
            .map(|p| p.to_string_lossy().to_string());
        let languages = self.languages.clone();
        let psm = page_seg_mode(self.level);
        let raw_data = prepared.image.into_raw();

        let api = Arc::clone(&self.api);

        let outcome = self
            .gate
            .run(move || {
                let mut slot = api.lock();
                if slot.is_none() {
                    *slot = Some(init_engine(tessdata.as_deref(), &languages, psm)?);
                }
                let Some(lt) = slot.as_mut() else {
                    return Err(OcrError::Init("엔진 인스턴스 없음".to_string()));
                };

                lt.set_image_from_mem(&raw_data, w as i32, h as i32, 4, (w * 4) as i32)
                    .map_err(|_| OcrError::ImageSetup("이미지 메모리 설정 실패".to_string()))?;

                let tsv = lt
                    .get_tsv_text(0)
                    .map_err(|e| OcrError::Extraction(format!("{e}")))?;

                debug!("OCR TSV 추출 완료: {}x{}, {}바이트", w, h, tsv.len());
                Ok(tsv)
            })
            .await
            .map_err(|e| OcrError::Async(e.to_string()))?;

        outcome.transpose()
    }
}

fn init_engine(tessdata: Option<&str>, languages: &str, psm: &str) -> Result<LepTess, OcrError> {
    let mut lt = LepTess::new(tessdata, languages).map_err(|e| OcrError::Init(format!("{e}")))?;
    lt.set_variable(leptess::Variable::TesseditPagesegMode, psm)
        .map_err(|e| OcrError::Init(format!("{e}")))?;
    info!(languages, psm, "Tesseract 엔진 초기화");
    Ok(lt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    #[test]
    fn error_display_messages() {
        assert!(OcrError::Init("x".into()).to_string().contains("초기화"));
        assert!(OcrError::EmptyImage.to_string().contains("빈 이미지"));
        let core: CoreError = OcrError::Extraction("x".into()).into();
        assert!(matches!(core, CoreError::OcrError(_)));
    }

    #[test]
    fn languages_are_joined() {
        let config = TextRecognitionConfig {
            languages: vec!["eng".into(), "kor".into()],
            ..Default::default()
        };
        assert_eq!(TesseractEngine::new(&config).languages(), "eng+kor");

        let empty = TextRecognitionConfig {
            languages: vec![],
            ..Default::default()
        };
        assert_eq!(TesseractEngine::new(&empty).languages(), "eng");
    }

    #[tokio::test]
    async fn empty_image_returns_error() {
        let engine = TesseractEngine::new(&TextRecognitionConfig::default());
        let prepared = PreparedImage {
            image: RgbaImage::new(0, 0),
            scale: 1.0,
        };
        let result = engine.recognize_tsv(prepared).await;
        assert!(matches!(result, Err(OcrError::EmptyImage)));
    }
}
