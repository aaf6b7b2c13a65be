//! # sightline-vision
//!
//! 화면 비전 어댑터 크레이트.
//! 스크린 캡처, Tesseract 텍스트 인식, 문자 체계 분류,
//! UI 요소-텍스트 융합 엔진, 휴리스틱 설명 보강을 담당한다.

pub mod actionable;
pub mod capture;
pub mod enrichment;
pub mod fusion;
#[cfg(feature = "ocr")]
pub mod ocr;
pub mod preprocess;
pub mod script;
pub mod text_recognition;
pub mod tsv;
