//! 인식된 텍스트 모델.

use serde::{Deserialize, Serialize};

use super::geometry::Rect;

/// 텍스트의 지배적 문자 체계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptTag {
    Latin,
    Hangul,
    Han,
    Kana,
    Cyrillic,
    Greek,
    Arabic,
    Hebrew,
    Thai,
    Devanagari,
    /// 과반을 넘는 문자 체계가 없음
    Mixed,
    /// 글리프 없음 (숫자/기호만)
    #[default]
    Unknown,
}

impl ScriptTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptTag::Latin => "latin",
            ScriptTag::Hangul => "hangul",
            ScriptTag::Han => "han",
            ScriptTag::Kana => "kana",
            ScriptTag::Cyrillic => "cyrillic",
            ScriptTag::Greek => "greek",
            ScriptTag::Arabic => "arabic",
            ScriptTag::Hebrew => "hebrew",
            ScriptTag::Thai => "thai",
            ScriptTag::Devanagari => "devanagari",
            ScriptTag::Mixed => "mixed",
            ScriptTag::Unknown => "unknown",
        }
    }
}

/// 텍스트 인식 결과 한 조각. 생성 후 불변.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    /// 인식된 문자열
    pub text: String,
    /// 인식 신뢰도 (0.0 ~ 1.0)
    pub confidence: f64,
    /// 프레임 픽셀 좌표 기준 바운딩 박스
    pub bounds: Rect,
    /// 감지된 문자 체계
    #[serde(default)]
    pub language: ScriptTag,
}
