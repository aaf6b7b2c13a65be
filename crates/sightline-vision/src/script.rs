//! 문자 체계(script) 분류.
//!
//! 글리프(알파벳성 문자)만 세며 공백, 숫자, 구두점은 제외한다.
//! 한 문자 체계가 글리프의 과반을 넘으면 그 체계, 아니면 `Mixed`.

use sightline_core::models::text::ScriptTag;

/// 문자 하나의 문자 체계. 분류 불가 글리프는 None
fn script_of(c: char) -> Option<ScriptTag> {
    let tag = match c as u32 {
        0x41..=0x5A | 0x61..=0x7A => ScriptTag::Latin,
        0xC0..=0x24F if c != '\u{D7}' && c != '\u{F7}' => ScriptTag::Latin,
        0x1E00..=0x1EFF => ScriptTag::Latin,
        0x370..=0x3FF => ScriptTag::Greek,
        0x400..=0x4FF => ScriptTag::Cyrillic,
        0x590..=0x5FF => ScriptTag::Hebrew,
        0x600..=0x6FF => ScriptTag::Arabic,
        0x900..=0x97F => ScriptTag::Devanagari,
        0xE00..=0xE7F => ScriptTag::Thai,
        0x1100..=0x11FF | 0x3130..=0x318F | 0xAC00..=0xD7A3 => ScriptTag::Hangul,
        0x3040..=0x30FF | 0x31F0..=0x31FF => ScriptTag::Kana,
        0x3400..=0x4DBF | 0x4E00..=0x9FFF | 0xF900..=0xFAFF => ScriptTag::Han,
        _ => return None,
    };
    Some(tag)
}

/// 텍스트의 지배적 문자 체계 분류
pub fn classify_script(text: &str) -> ScriptTag {
    let mut counts: Vec<(ScriptTag, usize)> = Vec::new();
    let mut glyphs = 0usize;

    for c in text.chars().filter(|c| c.is_alphabetic()) {
        glyphs += 1;
        if let Some(tag) = script_of(c) {
            match counts.iter_mut().find(|(t, _)| *t == tag) {
                Some((_, n)) => *n += 1,
                None => counts.push((tag, 1)),
            }
        }
    }

    if glyphs == 0 {
        return ScriptTag::Unknown;
    }

    counts
        .into_iter()
        .find(|(_, n)| n * 2 > glyphs)
        .map(|(tag, _)| tag)
        .unwrap_or(ScriptTag::Mixed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_script_texts() {
        assert_eq!(classify_script("Submit"), ScriptTag::Latin);
        assert_eq!(classify_script("저장하기"), ScriptTag::Hangul);
        assert_eq!(classify_script("保存"), ScriptTag::Han);
        assert_eq!(classify_script("キャンセル"), ScriptTag::Kana);
        assert_eq!(classify_script("Отмена"), ScriptTag::Cyrillic);
        assert_eq!(classify_script("Café résumé"), ScriptTag::Latin);
    }

    #[test]
    fn digits_and_punctuation_are_not_glyphs() {
        assert_eq!(classify_script("12:45: 3.5%"), ScriptTag::Unknown);
        assert_eq!(classify_script("OK 100%"), ScriptTag::Latin);
    }

    #[test]
    fn majority_must_exceed_half() {
        // 2 Latin + 2 Hangul → 과반 없음
        assert_eq!(classify_script("OK 확인"), ScriptTag::Mixed);
        // 3 Latin + 2 Hangul → Latin
        assert_eq!(classify_script("Yes 확인"), ScriptTag::Latin);
    }

    #[test]
    fn japanese_mixed_kanji_and_kana() {
        // 漢字 2 + かな 2 → 과반 없음
        assert_eq!(classify_script("保存する"), ScriptTag::Mixed);
    }

    #[test]
    fn empty_text_is_unknown() {
        assert_eq!(classify_script(""), ScriptTag::Unknown);
        assert_eq!(classify_script("   "), ScriptTag::Unknown);
    }
}
