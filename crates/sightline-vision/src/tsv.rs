//! Tesseract TSV 출력 파서.
//!
//! 열 순서: `level page_num block_num par_num line_num word_num left top width height conf text`.
//! 단어 행(level 5)만 사용하며 신뢰도 0~100을 0~1로 변환한다.

use sightline_core::models::geometry::Rect;

/// 단어 행 레벨
const WORD_LEVEL: u32 = 5;

/// TSV 열 개수
const COLUMN_COUNT: usize = 12;

/// 줄 식별자 (page, block, paragraph, line)
pub type LineKey = (u32, u32, u32, u32);

/// OCR 단어(또는 병합된 줄) + 바운딩 박스
#[derive(Debug, Clone, PartialEq)]
pub struct OcrWord {
    pub text: String,
    /// 신뢰도 (0.0 ~ 1.0)
    pub confidence: f64,
    /// 처리 이미지 픽셀 좌표 기준 박스
    pub bounds: Rect,
    pub line: LineKey,
}

/// TSV 문자열에서 단어 목록 추출.
///
/// 헤더, 비단어 행, 빈 텍스트, 음수 신뢰도, 형식이 깨진 행은 건너뛴다.
pub fn parse_tsv(tsv: &str) -> Vec<OcrWord> {
    tsv.lines().filter_map(parse_row).collect()
}

fn parse_row(row: &str) -> Option<OcrWord> {
    let cols: Vec<&str> = row.splitn(COLUMN_COUNT, '\t').collect();
    if cols.len() < COLUMN_COUNT {
        return None;
    }

    let level: u32 = cols[0].parse().ok()?;
    if level != WORD_LEVEL {
        return None;
    }

    let text = cols[11].trim();
    if text.is_empty() {
        return None;
    }

    let conf: f64 = cols[10].trim().parse().ok()?;
    if conf < 0.0 {
        return None;
    }

    let num = |i: usize| cols[i].trim().parse::<u32>().ok();
    let px = |i: usize| cols[i].trim().parse::<f64>().ok();

    Some(OcrWord {
        text: text.to_string(),
        confidence: (conf / 100.0).clamp(0.0, 1.0),
        bounds: Rect::new(px(6)?, px(7)?, px(8)?, px(9)?),
        line: (num(1)?, num(2)?, num(3)?, num(4)?),
    })
}

/// 같은 줄의 단어를 하나로 병합.
///
/// 텍스트는 공백으로 잇고, 박스는 합집합, 신뢰도는 평균.
/// 결과 순서는 각 줄이 처음 등장한 순서를 따른다.
pub fn merge_lines(words: Vec<OcrWord>) -> Vec<OcrWord> {
    let mut lines: Vec<(OcrWord, usize)> = Vec::new();

    for word in words {
        match lines.iter_mut().find(|(line, _)| line.line == word.line) {
            Some((line, count)) => {
                line.text.push(' ');
                line.text.push_str(&word.text);
                line.bounds = line.bounds.union(&word.bounds);
                line.confidence += word.confidence;
                *count += 1;
            }
            None => lines.push((word, 1)),
        }
    }

    lines
        .into_iter()
        .map(|(mut line, count)| {
            line.confidence /= count as f64;
            line
        })
        .collect()
}
