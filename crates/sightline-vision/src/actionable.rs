//! 실행 가능 레이블 판별.
//!
//! 버튼 레이블로 흔히 쓰이는 짧은 동작 어휘(다국어)와 비교한다.

use std::collections::HashSet;

use once_cell::sync::Lazy;

/// 단독으로 쓰이는 동작 어휘 (소문자)
static ACTION_VOCABULARY: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // English
        "ok", "okay", "yes", "no", "submit", "cancel", "save", "apply", "close", "done",
        "next", "back", "previous", "continue", "confirm", "accept", "decline", "allow",
        "deny", "open", "send", "delete", "remove", "add", "create", "new", "edit",
        "update", "upload", "download", "install", "sign", "log", "login", "logout",
        "signin", "signup", "register", "search", "go", "run", "start", "stop", "retry",
        "skip", "finish", "reply", "forward", "share", "copy", "paste", "cut", "undo",
        "redo", "print", "export", "import", "refresh", "reload", "play", "pause",
        "subscribe", "follow", "buy", "checkout", "pay", "agree", "dismiss", "got it",
        "learn more", "view", "show", "hide", "select", "choose", "browse", "attach",
        "post", "publish", "commit", "merge", "approve", "reject", "discard", "keep",
        "replace", "rename", "move", "enable", "disable", "connect", "join", "leave",
        // 한국어
        "확인", "취소", "저장", "저장하기", "적용", "닫기", "완료", "다음", "이전", "계속",
        "예", "아니요", "아니오", "보내기", "전송", "삭제", "추가", "만들기", "편집", "수정",
        "열기", "검색", "로그인", "로그아웃", "회원가입", "동의", "허용", "거부", "제출",
        "업로드", "다운로드", "설치", "시작", "중지", "재시도", "건너뛰기", "복사", "붙여넣기",
        "공유", "답장", "구매", "결제", "새로고침",
        // 日本語
        "保存", "キャンセル", "閉じる", "送信", "削除", "追加", "編集", "開く", "検索",
        "次へ", "戻る", "完了", "適用", "はい", "いいえ", "ログイン", "ログアウト", "同意",
        "続行", "更新", "作成", "共有", "コピー",
        // 中文
        "确定", "取消", "提交", "关闭", "删除", "添加", "编辑", "打开", "搜索", "下一步",
        "上一步", "登录", "注册", "发送", "确认", "应用", "完成", "是", "否", "分享",
        // Deutsch / Français / Español
        "abbrechen", "speichern", "schließen", "weiter", "zurück", "senden", "löschen",
        "annuler", "enregistrer", "fermer", "suivant", "envoyer", "supprimer", "valider",
        "cancelar", "guardar", "cerrar", "siguiente", "enviar", "eliminar", "aceptar",
    ]
    .into_iter()
    .collect()
});

/// 여러 단어 레이블에서 허용하는 최대 단어 수 ("Add to cart")
const MAX_PHRASE_WORDS: usize = 3;

/// 레이블 끝에 붙는 장식 문자
const TRAILING_DECORATION: &[char] = &['.', '…', ':', '!', '?', '>', '›', '→', '»'];
const LEADING_DECORATION: &[char] = &['<', '‹', '←', '«'];

/// 실행 가능 레이블처럼 보이는지 판별.
///
/// 정규화(소문자, 앞뒤 장식 제거) 후 어휘에 정확히 일치하거나,
/// `MAX_PHRASE_WORDS` 이하 단어로 된 구의 첫 단어가 어휘에 있으면 true.
pub fn is_actionable_label(text: &str, max_chars: usize) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.chars().count() > max_chars {
        return false;
    }

    let normalized = trimmed
        .trim_end_matches(TRAILING_DECORATION)
        .trim_start_matches(LEADING_DECORATION)
        .trim()
        .to_lowercase();
    if normalized.is_empty() {
        return false;
    }

    if ACTION_VOCABULARY.contains(normalized.as_str()) {
        return true;
    }

    let words: Vec<&str> = normalized.split_whitespace().collect();
    words.len() <= MAX_PHRASE_WORDS
        && words
            .first()
            .is_some_and(|first| ACTION_VOCABULARY.contains(first))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_labels() {
        for label in ["OK", "Submit", "Cancel", "  Save  ", "Next >", "Open…", "Sign in"] {
            assert!(is_actionable_label(label, 32), "{label}");
        }
    }

    #[test]
    fn localized_labels() {
        for label in ["확인", "취소", "キャンセル", "保存", "确定", "Abbrechen", "Enregistrer"] {
            assert!(is_actionable_label(label, 32), "{label}");
        }
    }

    #[test]
    fn sentences_and_long_text_are_not_labels() {
        assert!(!is_actionable_label("Save the file before closing it", 32));
        assert!(!is_actionable_label("fn main() {", 32));
        assert!(!is_actionable_label("Quarterly revenue", 32));
        assert!(!is_actionable_label("", 32));
        assert!(!is_actionable_label("...", 32));
        assert!(!is_actionable_label("Submit", 3));
    }
}
