//! 휴리스틱 설명 보강기.
//!
//! 앱 식별자, 창 제목, 텍스트 어휘, UI 구조로 장면(scene)과 레이아웃을
//! 분류하고 간단한 인사이트를 덧붙인다. ML 분류기 없이 동작하는
//! `Enricher` 기본 구현이다.
//!
//! 분석은 블로킹 스레드에서 실행하고 자체 타임아웃으로 제한한다.
//! 레이아웃 분석 대상은 [`MAX_LAYOUT_ELEMENTS`]개까지만 본다.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sightline_core::error::CoreError;
use sightline_core::models::frame::CaptureMetadata;
use sightline_core::models::geometry::Point;
use sightline_core::models::text::TextElement;
use sightline_core::models::ui::{UiElement, UiRole};
use sightline_core::ports::enrichment::{Enricher, EnrichmentRequest};
use tracing::debug;

use crate::actionable::is_actionable_label;

/// 장면 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scene {
    CodeEditor,
    Terminal,
    Browser,
    Document,
    Spreadsheet,
    Chat,
    Email,
    Form,
    Dialog,
    Media,
    Unknown,
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Scene::CodeEditor => "code_editor",
            Scene::Terminal => "terminal",
            Scene::Browser => "browser",
            Scene::Document => "document",
            Scene::Spreadsheet => "spreadsheet",
            Scene::Chat => "chat",
            Scene::Email => "email",
            Scene::Form => "form",
            Scene::Dialog => "dialog",
            Scene::Media => "media",
            Scene::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// 레이아웃 패턴
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutPattern {
    Form,
    Toolbar,
    List,
    Dialog,
    Dense,
    Sparse,
}

impl fmt::Display for LayoutPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LayoutPattern::Form => "form",
            LayoutPattern::Toolbar => "toolbar",
            LayoutPattern::List => "list",
            LayoutPattern::Dialog => "dialog",
            LayoutPattern::Dense => "dense",
            LayoutPattern::Sparse => "sparse",
        };
        f.write_str(s)
    }
}

/// 앱 식별자/창 제목 키워드 → 장면 (앞선 항목 우선)
const APP_SCENE_KEYWORDS: &[(&str, Scene)] = &[
    ("code", Scene::CodeEditor),
    ("intellij", Scene::CodeEditor),
    ("pycharm", Scene::CodeEditor),
    ("xcode", Scene::CodeEditor),
    ("sublime", Scene::CodeEditor),
    ("vim", Scene::CodeEditor),
    ("dev.zed", Scene::CodeEditor),
    ("terminal", Scene::Terminal),
    ("iterm", Scene::Terminal),
    ("alacritty", Scene::Terminal),
    ("kitty", Scene::Terminal),
    ("wezterm", Scene::Terminal),
    ("konsole", Scene::Terminal),
    ("powershell", Scene::Terminal),
    ("cmd.exe", Scene::Terminal),
    ("excel", Scene::Spreadsheet),
    ("numbers", Scene::Spreadsheet),
    ("sheets", Scene::Spreadsheet),
    ("calc", Scene::Spreadsheet),
    ("slack", Scene::Chat),
    ("discord", Scene::Chat),
    ("teams", Scene::Chat),
    ("telegram", Scene::Chat),
    ("kakaotalk", Scene::Chat),
    ("messages", Scene::Chat),
    ("mail", Scene::Email),
    ("outlook", Scene::Email),
    ("thunderbird", Scene::Email),
    ("winword", Scene::Document),
    ("microsoft word", Scene::Document),
    ("pages", Scene::Document),
    ("writer", Scene::Document),
    ("preview", Scene::Document),
    ("acrobat", Scene::Document),
    ("notion", Scene::Document),
    ("obsidian", Scene::Document),
    ("vlc", Scene::Media),
    ("spotify", Scene::Media),
    ("music", Scene::Media),
    ("quicktime", Scene::Media),
    ("youtube", Scene::Media),
    ("safari", Scene::Browser),
    ("chrome", Scene::Browser),
    ("firefox", Scene::Browser),
    ("msedge", Scene::Browser),
    ("brave", Scene::Browser),
    ("thebrowser", Scene::Browser),
    ("whale", Scene::Browser),
];

/// 화면 텍스트 어휘 → 장면 (앱 키워드가 없을 때)
const TEXT_SCENE_KEYWORDS: &[(&str, Scene)] = &[
    ("fn ", Scene::CodeEditor),
    ("def ", Scene::CodeEditor),
    ("import ", Scene::CodeEditor),
    ("function", Scene::CodeEditor),
    ("$ ", Scene::Terminal),
    ("inbox", Scene::Email),
    ("받은편지함", Scene::Email),
    ("compose", Scene::Email),
    ("type a message", Scene::Chat),
    ("메시지 입력", Scene::Chat),
    ("http", Scene::Browser),
    ("sum(", Scene::Spreadsheet),
];

/// 오류로 보이는 텍스트 어휘
const ERROR_KEYWORDS: &[&str] = &[
    "error", "failed", "exception", "fatal", "denied", "invalid", "not found", "오류",
    "실패", "에러", "エラー", "失敗", "错误",
];

/// 같은 행으로 볼 y 좌표 허용 오차 (픽셀)
const ROW_TOLERANCE_PX: f64 = 8.0;

/// 요소 수가 이 값을 넘으면 Dense
const DENSE_ELEMENT_COUNT: usize = 60;

/// 레이아웃 분석에 넘기는 최대 UI 요소 수
pub const MAX_LAYOUT_ELEMENTS: usize = 500;

/// 휴리스틱 보강기
#[derive(Debug, Clone)]
pub struct HeuristicEnricher {
    timeout: Duration,
    max_label_chars: usize,
}

impl HeuristicEnricher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            max_label_chars: 32,
        }
    }

    pub fn with_max_label_chars(mut self, max_label_chars: usize) -> Self {
        self.max_label_chars = max_label_chars;
        self
    }

    /// 장면 분류
    pub fn classify_scene(
        &self,
        app_id: &str,
        window_title: Option<&str>,
        texts: &[TextElement],
        ui: &[UiElement],
    ) -> Scene {
        let haystack = format!("{} {}", app_id, window_title.unwrap_or_default()).to_lowercase();
        if let Some((_, scene)) = APP_SCENE_KEYWORDS
            .iter()
            .find(|(kw, _)| haystack.contains(kw))
        {
            return *scene;
        }

        let screen_text = texts
            .iter()
            .map(|t| t.text.to_lowercase())
            .collect::<Vec<_>>()
            .join("\n");
        if let Some((_, scene)) = TEXT_SCENE_KEYWORDS
            .iter()
            .find(|(kw, _)| screen_text.contains(kw))
        {
            return *scene;
        }

        match self.classify_layout(ui, texts.len()) {
            LayoutPattern::Form => Scene::Form,
            LayoutPattern::Dialog => Scene::Dialog,
            _ => Scene::Unknown,
        }
    }

    /// UI 구조로 레이아웃 패턴 분류
    pub fn classify_layout(&self, ui: &[UiElement], text_count: usize) -> LayoutPattern {
        let count_role = |role: UiRole| ui.iter().filter(|e| e.role == role).count();
        let inputs = count_role(UiRole::TextInput);
        let buttons: Vec<&UiElement> = ui.iter().filter(|e| e.role == UiRole::Button).collect();
        let interactive = ui.iter().filter(|e| e.role.is_interactive()).count();

        if inputs >= 2 {
            return LayoutPattern::Form;
        }
        if ui.iter().any(|e| e.role == UiRole::Toolbar) || largest_row(&buttons) >= 4 {
            return LayoutPattern::Toolbar;
        }
        if count_role(UiRole::List) > 0 || largest_column(ui) >= 5 {
            return LayoutPattern::List;
        }
        if (1..=4).contains(&interactive)
            && buttons.iter().any(|b| {
                b.display_text()
                    .is_some_and(|label| is_actionable_label(label, self.max_label_chars))
            })
        {
            return LayoutPattern::Dialog;
        }
        if ui.len() + text_count > DENSE_ELEMENT_COUNT {
            return LayoutPattern::Dense;
        }
        LayoutPattern::Sparse
    }

    /// 관찰 인사이트 목록
    pub fn insights(
        &self,
        texts: &[TextElement],
        ui: &[UiElement],
        pointer: Option<Point>,
    ) -> Vec<String> {
        let mut insights = Vec::new();

        if let Some(error) = texts.iter().find(|t| {
            let lower = t.text.to_lowercase();
            ERROR_KEYWORDS.iter().any(|kw| lower.contains(kw))
        }) {
            insights.push(format!("error text visible: \"{}\"", error.text));
        }

        if let Some(disabled) = ui.iter().find(|e| {
            e.role == UiRole::Button
                && e.is_disabled()
                && e.display_text()
                    .is_some_and(|l| is_actionable_label(l, self.max_label_chars))
        }) {
            insights.push(format!(
                "primary action \"{}\" is disabled",
                disabled.display_text().unwrap_or_default()
            ));
        }

        if let Some(hovered) = pointer.and_then(|pointer| {
            ui.iter()
                .filter(|e| e.role.is_interactive() && e.bounds.contains(pointer))
                .max_by_key(|e| e.depth)
        }) {
            insights.push(format!(
                "pointer is over {} \"{}\"",
                hovered.role.as_str(),
                hovered.display_text().unwrap_or("unlabeled")
            ));
        }

        let empty_inputs = ui
            .iter()
            .filter(|e| {
                e.role == UiRole::TextInput
                    && !e.is_disabled()
                    && e.value.as_deref().map_or(true, |v| v.trim().is_empty())
            })
            .count();
        if empty_inputs > 0 {
            insights.push(format!("{empty_inputs} empty input field(s) pending"));
        }

        insights
    }

    fn compose(
        &self,
        base_description: &str,
        meta: &CaptureMetadata,
        texts: &[TextElement],
        ui: &[UiElement],
    ) -> String {
        let scene = self.classify_scene(&meta.app_id, meta.window_title.as_deref(), texts, ui);
        let layout = self.classify_layout(ui, texts.len());
        let insights = self.insights(texts, ui, meta.pointer);

        let mut out = String::with_capacity(base_description.len() + 256);
        out.push_str(base_description.trim_end());
        out.push_str("\n\n## Scene\n");
        out.push_str(&scene.to_string());
        out.push_str("\n\n## Layout\n");
        out.push_str(&layout.to_string());
        if !insights.is_empty() {
            out.push_str("\n\n## Insights\n");
            for insight in &insights {
                out.push_str("- ");
                out.push_str(insight);
                out.push('\n');
            }
        }

        debug!(
            scene = %scene,
            layout = %layout,
            insights = insights.len(),
            "휴리스틱 보강 완료"
        );
        out
    }
}

impl Default for HeuristicEnricher {
    fn default() -> Self {
        Self::new(Duration::from_millis(250))
    }
}

#[async_trait]
impl Enricher for HeuristicEnricher {
    async fn enhance(&self, request: EnrichmentRequest<'_>) -> Result<String, CoreError> {
        if request.ui_elements.len() > MAX_LAYOUT_ELEMENTS {
            debug!(
                total = request.ui_elements.len(),
                kept = MAX_LAYOUT_ELEMENTS,
                "레이아웃 분석 대상 축소"
            );
        }
        let enricher = self.clone();
        let base = request.base_description.to_string();
        let metadata = request.metadata.clone();
        let texts = request.text_elements.to_vec();
        let ui: Vec<UiElement> = request
            .ui_elements
            .iter()
            .take(MAX_LAYOUT_ELEMENTS)
            .cloned()
            .collect();

        run_bounded(self.timeout, move || {
            enricher.compose(&base, &metadata, &texts, &ui)
        })
        .await
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}

/// 블로킹 스레드에서 `job` 실행. `timeout`을 넘기면 `CoreError::Timeout`.
///
/// 시간 초과된 작업의 결과는 버려진다.
pub async fn run_bounded<T, F>(timeout: Duration, job: F) -> Result<T, CoreError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    match tokio::time::timeout(timeout, tokio::task::spawn_blocking(job)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(CoreError::Enrichment(format!("보강 작업 조인 실패: {e}"))),
        Err(_) => Err(CoreError::Timeout {
            timeout_ms: timeout.as_millis() as u64,
        }),
    }
}

/// 같은 행(y 허용 오차 내)에 놓인 요소의 최대 개수.
///
/// y 정렬 후 각 요소 기준 [y - 오차, y + 오차] 구간을 두 포인터로 센다.
fn largest_row(elements: &[&UiElement]) -> usize {
    let mut ys: Vec<f64> = elements.iter().map(|e| e.bounds.y).collect();
    ys.sort_by(f64::total_cmp);

    let mut best = 0;
    let (mut lo, mut hi) = (0, 0);
    for (i, &y) in ys.iter().enumerate() {
        while ys[lo] < y - ROW_TOLERANCE_PX {
            lo += 1;
        }
        hi = hi.max(i);
        while hi + 1 < ys.len() && ys[hi + 1] <= y + ROW_TOLERANCE_PX {
            hi += 1;
        }
        best = best.max(hi - lo + 1);
    }
    best
}

/// 같은 열(x 허용 오차 내)에 세로로 쌓인 상호작용 요소의 최대 개수
fn largest_column(elements: &[UiElement]) -> usize {
    let mut interactive: Vec<&UiElement> =
        elements.iter().filter(|e| e.role.is_interactive()).collect();
    interactive.sort_by(|a, b| a.bounds.x.total_cmp(&b.bounds.x));

    let mut best = 0;
    let mut lo = 0;
    for a in &interactive {
        while interactive[lo].bounds.x < a.bounds.x - ROW_TOLERANCE_PX {
            lo += 1;
        }
        let count = interactive[lo..]
            .iter()
            .take_while(|b| b.bounds.x <= a.bounds.x + ROW_TOLERANCE_PX)
            .filter(|b| (a.bounds.height - b.bounds.height).abs() <= ROW_TOLERANCE_PX)
            .count();
        best = best.max(count);
    }
    best
}
