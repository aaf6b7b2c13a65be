//! 애플리케이션 설정 구조체.
//!
//! 캡처 주기, 사이클 예산, 융합 가중치, 캐시, 인식기 설정 등
//! 런타임 설정을 정의한다. `ConfigManager`를 통해 JSON 파일에서 로드.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;
use crate::models::ui::UiRole;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 캡처 설정
    pub capture: CaptureConfig,
    /// 파이프라인 설정
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// 사이클 시간 예산
    #[serde(default)]
    pub budget: BudgetConfig,
    /// 융합 엔진 가중치
    #[serde(default)]
    pub fusion: FusionConfig,
    /// 결과 캐시
    #[serde(default)]
    pub cache: CacheConfig,
    /// 텍스트 인식
    #[serde(default)]
    pub text_recognition: TextRecognitionConfig,
    /// UI 트리 추출
    #[serde(default)]
    pub ui_tree: UiTreeConfig,
}

// ============================================================
// 캡처 설정
// ============================================================

/// 캡처 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// 캡처 주기 (밀리초): 사이클 목표 간격
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// 캡처 모니터 인덱스 (None이면 주 모니터)
    #[serde(default)]
    pub monitor_index: Option<usize>,
    /// 캡처 실패 시 재시도 간격 (밀리초)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            monitor_index: None,
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl CaptureConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

fn default_interval_ms() -> u64 {
    1_000
}

fn default_retry_backoff_ms() -> u64 {
    2_000
}

// ============================================================
// 파이프라인 설정
// ============================================================

/// 파이프라인 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// 추출 어댑터 호출당 타임아웃 (밀리초)
    #[serde(default = "default_adapter_timeout_ms")]
    pub adapter_timeout_ms: u64,
    /// 보강 사용 여부
    #[serde(default = "default_true")]
    pub enrichment_enabled: bool,
    /// 보강 마이크로 타임아웃 (밀리초)
    #[serde(default = "default_enrichment_timeout_ms")]
    pub enrichment_timeout_ms: u64,
    /// 발행 채널 용량
    #[serde(default = "default_publish_capacity")]
    pub publish_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            adapter_timeout_ms: default_adapter_timeout_ms(),
            enrichment_enabled: true,
            enrichment_timeout_ms: default_enrichment_timeout_ms(),
            publish_capacity: default_publish_capacity(),
        }
    }
}

impl PipelineConfig {
    pub fn adapter_timeout(&self) -> Duration {
        Duration::from_millis(self.adapter_timeout_ms)
    }

    pub fn enrichment_timeout(&self) -> Duration {
        Duration::from_millis(self.enrichment_timeout_ms)
    }
}

fn default_adapter_timeout_ms() -> u64 {
    1_500
}

fn default_enrichment_timeout_ms() -> u64 {
    300
}

fn default_publish_capacity() -> usize {
    32
}

// ============================================================
// 예산 설정
// ============================================================

/// 사이클 시간 예산: 캡처 주기 대비 비율
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// 이 비율 미만이면 보강 시도
    #[serde(default = "default_enrich_fraction")]
    pub enrich_fraction: f64,
    /// 이 비율 이상이면 Fast 전략
    #[serde(default = "default_base_fraction")]
    pub base_fraction: f64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            enrich_fraction: default_enrich_fraction(),
            base_fraction: default_base_fraction(),
        }
    }
}

impl BudgetConfig {
    /// (보강 임계값, Base 임계값)
    ///
    /// 비율이 유한한 [0, 1] 범위를 벗어나면 해당 임계값은 `interval`로 둔다.
    pub fn thresholds(&self, interval: Duration) -> (Duration, Duration) {
        let scale = |fraction: f64| {
            if fraction.is_finite() && (0.0..=1.0).contains(&fraction) {
                interval.mul_f64(fraction)
            } else {
                interval
            }
        };
        (scale(self.enrich_fraction), scale(self.base_fraction))
    }
}

fn default_enrich_fraction() -> f64 {
    0.5
}

fn default_base_fraction() -> f64 {
    0.9
}

// ============================================================
// 융합 설정
// ============================================================

/// 역할별 기본 가중치
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleWeights {
    pub button: f64,
    pub text_input: f64,
    pub toggle: f64,
    pub menu: f64,
    pub link: f64,
    pub other: f64,
}

impl Default for RoleWeights {
    fn default() -> Self {
        Self {
            button: 0.8,
            text_input: 0.7,
            toggle: 0.6,
            menu: 0.5,
            link: 0.4,
            other: 0.2,
        }
    }
}

impl RoleWeights {
    /// 역할별 기본 가중치 조회
    pub fn weight(&self, role: UiRole) -> f64 {
        match role {
            UiRole::Button => self.button,
            UiRole::TextInput => self.text_input,
            UiRole::Checkbox | UiRole::Radio => self.toggle,
            UiRole::Dropdown | UiRole::Menu | UiRole::MenuItem => self.menu,
            UiRole::Link => self.link,
            _ => self.other,
        }
    }
}

/// 융합 엔진 가중치. 경험적 상수이므로 설정으로 노출한다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionConfig {
    /// UI 요소-텍스트 근접 임계값 (픽셀, 포함)
    #[serde(default = "default_proximity_threshold_px")]
    pub proximity_threshold_px: f64,
    /// 포인터 근접 보너스 반경 (픽셀)
    #[serde(default = "default_pointer_radius_px")]
    pub pointer_radius_px: f64,
    /// 포인터 근접 보너스 최대값
    #[serde(default = "default_pointer_weight")]
    pub pointer_weight: f64,
    #[serde(default)]
    pub role_weights: RoleWeights,
    #[serde(default = "default_enabled_bonus")]
    pub enabled_bonus: f64,
    #[serde(default = "default_disabled_penalty")]
    pub disabled_penalty: f64,
    /// 실행 가능 레이블 텍스트 조각당 보너스
    #[serde(default = "default_actionable_label_bonus")]
    pub actionable_label_bonus: f64,
    /// 실행 가능 레이블의 신뢰도가 임계값을 넘을 때 추가 보너스
    #[serde(default = "default_high_confidence_bonus")]
    pub high_confidence_bonus: f64,
    #[serde(default = "default_high_confidence_threshold")]
    pub high_confidence_threshold: f64,
    /// 실행 가능 레이블처럼 보이는 독립 텍스트 확률
    #[serde(default = "default_standalone_actionable_probability")]
    pub standalone_actionable_probability: f64,
    /// 일반 독립 텍스트 확률
    #[serde(default = "default_standalone_probability")]
    pub standalone_probability: f64,
    /// 실행 가능 레이블로 볼 최대 글자 수
    #[serde(default = "default_max_label_chars")]
    pub max_label_chars: usize,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            proximity_threshold_px: default_proximity_threshold_px(),
            pointer_radius_px: default_pointer_radius_px(),
            pointer_weight: default_pointer_weight(),
            role_weights: RoleWeights::default(),
            enabled_bonus: default_enabled_bonus(),
            disabled_penalty: default_disabled_penalty(),
            actionable_label_bonus: default_actionable_label_bonus(),
            high_confidence_bonus: default_high_confidence_bonus(),
            high_confidence_threshold: default_high_confidence_threshold(),
            standalone_actionable_probability: default_standalone_actionable_probability(),
            standalone_probability: default_standalone_probability(),
            max_label_chars: default_max_label_chars(),
        }
    }
}

fn default_proximity_threshold_px() -> f64 {
    50.0
}

fn default_pointer_radius_px() -> f64 {
    200.0
}

fn default_pointer_weight() -> f64 {
    0.2
}

fn default_enabled_bonus() -> f64 {
    0.1
}

fn default_disabled_penalty() -> f64 {
    0.3
}

fn default_actionable_label_bonus() -> f64 {
    0.3
}

fn default_high_confidence_bonus() -> f64 {
    0.1
}

fn default_high_confidence_threshold() -> f64 {
    0.9
}

fn default_standalone_actionable_probability() -> f64 {
    0.6
}

fn default_standalone_probability() -> f64 {
    0.2
}

fn default_max_label_chars() -> usize {
    32
}

// ============================================================
// 캐시 설정
// ============================================================

/// 결과 캐시 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// 항목 유효 시간 (밀리초)
    #[serde(default = "default_cache_ttl_ms")]
    pub ttl_ms: u64,
    /// 포인터 양자화 격자 크기 (픽셀)
    #[serde(default = "default_grid_px")]
    pub grid_px: u32,
    /// 최대 항목 수
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: default_cache_ttl_ms(),
            grid_px: default_grid_px(),
            max_entries: default_max_entries(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

fn default_cache_ttl_ms() -> u64 {
    5_000
}

fn default_grid_px() -> u32 {
    100
}

fn default_max_entries() -> usize {
    64
}

// ============================================================
// 텍스트 인식 설정
// ============================================================

/// 인식 수준
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionLevel {
    /// 빠른 인식 (LSTM 생략, 단순 세그먼트)
    #[default]
    Fast,
    /// 정확한 인식
    Accurate,
}

/// 텍스트 인식 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRecognitionConfig {
    #[serde(default)]
    pub level: RecognitionLevel,
    /// true면 단어 단위 박스, false면 줄 단위로 병합
    #[serde(default)]
    pub word_level_boxes: bool,
    /// 이 신뢰도 미만 결과는 버림
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    /// Tesseract 언어 코드
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    /// tessdata 경로 (None이면 시스템 기본값)
    #[serde(default)]
    pub tessdata_path: Option<PathBuf>,
}

impl Default for TextRecognitionConfig {
    fn default() -> Self {
        Self {
            level: RecognitionLevel::default(),
            word_level_boxes: false,
            min_confidence: default_min_confidence(),
            languages: default_languages(),
            tessdata_path: None,
        }
    }
}

fn default_min_confidence() -> f64 {
    0.3
}

fn default_languages() -> Vec<String> {
    vec!["eng".to_string()]
}

// ============================================================
// UI 트리 설정
// ============================================================

/// 트리 추출 범위
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeDepth {
    /// 상호작용 가능한 노드만
    #[default]
    Interactive,
    /// 구조 노드 포함 전체 트리
    Complete,
}

/// UI 트리 추출 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiTreeConfig {
    #[serde(default)]
    pub depth: TreeDepth,
    /// 사이클당 최대 노드 수
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,
    /// 외부 접근성 덤프 명령 (JSON 트리를 stdout으로 출력)
    #[serde(default)]
    pub helper_command: Option<String>,
}

impl Default for UiTreeConfig {
    fn default() -> Self {
        Self {
            depth: TreeDepth::default(),
            max_nodes: default_max_nodes(),
            helper_command: None,
        }
    }
}

fn default_max_nodes() -> usize {
    2_000
}

fn default_true() -> bool {
    true
}

/// 주기와 타임아웃 상한 (10분)
pub const MAX_DURATION_MS: u64 = 600_000;

impl AppConfig {
    /// 기본 설정 생성
    pub fn default_config() -> Self {
        Self {
            capture: CaptureConfig::default(),
            pipeline: PipelineConfig::default(),
            budget: BudgetConfig::default(),
            fusion: FusionConfig::default(),
            cache: CacheConfig::default(),
            text_recognition: TextRecognitionConfig::default(),
            ui_tree: UiTreeConfig::default(),
        }
    }

    /// 설정값 일관성 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.capture.interval_ms == 0 {
            return Err(invalid("capture.interval_ms", "0보다 커야 합니다"));
        }
        if self.capture.interval_ms > MAX_DURATION_MS {
            return Err(invalid("capture.interval_ms", "최대 600000ms"));
        }
        if self.pipeline.adapter_timeout_ms > MAX_DURATION_MS {
            return Err(invalid("pipeline.adapter_timeout_ms", "최대 600000ms"));
        }
        if self.pipeline.enrichment_timeout_ms > MAX_DURATION_MS {
            return Err(invalid("pipeline.enrichment_timeout_ms", "최대 600000ms"));
        }

        let budget = &self.budget;
        if !budget.enrich_fraction.is_finite() || budget.enrich_fraction <= 0.0 {
            return Err(invalid("budget.enrich_fraction", "0보다 큰 유한값이어야 합니다"));
        }
        if !budget.base_fraction.is_finite() || budget.base_fraction > 1.0 {
            return Err(invalid("budget.base_fraction", "1 이하의 유한값이어야 합니다"));
        }
        if budget.enrich_fraction > budget.base_fraction {
            return Err(invalid(
                "budget.enrich_fraction",
                "base_fraction 이하여야 합니다",
            ));
        }

        let fusion = &self.fusion;
        let weights = &fusion.role_weights;
        let finite_fields = [
            ("fusion.proximity_threshold_px", fusion.proximity_threshold_px),
            ("fusion.pointer_radius_px", fusion.pointer_radius_px),
            ("fusion.pointer_weight", fusion.pointer_weight),
            ("fusion.enabled_bonus", fusion.enabled_bonus),
            ("fusion.disabled_penalty", fusion.disabled_penalty),
            ("fusion.actionable_label_bonus", fusion.actionable_label_bonus),
            ("fusion.high_confidence_bonus", fusion.high_confidence_bonus),
            ("fusion.high_confidence_threshold", fusion.high_confidence_threshold),
            (
                "fusion.standalone_actionable_probability",
                fusion.standalone_actionable_probability,
            ),
            ("fusion.standalone_probability", fusion.standalone_probability),
            ("fusion.role_weights.button", weights.button),
            ("fusion.role_weights.text_input", weights.text_input),
            ("fusion.role_weights.toggle", weights.toggle),
            ("fusion.role_weights.menu", weights.menu),
            ("fusion.role_weights.link", weights.link),
            ("fusion.role_weights.other", weights.other),
        ];
        if let Some((field, _)) = finite_fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(invalid(field, "유한값이어야 합니다"));
        }
        if fusion.proximity_threshold_px < 0.0 {
            return Err(invalid("fusion.proximity_threshold_px", "음수 불가"));
        }
        if fusion.pointer_radius_px <= 0.0 {
            return Err(invalid("fusion.pointer_radius_px", "0보다 커야 합니다"));
        }
        if self.cache.grid_px == 0 {
            return Err(invalid("cache.grid_px", "0보다 커야 합니다"));
        }
        if self.cache.max_entries == 0 {
            return Err(invalid("cache.max_entries", "0보다 커야 합니다"));
        }
        if self.pipeline.publish_capacity == 0 {
            return Err(invalid("pipeline.publish_capacity", "0보다 커야 합니다"));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> CoreError {
    CoreError::Validation {
        field: field.to_string(),
        message: message.to_string(),
    }
}
