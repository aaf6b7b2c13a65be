//! 파이프라인 운영 통계 스냅샷.
//!
//! 관측 전용이며 제어 결정에는 사용하지 않는다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 마지막 보강 시도 상태 (상태 표시기용)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentStatus {
    Succeeded,
    TimedOut,
    Failed,
    Unavailable,
    #[default]
    Skipped,
}

/// 보강 관련 카운터
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentStats {
    /// 총 시도 횟수
    pub attempts: u64,
    /// 성공 횟수
    pub successes: u64,
    /// 마지막 생략/실패 사유
    pub last_skip_reason: Option<String>,
    /// 마지막 시도 시각
    pub last_attempt_at: Option<DateTime<Utc>>,
    /// 마지막 상태
    pub last_status: EnrichmentStatus,
}

impl EnrichmentStats {
    /// 성공률 (시도 0회면 0.0)
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.successes as f64 / self.attempts as f64
        }
    }
}

/// 어댑터별 실패 카운터
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterFailures {
    pub text_recognition: u64,
    pub ui_tree: u64,
    pub topology: u64,
}

/// 파이프라인 통계 스냅샷
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineStats {
    /// 단일 극점 필터 처리 시간 평균 (밀리초)
    pub avg_processing_ms: f64,
    /// 마지막 사이클 텍스트 요소 수
    pub last_text_count: usize,
    /// 마지막 사이클 UI 요소 수
    pub last_ui_count: usize,
    /// 마지막 사이클 융합 요소 수
    pub last_fused_count: usize,
    /// 완료된 사이클 수 (캐시 적중 제외)
    pub total_cycles: u64,
    /// 파생 FPS
    pub fps: f64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    /// 대기 중 새 프레임으로 교체되어 버려진 프레임 수
    pub dropped_frames: u64,
    pub adapter_failures: AdapterFailures,
    pub enrichment: EnrichmentStats,
}

impl PipelineStats {
    /// 캐시 적중률 (조회 0회면 0.0)
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}
