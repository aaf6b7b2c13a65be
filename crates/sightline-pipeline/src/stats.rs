//! 운영 통계 추적기.
//!
//! 처리 시간은 단일 극점 필터 `avg = (avg + sample) / 2` (초기값 0).
//! 요소 수는 마지막 사이클 값. 제어 결정에는 쓰지 않는다.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sightline_core::models::context::{EnrichmentOutcome, FailureReason, SkipReason};
use sightline_core::models::stats::{EnrichmentStatus, PipelineStats};

/// 추출 어댑터 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterKind {
    TextRecognition,
    UiTree,
    Topology,
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AdapterKind::TextRecognition => "text_recognition",
            AdapterKind::UiTree => "ui_tree",
            AdapterKind::Topology => "topology",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Default)]
pub struct StatsTracker {
    stats: PipelineStats,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 완료된 사이클 기록 (캐시 적중은 제외)
    pub fn record_cycle(
        &mut self,
        processing: Duration,
        text_count: usize,
        ui_count: usize,
        fused_count: usize,
    ) {
        let sample_ms = processing.as_secs_f64() * 1_000.0;
        let s = &mut self.stats;
        s.avg_processing_ms = (s.avg_processing_ms + sample_ms) / 2.0;
        s.last_text_count = text_count;
        s.last_ui_count = ui_count;
        s.last_fused_count = fused_count;
        s.total_cycles += 1;
        s.fps = if s.total_cycles > 0 && s.avg_processing_ms > 0.0 {
            1_000.0 / s.avg_processing_ms
        } else {
            0.0
        };
    }

    pub fn record_cache_hit(&mut self) {
        self.stats.cache_hits += 1;
    }

    pub fn record_cache_miss(&mut self) {
        self.stats.cache_misses += 1;
    }

    pub fn record_adapter_failure(&mut self, adapter: AdapterKind) {
        let failures = &mut self.stats.adapter_failures;
        match adapter {
            AdapterKind::TextRecognition => failures.text_recognition += 1,
            AdapterKind::UiTree => failures.ui_tree += 1,
            AdapterKind::Topology => failures.topology += 1,
        }
    }

    pub fn set_dropped_frames(&mut self, dropped: u64) {
        self.stats.dropped_frames = dropped;
    }

    /// 보강 결과 기록. 생략은 시도로 세지 않는다
    pub fn record_enrichment(&mut self, outcome: &EnrichmentOutcome, at: DateTime<Utc>) {
        let e = &mut self.stats.enrichment;
        match outcome {
            EnrichmentOutcome::Enriched { .. } => {
                e.attempts += 1;
                e.successes += 1;
                e.last_attempt_at = Some(at);
                e.last_status = EnrichmentStatus::Succeeded;
            }
            EnrichmentOutcome::Failed { reason } => {
                e.attempts += 1;
                e.last_attempt_at = Some(at);
                e.last_skip_reason = Some(reason.to_string());
                e.last_status = match reason {
                    FailureReason::TimedOut { .. } => EnrichmentStatus::TimedOut,
                    FailureReason::Error { .. } => EnrichmentStatus::Failed,
                };
            }
            EnrichmentOutcome::Skipped { reason } => {
                e.last_skip_reason = Some(reason.to_string());
                e.last_status = match reason {
                    SkipReason::Unavailable | SkipReason::Disabled => EnrichmentStatus::Unavailable,
                    _ => EnrichmentStatus::Skipped,
                };
            }
        }
    }

    pub fn snapshot(&self) -> PipelineStats {
        self.stats.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_follows_single_pole_recurrence() {
        let samples = [100.0, 40.0, 10.0, 70.0];
        let mut tracker = StatsTracker::new();
        let mut expected = 0.0;
        for ms in samples {
            tracker.record_cycle(Duration::from_secs_f64(ms / 1_000.0), 1, 2, 3);
            expected = (expected + ms) / 2.0;
        }

        let stats = tracker.snapshot();
        assert!((stats.avg_processing_ms - expected).abs() < 1e-9);
        // 산술 평균(55.0)과 다름
        assert!((stats.avg_processing_ms - 55.0).abs() > 1.0);
        assert_eq!(stats.total_cycles, 4);
        assert!((stats.fps - 1_000.0 / expected).abs() < 1e-9);
        assert_eq!(
            (stats.last_text_count, stats.last_ui_count, stats.last_fused_count),
            (1, 2, 3)
        );
    }

    #[test]
    fn fps_is_zero_before_any_cycle_or_zero_time() {
        let mut tracker = StatsTracker::new();
        assert_eq!(tracker.snapshot().fps, 0.0);
        tracker.record_cycle(Duration::ZERO, 0, 0, 0);
        assert_eq!(tracker.snapshot().fps, 0.0);
        assert_eq!(tracker.snapshot().total_cycles, 1);
    }

    #[test]
    fn enrichment_counters() {
        let mut tracker = StatsTracker::new();
        let now = Utc::now();
        tracker.record_enrichment(
            &EnrichmentOutcome::Enriched {
                description: "x".into(),
            },
            now,
        );
        tracker.record_enrichment(
            &EnrichmentOutcome::Failed {
                reason: FailureReason::TimedOut { timeout_ms: 300 },
            },
            now,
        );
        tracker.record_enrichment(
            &EnrichmentOutcome::Skipped {
                reason: SkipReason::BudgetFast,
            },
            now,
        );

        let e = tracker.snapshot().enrichment;
        assert_eq!(e.attempts, 2);
        assert_eq!(e.successes, 1);
        assert!((e.success_rate() - 0.5).abs() < f64::EPSILON);
        assert_eq!(e.last_status, EnrichmentStatus::Skipped);
        assert_eq!(e.last_skip_reason.as_deref(), Some("budget_fast"));
        assert_eq!(e.last_attempt_at, Some(now));
    }

    #[test]
    fn timeout_and_unavailable_statuses() {
        let mut tracker = StatsTracker::new();
        tracker.record_enrichment(
            &EnrichmentOutcome::Failed {
                reason: FailureReason::TimedOut { timeout_ms: 300 },
            },
            Utc::now(),
        );
        assert_eq!(tracker.snapshot().enrichment.last_status, EnrichmentStatus::TimedOut);

        tracker.record_enrichment(
            &EnrichmentOutcome::Skipped {
                reason: SkipReason::Unavailable,
            },
            Utc::now(),
        );
        assert_eq!(
            tracker.snapshot().enrichment.last_status,
            EnrichmentStatus::Unavailable
        );
    }

    #[test]
    fn adapter_failures_and_cache_counters() {
        let mut tracker = StatsTracker::new();
        tracker.record_adapter_failure(AdapterKind::UiTree);
        tracker.record_adapter_failure(AdapterKind::UiTree);
        tracker.record_adapter_failure(AdapterKind::Topology);
        tracker.record_cache_hit();
        tracker.record_cache_miss();
        tracker.set_dropped_frames(4);

        let s = tracker.snapshot();
        assert_eq!(s.adapter_failures.ui_tree, 2);
        assert_eq!(s.adapter_failures.topology, 1);
        assert_eq!(s.adapter_failures.text_recognition, 0);
        assert_eq!((s.cache_hits, s.cache_misses, s.dropped_frames), (1, 1, 4));
        assert_eq!(AdapterKind::TextRecognition.to_string(), "text_recognition");
    }
}
