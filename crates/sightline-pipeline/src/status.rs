//! 파이프라인 상태 판정 (상태 표시기용).

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sightline_core::models::stats::EnrichmentStatus;

/// 이 배수의 캡처 주기 동안 발행이 없으면 오프라인
pub const OFFLINE_INTERVAL_MULTIPLIER: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStatus {
    /// 최근 발행 없음
    pub offline: bool,
    /// 캡처 소스 동작 여부
    pub capture_online: bool,
    pub last_published_at: Option<DateTime<Utc>>,
    /// 마지막 보강 시도 상태
    pub enrichment: EnrichmentStatus,
}

/// 마지막 발행 후 경과 시간으로 오프라인 판정. 발행 이력이 없으면 오프라인
pub fn is_offline(since_last_publish: Option<Duration>, interval: Duration) -> bool {
    match since_last_publish {
        // 곱이 넘치면 오프라인 기준에 도달할 수 없다
        Some(elapsed) => interval
            .checked_mul(OFFLINE_INTERVAL_MULTIPLIER)
            .is_some_and(|limit| elapsed > limit),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_after_three_intervals() {
        let interval = Duration::from_millis(1_000);
        assert!(is_offline(None, interval));
        assert!(!is_offline(Some(Duration::from_millis(100)), interval));
        assert!(!is_offline(Some(Duration::from_millis(3_000)), interval));
        assert!(is_offline(Some(Duration::from_millis(3_001)), interval));
    }

    #[test]
    fn huge_interval_does_not_overflow() {
        assert!(!is_offline(Some(Duration::from_secs(60)), Duration::MAX));
        assert!(is_offline(None, Duration::MAX));
    }
}
