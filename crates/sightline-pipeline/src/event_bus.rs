//! 파이프라인 이벤트 버스.
//!
//! `tokio::broadcast` 기반. 구독자가 없으면 발행은 조용히 버려진다.

use std::sync::Arc;

use sightline_core::models::context::ScreenContext;
use tokio::sync::broadcast;
use tracing::debug;

/// 파이프라인 이벤트
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// 사이클 완료 (캐시 재발행 포함)
    ContextPublished(Arc<ScreenContext>),
    /// 캡처 소스 중단
    CaptureOffline { reason: String },
    /// 캡처 소스 복구
    CaptureRecovered,
}

impl PipelineEvent {
    fn kind(&self) -> &'static str {
        match self {
            PipelineEvent::ContextPublished(_) => "context_published",
            PipelineEvent::CaptureOffline { .. } => "capture_offline",
            PipelineEvent::CaptureRecovered => "capture_recovered",
        }
    }
}

pub struct EventBus {
    tx: broadcast::Sender<PipelineEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// 이벤트 발행. 수신한 구독자 수 반환
    pub fn publish(&self, event: PipelineEvent) -> usize {
        let kind = event.kind();
        let receivers = self.tx.send(event).unwrap_or(0);
        debug!(kind, receivers, "이벤트 발행");
        receivers
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(32)
    }
}
