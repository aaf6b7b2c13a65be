//! 발행된 컨텍스트 로그 출력 + `--cycles` 종료 조건.

use std::sync::Arc;

use sightline_core::models::context::ScreenContext;
use sightline_pipeline::event_bus::PipelineEvent;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::lifecycle::LifecycleManager;

/// 발행 횟수 카운터
#[derive(Debug, Default)]
pub struct ContextReporter {
    max_contexts: Option<u64>,
    seen: u64,
}

impl ContextReporter {
    pub fn new(max_contexts: Option<u64>) -> Self {
        Self {
            max_contexts,
            seen: 0,
        }
    }

    /// 컨텍스트 하나 기록. 한도에 도달하면 true
    pub fn observe(&mut self, context: &ScreenContext) -> bool {
        self.seen += 1;
        let top = context
            .top_element()
            .map(|e| format!("{} (p={:.2})", e.label(), e.interaction_probability))
            .unwrap_or_else(|| "-".to_string());
        info!(
            cycle_id = context.cycle_id,
            app_id = %context.metadata.app_id,
            strategy = %context.strategy,
            texts = context.text_elements.len(),
            ui = context.ui_elements.len(),
            fused = context.fused_elements.len(),
            processing_ms = context.processing_ms,
            top = %top,
            "컨텍스트 발행"
        );
        self.max_contexts.is_some_and(|max| self.seen >= max)
    }

    pub fn seen(&self) -> u64 {
        self.seen
    }
}

/// 이벤트 구독 루프. 한도 도달 시 종료 신호 발송
pub async fn report_events(
    mut events: broadcast::Receiver<PipelineEvent>,
    mut reporter: ContextReporter,
    lifecycle: Arc<LifecycleManager>,
) -> u64 {
    let mut shutdown_rx = lifecycle.subscribe();
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(PipelineEvent::ContextPublished(context)) => {
                    if reporter.observe(&context) {
                        info!("발행 한도 도달: {}회", reporter.seen());
                        lifecycle.shutdown();
                        break;
                    }
                }
                Ok(PipelineEvent::CaptureOffline { reason }) => {
                    warn!("캡처 오프라인: {reason}");
                }
                Ok(PipelineEvent::CaptureRecovered) => {
                    info!("캡처 온라인");
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("이벤트 {n}개 누락");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }
    reporter.seen()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sightline_core::models::context::{DescriptionStrategy, EnrichmentOutcome, SkipReason};
    use sightline_core::models::frame::CaptureMetadata;
    use sightline_core::models::geometry::Point;
    use sightline_core::models::topology::WindowStructure;

    fn context(cycle_id: u64) -> Arc<ScreenContext> {
        Arc::new(ScreenContext {
            context_id: format!("ctx-{cycle_id}"),
            cycle_id,
            timestamp: Utc::now(),
            metadata: CaptureMetadata {
                timestamp: Utc::now(),
                pointer: Some(Point::new(0.0, 0.0)),
                app_id: "app".into(),
                window_title: None,
                pid: None,
            },
            description: String::new(),
            strategy: DescriptionStrategy::Fast,
            enrichment: EnrichmentOutcome::Skipped {
                reason: SkipReason::BudgetFast,
            },
            text_elements: vec![],
            ui_elements: vec![],
            topology: WindowStructure::empty(),
            fused_elements: vec![],
            processing_ms: 1.0,
            frame: None,
        })
    }

    #[test]
    fn limit_is_reached_after_n_contexts() {
        let mut reporter = ContextReporter::new(Some(2));
        assert!(!reporter.observe(&context(1)));
        assert!(reporter.observe(&context(2)));

        let mut unlimited = ContextReporter::new(None);
        for i in 0..10 {
            assert!(!unlimited.observe(&context(i)));
        }
    }

    #[tokio::test]
    async fn report_loop_triggers_shutdown_at_limit() {
        let (tx, rx) = broadcast::channel(8);
        let lifecycle = Arc::new(LifecycleManager::new());

        tx.send(PipelineEvent::CaptureRecovered).unwrap();
        tx.send(PipelineEvent::ContextPublished(context(1))).unwrap();
        tx.send(PipelineEvent::ContextPublished(context(2))).unwrap();

        let seen = report_events(rx, ContextReporter::new(Some(2)), lifecycle.clone()).await;
        assert_eq!(seen, 2);
        assert!(lifecycle.is_shutting_down());
    }
}
