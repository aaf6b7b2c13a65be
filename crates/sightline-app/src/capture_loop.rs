//! 캡처 스케줄러.
//!
//! `capture.interval_ms` 주기로 프레임을 캡처해 파이프라인에 제출한다.
//! 캡처가 실패하면 오프라인으로 표시하고 `retry_backoff_ms` 간격으로 재시도한다.
//! 밀린 틱은 건너뛴다.

use std::sync::Arc;
use std::time::Duration;

use sightline_core::config::CaptureConfig;
use sightline_core::ports::capture::FrameSource;
use sightline_pipeline::PipelineOrchestrator;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

pub struct CaptureLoop {
    source: Arc<dyn FrameSource>,
    pipeline: Arc<PipelineOrchestrator>,
    interval: Duration,
    retry_backoff: Duration,
}

impl CaptureLoop {
    pub fn new(
        source: Arc<dyn FrameSource>,
        pipeline: Arc<PipelineOrchestrator>,
        config: &CaptureConfig,
    ) -> Self {
        Self {
            source,
            pipeline,
            interval: config.interval(),
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) {
        info!(
            source = self.source.name(),
            interval_ms = self.interval.as_millis() as u64,
            "캡처 루프 시작"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut offline = false;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                    continue;
                }
            }

            match self.source.capture().await {
                Ok(frame) => {
                    if offline {
                        info!(sequence = frame.sequence, "캡처 복구");
                        offline = false;
                        self.pipeline.report_capture_recovered();
                    }
                    self.pipeline.submit(frame);
                }
                Err(e) => {
                    if offline {
                        debug!(error = %e, "캡처 재시도 실패");
                    } else {
                        warn!(error = %e, "캡처 실패, 오프라인 전환");
                        offline = true;
                        self.pipeline.report_capture_offline(e.to_string());
                    }

                    tokio::select! {
                        _ = tokio::time::sleep(self.retry_backoff) => {}
                        changed = shutdown_rx.changed() => {
                            if changed.is_err() || *shutdown_rx.borrow() {
                                break;
                            }
                        }
                    }
                    ticker.reset();
                }
            }
        }

        info!("캡처 루프 종료");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use chrono::Utc;
    use sightline_core::config::{AppConfig, RecognitionLevel};
    use sightline_core::error::CoreError;
    use sightline_core::models::frame::{CaptureMetadata, Frame, RawImage};
    use sightline_core::models::geometry::Point;
    use sightline_core::models::text::TextElement;
    use sightline_core::models::topology::WindowStructure;
    use sightline_core::models::ui::UiElement;
    use sightline_core::ports::text_recognizer::TextRecognizer;
    use sightline_core::ports::topology::TopologyProvider;
    use sightline_core::ports::ui_tree::UiTreeExtractor;
    use sightline_pipeline::event_bus::PipelineEvent;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// 처음 `failures`번 실패 후 성공하는 캡처 소스
    struct FlakySource {
        failures: u64,
        calls: AtomicU64,
    }

    #[async_trait]
    impl FrameSource for FlakySource {
        async fn capture(&self) -> Result<Frame, CoreError> {
            let n = self.calls.fetch_add(1, Ordering::Relaxed);
            if n < self.failures {
                return Err(CoreError::Capture("no monitor".into()));
            }
            Ok(Frame::new(
                n,
                RawImage::filled(2, 2, [0, 0, 0, 255]),
                CaptureMetadata {
                    timestamp: Utc::now(),
                    pointer: Some(Point::new(n as f64 * 500.0, 0.0)),
                    app_id: "app".into(),
                    window_title: None,
                    pid: None,
                },
            ))
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    struct Empty;

    #[async_trait]
    impl TextRecognizer for Empty {
        async fn recognize(&self, _image: Arc<RawImage>) -> Result<Vec<TextElement>, CoreError> {
            Ok(vec![])
        }

        fn provider_name(&self) -> &str {
            "empty"
        }

        fn level(&self) -> RecognitionLevel {
            RecognitionLevel::Fast
        }
    }

    #[async_trait]
    impl UiTreeExtractor for Empty {
        async fn extract(&self, _app_id: &str) -> Result<Vec<UiElement>, CoreError> {
            Ok(vec![])
        }

        fn name(&self) -> &str {
            "empty"
        }
    }

    #[async_trait]
    impl TopologyProvider for Empty {
        async fn snapshot(&self) -> Result<WindowStructure, CoreError> {
            Ok(WindowStructure::empty())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn offline_then_recovered_then_publishes() {
        let config = AppConfig::default_config();
        let pipeline = Arc::new(PipelineOrchestrator::new(
            &config,
            Arc::new(Empty),
            Arc::new(Empty),
            Arc::new(Empty),
        ));
        let mut events = pipeline.subscribe();
        let source = Arc::new(FlakySource {
            failures: 2,
            calls: AtomicU64::new(0),
        });

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let pipeline_task = {
            let pipeline = pipeline.clone();
            let rx = shutdown_rx.clone();
            tokio::spawn(async move { pipeline.run(rx).await })
        };
        let capture_task = {
            let capture = CaptureLoop::new(source.clone(), pipeline.clone(), &config.capture);
            tokio::spawn(async move { capture.run(shutdown_rx).await })
        };

        assert_matches!(
            events.recv().await,
            Ok(PipelineEvent::CaptureOffline { reason }) if reason.contains("no monitor")
        );
        assert_matches!(events.recv().await, Ok(PipelineEvent::CaptureRecovered));
        assert_matches!(events.recv().await, Ok(PipelineEvent::ContextPublished(_)));

        shutdown_tx.send(true).unwrap();
        capture_task.await.unwrap();
        pipeline_task.await.unwrap();

        // 실패 2회 + 성공 1회 이상
        assert!(source.calls.load(Ordering::Relaxed) >= 3);
        assert!(pipeline.stats().total_cycles >= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_promptly_during_backoff() {
        let config = AppConfig::default_config();
        let pipeline = Arc::new(PipelineOrchestrator::new(
            &config,
            Arc::new(Empty),
            Arc::new(Empty),
            Arc::new(Empty),
        ));
        let source = Arc::new(FlakySource {
            failures: u64::MAX,
            calls: AtomicU64::new(0),
        });
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let capture = CaptureLoop::new(source.clone(), pipeline.clone(), &config.capture);
        let task = tokio::spawn(async move { capture.run(shutdown_rx).await });

        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown_tx.send(true).unwrap();
        task.await.unwrap();

        assert_eq!(source.calls.load(Ordering::Relaxed), 1);
        assert!(!pipeline.status().capture_online);
    }
}
