//! 파이프라인 오케스트레이터.
//!
//! 프레임 하나당 사이클 하나를 끝까지 실행한다. 사이클은 한 번에 하나만
//! 실행되며, 실행 중 들어온 프레임은 [`FrameSlot`]에서 최신 것만 남는다.
//!
//! 사이클 순서:
//! 1. 캐시 조회. 적중하면 캐시된 컨텍스트를 재발행하고 종료
//! 2. 텍스트 인식 + UI 트리 + 토폴로지 동시 실행 (`tokio::join!`)
//! 3. 융합
//! 4. 예산 컨트롤러로 전략 선택, 필요 시 보강 (마이크로 타임아웃)
//! 5. 캐시 저장, 통계 갱신, 현재 컨텍스트 교체, 이벤트 발행
//!
//! 어댑터 에러와 타임아웃은 빈 결과로 흡수된다. 사이클은 중단되지 않는다.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use sightline_core::config::AppConfig;
use sightline_core::error::CoreError;
use sightline_core::models::context::{
    DescriptionStrategy, EnrichmentOutcome, FailureReason, ScreenContext, SkipReason,
};
use sightline_core::models::frame::Frame;
use sightline_core::models::stats::PipelineStats;
use sightline_core::ports::enrichment::{Enricher, EnrichmentRequest};
use sightline_core::ports::text_recognizer::TextRecognizer;
use sightline_core::ports::topology::TopologyProvider;
use sightline_core::ports::ui_tree::UiTreeExtractor;
use sightline_vision::fusion::FusionEngine;
use tokio::sync::{broadcast, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::budget::BudgetController;
use crate::cache::{ContextKey, ResultCache};
use crate::description::{base_description, fast_description};
use crate::event_bus::{EventBus, PipelineEvent};
use crate::frame_slot::{FrameSlot, SubmitOutcome};
use crate::stats::{AdapterKind, StatsTracker};
use crate::status::{is_offline, PipelineStatus};

/// 파이프라인 오케스트레이터
pub struct PipelineOrchestrator {
    recognizer: Arc<dyn TextRecognizer>,
    ui_tree: Arc<dyn UiTreeExtractor>,
    topology: Arc<dyn TopologyProvider>,
    enricher: Option<Arc<dyn Enricher>>,
    fusion: FusionEngine,
    budget: BudgetController,
    cache: ResultCache,
    grid_px: u32,
    interval: Duration,
    adapter_timeout: Duration,
    enrichment_enabled: bool,
    enrichment_timeout: Duration,
    stats: Mutex<StatsTracker>,
    slot: FrameSlot,
    bus: EventBus,
    current_tx: watch::Sender<Option<Arc<ScreenContext>>>,
    /// 사이클 단일 실행 보장
    cycle_lock: tokio::sync::Mutex<()>,
    cycle_counter: AtomicU64,
    last_published: Mutex<Option<(Instant, chrono::DateTime<Utc>)>>,
    capture_online: AtomicBool,
}

impl PipelineOrchestrator {
    pub fn new(
        config: &AppConfig,
        recognizer: Arc<dyn TextRecognizer>,
        ui_tree: Arc<dyn UiTreeExtractor>,
        topology: Arc<dyn TopologyProvider>,
    ) -> Self {
        let interval = config.capture.interval();
        let (current_tx, _) = watch::channel(None);
        Self {
            recognizer,
            ui_tree,
            topology,
            enricher: None,
            fusion: FusionEngine::new(config.fusion.clone()),
            budget: BudgetController::from_config(&config.budget, interval),
            cache: ResultCache::from_config(&config.cache),
            grid_px: config.cache.grid_px,
            interval,
            adapter_timeout: config.pipeline.adapter_timeout(),
            enrichment_enabled: config.pipeline.enrichment_enabled,
            enrichment_timeout: config.pipeline.enrichment_timeout(),
            stats: Mutex::new(StatsTracker::new()),
            slot: FrameSlot::new(),
            bus: EventBus::new(config.pipeline.publish_capacity),
            current_tx,
            cycle_lock: tokio::sync::Mutex::new(()),
            cycle_counter: AtomicU64::new(0),
            last_published: Mutex::new(None),
            capture_online: AtomicBool::new(true),
        }
    }

    /// 보강 어댑터 설정
    pub fn with_enricher(mut self, enricher: Arc<dyn Enricher>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    // ============================================================
    // 프레임 입력 / 실행 루프
    // ============================================================

    /// 캡처 소스 진입점. 대기 프레임이 있으면 교체한다
    pub fn submit(&self, frame: Frame) -> SubmitOutcome {
        let sequence = frame.sequence;
        let outcome = self.slot.submit(frame);
        match outcome {
            SubmitOutcome::Replaced => debug!(sequence, "대기 프레임 교체"),
            SubmitOutcome::Closed => debug!(sequence, "종료된 파이프라인에 프레임 제출"),
            SubmitOutcome::Accepted => {}
        }
        outcome
    }

    /// 사이클 루프. 종료 신호 또는 슬롯 닫힘까지 실행한다.
    ///
    /// 종료 신호는 사이클 사이에서만 확인하므로 진행 중인 사이클은 끝까지 완료된다.
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            enrich_ms = self.budget.enrich_threshold().as_millis() as u64,
            base_ms = self.budget.base_threshold().as_millis() as u64,
            "파이프라인 시작"
        );

        loop {
            tokio::select! {
                frame = self.slot.next() => {
                    match frame {
                        Some(frame) => {
                            self.process_frame(frame).await;
                        }
                        None => break,
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        self.slot.close();
        info!("파이프라인 종료");
    }

    /// 슬롯을 닫아 `run` 루프를 끝낸다
    pub fn shutdown(&self) {
        self.slot.close();
    }

    // ============================================================
    // 사이클
    // ============================================================

    /// 프레임 하나로 사이클 실행. 항상 발행 가능한 결과를 만든다
    pub async fn process_frame(&self, frame: Frame) -> Arc<ScreenContext> {
        let _cycle = self.cycle_lock.lock().await;
        let started = Instant::now();
        let metadata = &frame.metadata;
        let key = ContextKey::new(&metadata.app_id, metadata.pointer, self.grid_px);

        if let Some(cached) = self.cache.get(&key) {
            self.stats.lock().record_cache_hit();
            debug!(
                cycle_id = cached.cycle_id,
                app_id = %metadata.app_id,
                "캐시 적중, 재발행"
            );
            self.publish(cached.clone());
            return cached;
        }
        self.stats.lock().record_cache_miss();

        let cycle_id = self.cycle_counter.fetch_add(1, Ordering::Relaxed) + 1;

        let (text_elements, ui_elements, topology) = tokio::join!(
            self.absorb(
                AdapterKind::TextRecognition,
                self.recognizer.recognize(frame.image.clone())
            ),
            self.absorb(AdapterKind::UiTree, self.ui_tree.extract(&metadata.app_id)),
            self.absorb(AdapterKind::Topology, self.topology.snapshot()),
        );

        let fused_elements = self
            .fusion
            .fuse(&ui_elements, &text_elements, metadata.pointer);

        let elapsed = started.elapsed();
        let selected = self.budget.select(elapsed);
        let (strategy, description, enrichment) = match selected {
            DescriptionStrategy::Fast => (
                DescriptionStrategy::Fast,
                fast_description(&text_elements),
                EnrichmentOutcome::Skipped {
                    reason: SkipReason::BudgetFast,
                },
            ),
            DescriptionStrategy::Base => (
                DescriptionStrategy::Base,
                base_description(metadata, &topology, &fused_elements, &text_elements),
                EnrichmentOutcome::Skipped {
                    reason: SkipReason::BudgetBase,
                },
            ),
            DescriptionStrategy::Enrich => {
                let base =
                    base_description(metadata, &topology, &fused_elements, &text_elements);
                let request = EnrichmentRequest {
                    base_description: &base,
                    image: &frame.image,
                    metadata,
                    text_elements: &text_elements,
                    windows: &topology,
                    ui_elements: &ui_elements,
                };
                let outcome = self.enrich(request).await;
                let enriched = match &outcome {
                    EnrichmentOutcome::Enriched { description } => Some(description.clone()),
                    _ => None,
                };
                match enriched {
                    Some(description) => (DescriptionStrategy::Enrich, description, outcome),
                    None => (DescriptionStrategy::Base, base, outcome),
                }
            }
        };

        let processing = started.elapsed();
        let context = Arc::new(ScreenContext {
            context_id: Uuid::new_v4().to_string(),
            cycle_id,
            timestamp: Utc::now(),
            metadata: frame.metadata.clone(),
            description,
            strategy,
            enrichment,
            text_elements,
            ui_elements,
            topology,
            fused_elements,
            processing_ms: processing.as_secs_f64() * 1_000.0,
            frame: Some(frame.image.clone()),
        });

        self.cache.put(key, context.clone());
        {
            let mut stats = self.stats.lock();
            stats.record_cycle(
                processing,
                context.text_elements.len(),
                context.ui_elements.len(),
                context.fused_elements.len(),
            );
            stats.record_enrichment(&context.enrichment, context.timestamp);
        }

        debug!(
            cycle_id,
            elapsed_ms = processing.as_millis() as u64,
            strategy = %strategy,
            texts = context.text_elements.len(),
            ui = context.ui_elements.len(),
            fused = context.fused_elements.len(),
            "사이클 완료"
        );

        self.publish(context.clone());
        context
    }

    /// 어댑터 호출 결과를 흡수. 에러/타임아웃이면 기본값(빈 결과)
    async fn absorb<T, F>(&self, adapter: AdapterKind, call: F) -> T
    where
        T: Default,
        F: Future<Output = Result<T, CoreError>>,
    {
        match tokio::time::timeout(self.adapter_timeout, call).await {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => {
                warn!(adapter = %adapter, error = %e, "어댑터 실패, 빈 결과로 대체");
                self.stats.lock().record_adapter_failure(adapter);
                T::default()
            }
            Err(_) => {
                warn!(
                    adapter = %adapter,
                    timeout_ms = self.adapter_timeout.as_millis() as u64,
                    "어댑터 타임아웃, 빈 결과로 대체"
                );
                self.stats.lock().record_adapter_failure(adapter);
                T::default()
            }
        }
    }

    async fn enrich(&self, request: EnrichmentRequest<'_>) -> EnrichmentOutcome {
        if !self.enrichment_enabled {
            return EnrichmentOutcome::Skipped {
                reason: SkipReason::Disabled,
            };
        }
        let Some(enricher) = self.enricher.as_ref() else {
            return EnrichmentOutcome::Skipped {
                reason: SkipReason::Unavailable,
            };
        };

        match tokio::time::timeout(self.enrichment_timeout, enricher.enhance(request)).await {
            Ok(Ok(description)) => EnrichmentOutcome::Enriched { description },
            Ok(Err(CoreError::Timeout { timeout_ms })) => {
                warn!(enricher = enricher.name(), timeout_ms, "보강 자체 타임아웃");
                EnrichmentOutcome::Failed {
                    reason: FailureReason::TimedOut { timeout_ms },
                }
            }
            Ok(Err(e)) => {
                warn!(enricher = enricher.name(), error = %e, "보강 실패, Base로 대체");
                EnrichmentOutcome::Failed {
                    reason: FailureReason::Error {
                        message: e.to_string(),
                    },
                }
            }
            Err(_) => {
                let timeout_ms = self.enrichment_timeout.as_millis() as u64;
                warn!(enricher = enricher.name(), timeout_ms, "보강 타임아웃, Base로 대체");
                EnrichmentOutcome::Failed {
                    reason: FailureReason::TimedOut { timeout_ms },
                }
            }
        }
    }

    fn publish(&self, context: Arc<ScreenContext>) {
        *self.last_published.lock() = Some((Instant::now(), context.timestamp));
        self.current_tx.send_replace(Some(context.clone()));
        self.bus.publish(PipelineEvent::ContextPublished(context));
    }

    // ============================================================
    // 캡처 소스 상태
    // ============================================================

    /// 캡처 중단 보고. 상태가 바뀔 때만 이벤트 발행
    pub fn report_capture_offline(&self, reason: impl Into<String>) {
        if self.capture_online.swap(false, Ordering::Relaxed) {
            self.bus.publish(PipelineEvent::CaptureOffline {
                reason: reason.into(),
            });
        }
    }

    /// 캡처 복구 보고. 상태가 바뀔 때만 이벤트 발행
    pub fn report_capture_recovered(&self) {
        if !self.capture_online.swap(true, Ordering::Relaxed) {
            self.bus.publish(PipelineEvent::CaptureRecovered);
        }
    }

    // ============================================================
    // 조회
    // ============================================================

    /// 현재 컨텍스트
    pub fn current(&self) -> Option<Arc<ScreenContext>> {
        self.current_tx.borrow().clone()
    }

    /// 현재 컨텍스트 감시 수신기
    pub fn watch_current(&self) -> watch::Receiver<Option<Arc<ScreenContext>>> {
        self.current_tx.subscribe()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.bus.subscribe()
    }

    pub fn stats(&self) -> PipelineStats {
        let mut stats = self.stats.lock();
        stats.set_dropped_frames(self.slot.dropped_frames());
        stats.snapshot()
    }

    pub fn status(&self) -> PipelineStatus {
        let last = *self.last_published.lock();
        let enrichment = self.stats.lock().snapshot().enrichment.last_status;
        PipelineStatus {
            offline: is_offline(last.map(|(at, _)| at.elapsed()), self.interval),
            capture_online: self.capture_online.load(Ordering::Relaxed),
            last_published_at: last.map(|(_, ts)| ts),
            enrichment,
        }
    }

    pub fn budget(&self) -> &BudgetController {
        &self.budget
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }
}
