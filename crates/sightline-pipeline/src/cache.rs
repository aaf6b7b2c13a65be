//! 결과 캐시.
//!
//! 키는 (전경 앱 ID, 격자 양자화된 포인터). 포인터가 같은 격자 칸 안에서
//! 흔들리는 정도는 같은 키로 본다. 포인터를 모르면 별도 칸(None)을 쓴다.
//! TTL은 읽을 때마다 검사하고,
//! 만료 항목은 쓰기 시점에 정리한다.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use lru::LruCache;
use parking_lot::Mutex;
use sightline_core::config::CacheConfig;
use sightline_core::models::context::ScreenContext;
use sightline_core::models::geometry::Point;
use tokio::time::Instant;
use tracing::trace;

/// 거친 컨텍스트 키
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextKey {
    pub app_id: String,
    /// 포인터 격자 칸 (x, y)
    pub cell: Option<(i64, i64)>,
}

impl ContextKey {
    pub fn new(app_id: &str, pointer: impl Into<Option<Point>>, grid_px: u32) -> Self {
        let grid = f64::from(grid_px.max(1));
        Self {
            app_id: app_id.to_string(),
            cell: pointer
                .into()
                .map(|p| ((p.x / grid).floor() as i64, (p.y / grid).floor() as i64)),
        }
    }
}

struct CacheEntry {
    context: Arc<ScreenContext>,
    stored_at: Instant,
}

/// TTL + LRU 결과 캐시
pub struct ResultCache {
    entries: Mutex<LruCache<ContextKey, CacheEntry>>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.ttl(), config.max_entries)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 조회. 저장 후 TTL 이상 지났으면 None
    pub fn get(&self, key: &ContextKey) -> Option<Arc<ScreenContext>> {
        self.get_at(key, Instant::now())
    }

    pub fn get_at(&self, key: &ContextKey, now: Instant) -> Option<Arc<ScreenContext>> {
        let mut entries = self.entries.lock();
        let expired = match entries.get(key) {
            Some(entry) if now.saturating_duration_since(entry.stored_at) < self.ttl => {
                return Some(entry.context.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
            trace!("캐시 만료: {}", key.app_id);
        }
        None
    }

    /// 저장 (항상 덮어씀). 만료 항목을 먼저 정리한다
    pub fn put(&self, key: ContextKey, context: Arc<ScreenContext>) {
        self.put_at(key, context, Instant::now());
    }

    pub fn put_at(&self, key: ContextKey, context: Arc<ScreenContext>, now: Instant) {
        let mut entries = self.entries.lock();
        let expired: Vec<ContextKey> = entries
            .iter()
            .filter(|(_, entry)| now.saturating_duration_since(entry.stored_at) >= self.ttl)
            .map(|(k, _)| k.clone())
            .collect();
        for k in &expired {
            entries.pop(k);
        }
        if !expired.is_empty() {
            trace!("만료 캐시 항목 {}개 정리", expired.len());
        }

        entries.put(
            key,
            CacheEntry {
                context,
                stored_at: now,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sightline_core::models::context::{DescriptionStrategy, EnrichmentOutcome, SkipReason};
    use sightline_core::models::frame::CaptureMetadata;
    use sightline_core::models::topology::WindowStructure;

    fn context(cycle_id: u64) -> Arc<ScreenContext> {
        Arc::new(ScreenContext {
            context_id: format!("ctx-{cycle_id}"),
            cycle_id,
            timestamp: Utc::now(),
            metadata: CaptureMetadata {
                timestamp: Utc::now(),
                pointer: Some(Point::new(0.0, 0.0)),
                app_id: "app".to_string(),
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
            processing_ms: 0.0,
            frame: None,
        })
    }

    fn key(app: &str, x: f64, y: f64) -> ContextKey {
        ContextKey::new(app, Point::new(x, y), 100)
    }

    #[test]
    fn pointer_jitter_maps_to_same_key() {
        assert_eq!(key("a", 110.0, 120.0), key("a", 190.0, 199.9));
        assert_ne!(key("a", 199.0, 120.0), key("a", 200.0, 120.0));
        assert_ne!(key("a", 10.0, 10.0), key("b", 10.0, 10.0));
        // 음수 좌표 (주 모니터 왼쪽 보조 모니터)
        assert_eq!(key("a", -1.0, 0.0).cell, Some((-1, 0)));
    }

    #[test]
    fn unknown_pointer_does_not_share_origin_cell() {
        let unknown = ContextKey::new("a", None, 100);
        assert_eq!(unknown.cell, None);
        assert_ne!(unknown, key("a", 0.0, 0.0));
        assert_eq!(unknown, ContextKey::new("a", None, 100));
    }

    #[test]
    fn put_then_get_before_ttl_returns_same_context() {
        let cache = ResultCache::new(Duration::from_secs(5), 8);
        let now = Instant::now();
        let ctx = context(1);
        cache.put_at(key("a", 0.0, 0.0), ctx.clone(), now);

        let hit = cache
            .get_at(&key("a", 5.0, 5.0), now + Duration::from_millis(4_999))
            .unwrap();
        assert!(Arc::ptr_eq(&hit, &ctx));
    }

    #[test]
    fn get_at_or_after_ttl_is_absent() {
        let cache = ResultCache::new(Duration::from_secs(5), 8);
        let now = Instant::now();
        cache.put_at(key("a", 0.0, 0.0), context(1), now);

        assert!(cache
            .get_at(&key("a", 0.0, 0.0), now + Duration::from_secs(5))
            .is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn put_overwrites_and_prunes_expired() {
        let cache = ResultCache::new(Duration::from_secs(5), 8);
        let now = Instant::now();
        cache.put_at(key("a", 0.0, 0.0), context(1), now);
        cache.put_at(key("b", 0.0, 0.0), context(2), now + Duration::from_secs(1));
        cache.put_at(key("b", 0.0, 0.0), context(3), now + Duration::from_secs(2));
        assert_eq!(cache.len(), 2);

        cache.put_at(key("c", 0.0, 0.0), context(4), now + Duration::from_secs(6));
        assert_eq!(cache.len(), 2);
        let b = cache
            .get_at(&key("b", 0.0, 0.0), now + Duration::from_secs(6))
            .unwrap();
        assert_eq!(b.cycle_id, 3);
    }

    #[test]
    fn capacity_evicts_least_recently_used() {
        let cache = ResultCache::new(Duration::from_secs(60), 2);
        cache.put(key("a", 0.0, 0.0), context(1));
        cache.put(key("b", 0.0, 0.0), context(2));
        cache.put(key("c", 0.0, 0.0), context(3));
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key("a", 0.0, 0.0)).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn ttl_follows_tokio_clock() {
        let cache = ResultCache::from_config(&CacheConfig::default());
        cache.put(key("a", 0.0, 0.0), context(1));

        tokio::time::advance(Duration::from_millis(4_900)).await;
        assert!(cache.get(&key("a", 0.0, 0.0)).is_some());

        tokio::time::advance(Duration::from_millis(100)).await;
        assert!(cache.get(&key("a", 0.0, 0.0)).is_none());
    }
}
