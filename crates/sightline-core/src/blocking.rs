//! 블로킹 작업 단일 실행 게이트.
//!
//! `spawn_blocking` 작업은 기다리던 future가 타임아웃으로 버려져도 끝까지
//! 실행된다. [`SingleFlight`]는 허가(permit)를 블로킹 클로저 안으로 옮겨
//! 작업이 실제로 끝날 때까지 다음 작업을 막는다.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::debug;

use crate::error::CoreError;

/// 동시에 하나의 블로킹 작업만 허용하는 게이트
#[derive(Debug, Clone)]
pub struct SingleFlight {
    name: &'static str,
    permit: Arc<Semaphore>,
}

impl SingleFlight {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            permit: Arc::new(Semaphore::new(1)),
        }
    }

    /// 이전 작업이 아직 실행 중인지
    pub fn is_busy(&self) -> bool {
        self.permit.available_permits() == 0
    }

    /// 블로킹 스레드에서 `job` 실행.
    ///
    /// 이전 작업이 진행 중이면 실행하지 않고 `Ok(None)`.
    pub async fn run<T, F>(&self, job: F) -> Result<Option<T>, CoreError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let Ok(permit) = Arc::clone(&self.permit).try_acquire_owned() else {
            debug!(gate = self.name, "이전 블로킹 작업 진행 중, 건너뜀");
            return Ok(None);
        };

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        })
        .await
        .map(Some)
        .map_err(|e| CoreError::Internal(format!("{} 작업 조인 실패: {e}", self.name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn slow_job(
        running: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
        work: Duration,
    ) -> impl FnOnce() -> u32 + Send + 'static {
        move || {
            let now = running.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(work);
            running.fetch_sub(1, Ordering::SeqCst);
            7
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn only_one_job_runs_at_a_time() {
        let gate = SingleFlight::new("test");
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let (first, second) = tokio::join!(
            gate.run(slow_job(running.clone(), peak.clone(), Duration::from_millis(200))),
            async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                gate.run(slow_job(running.clone(), peak.clone(), Duration::from_millis(200)))
                    .await
            }
        );

        assert_eq!(first.unwrap(), Some(7));
        assert_eq!(second.unwrap(), None);
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn abandoned_job_keeps_gate_closed_until_it_finishes() {
        let gate = SingleFlight::new("test");
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let timed_out = tokio::time::timeout(
            Duration::from_millis(20),
            gate.run(slow_job(running.clone(), peak.clone(), Duration::from_millis(300))),
        )
        .await;
        assert!(timed_out.is_err());

        // 기다리던 쪽은 포기했지만 블로킹 작업은 아직 실행 중
        assert!(gate.is_busy());
        let skipped = gate
            .run(slow_job(running.clone(), peak.clone(), Duration::from_millis(1)))
            .await
            .unwrap();
        assert_eq!(skipped, None);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(!gate.is_busy());
        let resumed = gate
            .run(slow_job(running.clone(), peak.clone(), Duration::from_millis(1)))
            .await
            .unwrap();
        assert_eq!(resumed, Some(7));
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }
}
