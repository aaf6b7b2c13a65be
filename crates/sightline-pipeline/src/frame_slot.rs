//! 최신 프레임 우선(latest-wins) 대기 슬롯.
//!
//! 대기 프레임은 최대 1개. 사이클 처리 중 새 프레임이 들어오면
//! 기존 대기 프레임을 교체하고 버린 수를 센다.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use sightline_core::models::frame::Frame;
use tokio::sync::Notify;

/// `submit` 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 빈 슬롯에 저장
    Accepted,
    /// 기존 대기 프레임을 교체
    Replaced,
    /// 슬롯이 닫혀 버림
    Closed,
}

#[derive(Default)]
struct SlotState {
    pending: Option<Frame>,
    closed: bool,
}

/// 단일 생산자/단일 소비자 프레임 슬롯
#[derive(Default)]
pub struct FrameSlot {
    state: Mutex<SlotState>,
    notify: Notify,
    dropped: AtomicU64,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// 프레임 제출. 대기 중인 프레임이 있으면 교체한다
    pub fn submit(&self, frame: Frame) -> SubmitOutcome {
        let outcome = {
            let mut state = self.state.lock();
            if state.closed {
                return SubmitOutcome::Closed;
            }
            match state.pending.replace(frame) {
                Some(_) => SubmitOutcome::Replaced,
                None => SubmitOutcome::Accepted,
            }
        };

        if outcome == SubmitOutcome::Replaced {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        self.notify.notify_one();
        outcome
    }

    /// 다음 프레임 대기. 슬롯이 닫히면 None
    pub async fn next(&self) -> Option<Frame> {
        loop {
            {
                let mut state = self.state.lock();
                if state.closed {
                    return None;
                }
                if let Some(frame) = state.pending.take() {
                    return Some(frame);
                }
            }
            // notify_one은 대기자가 없으면 permit을 남기므로 락 해제 후 제출돼도 놓치지 않음
            self.notify.notified().await;
        }
    }

    /// 슬롯 닫기. 대기 프레임은 버린다
    pub fn close(&self) {
        {
            let mut state = self.state.lock();
            state.closed = true;
            state.pending = None;
        }
        self.notify.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn has_pending(&self) -> bool {
        self.state.lock().pending.is_some()
    }

    /// 교체되어 버려진 프레임 수
    pub fn dropped_frames(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
