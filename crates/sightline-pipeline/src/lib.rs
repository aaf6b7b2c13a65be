//! # sightline-pipeline
//!
//! 실시간 컨텍스트 융합 파이프라인.
//!
//! 캡처 프레임 하나당 한 사이클을 실행한다. 텍스트 인식, UI 트리, 토폴로지
//! 추출을 동시에 실행하고, 융합 후 시간 예산에 따라 설명 전략을 고른 뒤
//! 결과를 캐시하고 구독자에게 발행한다.
//!
//! ## 구조
//!
//! - [`frame_slot`]: 최신 프레임 우선 대기 슬롯
//! - [`budget`]: 경과 시간 → 설명 전략
//! - [`description`]: Fast/Base 설명 생성
//! - [`cache`]: TTL 결과 캐시
//! - [`stats`]: 운영 통계
//! - [`event_bus`]: 파이프라인 이벤트 발행
//! - [`status`]: 오프라인/보강 상태 판정
//! - [`orchestrator`]: 사이클 제어 흐름

pub mod budget;
pub mod cache;
pub mod description;
pub mod event_bus;
pub mod frame_slot;
pub mod orchestrator;
pub mod stats;
pub mod status;

pub use orchestrator::PipelineOrchestrator;
