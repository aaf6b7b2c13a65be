//! Sightline 도메인 모델.
//!
//! 한 사이클 동안 생성되는 프레임, 추출 결과, 융합 결과, 통계 구조체를 정의한다.
//! 프레임 원본을 제외한 모든 모델은 `serde` Serialize/Deserialize를 구현한다.

pub mod context;
pub mod frame;
pub mod fused;
pub mod geometry;
pub mod stats;
pub mod text;
pub mod topology;
pub mod ui;
