//! Sightline 핵심 에러 타입.
//!
//! 모든 어댑터 crate는 자체 에러 타입에서 `CoreError`로 변환한다.
//! 파이프라인 오케스트레이터는 사이클 내 어댑터 에러를 모두 흡수한다.

use thiserror::Error;

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 필드 유효성 검증 실패
    #[error("유효성 검증 실패: {field}: {message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// 리소스를 찾을 수 없음
    #[error("{resource_type} 미발견: {id}")]
    NotFound {
        /// 리소스 종류 (예: "Application", "Monitor")
        resource_type: String,
        /// 리소스 식별자
        id: String,
    },

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),

    /// 스크린 캡처 실패 (캡처 소스 오프라인)
    #[error("캡처 에러: {0}")]
    Capture(String),

    /// OCR 처리 실패
    #[error("OCR 에러: {0}")]
    OcrError(String),

    /// 접근성 트리 추출 실패
    #[error("접근성 에러: {0}")]
    Accessibility(String),

    /// 창/디스플레이 토폴로지 조회 실패
    #[error("토폴로지 에러: {0}")]
    Topology(String),

    /// 설명 보강(enrichment) 실패
    #[error("보강 에러: {0}")]
    Enrichment(String),

    /// 권한 부족 (접근성/화면 기록 권한 미부여)
    #[error("권한 거부: {0}")]
    PermissionDenied(String),

    /// 실행 타임아웃
    #[error("실행 타임아웃: {timeout_ms}ms 초과")]
    Timeout {
        /// 초과된 타임아웃 시간 (밀리초)
        timeout_ms: u64,
    },
}
