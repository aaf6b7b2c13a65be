//! 캡처 소스 포트.
//!
//! 구현: `sightline-vision` (xcap 스크린 캡처), `sightline-monitor` (전경 창/포인터 탐지)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::frame::Frame;
use crate::models::geometry::Point;

/// 전경 애플리케이션 정보
#[derive(Debug, Clone, PartialEq)]
pub struct ForegroundInfo {
    /// 애플리케이션 식별자
    pub app_id: String,
    /// 창 제목
    pub window_title: Option<String>,
    /// 프로세스 ID (알 수 없으면 None)
    pub pid: Option<u32>,
}

/// 전경 창 + 포인터 위치 탐지기 (캡처 메타데이터 채움용)
pub trait ForegroundProbe: Send + Sync {
    /// 현재 전경 애플리케이션. 감지 불가면 `Ok(None)`
    fn foreground(&self) -> Result<Option<ForegroundInfo>, CoreError>;

    /// 전역 좌표계 기준 포인터 위치. 감지 불가면 None
    fn pointer(&self) -> Option<Point>;
}

/// 프레임 소스: 활성 디스플레이의 래스터 프레임 + 메타데이터 생성
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// 프레임 한 장 캡처. 소스 오프라인이면 `CoreError::Capture`
    async fn capture(&self) -> Result<Frame, CoreError>;

    /// 소스 이름 (로그용)
    fn name(&self) -> &str;
}
