//! 토폴로지 제공자 포트.
//!
//! 구현: `sightline-monitor` crate (xcap + sysinfo)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::topology::WindowStructure;

/// 디스플레이/애플리케이션/창 스냅샷 제공자
#[async_trait]
pub trait TopologyProvider: Send + Sync {
    /// 현재 토폴로지 스냅샷
    async fn snapshot(&self) -> Result<WindowStructure, CoreError>;
}
