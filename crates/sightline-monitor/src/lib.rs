//! # sightline-monitor
//!
//! 데스크톱 상태 어댑터.
//! 전경 창/포인터 탐지, 디스플레이/앱/창 토폴로지, 접근성 트리 추출을 담당한다.
//! 플랫폼별(macOS, Windows, Linux) 네이티브 API 또는 보조 도구를 통해 구현.

pub mod accessibility;
pub mod backend;
pub mod foreground;
pub mod roles;
pub mod topology;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "linux")]
pub mod linux;
