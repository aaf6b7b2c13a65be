//! # sightline-app
//!
//! Sightline 바이너리 진입점.
//! 어댑터 조립(DI), 캡처 스케줄러, 파이프라인 실행, 라이프사이클 관리.

mod capture_loop;
mod lifecycle;
mod reporter;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use sightline_core::config::AppConfig;
use sightline_core::config_manager::ConfigManager;
use sightline_core::ports::capture::{ForegroundProbe, FrameSource};
use sightline_monitor::accessibility::{
    AccessibilityBackend, AccessibilityTreeExtractor, CoordinateTransform,
};
use sightline_monitor::backend::{CommandAccessibilityBackend, UnsupportedBackend};
use sightline_monitor::foreground::PlatformForegroundProbe;
use sightline_monitor::topology::{display_transform, SystemTopologyProvider};
use sightline_pipeline::PipelineOrchestrator;
use sightline_vision::capture::ScreenCapture;
use sightline_vision::enrichment::HeuristicEnricher;
use sightline_vision::text_recognition::OcrTextRecognizer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::capture_loop::CaptureLoop;
use crate::lifecycle::LifecycleManager;
use crate::reporter::{report_events, ContextReporter};

/// Sightline 실시간 화면 컨텍스트 파이프라인
#[derive(Parser, Debug)]
#[command(name = "sightline")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 캡처 주기 (밀리초). 설정 파일 값을 덮어씀
    #[arg(long)]
    interval_ms: Option<u64>,

    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,

    /// 보강 비활성화
    #[arg(long)]
    no_enrichment: bool,

    /// 컨텍스트 N개 발행 후 종료
    #[arg(long)]
    cycles: Option<u64>,

    /// CLI로 덮어쓴 값을 설정 파일에 저장
    #[arg(long)]
    save_config: bool,
}

/// 로컬 대체 설정 파일
const FALLBACK_CONFIG_PATH: &str = "./sightline-config.json";

/// 설정 관리자 생성. 플랫폼 설정 디렉토리를 쓸 수 없으면 현재 디렉토리 사용
fn open_config(path: Option<PathBuf>) -> Result<ConfigManager> {
    if let Some(path) = path {
        return ConfigManager::with_path(path).context("설정 파일 열기 실패");
    }
    ConfigManager::new().or_else(|e| {
        warn!("기본 설정 경로 사용 불가: {e}");
        ConfigManager::with_path(PathBuf::from(FALLBACK_CONFIG_PATH))
            .context("대체 설정 파일 열기 실패")
    })
}

/// 실행 설정 결정. `--save-config`면 덮어쓴 값을 검증 후 파일에도 저장
fn effective_config(manager: &ConfigManager, args: &Args) -> Result<AppConfig> {
    if args.save_config {
        let config = manager
            .update_with(|c| apply_overrides(c, args))
            .context("설정 저장 실패")?;
        info!("설정 저장: {}", manager.config_path().display());
        return Ok(config);
    }
    let mut config = manager.get();
    apply_overrides(&mut config, args);
    config.validate().context("설정 검증 실패")?;
    Ok(config)
}

/// CLI 인자로 설정 덮어쓰기
fn apply_overrides(config: &mut AppConfig, args: &Args) {
    if let Some(interval_ms) = args.interval_ms {
        config.capture.interval_ms = interval_ms;
    }
    if args.no_enrichment {
        config.pipeline.enrichment_enabled = false;
    }
}

fn accessibility_backend(config: &AppConfig) -> Arc<dyn AccessibilityBackend> {
    let command = config.ui_tree.helper_command.as_deref().and_then(|cmd| {
        CommandAccessibilityBackend::from_command_line(cmd, config.pipeline.adapter_timeout())
    });
    match command {
        Some(backend) => Arc::new(backend),
        None => {
            info!("접근성 도우미 미설정, UI 트리 비활성화");
            Arc::new(UnsupportedBackend)
        }
    }
}

fn build_pipeline(config: &AppConfig, probe: Arc<dyn ForegroundProbe>) -> PipelineOrchestrator {
    let recognizer = Arc::new(OcrTextRecognizer::new(config.text_recognition.clone()));

    let transform = display_transform(config.capture.monitor_index).unwrap_or_else(|e| {
        warn!("좌표 변환 계산 실패, 항등 변환 사용: {e}");
        CoordinateTransform::identity()
    });
    let ui_tree = Arc::new(
        AccessibilityTreeExtractor::new(accessibility_backend(config), config.ui_tree.clone())
            .with_transform(transform),
    );
    let topology = Arc::new(SystemTopologyProvider::new(Some(probe)));

    let pipeline = PipelineOrchestrator::new(config, recognizer, ui_tree, topology);
    if config.pipeline.enrichment_enabled {
        let enricher = HeuristicEnricher::new(config.pipeline.enrichment_timeout())
            .with_max_label_chars(config.fusion.max_label_chars);
        pipeline.with_enricher(Arc::new(enricher))
    } else {
        pipeline
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_target(false)
        .init();

    info!("Sightline 시작 (v{})", env!("CARGO_PKG_VERSION"));

    let config_manager = open_config(args.config.clone())?;
    info!("설정 파일: {}", config_manager.config_path().display());
    let config = effective_config(&config_manager, &args)?;

    let probe: Arc<dyn ForegroundProbe> = Arc::new(PlatformForegroundProbe::new());
    let source: Arc<dyn FrameSource> =
        Arc::new(ScreenCapture::new(config.capture.monitor_index, probe.clone()));
    let pipeline = Arc::new(build_pipeline(&config, probe));

    let lifecycle = Arc::new(LifecycleManager::new());

    let pipeline_task = {
        let pipeline = pipeline.clone();
        let shutdown_rx = lifecycle.subscribe();
        tokio::spawn(async move { pipeline.run(shutdown_rx).await })
    };

    let capture_task = {
        let capture = CaptureLoop::new(source, pipeline.clone(), &config.capture);
        let shutdown_rx = lifecycle.subscribe();
        tokio::spawn(async move { capture.run(shutdown_rx).await })
    };

    let report_task = tokio::spawn(report_events(
        pipeline.subscribe(),
        ContextReporter::new(args.cycles),
        lifecycle.clone(),
    ));

    info!(
        interval_ms = config.capture.interval_ms,
        enrichment = config.pipeline.enrichment_enabled,
        "Sightline 실행 중 (Ctrl+C로 종료)"
    );

    let mut shutdown_rx = lifecycle.subscribe();
    tokio::select! {
        _ = lifecycle.wait_for_signal() => {}
        _ = shutdown_rx.wait_for(|stopping| *stopping) => {}
    }
    lifecycle.shutdown();

    for (name, task) in [("capture", capture_task), ("pipeline", pipeline_task)] {
        if let Err(e) = task.await {
            warn!("{name} 태스크 종료 실패: {e}");
        }
    }
    let published = report_task.await.unwrap_or_default();

    let stats = pipeline.stats();
    info!(
        published,
        cycles = stats.total_cycles,
        avg_ms = stats.avg_processing_ms,
        cache_hit_rate = stats.cache_hit_rate(),
        dropped = stats.dropped_frames,
        cache_entries = pipeline.cache().len(),
        "최종 통계"
    );
    if let Ok(json) = serde_json::to_string(&stats) {
        info!("통계 스냅샷: {json}");
    }

    info!("Sightline 종료");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_apply() {
        let args = Args::parse_from([
            "sightline",
            "--interval-ms",
            "250",
            "--no-enrichment",
            "--cycles",
            "3",
        ]);
        let mut config = AppConfig::default_config();
        apply_overrides(&mut config, &args);

        assert_eq!(config.capture.interval_ms, 250);
        assert!(!config.pipeline.enrichment_enabled);
        assert_eq!(args.cycles, Some(3));
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn explicit_config_path_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        let manager = open_config(Some(path.clone())).unwrap();
        assert_eq!(manager.config_path(), path.as_path());
        assert!(path.exists());
    }

    #[test]
    fn save_config_persists_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let manager = open_config(Some(path.clone())).unwrap();

        let args = Args::parse_from(["sightline", "--interval-ms", "400", "--save-config"]);
        let config = effective_config(&manager, &args).unwrap();
        assert_eq!(config.capture.interval_ms, 400);

        let reopened = ConfigManager::with_path(path).unwrap();
        assert_eq!(reopened.get().capture.interval_ms, 400);
    }

    #[test]
    fn overrides_without_save_leave_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let manager = open_config(Some(path.clone())).unwrap();

        let args = Args::parse_from(["sightline", "--interval-ms", "400"]);
        assert_eq!(effective_config(&manager, &args).unwrap().capture.interval_ms, 400);
        assert_eq!(
            ConfigManager::with_path(path).unwrap().get().capture.interval_ms,
            1_000
        );

        let invalid = Args::parse_from(["sightline", "--interval-ms", "0", "--save-config"]);
        assert!(effective_config(&manager, &invalid).is_err());
    }

    #[test]
    fn missing_helper_uses_unsupported_backend() {
        let config = AppConfig::default_config();
        assert_eq!(accessibility_backend(&config).name(), "unsupported");

        let mut config = AppConfig::default_config();
        config.ui_tree.helper_command = Some("ax-dump --json".into());
        assert_eq!(accessibility_backend(&config).name(), "command");
    }
}
