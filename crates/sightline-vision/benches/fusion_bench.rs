//! sightline-vision 융합 엔진 벤치마크
//!
//! 실행: cargo bench -p sightline-vision
//!
//! 벤치마크 대상:
//! - 융합 (FusionEngine::fuse), UI/텍스트 요소 수별
//! - 문자 체계 분류 (classify_script)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sightline_core::models::geometry::{Point, Rect};
use sightline_core::models::text::{ScriptTag, TextElement};
use sightline_core::models::ui::{UiElement, UiRole};
use sightline_vision::fusion::FusionEngine;
use sightline_vision::script::classify_script;

/// 격자 형태의 테스트 화면 생성
fn create_screen(count: usize) -> (Vec<UiElement>, Vec<TextElement>) {
    let roles = [UiRole::Button, UiRole::TextInput, UiRole::Link, UiRole::Checkbox];
    let labels = ["OK", "Cancel", "Details", "Quarterly revenue", "저장"];
    let columns = 12;

    let mut ui = Vec::with_capacity(count);
    let mut text = Vec::with_capacity(count);
    for i in 0..count {
        let x = (i % columns) as f64 * 160.0;
        let y = (i / columns) as f64 * 48.0;
        ui.push(UiElement {
            role: roles[i % roles.len()],
            platform_role: String::new(),
            label: None,
            value: None,
            bounds: Rect::new(x, y, 120.0, 32.0),
            enabled: Some(i % 5 != 0),
            depth: 3,
            path: format!("Window[0]/Group[{}]/Element[{}]", i / columns, i % columns),
        });
        text.push(TextElement {
            text: labels[i % labels.len()].to_string(),
            confidence: 0.8 + (i % 20) as f64 * 0.01,
            bounds: Rect::new(x + 8.0, y + 6.0, 80.0, 20.0),
            language: ScriptTag::Latin,
        });
    }
    (ui, text)
}

/// 융합 벤치마크
fn bench_fusion(c: &mut Criterion) {
    let mut group = c.benchmark_group("fusion");
    let engine = FusionEngine::default();
    let pointer = Point::new(640.0, 360.0);

    for count in [10usize, 100, 500] {
        let (ui, text) = create_screen(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("fuse", count), &count, |b, _| {
            b.iter(|| engine.fuse(black_box(&ui), black_box(&text), black_box(pointer)))
        });
    }

    group.finish();
}

/// 문자 체계 분류 벤치마크
fn bench_script(c: &mut Criterion) {
    let samples = [
        "Submit",
        "변경 사항을 저장하시겠습니까?",
        "ファイルを保存する",
        "OK 확인 Cancel 취소",
    ];
    c.bench_function("classify_script", |b| {
        b.iter(|| {
            for s in &samples {
                black_box(classify_script(black_box(s)));
            }
        })
    });
}

criterion_group!(benches, bench_fusion, bench_script);
criterion_main!(benches);
