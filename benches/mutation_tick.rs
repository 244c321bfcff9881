//! Mutation tick benchmark suite.
//!
//! Every DOM mutation batch re-scans the whole page, so tick cost grows
//! with page size. Measures one tick at several page sizes:
//! - Idle: no ad, button already present (the steady state)
//! - Ad: ad marker and video present, skip performed each tick
//!
//! Run with: cargo bench --bench mutation_tick
//! Results saved to: target/criterion/

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use yt_ad_skipper::content::{NodeId, PageInterventionist, VirtualDocument};
use yt_ad_skipper::SkipperConfig;

// ============================================================================
// Benchmark Parameters
// ============================================================================

/// Extra elements outside the player (comments, recommendations, ...).
const PAGE_SIZES: &[usize] = &[100, 1_000, 5_000];

// ============================================================================
// Page Fixture
// ============================================================================

fn watch_page(filler: usize, ad: bool) -> VirtualDocument {
    let doc = VirtualDocument::new();

    let mut classes = vec!["html5-video-player"];
    if ad {
        classes.push("ad-showing");
    }
    let player = doc.append_element(doc.body(), "div", &classes);
    let video = doc.append_element(player, "video", &["html5-main-video"]);
    doc.set_media(video, 30.0);

    let left = doc.append_element(player, "div", &["ytp-left-controls"]);
    let next = doc.append_element(left, "a", &["ytp-next-button", "ytp-button"]);
    doc.append_element(next, "svg", &[]);

    let right = doc.append_element(player, "div", &["ytp-right-controls"]);
    doc.append_element(right, "button", &["ytp-subtitles-button"]);
    doc.append_element(right, "button", &["ytp-settings-button"]);
    doc.append_element(right, "button", &["ytp-fullscreen-button"]);

    let mut parent: NodeId = doc.append_element(doc.body(), "div", &["ytd-watch-flexy"]);
    for i in 0..filler {
        let node = doc.append_element(parent, "div", &["ytd-item"]);
        if i % 10 == 0 {
            parent = node;
        }
    }

    doc.take_mutations();
    doc
}

// ============================================================================
// Benchmark: Tick
// ============================================================================

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("mutation_tick");

    for &size in PAGE_SIZES {
        let doc = watch_page(size, false);
        let page = PageInterventionist::new(doc, SkipperConfig::default());
        page.on_mutations(1);

        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| page.on_mutations(1));
        });

        let doc = watch_page(size, true);
        let page = PageInterventionist::new(doc, SkipperConfig::default());
        page.on_mutations(1);

        group.bench_with_input(BenchmarkId::new("ad", size), &size, |b, _| {
            b.iter(|| page.on_mutations(1));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Toggle
// ============================================================================

fn bench_toggle(c: &mut Criterion) {
    let page = PageInterventionist::new(watch_page(1_000, false), SkipperConfig::default());
    let mut enabled = true;

    c.bench_function("toggle_message", |b| {
        b.iter(|| {
            enabled = !enabled;
            page.apply_preference(enabled)
        });
    });
}

criterion_group!(benches, bench_tick, bench_toggle);
criterion_main!(benches);
