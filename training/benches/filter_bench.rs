//! Benchmarks for the in-memory filter/search engine.

use criterion::{Criterion, criterion_group, criterion_main};
use fitsync_training::filter::SessionFilterSpec;
use fitsync_training::model::{
    ActivityCategory, Level, LevelStats, MuscleGroup, SessionId, TrainingSession, UserId,
    VideoPlatform, VideoRef, Visibility,
};
use fitsync_training::search::search_sessions;
use std::collections::BTreeSet;
use std::hint::black_box;

fn catalog(size: usize) -> Vec<TrainingSession> {
    let now = chrono::Utc::now();
    (0..size)
        .map(|i| {
            let level = Level::ALL[i % 3];
            TrainingSession {
                id: SessionId::new(format!("s-{i}")),
                title: format!("Session {i} {}", if i % 2 == 0 { "Leg Day" } else { "Arm Blast" }),
                video: VideoRef {
                    platform: VideoPlatform::Youtube,
                    url: format!("https://youtube.example/watch?v={i}"),
                    duration_seconds: 1200,
                    channel: if i % 2 == 0 { "FitChan" } else { "Other" }.to_string(),
                },
                complexity: LevelStats::new(level),
                intensity: LevelStats::new(level),
                equipment: i % 4 == 0,
                muscle_groups: vec![MuscleGroup::Legs, MuscleGroup::Core],
                activity_categories: vec![ActivityCategory::Strength],
                focus_tags: Vec::new(),
                visibility: Visibility::Public,
                creator_id: UserId::new("u-1"),
                created_at: now,
                updated_at: now,
            }
        })
        .collect()
}

fn bench_search(c: &mut Criterion) {
    let sessions = catalog(1_000);

    c.bench_function("search_keyword_1k", |b| {
        b.iter(|| search_sessions(black_box(&sessions), black_box("leg fit")));
    });

    c.bench_function("search_character_1k", |b| {
        b.iter(|| search_sessions(black_box(&sessions), black_box("arm blast")));
    });
}

fn bench_filter(c: &mut Criterion) {
    let sessions = catalog(1_000);
    let spec = SessionFilterSpec {
        complexity: BTreeSet::from([Level::Low, Level::Moderate]),
        muscle_groups: BTreeSet::from([MuscleGroup::Legs]),
        ..SessionFilterSpec::default()
    };

    c.bench_function("filter_multi_criteria_1k", |b| {
        b.iter(|| spec.apply(black_box(&sessions)));
    });
}

criterion_group!(benches, bench_search, bench_filter);
criterion_main!(benches);
