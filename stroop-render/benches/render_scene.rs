use criterion::{Criterion, black_box, criterion_group, criterion_main};
use stroop_core::{Direction, SessionStats, TrialResult, TrialSpec};
use stroop_render::{Hud, Scene, SceneRenderer as _, SkiaRenderer, load_font};

const HUD: Hud = Hud {
    trial: 10,
    total: 40,
    score: 7,
};

fn harness() -> Option<SkiaRenderer> {
    let font = load_font(None).ok()?;
    let mut r = SkiaRenderer::new(1000, 650, font).ok()?;
    // Warm the text cache with the labels every trial screen uses
    let spec = TrialSpec::incongruent(Direction::Left, Direction::Right);
    let _ = r.render_scene(&Scene::Stimulus {
        hud: HUD,
        spec: &spec,
        show_distractor: true,
        time_left_ms: 800.0,
        hovered: None,
    });
    Some(r)
}

pub fn bench_scenes(c: &mut Criterion) {
    let Some(mut r) = harness() else {
        eprintln!("no system font found, skipping scene benches");
        return;
    };
    let spec = TrialSpec::incongruent(Direction::Left, Direction::Right);
    let result = TrialResult::new(9, spec, Some(Direction::Left), Some(512.0));
    let mut stats = SessionStats::new(40);
    stats.record(&result);

    let mut g = c.benchmark_group("render_scene");
    g.sample_size(60);

    g.bench_function("fixation", |b| {
        b.iter(|| r.render_scene(black_box(&Scene::Fixation { hud: HUD })))
    });

    g.bench_function("stimulus", |b| {
        b.iter(|| {
            r.render_scene(black_box(&Scene::Stimulus {
                hud: HUD,
                spec: &spec,
                show_distractor: true,
                time_left_ms: 800.0,
                hovered: Some(Direction::Right),
            }))
        })
    });

    g.bench_function("feedback_overlay", |b| {
        b.iter(|| {
            r.render_scene(black_box(&Scene::Feedback {
                hud: HUD,
                result: &result,
                show_distractor: true,
            }))
        })
    });

    g.bench_function("finished", |b| {
        b.iter(|| r.render_scene(black_box(&Scene::Finished { stats: &stats })))
    });

    g.finish();
}

criterion_group!(benches, bench_scenes);
criterion_main!(benches);
