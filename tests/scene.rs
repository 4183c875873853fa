use arcade_fx::rng::SeededRng;
use arcade_fx::surface::{DrawOp, RecordingSurface};
use arcade_fx::timer::ManualFrameLoop;
use arcade_fx::{Backdrop, FrameScheduler, SceneCompositor, SceneConfig, ViewportSize};

fn backdrop_at(
    size: ViewportSize,
    frames: &ManualFrameLoop,
) -> Backdrop<ManualFrameLoop, RecordingSurface> {
    let compositor = SceneCompositor::new(
        Some(RecordingSurface::new(size)),
        size,
        SceneConfig::default(),
        Box::new(SeededRng::new(2024)),
    );
    let mut backdrop = Backdrop::new(frames.clone(), compositor);
    backdrop.init();
    backdrop
}

#[test]
fn star_alpha_stays_bounded_through_a_long_run() {
    let frames = ManualFrameLoop::new();
    let backdrop = backdrop_at(ViewportSize::new(800.0, 600.0), &frames);
    for _ in 0..600 {
        frames.pump();
        let compositor = backdrop.compositor();
        let field = compositor.stars();
        for star in field.stars() {
            let a = field.alpha_of(star);
            assert!((0.3..=1.0).contains(&a), "alpha {a}");
        }
    }
}

#[test]
fn emblems_respect_the_wrap_bound() {
    let frames = ManualFrameLoop::new();
    let backdrop = backdrop_at(ViewportSize::new(300.0, 120.0), &frames);
    let margin = backdrop.compositor().emblems().wrap_margin();
    for _ in 0..1_500 {
        let before: Vec<f64> = backdrop
            .compositor()
            .emblems()
            .emblems()
            .iter()
            .map(|e| e.y)
            .collect();
        frames.pump();
        let compositor = backdrop.compositor();
        for (e, prev_y) in compositor.emblems().emblems().iter().zip(before) {
            let wrapped = e.y < prev_y;
            if wrapped {
                assert!(e.y < 0.0);
                assert!((0.0..300.0).contains(&e.x));
            } else {
                assert!(e.y <= 120.0 + margin);
            }
        }
    }
}

#[test]
fn resize_keeps_entities_in_flight() {
    let frames = ManualFrameLoop::new();
    let backdrop = backdrop_at(ViewportSize::new(800.0, 600.0), &frames);
    frames.pump();

    let stars_before = backdrop.compositor().stars().stars().to_vec();
    let emblems_before = backdrop.compositor().emblems().emblems().to_vec();

    backdrop.resize(ViewportSize::new(400.0, 300.0));
    frames.pump();

    let compositor = backdrop.compositor();
    assert_eq!(compositor.viewport(), ViewportSize::new(400.0, 300.0));
    assert_eq!(compositor.stars().stars(), &stars_before[..]);
    for (after, before) in compositor.emblems().emblems().iter().zip(&emblems_before) {
        // One step of motion, or a wrap against the new, smaller bound.
        let stepped = (after.y - (before.y + before.vy)).abs() < 1e-9;
        let wrapped = after.y == -compositor.emblems().wrap_margin();
        assert!(stepped || wrapped, "{before:?} -> {after:?}");
        if stepped {
            assert_eq!(after.x, before.x);
        }
    }

    let ops = compositor.surface().unwrap().ops();
    let resize_at = ops
        .iter()
        .rposition(|op| matches!(op, DrawOp::Resize(_)))
        .unwrap();
    assert_eq!(ops[resize_at], DrawOp::Resize(ViewportSize::new(400.0, 300.0)));
    assert_eq!(ops[resize_at + 1], DrawOp::Clear(ViewportSize::new(400.0, 300.0)));
}

#[test]
fn emblems_draw_above_the_ground_and_lanes() {
    let frames = ManualFrameLoop::new();
    let backdrop = backdrop_at(ViewportSize::new(640.0, 480.0), &frames);
    frames.pump();
    let compositor = backdrop.compositor();
    let ops = compositor.surface().unwrap().ops();
    let last_line = ops.iter().rposition(|op| matches!(op, DrawOp::Line { .. })).unwrap();
    let first_disc = ops.iter().position(|op| matches!(op, DrawOp::Disc { .. })).unwrap();
    let first_text = ops.iter().position(|op| matches!(op, DrawOp::Text { .. })).unwrap();
    let last_disc = ops.iter().rposition(|op| matches!(op, DrawOp::Disc { .. })).unwrap();
    assert!(last_line < first_disc);
    assert!(last_disc < first_text);
}

#[test]
fn stopping_twice_schedules_nothing_more() {
    let frames = ManualFrameLoop::new();
    let mut scheduler = FrameScheduler::new(frames.clone());
    let count = std::rc::Rc::new(std::cell::Cell::new(0u32));
    let c = count.clone();
    scheduler.start(move |_| c.set(c.get() + 1));
    frames.pump();
    scheduler.stop();
    scheduler.stop();
    for _ in 0..5 {
        frames.pump();
    }
    assert_eq!(count.get(), 1);
    assert!(!scheduler.is_running());
}

#[test]
fn disposed_backdrop_never_paints_again() {
    let frames = ManualFrameLoop::new();
    let mut backdrop = backdrop_at(ViewportSize::new(200.0, 200.0), &frames);
    frames.pump();
    let ops_before = backdrop.compositor().surface().unwrap().ops().len();
    backdrop.dispose();
    for _ in 0..3 {
        frames.pump();
    }
    assert_eq!(backdrop.compositor().surface().unwrap().ops().len(), ops_before);
    assert!(backdrop.is_disposed());
}

#[test]
fn blank_backdrop_without_a_surface_keeps_ticking_quietly() {
    let frames = ManualFrameLoop::new();
    let size = ViewportSize::new(200.0, 200.0);
    let compositor: SceneCompositor<RecordingSurface> =
        SceneCompositor::new(None, size, SceneConfig::default(), Box::new(SeededRng::new(1)));
    let mut backdrop = Backdrop::new(frames.clone(), compositor);
    backdrop.init();
    for _ in 0..10 {
        frames.pump();
    }
    assert_eq!(backdrop.frames_rendered(), 10);
    assert!(!backdrop.compositor().has_surface());
}
