// Host-side integration tests for the particle morph engine.

use std::time::Duration;

use glam::Vec3;
use morph_core::*;
use rand::SeedableRng;

const DT: Duration = Duration::from_millis(16);

fn make_engine(n: usize) -> MorphEngine {
    MorphEngine::new(
        EngineParams {
            particle_count: n,
            ..EngineParams::default()
        },
        42,
    )
}

fn distance_to_targets(engine: &MorphEngine) -> f32 {
    let expansion = engine.expansion_factor();
    engine
        .buffer()
        .positions
        .iter()
        .zip(engine.targets().iter())
        .map(|(p, t)| p.distance(*t * expansion))
        .sum()
}

#[test]
fn new_engine_scatters_particles_with_base_color() {
    let engine = make_engine(2_000);
    let buf = engine.buffer();
    assert_eq!(buf.len(), 2_000);
    assert_eq!(buf.colors.len(), 2_000);
    assert_eq!(engine.targets().len(), 2_000);
    assert!(buf
        .positions
        .iter()
        .all(|p| p.abs().max_element() <= INITIAL_SPREAD / 2.0));
    assert!(buf.colors.iter().all(|c| *c == engine.base_color()));
    assert_eq!(engine.shape(), ShapeKind::Heart);
    assert_eq!(engine.smoothed_interaction(), 0.0);
    assert_eq!(engine.expansion_factor(), 1.0);
}

#[test]
fn default_engine_uses_twenty_thousand_particles() {
    let engine = MorphEngine::with_defaults(1);
    assert_eq!(engine.particle_count(), DEFAULT_PARTICLE_COUNT);
    assert_eq!(engine.targets().len(), DEFAULT_PARTICLE_COUNT);
}

#[test]
fn same_seed_same_cloud() {
    let a = make_engine(500);
    let b = make_engine(500);
    assert_eq!(a.buffer().positions, b.buffer().positions);
    assert_eq!(&*a.targets(), &*b.targets());
}

#[test]
fn select_shape_swaps_targets_without_moving_particles() {
    let mut engine = make_engine(1_000);
    let before_positions = engine.buffer().positions.clone();
    let old_targets = engine.targets();
    engine.select_shape(ShapeKind::Saturn);
    assert_eq!(engine.shape(), ShapeKind::Saturn);
    assert_eq!(engine.buffer().positions, before_positions);
    let new_targets = engine.targets();
    assert_eq!(new_targets.len(), 1_000);
    assert_ne!(&*old_targets, &*new_targets);
    // A snapshot taken before the swap is still whole
    assert_eq!(old_targets.len(), 1_000);
}

#[test]
fn saturn_targets_split_seventy_thirty() {
    let mut engine = make_engine(10_000);
    engine.select_shape(ShapeKind::Saturn);
    let targets = engine.targets();
    let sphere = targets
        .iter()
        .filter(|p| (p.length() - 2.5).abs() < 1e-3)
        .count();
    let ring = targets
        .iter()
        .filter(|p| {
            let r = (p.x * p.x + p.z * p.z).sqrt();
            r >= 3.5 - 1e-4 && r <= 6.0 + 1e-4 && p.y.abs() <= 0.1
        })
        .count();
    assert_eq!(sphere, 7_000);
    assert_eq!(ring, 3_000);
}

#[test]
fn unknown_shape_name_falls_back_to_heart() {
    let mut engine = make_engine(100);
    engine.select_shape(ShapeKind::Starburst);
    engine.select_shape_by_name("dodecahedron");
    assert_eq!(engine.shape(), ShapeKind::Heart);
    engine.select_shape_by_name("fireworks");
    assert_eq!(engine.shape(), ShapeKind::Starburst);
}

#[test]
fn first_tick_after_shape_change_moves_a_tenth_of_the_way() {
    let mut engine = make_engine(3_000);
    for _ in 0..30 {
        engine.tick(Interaction::Absent, DT);
    }
    engine.select_shape(ShapeKind::Starburst);
    let before = engine.buffer().positions.clone();
    engine.tick(Interaction::Absent, DT);
    let targets = engine.targets();
    for ((old, new), t) in before.iter().zip(&engine.buffer().positions).zip(targets.iter()) {
        let step = old.distance(*new);
        let remaining = old.distance(*t);
        assert!(
            step <= 0.1 * remaining + 1e-4,
            "moved {step} of {remaining}"
        );
    }
}

#[test]
fn tense_tick_is_bounded_by_tenth_plus_jitter() {
    let mut engine = make_engine(3_000);
    for _ in 0..60 {
        engine.tick(Interaction::Tension(1.0), DT);
    }
    engine.select_shape(ShapeKind::MeditatingFigure);
    let before = engine.buffer().positions.clone();
    engine.tick(Interaction::Tension(1.0), DT);
    let s = engine.smoothed_interaction();
    assert!(s > 0.9, "smoothed {s}");
    let expansion = engine.expansion_factor();
    let jitter_bound = 3f32.sqrt() * s / 2.0;
    let targets = engine.targets();
    for ((old, new), t) in before.iter().zip(&engine.buffer().positions).zip(targets.iter()) {
        let step = old.distance(*new);
        let remaining = old.distance(*t * expansion);
        assert!(
            step <= 0.1 * (remaining + jitter_bound) + 1e-4,
            "moved {step}, remaining {remaining}"
        );
    }
}

#[test]
fn constant_input_converges_monotonically() {
    let mut engine = make_engine(2_000);
    engine.select_shape(ShapeKind::Flower);
    let mut prev_distance = distance_to_targets(&engine);
    let mut prev_step = f32::INFINITY;
    for i in 0..60 {
        let before = engine.buffer().positions.clone();
        engine.tick(Interaction::Absent, DT);
        let step: f32 = before
            .iter()
            .zip(&engine.buffer().positions)
            .map(|(a, b)| a.distance(*b))
            .sum();
        let distance = distance_to_targets(&engine);
        assert!(distance < prev_distance, "tick {i}: {prev_distance} -> {distance}");
        assert!(step < prev_step, "tick {i}: step grew {prev_step} -> {step}");
        prev_distance = distance;
        prev_step = step;
    }
    let initial_scale = INITIAL_SPREAD * 2_000.0;
    assert!(prev_distance < initial_scale * 0.01, "still {prev_distance} away");
}

#[test]
fn absent_signal_relaxes_expansion_to_one() {
    let mut engine = make_engine(500);
    for _ in 0..100 {
        engine.tick(Interaction::Tension(1.0), DT);
    }
    assert!(engine.expansion_factor() > 2.9);
    for _ in 0..200 {
        engine.tick(Interaction::Absent, DT);
    }
    assert!(engine.smoothed_interaction() < 1e-4);
    assert!((engine.expansion_factor() - 1.0).abs() < 1e-3);
}

#[test]
fn smoothing_is_per_tick_by_default() {
    let mut fast = make_engine(10);
    let mut slow = make_engine(10);
    fast.tick(Interaction::Tension(1.0), Duration::from_millis(5));
    slow.tick(Interaction::Tension(1.0), Duration::from_millis(100));
    assert!((fast.smoothed_interaction() - 0.1).abs() < 1e-6);
    assert_eq!(fast.smoothed_interaction(), slow.smoothed_interaction());
}

#[test]
fn frame_rate_independent_smoothing_scales_with_dt() {
    let params = EngineParams {
        particle_count: 10,
        frame_rate_independent: true,
        ..EngineParams::default()
    };
    let mut one = MorphEngine::new(params.clone(), 3);
    let mut two = MorphEngine::new(params, 3);
    // One 1/30 s tick matches two 1/60 s ticks.
    one.tick(Interaction::Tension(1.0), Duration::from_secs_f32(1.0 / 30.0));
    two.tick(Interaction::Tension(1.0), Duration::from_secs_f32(1.0 / 60.0));
    two.tick(Interaction::Tension(1.0), Duration::from_secs_f32(1.0 / 60.0));
    assert!((one.smoothed_interaction() - two.smoothed_interaction()).abs() < 1e-5);
    assert!((one.smoothed_interaction() - 0.19).abs() < 1e-4);
}

#[test]
fn low_tension_adds_no_jitter() {
    let mut engine = make_engine(200);
    let targets = engine.targets();
    let mut expected = engine.buffer().positions.clone();
    let mut s = 0.0f32;
    // Smoothed value approaches 0.1 from below and never crosses the threshold.
    for _ in 0..20 {
        engine.tick(Interaction::Tension(0.1), DT);
        s += (0.1 - s) * INTERACTION_SMOOTHING;
        let expansion = 1.0 + s * EXPANSION_GAIN;
        for (p, t) in expected.iter_mut().zip(targets.iter()) {
            *p += (*t * expansion - *p) * FOLLOW_RATE;
        }
    }
    assert!(engine.smoothed_interaction() <= JITTER_THRESHOLD);
    for (got, want) in engine.buffer().positions.iter().zip(&expected) {
        assert!(got.distance(*want) < 1e-4, "{got} vs {want}");
    }
}

#[test]
fn select_color_recolors_with_clamped_jitter() {
    let mut engine = make_engine(5_000);
    let base = Rgb::new(1.0, 0.0, 0.5);
    engine.select_color(base);
    assert_eq!(engine.base_color(), base);
    let colors = &engine.buffer().colors;
    let mut varied = false;
    for c in colors {
        for (v, b) in c.to_array().into_iter().zip(base.to_array()) {
            assert!((0.0..=1.0).contains(&v), "channel out of range: {v}");
            assert!((v - b).abs() <= COLOR_JITTER + 1e-6, "{v} too far from {b}");
        }
        varied |= *c != base;
    }
    assert!(varied, "expected per-particle variation");
    // Channels vary independently
    assert!(colors.iter().any(|c| (c.g() - (c.b() - 0.5)).abs() > 1e-3));
}

#[test]
fn recolor_is_immediate_and_ticks_leave_colors_alone() {
    let mut engine = make_engine(300);
    engine.apply(ControlCommand::SelectColor(Rgb::new(0.2, 0.4, 0.6)));
    let colors = engine.buffer().colors.clone();
    for _ in 0..10 {
        engine.tick(Interaction::Tension(0.8), DT);
    }
    assert_eq!(engine.buffer().colors, colors);
}

#[test]
fn change_flags_are_taken_once() {
    let mut engine = make_engine(50);
    let first = engine.take_changes();
    assert!(first.positions && first.colors);
    assert!(!engine.take_changes().any());
    engine.tick(Interaction::Absent, DT);
    assert_eq!(
        engine.take_changes(),
        BufferChanges {
            positions: true,
            colors: false
        }
    );
    engine.select_color(Rgb::default());
    assert!(engine.take_changes().colors);
    // Shape changes only move targets; nothing to re-upload yet.
    engine.select_shape(ShapeKind::Flower);
    assert!(!engine.take_changes().any());
}

#[test]
fn rotation_advances_independently_of_input() {
    let mut a = make_engine(10);
    let mut b = make_engine(10);
    for _ in 0..100 {
        a.tick(Interaction::Absent, DT);
        b.tick(Interaction::Tension(1.0), DT);
    }
    assert!((a.rotation_y() - 100.0 * ROTATION_PER_TICK).abs() < 1e-5);
    assert_eq!(a.rotation_y(), b.rotation_y());
    let rotated = a.model_matrix().transform_point3(Vec3::X);
    assert!((rotated.length() - 1.0).abs() < 1e-5);
}

#[test]
fn control_commands_route_to_engine() {
    let mut engine = make_engine(100);
    engine.apply(ControlCommand::SelectShape(ShapeKind::MeditatingFigure));
    assert_eq!(engine.shape(), ShapeKind::MeditatingFigure);
}

#[test]
fn empty_engine_ticks_without_panicking() {
    let mut engine = make_engine(0);
    engine.tick(Interaction::Tension(1.0), DT);
    engine.select_shape(ShapeKind::Saturn);
    engine.select_color(Rgb::default());
    assert!(engine.buffer().is_empty());
}

#[test]
fn out_of_range_tension_is_read_as_clamped() {
    let mut high = make_engine(50);
    let mut one = make_engine(50);
    high.tick(Interaction::Tension(5.0), DT);
    one.tick(Interaction::Tension(1.0), DT);
    assert!((high.smoothed_interaction() - 0.1).abs() < 1e-6);
    assert_eq!(high.buffer().positions, one.buffer().positions);

    let mut low = make_engine(50);
    low.tick(Interaction::Tension(-3.0), DT);
    assert_eq!(low.smoothed_interaction(), 0.0);
}

#[test]
fn nan_tension_counts_as_absent() {
    let mut engine = make_engine(200);
    engine.tick(Interaction::Tension(f32::NAN), DT);
    assert_eq!(engine.smoothed_interaction(), 0.0);
    for _ in 0..50 {
        engine.tick(Interaction::Absent, DT);
    }
    assert!(engine.smoothed_interaction().is_finite());
    assert!(engine.buffer().positions.iter().all(|p| p.is_finite()));
    assert!(!Interaction::Tension(f32::NAN).is_present());
    assert_eq!(Interaction::Tension(f32::NAN).value(), None);
}

#[test]
fn out_of_range_base_color_is_clamped_everywhere() {
    let wild = Rgb::new(2.0, -1.0, 0.5);
    assert_eq!(wild.to_array(), [1.0, 0.0, 0.5]);
    let mut engine = MorphEngine::new(
        EngineParams {
            particle_count: 300,
            base_color: wild,
            ..EngineParams::default()
        },
        11,
    );
    let in_range = |c: &Rgb| c.to_array().iter().all(|v| (0.0..=1.0).contains(v));
    assert!(engine.buffer().colors.iter().all(in_range));
    engine.select_color(Rgb::from_array([1.5, f32::NAN, -0.5]));
    assert!(engine.buffer().colors.iter().all(in_range));
    let mut rng = rand::rngs::StdRng::seed_from_u64(1);
    assert_eq!(wild.jittered(0.0, &mut rng), wild);
    assert_eq!(wild.jittered(f32::NAN, &mut rng), wild);
}
