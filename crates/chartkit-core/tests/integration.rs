//! Integration tests for chartkit-core.
//!
//! These tests verify the public API works correctly end-to-end.

use chartkit_core::{
    resolve_is_light, AnimationSpec, AnimationState, AnimationStyle, Animator, ChartOptions,
    Color, Container, Easing, GeometryRecord, HitTester, ManualFrameHost, Point, Rect,
};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

// =============================================================================
// Theme Integration Tests
// =============================================================================

#[test]
fn test_theme_explicit_colors() {
    assert!(resolve_is_light("#FFFFFF", None));
    assert!(!resolve_is_light("#000000", None));
    assert!(resolve_is_light("rgb(200,200,200)", None));
    assert!(resolve_is_light("rgba(255, 255, 255, 0.9)", None));
    assert!(resolve_is_light("white", None));
}

struct Page {
    body: Color,
}

struct Panel<'a> {
    page: &'a Page,
}

impl Container for Page {
    fn effective_background_color(&self) -> Option<Color> {
        Some(self.body)
    }

    fn parent(&self) -> Option<&dyn Container> {
        None
    }
}

impl Container for Panel<'_> {
    fn effective_background_color(&self) -> Option<Color> {
        None
    }

    fn parent(&self) -> Option<&dyn Container> {
        Some(self.page)
    }
}

#[test]
fn test_theme_follows_page_changes() {
    let mut page = Page { body: Color::WHITE };
    assert!(resolve_is_light("transparent", Some(&Panel { page: &page })));

    page.body = Color::BLACK;
    assert!(!resolve_is_light("transparent", Some(&Panel { page: &page })));
}

// =============================================================================
// Animation Integration Tests
// =============================================================================

const EASINGS: [Easing; 4] = [
    Easing::Linear,
    Easing::EaseOut,
    Easing::EaseInOut,
    Easing::Spring,
];

#[test]
fn test_progress_boundaries_every_easing() {
    for easing in EASINGS {
        let config = AnimationSpec {
            easing,
            delay_ms: 40.0,
            ..AnimationSpec::default()
        }
        .resolve();
        for item in 0..5 {
            assert_eq!(config.progress(item, 0.0), 0.0, "{easing:?} item {item}");
            assert_eq!(
                config.progress(item, config.total_duration_ms(5)),
                1.0,
                "{easing:?} item {item}"
            );
            assert_eq!(config.progress(item, f64::INFINITY), 1.0);
        }
    }
}

#[test]
fn test_completion_iff_every_item_reached_one() {
    let config = AnimationSpec {
        duration_ms: 200.0,
        delay_ms: 25.0,
        ..AnimationSpec::default()
    }
    .resolve();
    let n = 6;
    for elapsed in (0..=400).step_by(5).map(f64::from) {
        let all_done = (0..n).all(|i| config.raw_progress(i, elapsed) >= 1.0);
        assert_eq!(config.is_complete(elapsed, n), all_done, "elapsed {elapsed}");
    }
}

#[test]
fn test_full_run_with_manual_frames() {
    let config = AnimationSpec {
        duration_ms: 100.0,
        delay_ms: 10.0,
        easing: Easing::Spring,
        ..AnimationSpec::default()
    }
    .resolve();
    let mut host = ManualFrameHost::new();
    let mut animator = Animator::new(config);

    animator.start(&mut host, 1_000.0, 3);
    assert!(animator.is_running());

    let mut now = 1_000.0;
    let mut last = None;
    while host.fire().is_some() {
        now += 16.0;
        last = Some(animator.tick(&mut host, now));
    }

    let last = last.expect("at least one frame");
    assert!(last.is_settled());
    for item in 0..3 {
        assert_eq!(last.item(item), 1.0);
    }
    assert_eq!(animator.state(), AnimationState::Completed);
    assert_eq!(host.outstanding(), 0);
}

#[test]
fn test_restart_cancels_pending_frame() {
    let mut host = ManualFrameHost::new();
    let mut animator = Animator::new(AnimationSpec::default().resolve());
    animator.start(&mut host, 0.0, 4);
    animator.start(&mut host, 50.0, 4);
    assert_eq!(host.cancelled(), 1);
    assert_eq!(host.outstanding(), 1);
}

#[test]
fn test_disabled_style_never_schedules() {
    let options = ChartOptions::default()
        .merge(&serde_json::json!({"animationStyle": "none"}))
        .unwrap();
    let mut host = ManualFrameHost::new();
    let mut animator = Animator::new(options.animation(AnimationStyle::Sweep).resolve());
    let progress = animator.start(&mut host, 0.0, 10);
    assert!(progress.is_settled());
    assert_eq!(host.requested(), 0);
}

// =============================================================================
// Hit-Testing Integration Tests
// =============================================================================

#[test]
fn test_rect_center_and_one_pixel_outside() {
    let rects = [
        Rect::new(0.0, 0.0, 40.0, 30.0),
        Rect::new(40.0, 0.0, 60.0, 30.0),
        Rect::new(0.0, 30.0, 100.0, 70.0),
    ];
    let records: Vec<_> = rects
        .iter()
        .enumerate()
        .map(|(i, r)| GeometryRecord::rect(i, *r))
        .collect();
    let tester = HitTester::default();

    for (i, r) in rects.iter().enumerate() {
        assert_eq!(tester.hit_test(r.center(), &records), Some(i));
    }
    assert_eq!(tester.hit_test(Point::new(-1.0, 50.0), &records), None);
    assert_eq!(tester.hit_test(Point::new(101.0, 50.0), &records), None);
    assert_eq!(tester.hit_test(Point::new(50.0, 101.0), &records), None);
}

#[test]
fn test_three_equal_slices() {
    let center = Point::new(150.0, 150.0);
    let sweep = TAU / 3.0;
    let records: Vec<_> = (0..3)
        .map(|i| {
            let start = (i as f64).mul_add(sweep, -FRAC_PI_2);
            GeometryRecord::sector(i, center, 0.0, 100.0, start, start + sweep)
        })
        .collect();
    let tester = HitTester::default();
    let at = |deg: f64| center.polar(50.0, deg * PI / 180.0);

    assert_eq!(tester.hit_test(at(-89.0), &records), Some(0));
    assert_eq!(tester.hit_test(at(31.0), &records), Some(1));
    assert_eq!(tester.hit_test(at(151.0), &records), Some(2));
    assert_eq!(tester.hit_test(at(30.0), &records), Some(1));
    assert_eq!(tester.hit_test(at(150.0), &records), Some(2));
}
