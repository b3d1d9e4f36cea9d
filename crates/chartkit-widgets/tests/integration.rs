//! Integration tests for chartkit-widgets.

use chartkit_core::{AnimationState, ChartOptions, Color, Container, DrawCommand, Shape};
use chartkit_widgets::{
    create_chart, Area, Chart, Depth, Donut, DynChart, Gauge, HeadlessHost, Heatmap, Radar,
    Viewport,
};
use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::Rc;

fn options(patch: serde_json::Value) -> ChartOptions {
    ChartOptions::default().merge(&patch).unwrap()
}

fn still() -> ChartOptions {
    options(serde_json::json!({"animate": false, "padding": 0, "gap": 0}))
}

struct Page(Color);

impl Container for Page {
    fn effective_background_color(&self) -> Option<Color> {
        Some(self.0)
    }

    fn parent(&self) -> Option<&dyn Container> {
        None
    }
}

// =============================================================================
// Heatmap
// =============================================================================

#[test]
fn test_heatmap_fifty_thirty_twenty_end_to_end() {
    let mut chart = Chart::<Heatmap, _>::create(HeadlessHost::new(100.0, 100.0, 1.0), still());
    chart
        .set_data_json(
            r#"[{"label":"A","weight":50,"change":1},
                {"label":"B","weight":30,"change":-2},
                {"label":"C","weight":20,"change":0}]"#,
        )
        .unwrap();

    let mut areas = [0.0; 3];
    for record in chart.geometry().to_vec() {
        let Shape::Rect(rect) = record.shape else {
            panic!("heatmap records are rects");
        };
        areas[record.index] = rect.area();
        let center = rect.center();
        assert_eq!(chart.hit_test(center.x, center.y), Some(record.index));
    }
    for (area, expected) in areas.iter().zip([5000.0, 3000.0, 2000.0]) {
        assert!((area - expected).abs() <= expected * 0.01, "{area} vs {expected}");
    }
    assert_eq!(chart.hit_test(-5.0, 50.0), None);
}

#[test]
fn test_heatmap_hit_scales_with_device_pixels() {
    let mut chart = Chart::<Heatmap, _>::create(HeadlessHost::new(100.0, 50.0, 2.0), still());
    chart
        .set_data_json(r#"[{"label":"A","weight":1},{"label":"B","weight":1}]"#)
        .unwrap();
    // Geometry lives in a 200x100 device surface; pointers arrive in CSS px.
    let right = chart
        .geometry()
        .iter()
        .find(|r| matches!(r.shape, Shape::Rect(rect) if rect.x > 0.0))
        .unwrap()
        .index;
    assert_eq!(chart.hit_test(75.0, 25.0), Some(right));
    assert_eq!(chart.hit_test(75.0, 75.0), None);
}

#[test]
fn test_heatmap_hover_tooltip_and_labels() {
    let mut chart = Chart::<Heatmap, _>::create(HeadlessHost::new(300.0, 200.0, 1.0), still());
    chart
        .set_data_json(r#"[{"label":"AAPL","weight":10,"change":2.5}]"#)
        .unwrap();
    chart.pointer_move(150.0, 100.0);

    let tooltip = chart.host().tooltip().unwrap();
    assert_eq!(tooltip.title, "AAPL");
    assert_eq!(tooltip.lines[1], "Change: +2.5%");
    assert_eq!((tooltip.x, tooltip.y), (150.0, 100.0));
    assert!(chart.host().canvas().texts().contains(&"AAPL"));
}

// =============================================================================
// Radial
// =============================================================================

#[test]
fn test_donut_slices_and_boundaries() {
    let mut chart = Chart::<Donut, _>::create(HeadlessHost::new(200.0, 200.0, 1.0), still());
    chart
        .set_data_json(r#"[{"label":"a","value":1},{"label":"b","value":1},{"label":"c","value":1}]"#)
        .unwrap();
    let at = |degrees: f64, radius: f64| {
        let angle = degrees * PI / 180.0;
        (100.0 + radius * angle.cos(), 100.0 + radius * angle.sin())
    };

    let (x, y) = at(-80.0, 80.0);
    assert_eq!(chart.hit_test(x, y), Some(0));
    // 30° closes slice 0 and opens slice 1.
    let (x, y) = at(30.0, 80.0);
    assert_eq!(chart.hit_test(x, y), Some(1));
    let (x, y) = at(200.0, 80.0);
    assert_eq!(chart.hit_test(x, y), Some(2));
    // Hole and outside.
    assert_eq!(chart.hit_test(100.0, 100.0), None);
    let (x, y) = at(0.0, 130.0);
    assert_eq!(chart.hit_test(x, y), None);
}

#[test]
fn test_gauge_track_is_one_sector() {
    let mut chart = Chart::<Gauge, _>::create(HeadlessHost::new(200.0, 200.0, 1.0), still());
    chart.set_data_json("75").unwrap();
    assert_eq!(chart.geometry().len(), 1);
    let Shape::Sector {
        center,
        outer_radius,
        ..
    } = chart.geometry()[0].shape
    else {
        panic!("gauge track is a sector");
    };
    let r = outer_radius * 0.9;
    assert_eq!(chart.hit_test(center.x, center.y - r), Some(0));
    // The open bottom of the track.
    assert_eq!(chart.hit_test(center.x, center.y + r), None);
}

#[test]
fn test_radar_vertex_proximity() {
    let mut chart = Chart::<Radar, _>::create(HeadlessHost::new(200.0, 200.0, 1.0), still());
    chart
        .set_data_json(
            r#"{"axes":["a","b","c","d"],
                "series":[{"a":10,"b":10,"c":10,"d":10},{"a":5,"b":5,"c":5,"d":5}]}"#,
        )
        .unwrap();
    let vertex = chart
        .geometry()
        .iter()
        .find(|r| r.index == 4)
        .map(|r| match r.shape {
            Shape::Point { center, .. } => center,
            _ => panic!("radar records are points"),
        })
        .unwrap();
    assert_eq!(chart.hit_test(vertex.x + 3.0, vertex.y), Some(4));
    assert_eq!(chart.hit_test(vertex.x - 30.0, vertex.y - 30.0), None);
}

// =============================================================================
// Axis charts
// =============================================================================

#[test]
fn test_area_sweep_runs_to_completion() {
    let mut chart = Chart::<Area, _>::create(
        HeadlessHost::new(200.0, 100.0, 1.0),
        options(serde_json::json!({"animationDuration": 200, "padding": 0})),
    );
    chart.set_series(vec![vec![1.0, 3.0, 2.0, 5.0]]).unwrap();
    assert!(matches!(chart.animation_state(), AnimationState::Running { .. }));

    let frames = chart.run_frames(16.0);
    assert!(frames >= 12, "{frames}");
    assert_eq!(chart.animation_state(), AnimationState::Completed);
    assert_eq!(chart.host().frames().outstanding(), 0);

    let records = chart.geometry().to_vec();
    assert_eq!(records.len(), 4);
    for record in &records {
        if let Shape::AxisIndex { x, .. } = record.shape {
            assert_eq!(chart.hit_test(x + 1.0, 5.0), Some(record.index));
        }
    }
}

#[test]
fn test_area_flat_series_draws() {
    let mut chart = Chart::<Area, _>::create(HeadlessHost::new(200.0, 100.0, 1.0), still());
    chart.set_data_json("[4, 4, 4]").unwrap();
    let polygons = chart
        .host()
        .canvas()
        .last_frame()
        .iter()
        .filter(|c| matches!(c, DrawCommand::Polygon { .. }))
        .count();
    assert_eq!(polygons, 1);
}

#[test]
fn test_depth_axis_hits_follow_prices() {
    let mut chart = Chart::<Depth, _>::create(HeadlessHost::new(400.0, 200.0, 1.0), still());
    chart
        .set_data_json(
            r#"{"bids":[{"price":99,"quantity":2},{"price":100,"quantity":1}],
                "asks":[{"price":101,"quantity":1},{"price":103,"quantity":2}]}"#,
        )
        .unwrap();
    let xs: Vec<f64> = chart
        .geometry()
        .iter()
        .map(|r| match r.shape {
            Shape::AxisIndex { x, .. } => x,
            _ => panic!("depth records are axis indices"),
        })
        .collect();
    assert_eq!(xs.len(), 4);
    assert!(xs.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(chart.hit_test(xs[3] - 1.0, 10.0), Some(3));
    assert_eq!(chart.host().tooltip(), None);
    chart.pointer_move(xs[0], 10.0);
    assert_eq!(chart.host().tooltip().unwrap().title, "Bid");
}

// =============================================================================
// Theme
// =============================================================================

#[test]
fn test_theme_follows_ambient_on_resize() {
    let host = HeadlessHost::new(100.0, 100.0, 1.0).with_ambient(Page(Color::WHITE));
    let mut chart = Chart::<Donut, _>::create(host, still());
    assert!(chart.theme().is_light);

    chart
        .host_mut()
        .set_ambient(Some(Box::new(Page(Color::rgb(0.05, 0.05, 0.08)))));
    chart.resize();
    assert!(!chart.theme().is_light);

    chart
        .set_options(&serde_json::json!({"background": "#f5f5f5"}))
        .unwrap();
    assert!(chart.theme().is_light);
}

#[test]
fn test_resize_rebuilds_geometry() {
    let mut chart = Chart::<Heatmap, _>::create(HeadlessHost::new(100.0, 100.0, 1.0), still());
    chart
        .set_data_json(r#"[{"label":"A","weight":1}]"#)
        .unwrap();
    chart
        .host_mut()
        .set_viewport(Viewport::new(300.0, 100.0, 1.0));
    chart.resize();
    let Shape::Rect(rect) = chart.geometry()[0].shape else {
        panic!("heatmap records are rects");
    };
    assert_eq!(rect.width, 300.0);
}

// =============================================================================
// Registry
// =============================================================================

#[test]
fn test_registry_chart_lifecycle() {
    let mut chart = create_chart("sparkline", HeadlessHost::new(120.0, 40.0, 1.0), still()).unwrap();
    let hovers = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&hovers);
    chart.on_hover_json(Box::new(move |json, index| sink.borrow_mut().push((json, index))));

    chart.set_data_json("[1, 2, 3]").unwrap();
    assert!(chart.set_data_json(r#"{"nope": true}"#).is_err());
    chart.pointer_move(119.0, 20.0);
    chart.pointer_leave();
    chart.dispose();
    chart.dispose();
    assert!(chart.is_disposed());

    let hovers = hovers.borrow();
    assert_eq!(hovers.len(), 2);
    assert_eq!(hovers[0].1, Some(2));
    assert_eq!(hovers[1], (None, None));
}
