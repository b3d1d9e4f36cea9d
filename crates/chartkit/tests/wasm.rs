//! WASM browser tests - run with `wasm-pack test --headless --chrome`

#![cfg(target_arch = "wasm32")]

use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{HtmlElement, MouseEvent};

wasm_bindgen_test_configure!(run_in_browser);

use chartkit::browser::{chart_kinds, ChartHandle};

fn div() -> HtmlElement {
    let document = web_sys::window().unwrap().document().unwrap();
    document.create_element("div").unwrap().dyn_into().unwrap()
}

fn mount_point() -> HtmlElement {
    let div = div();
    div.style().set_property("width", "320px").unwrap();
    div.style().set_property("height", "200px").unwrap();
    let body = web_sys::window().unwrap().document().unwrap().body().unwrap();
    body.append_child(&div).unwrap();
    div
}

fn surface(background: &str) -> HtmlElement {
    let parent = div();
    parent.style().set_property("background-color", background).unwrap();
    let body = web_sys::window().unwrap().document().unwrap().body().unwrap();
    body.append_child(&parent).unwrap();
    parent
}

// ============================================================================
// Mounting
// ============================================================================

#[wasm_bindgen_test]
fn test_create_adds_canvas_and_tooltip() {
    let div = mount_point();
    let chart = ChartHandle::create(div.clone(), "heatmap", "").unwrap();
    assert_eq!(div.child_element_count(), 2);
    assert_eq!(div.first_element_child().unwrap().tag_name(), "CANVAS");

    chart
        .set_data(r#"[{"label":"AAPL","weight":3,"change":1.5},{"label":"MSFT","weight":1}]"#)
        .unwrap();
    chart.dispose();
    assert_eq!(div.child_element_count(), 0);
}

#[wasm_bindgen_test]
fn test_canvas_backing_store_uses_device_pixels() {
    let div = mount_point();
    let chart = ChartHandle::create(div.clone(), "donut", r#"{"animate":false}"#).unwrap();
    chart.set_data(r#"[{"label":"a","value":1}]"#).unwrap();

    let canvas: web_sys::HtmlCanvasElement =
        div.first_element_child().unwrap().dyn_into().unwrap();
    let dpr = web_sys::window().unwrap().device_pixel_ratio();
    assert_eq!(f64::from(canvas.width()), (320.0 * dpr).round());
}

#[wasm_bindgen_test]
fn test_unknown_kind_is_rejected() {
    let div = mount_point();
    assert!(ChartHandle::create(div.clone(), "pie3d", "").is_err());
    assert_eq!(div.child_element_count(), 0);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[wasm_bindgen_test]
fn test_dispose_twice_and_calls_after() {
    let div = mount_point();
    let chart = ChartHandle::create(div, "bar", "").unwrap();
    chart.set_data(r#"[{"label":"a","value":2}]"#).unwrap();
    chart.dispose();
    chart.dispose();
    chart.redraw().unwrap();
    chart.set_active_index(0).unwrap();
}

#[wasm_bindgen_test]
fn test_dispose_from_click_callback_releases_everything() {
    let div = mount_point();
    let chart = ChartHandle::create(div.clone(), "heatmap", r#"{"animate":false}"#).unwrap();
    let chart = Rc::new(chart);
    chart.set_data(r#"[{"label":"A","weight":1}]"#).unwrap();

    let handle = Rc::clone(&chart);
    let callback = Closure::<dyn FnMut(JsValue, JsValue)>::new(move |_item, _index| {
        handle.dispose();
    });
    chart
        .on_click(callback.as_ref().unchecked_ref::<js_sys::Function>().clone())
        .unwrap();
    callback.forget();

    let canvas = div.first_element_child().unwrap();
    let click = MouseEvent::new("click").unwrap();
    canvas.dispatch_event(&click).unwrap();

    assert!(chart.is_disposed());
    assert_eq!(div.child_element_count(), 0);
}

// ============================================================================
// Theme
// ============================================================================

#[wasm_bindgen_test]
fn test_theme_follows_container_to_new_parent() {
    let dark = surface("rgb(12, 12, 20)");
    let light = surface("rgb(250, 250, 250)");
    let container = div();
    container.style().set_property("width", "200px").unwrap();
    container.style().set_property("height", "100px").unwrap();
    dark.append_child(&container).unwrap();

    let chart = ChartHandle::create(container.clone(), "donut", "").unwrap();
    assert!(!chart.is_light());

    light.append_child(&container).unwrap();
    chart.resize().unwrap();
    assert!(chart.is_light());
}

#[wasm_bindgen_test]
fn test_bad_payloads_return_errors() {
    let div = mount_point();
    let chart = ChartHandle::create(div, "gauge", "").unwrap();
    assert!(chart.set_data("not json").is_err());
    assert!(chart.set_series("[[1, 2]]").is_err());
    assert!(chart.set_options(r#"{"animationDuration": "slow"}"#).is_ok());
    assert!(chart.set_options(r#"{"animationDuration": -5}"#).is_ok());
    assert!(chart.set_options("[1, 2]").is_err());
}

#[wasm_bindgen_test]
fn test_chart_kinds_lists_registry() {
    let kinds = chart_kinds();
    assert_eq!(kinds.length(), 8);
    assert_eq!(kinds.get(0).as_string().as_deref(), Some("heatmap"));
}
