//! JavaScript entry points.

use super::host::{HostHooks, WebHost};
use super::BrowserError;
use chartkit_core::{ChartOptions, DataError};
use chartkit_widgets::{create_chart, DynChart, KINDS};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, HtmlElement, MouseEvent};

/// The chart plus a dispose request that arrived while it was borrowed.
struct SharedChart {
    chart: RefCell<Box<dyn DynChart>>,
    dispose_pending: Cell<bool>,
}

impl SharedChart {
    /// Run `f` on the chart, or return `None` if a call is already inside it.
    ///
    /// A dispose requested from within `f` (a JavaScript callback calling
    /// `dispose()`) is carried out once `f` returns.
    fn run<R>(&self, f: impl FnOnce(&mut dyn DynChart) -> R) -> Option<R> {
        let result = {
            let mut chart = self.chart.try_borrow_mut().ok()?;
            f(chart.as_mut())
        };
        if self.dispose_pending.take() {
            self.dispose();
        }
        Some(result)
    }

    fn dispose(&self) {
        match self.chart.try_borrow_mut() {
            Ok(mut chart) => chart.dispose(),
            Err(_) => self.dispose_pending.set(true),
        }
    }

    fn is_disposed(&self) -> bool {
        self.dispose_pending.get() || self.chart.try_borrow().is_ok_and(|c| c.is_disposed())
    }
}

/// A chart mounted in a DOM container.
///
/// Payloads cross this boundary as JSON strings. Errors are returned as
/// string `JsValue`s and also logged to the console.
#[wasm_bindgen]
pub struct ChartHandle {
    chart: Rc<SharedChart>,
    hooks: Rc<HostHooks>,
    canvas: HtmlCanvasElement,
    // Detached on dispose but only dropped with the handle, since dispose
    // can run from inside one of them.
    listeners: Vec<(&'static str, Closure<dyn FnMut(MouseEvent)>)>,
}

fn report(err: BrowserError) -> JsValue {
    web_sys::console::error_1(&JsValue::from_str(&format!("chartkit: {err}")));
    err.into()
}

/// Item payload for JavaScript callbacks: parsed JSON, or `null`.
fn item_value(json: Option<String>) -> JsValue {
    json.and_then(|j| js_sys::JSON::parse(&j).ok())
        .unwrap_or(JsValue::NULL)
}

/// Index for JavaScript callbacks: `-1` when nothing matched.
fn index_value(index: Option<usize>) -> JsValue {
    index
        .and_then(|i| u32::try_from(i).ok())
        .map_or_else(|| JsValue::from(-1), JsValue::from)
}

fn pointer_listener(
    chart: Weak<SharedChart>,
    action: fn(&mut dyn DynChart, &MouseEvent),
) -> Closure<dyn FnMut(MouseEvent)> {
    Closure::new(move |event: MouseEvent| {
        // Events arriving while a callback runs inside the chart are skipped.
        if let Some(chart) = chart.upgrade() {
            chart.run(|chart| action(chart, &event));
        }
    })
}

#[wasm_bindgen]
impl ChartHandle {
    /// Mount a chart of `kind` into `container`.
    ///
    /// `options_json` is a JSON object of options, or an empty string for
    /// the defaults.
    pub fn create(
        container: HtmlElement,
        kind: &str,
        options_json: &str,
    ) -> Result<ChartHandle, JsValue> {
        console_error_panic_hook::set_once();
        Self::build(container, kind, options_json).map_err(report)
    }

    /// Replace the data from a JSON payload.
    #[wasm_bindgen(js_name = setData)]
    pub fn set_data(&self, json: &str) -> Result<(), JsValue> {
        self.with_chart(|chart| Ok(chart.set_data_json(json)?))
    }

    /// Replace the data with numeric series: a JSON array of arrays.
    #[wasm_bindgen(js_name = setSeries)]
    pub fn set_series(&self, json: &str) -> Result<(), JsValue> {
        self.with_chart(|chart| {
            let series: Vec<Vec<f64>> = serde_json::from_str(json).map_err(DataError::from)?;
            Ok(chart.set_series(series)?)
        })
    }

    /// Replace the data with stacked segments: a JSON array of arrays.
    #[wasm_bindgen(js_name = setStackedData)]
    pub fn set_stacked_data(&self, json: &str) -> Result<(), JsValue> {
        self.with_chart(|chart| {
            let stacked: Vec<Vec<f64>> = serde_json::from_str(json).map_err(DataError::from)?;
            Ok(chart.set_stacked_data(stacked)?)
        })
    }

    /// Merge a JSON object of options.
    #[wasm_bindgen(js_name = setOptions)]
    pub fn set_options(&self, json: &str) -> Result<(), JsValue> {
        self.with_chart(|chart| {
            let patch: serde_json::Value = serde_json::from_str(json)
                .map_err(|e| BrowserError::Options(e.into()))?;
            Ok(chart.set_options(&patch)?)
        })
    }

    /// Redraw without restarting the animation.
    pub fn redraw(&self) -> Result<(), JsValue> {
        self.with_chart(|chart| {
            chart.redraw();
            Ok(())
        })
    }

    /// Re-measure the container and redraw.
    pub fn resize(&self) -> Result<(), JsValue> {
        self.with_chart(|chart| {
            chart.resize();
            Ok(())
        })
    }

    /// Highlight an item; a negative index clears the highlight.
    #[wasm_bindgen(js_name = setActiveIndex)]
    pub fn set_active_index(&self, index: i32) -> Result<(), JsValue> {
        self.with_chart(|chart| {
            chart.set_active_index(usize::try_from(index).ok());
            Ok(())
        })
    }

    /// Register `callback(item, index)` for clicks; `(null, -1)` on a miss.
    #[wasm_bindgen(js_name = onClick)]
    pub fn on_click(&self, callback: js_sys::Function) -> Result<(), JsValue> {
        self.with_chart(|chart| {
            chart.on_click_json(Box::new(move |json, index| {
                callback
                    .call2(&JsValue::NULL, &item_value(json), &index_value(index))
                    .ok();
            }));
            Ok(())
        })
    }

    /// Register `callback(item, index)` for hover changes.
    #[wasm_bindgen(js_name = onHover)]
    pub fn on_hover(&self, callback: js_sys::Function) -> Result<(), JsValue> {
        self.with_chart(|chart| {
            chart.on_hover_json(Box::new(move |json, index| {
                callback
                    .call2(&JsValue::NULL, &item_value(json), &index_value(index))
                    .ok();
            }));
            Ok(())
        })
    }

    /// Whether the chart currently uses the light palette.
    #[wasm_bindgen(js_name = isLight)]
    pub fn is_light(&self) -> bool {
        self.chart.run(|chart| chart.theme().is_light).unwrap_or(false)
    }

    /// Whether `dispose` has been called.
    #[wasm_bindgen(js_name = isDisposed)]
    pub fn is_disposed(&self) -> bool {
        self.chart.is_disposed()
    }

    /// Remove the chart from the page. Safe to call twice, and from inside
    /// an `onClick`/`onHover` callback, where the release completes as soon
    /// as the callback returns.
    pub fn dispose(&self) {
        for (event, listener) in &self.listeners {
            self.canvas
                .remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref())
                .ok();
        }
        self.hooks.clear();
        self.chart.dispose();
    }
}

impl ChartHandle {
    fn build(container: HtmlElement, kind: &str, options_json: &str) -> Result<Self, BrowserError> {
        if !KINDS.contains(&kind) {
            return Err(DataError::UnknownKind(kind.to_string()).into());
        }
        let options = if options_json.trim().is_empty() {
            ChartOptions::default()
        } else {
            ChartOptions::from_json(options_json)?
        };
        let host = WebHost::new(container)?;
        let hooks = host.hooks();
        let canvas = host.canvas();
        let chart = Rc::new(SharedChart {
            chart: RefCell::new(create_chart(kind, host, options)?),
            dispose_pending: Cell::new(false),
        });

        let weak = Rc::downgrade(&chart);
        hooks.on_frame(move || {
            if let Some(chart) = weak.upgrade() {
                chart.run(|chart| chart.on_frame());
            }
        });
        let weak = Rc::downgrade(&chart);
        hooks.on_resize(move || {
            if let Some(chart) = weak.upgrade() {
                chart.run(|chart| chart.resize());
            }
        });

        let listeners = vec![
            (
                "pointermove",
                pointer_listener(Rc::downgrade(&chart), |chart, e| {
                    chart.pointer_move(f64::from(e.offset_x()), f64::from(e.offset_y()));
                }),
            ),
            (
                "pointerleave",
                pointer_listener(Rc::downgrade(&chart), |chart, _| chart.pointer_leave()),
            ),
            (
                "click",
                pointer_listener(Rc::downgrade(&chart), |chart, e| {
                    chart.click(f64::from(e.offset_x()), f64::from(e.offset_y()));
                }),
            ),
        ];
        for (event, listener) in &listeners {
            canvas
                .add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())
                .map_err(|e| BrowserError::Dom(format!("{e:?}")))?;
        }

        tracing::debug!(kind, "chart mounted");
        Ok(Self {
            chart,
            hooks,
            canvas,
            listeners,
        })
    }

    fn with_chart(
        &self,
        f: impl FnOnce(&mut dyn DynChart) -> Result<(), BrowserError>,
    ) -> Result<(), JsValue> {
        self.chart
            .run(f)
            .ok_or_else(|| report(BrowserError::Busy))?
            .map_err(report)
    }
}

/// Registry names accepted by [`ChartHandle::create`].
#[wasm_bindgen(js_name = chartKinds)]
pub fn chart_kinds() -> js_sys::Array {
    KINDS.iter().map(|k| JsValue::from_str(k)).collect()
}

/// Install the panic hook.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}
