//! Kind-erased charts, created by registry name.

use crate::area::{Area, Sparkline};
use crate::bar::Bar;
use crate::chart::{Chart, ChartKind, Host};
use crate::depth::Depth;
use crate::donut::Donut;
use crate::gauge::Gauge;
use crate::heatmap::Heatmap;
use crate::radar::Radar;
use chartkit_core::{ChartOptions, DataError, OptionsError, ThemeDecision};

/// Registry names of every chart kind.
pub const KINDS: [&str; 8] = [
    Heatmap::NAME,
    Donut::NAME,
    Bar::NAME,
    Radar::NAME,
    Area::NAME,
    Sparkline::NAME,
    Depth::NAME,
    Gauge::NAME,
];

/// Callback receiving the matched item as JSON and its index, or `None` twice.
pub type JsonCallback = Box<dyn FnMut(Option<String>, Option<usize>)>;

/// A chart of any kind, driven with JSON payloads.
pub trait DynChart {
    /// Registry name of the kind.
    fn kind(&self) -> &'static str;

    /// Replace the data from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not match the kind's data shape.
    fn set_data_json(&mut self, json: &str) -> Result<(), DataError>;

    /// Replace the data with numeric series.
    ///
    /// # Errors
    ///
    /// Returns an error if the kind does not take series.
    fn set_series(&mut self, series: Vec<Vec<f64>>) -> Result<(), DataError>;

    /// Replace the data with stacked segments.
    ///
    /// # Errors
    ///
    /// Returns an error if the kind does not stack.
    fn set_stacked_data(&mut self, stacked: Vec<Vec<f64>>) -> Result<(), DataError>;

    /// Merge an options patch.
    ///
    /// # Errors
    ///
    /// Returns an error if the patch is rejected.
    fn set_options(&mut self, patch: &serde_json::Value) -> Result<(), OptionsError>;

    /// Redraw without touching the animation.
    fn redraw(&mut self);

    /// React to a size change.
    fn resize(&mut self);

    /// Frame callback.
    fn on_frame(&mut self);

    /// Highlight an item, or clear with `None`.
    fn set_active_index(&mut self, index: Option<usize>);

    /// Pointer moved, CSS pixels.
    fn pointer_move(&mut self, x: f64, y: f64);

    /// Pointer left.
    fn pointer_leave(&mut self);

    /// Click, CSS pixels.
    fn click(&mut self, x: f64, y: f64);

    /// Register the click callback.
    fn on_click_json(&mut self, callback: JsonCallback);

    /// Register the hover callback.
    fn on_hover_json(&mut self, callback: JsonCallback);

    /// Last theme decision.
    fn theme(&self) -> ThemeDecision;

    /// Data index at `(x, y)` in CSS pixels.
    fn hit_test(&mut self, x: f64, y: f64) -> Option<usize>;

    /// Stop and release. Safe to call twice.
    fn dispose(&mut self);

    /// Whether `dispose` ran.
    fn is_disposed(&self) -> bool;
}

fn json_adapter<T: serde::Serialize>(
    mut callback: JsonCallback,
) -> impl FnMut(Option<T>, Option<usize>) + 'static {
    move |item: Option<T>, index| {
        let json = item.and_then(|item| serde_json::to_string(&item).ok());
        callback(json, index);
    }
}

impl<K: ChartKind, H: Host> DynChart for Chart<K, H> {
    fn kind(&self) -> &'static str {
        K::NAME
    }

    fn set_data_json(&mut self, json: &str) -> Result<(), DataError> {
        Self::set_data_json(self, json)
    }

    fn set_series(&mut self, series: Vec<Vec<f64>>) -> Result<(), DataError> {
        Self::set_series(self, series)
    }

    fn set_stacked_data(&mut self, stacked: Vec<Vec<f64>>) -> Result<(), DataError> {
        Self::set_stacked_data(self, stacked)
    }

    fn set_options(&mut self, patch: &serde_json::Value) -> Result<(), OptionsError> {
        Self::set_options(self, patch)
    }

    fn redraw(&mut self) {
        Self::redraw(self);
    }

    fn resize(&mut self) {
        Self::resize(self);
    }

    fn on_frame(&mut self) {
        Self::on_frame(self);
    }

    fn set_active_index(&mut self, index: Option<usize>) {
        Self::set_active_index(self, index);
    }

    fn pointer_move(&mut self, x: f64, y: f64) {
        Self::pointer_move(self, x, y);
    }

    fn pointer_leave(&mut self) {
        Self::pointer_leave(self);
    }

    fn click(&mut self, x: f64, y: f64) {
        Self::click(self, x, y);
    }

    fn on_click_json(&mut self, callback: JsonCallback) {
        self.on_click(json_adapter(callback));
    }

    fn on_hover_json(&mut self, callback: JsonCallback) {
        self.on_hover(json_adapter(callback));
    }

    fn theme(&self) -> ThemeDecision {
        Self::theme(self)
    }

    fn hit_test(&mut self, x: f64, y: f64) -> Option<usize> {
        Self::hit_test(self, x, y)
    }

    fn dispose(&mut self) {
        Self::dispose(self);
    }

    fn is_disposed(&self) -> bool {
        Self::is_disposed(self)
    }
}

/// Create a chart by registry name.
///
/// # Errors
///
/// Returns [`DataError::UnknownKind`] for names not in [`KINDS`].
pub fn create_chart<H: Host + 'static>(
    kind: &str,
    host: H,
    options: ChartOptions,
) -> Result<Box<dyn DynChart>, DataError> {
    let chart: Box<dyn DynChart> = match kind {
        Heatmap::NAME => Box::new(Chart::<Heatmap, H>::create(host, options)),
        Donut::NAME => Box::new(Chart::<Donut, H>::create(host, options)),
        Bar::NAME => Box::new(Chart::<Bar, H>::create(host, options)),
        Radar::NAME => Box::new(Chart::<Radar, H>::create(host, options)),
        Area::NAME => Box::new(Chart::<Area, H>::create(host, options)),
        Sparkline::NAME => Box::new(Chart::<Sparkline, H>::create(host, options)),
        Depth::NAME => Box::new(Chart::<Depth, H>::create(host, options)),
        Gauge::NAME => Box::new(Chart::<Gauge, H>::create(host, options)),
        other => return Err(DataError::UnknownKind(other.to_string())),
    };
    Ok(chart)
}
