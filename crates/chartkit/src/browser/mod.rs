//! Browser runtime: charts mounted into DOM containers.
//!
//! [`ChartHandle`] is the JavaScript-facing entry point. It wires a
//! [`WebHost`] (canvas, tooltip, resize observer, animation frames) to a
//! chart from the registry and forwards pointer events to it.

mod app;
mod canvas2d;
mod dom;
mod host;

pub use app::{chart_kinds, init, ChartHandle};
pub use canvas2d::Canvas2dSurface;
pub use dom::ElementContainer;
pub use host::{HostHooks, WebHost};

use chartkit_core::{DataError, OptionsError};
use thiserror::Error;
use wasm_bindgen::JsValue;

/// Failure at the browser boundary.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// No global `window`.
    #[error("no window available")]
    NoWindow,
    /// No `document` on the window.
    #[error("no document available")]
    NoDocument,
    /// The 2D context could not be obtained.
    #[error("canvas context: {0}")]
    Context(String),
    /// A DOM call failed.
    #[error("dom: {0}")]
    Dom(String),
    /// The chart is handling another call (a callback re-entered it).
    #[error("chart is busy")]
    Busy,
    /// Chart data was rejected.
    #[error(transparent)]
    Data(#[from] DataError),
    /// Options were rejected.
    #[error(transparent)]
    Options(#[from] OptionsError),
}

impl From<BrowserError> for JsValue {
    fn from(err: BrowserError) -> Self {
        Self::from_str(&err.to_string())
    }
}
