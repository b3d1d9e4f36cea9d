//! chartkit: interactive canvas charts with a Rust core.
//!
//! The pieces live in focused crates re-exported here:
//! - [`chartkit_core`]: geometry, color, theme, animation, hit-testing and
//!   the drawing surface
//! - [`layout`]: the squarified treemap
//! - [`widgets`]: the chart runtime and every chart kind
//!
//! On `wasm32` the [`browser`] module mounts charts into DOM containers.
//!
//! # Browser Usage (WASM)
//!
//! ```javascript
//! import init, { ChartHandle } from './chartkit.js';
//!
//! await init();
//! const chart = ChartHandle.create(document.getElementById('map'), 'heatmap', '{}');
//! chart.setData(JSON.stringify([{ label: 'AAPL', weight: 50, change: 1.2 }]));
//! chart.onClick((item, index) => console.log(item, index));
//! ```
//!
//! # Headless Usage
//!
//! ```
//! use chartkit::widgets::{create_chart, DynChart, HeadlessHost};
//! use chartkit::ChartOptions;
//!
//! let mut chart = create_chart("donut", HeadlessHost::new(200.0, 200.0, 1.0), ChartOptions::default())?;
//! chart.set_data_json(r#"[{"label":"a","value":1},{"label":"b","value":3}]"#)?;
//! assert_eq!(chart.kind(), "donut");
//! # Ok::<(), chartkit::DataError>(())
//! ```

pub use chartkit_core::*;
pub use chartkit_layout as layout;
pub use chartkit_widgets as widgets;

#[cfg(target_arch = "wasm32")]
pub mod browser;

#[cfg(target_arch = "wasm32")]
pub use browser::ChartHandle;
