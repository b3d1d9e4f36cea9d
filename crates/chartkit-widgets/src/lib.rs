//! Chart widgets for chartkit.
//!
//! Every widget is a [`ChartKind`] driven by the shared [`Chart`] runtime:
//! - [`Heatmap`]: treemap of weighted cells colored by change
//! - [`Donut`]: categorical slices around a ring
//! - [`Bar`]: categorical bars, optionally stacked
//! - [`Radar`]: series over named axes
//! - [`Area`] and [`Sparkline`]: numeric series over an even x axis
//! - [`Depth`]: cumulative order-book depth
//! - [`Gauge`]: one value on a 270° track
//!
//! [`create_chart`] builds any of them by name behind [`DynChart`].

pub mod area;
pub mod bar;
pub mod chart;
pub mod depth;
pub mod donut;
pub mod gauge;
pub mod heatmap;
pub mod radar;
pub mod registry;
pub mod scale;

pub use area::{Area, LabeledValue, SeriesData, SeriesPoint, Sparkline};
pub use bar::{Bar, BarData, BarItem, BarPoint};
pub use chart::{
    tooltip_json, Chart, ChartKind, HeadlessHost, Host, ItemCallback, PaintContext, Tooltip,
    Viewport,
};
pub use depth::{Depth, DepthData, DepthPoint, Level, Side};
pub use donut::{Donut, DonutData, DonutItem, Slice};
pub use gauge::{Gauge, GaugeData};
pub use heatmap::{change_color, Heatmap, HeatmapCell, HeatmapData};
pub use radar::{Radar, RadarData, RadarPoint};
pub use registry::{create_chart, DynChart, JsonCallback, KINDS};
pub use scale::{LinearScale, ValueRange};
