//! Categorical bar chart, optionally stacked.

use crate::chart::{ChartKind, PaintContext, Tooltip};
use crate::scale::{LinearScale, ValueRange};
use chartkit_core::{
    format_value, AnimationStyle, Canvas, ChartOptions, DataError, GeometryRecord, Point, Rect,
    Shape,
};
use serde::{Deserialize, Serialize};

/// A labeled value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarPoint {
    /// Category label
    pub label: String,
    /// Bar value
    pub value: f64,
}

/// Bar data: one stack of segments per category.
///
/// Deserializes from a list of `{label, value}` points, each becoming a
/// single-segment stack.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<BarPoint>")]
pub struct BarData {
    /// Category labels
    pub labels: Vec<String>,
    /// Segments per category, bottom to top
    pub stacks: Vec<Vec<f64>>,
}

impl From<Vec<BarPoint>> for BarData {
    fn from(points: Vec<BarPoint>) -> Self {
        let (labels, stacks) = points
            .into_iter()
            .map(|p| (p.label, vec![p.value]))
            .unzip();
        Self { labels, stacks }
    }
}

impl BarData {
    /// Replace the segments, keeping labels where they line up. Categories
    /// without a label are numbered.
    pub fn set_stacks(&mut self, stacks: Vec<Vec<f64>>) {
        self.labels.truncate(stacks.len());
        for i in self.labels.len()..stacks.len() {
            self.labels.push((i + 1).to_string());
        }
        self.stacks = stacks;
    }

    /// Positive and negative extents of a category.
    #[must_use]
    pub fn extent(&self, category: usize) -> (f64, f64) {
        self.stacks.get(category).map_or((0.0, 0.0), |segments| {
            segments
                .iter()
                .filter(|v| v.is_finite())
                .fold((0.0, 0.0), |(up, down), v| {
                    if *v >= 0.0 {
                        (up + v, down)
                    } else {
                        (up, down + v)
                    }
                })
        })
    }

    /// Sum of a category's segments.
    #[must_use]
    pub fn total(&self, category: usize) -> f64 {
        let (up, down) = self.extent(category);
        up + down
    }

    fn is_stacked(&self) -> bool {
        self.stacks.iter().any(|s| s.len() > 1)
    }
}

/// Hovered category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarItem {
    /// Category label
    pub label: String,
    /// Sum of segments
    pub value: f64,
    /// Individual segments, bottom to top
    pub segments: Vec<f64>,
}

/// Bar chart kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bar;

struct BarLayout {
    plot: Rect,
    scale: LinearScale,
    slot: f64,
    bar_width: f64,
}

fn label_band(ctx: &PaintContext<'_>) -> f64 {
    if ctx.options.show_labels {
        ctx.px(ctx.options.font_size.max(1.0) * 1.8)
    } else {
        0.0
    }
}

fn bar_layout(data: &BarData, ctx: &PaintContext<'_>) -> Option<BarLayout> {
    let n = data.stacks.len();
    if n == 0 {
        return None;
    }
    let b = ctx.bounds;
    let plot = Rect::new(b.x, b.y, b.width, (b.height - label_band(ctx)).max(0.0));
    let range = ValueRange::from_values((0..n).flat_map(|i| {
        let (up, down) = data.extent(i);
        [up, down]
    }))?
    .including_zero();

    let slot = plot.width / n as f64;
    let bar_width = (slot - ctx.px(ctx.options.gap.max(0.0))).max(slot * 0.2);
    Some(BarLayout {
        plot,
        scale: LinearScale::new(range, plot.bottom(), plot.y),
        slot,
        bar_width,
    })
}

impl ChartKind for Bar {
    type Data = BarData;
    type Item = BarItem;

    const NAME: &'static str = "bar";
    const DEFAULT_STYLE: AnimationStyle = AnimationStyle::Grow;

    fn item_count(data: &Self::Data) -> usize {
        data.stacks.len()
    }

    fn item(data: &Self::Data, index: usize) -> Option<BarItem> {
        let segments = data.stacks.get(index)?.clone();
        Some(BarItem {
            label: data.labels.get(index).cloned().unwrap_or_default(),
            value: data.total(index),
            segments,
        })
    }

    fn build_geometry(data: &Self::Data, ctx: &PaintContext<'_>) -> Vec<GeometryRecord> {
        let Some(layout) = bar_layout(data, ctx) else {
            return Vec::new();
        };
        let zero = layout.scale.map(0.0);
        (0..data.stacks.len())
            .map(|i| {
                let (up, down) = data.extent(i);
                let top = layout.scale.map(up);
                let bottom = layout.scale.map(down);
                let x = (i as f64).mul_add(layout.slot, layout.plot.x)
                    + (layout.slot - layout.bar_width) / 2.0;
                let (y0, y1) = (top.min(zero), bottom.max(zero));
                GeometryRecord::rect(i, Rect::new(x, y0, layout.bar_width, y1 - y0))
            })
            .collect()
    }

    fn paint(
        canvas: &mut dyn Canvas,
        data: &Self::Data,
        geometry: &[GeometryRecord],
        ctx: &PaintContext<'_>,
    ) {
        let Some(layout) = bar_layout(data, ctx) else {
            return;
        };
        let zero = layout.scale.map(0.0);
        let stacked = data.is_stacked();
        let line = ctx.px(1.0);

        canvas.stroke_path(
            &[
                Point::new(layout.plot.x, zero),
                Point::new(layout.plot.right(), zero),
            ],
            false,
            ctx.palette.grid,
            line,
        );

        let text = ctx.text_style().colored(ctx.palette.muted_text);
        for record in geometry {
            let Shape::Rect(bar) = record.shape else {
                continue;
            };
            let i = record.index;
            let grow = ctx.reveal(i, AnimationStyle::Grow).max(0.0);
            let sweep = ctx.reveal(i, AnimationStyle::Sweep).clamp(0.0, 1.0);
            let alpha = ctx.item_alpha(i, i);

            let (mut up, mut down) = (0.0, 0.0);
            for (s, value) in data.stacks[i].iter().enumerate() {
                if !value.is_finite() || *value == 0.0 {
                    continue;
                }
                let (from, to) = if *value > 0.0 {
                    up += value;
                    (up - value, up)
                } else {
                    down += value;
                    (down - value, down)
                };
                let y_from = (layout.scale.map(from) - zero).mul_add(grow, zero);
                let y_to = (layout.scale.map(to) - zero).mul_add(grow, zero);
                let rect = Rect::new(
                    bar.x,
                    y_from.min(y_to),
                    bar.width * sweep,
                    (y_to - y_from).abs(),
                );
                let color = if stacked {
                    ctx.palette.series_color(s)
                } else {
                    ctx.palette.series_color(0)
                };
                canvas.fill_rect(rect, color.fade(alpha));
            }

            if ctx.options.show_labels {
                if let Some(label) = data.labels.get(i) {
                    let band = label_band(ctx);
                    let position = Point::new(bar.center().x, layout.plot.bottom() + band / 2.0);
                    if canvas.measure_text(label, &text) <= layout.slot {
                        canvas.draw_text(label, position, &text.clone().colored(text.color.fade(alpha)));
                    }
                }
            }
        }
    }

    fn tooltip(
        data: &Self::Data,
        record: &GeometryRecord,
        options: &ChartOptions,
    ) -> Option<Tooltip> {
        let item = Self::item(data, record.index)?;
        let mut tooltip =
            Tooltip::new(&item.label).line(format_value(item.value, options.decimals));
        if item.segments.len() > 1 {
            for (s, value) in item.segments.iter().enumerate() {
                tooltip = tooltip.line(format!(
                    "Segment {}: {}",
                    s + 1,
                    format_value(*value, options.decimals)
                ));
            }
        }
        Some(tooltip)
    }

    fn apply_stacked(data: &mut Self::Data, stacked: Vec<Vec<f64>>) -> Result<(), DataError> {
        data.set_stacks(stacked);
        Ok(())
    }
}
