//! Area charts and sparklines over evenly spaced numeric series.

use crate::chart::{ChartKind, PaintContext, Tooltip};
use crate::scale::{LinearScale, ValueRange};
use chartkit_core::{
    format_value, AnimationStyle, AxisMap, Canvas, ChartOptions, DataError, GeometryRecord, Point,
    Rect, TextAlign,
};
use serde::{Deserialize, Serialize};

/// Labeled point accepted by `set_data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledValue {
    /// X-axis label
    pub label: String,
    /// Value
    pub value: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum SeriesInput {
    Single(Vec<f64>),
    Multi(Vec<Vec<f64>>),
    Labeled(Vec<LabeledValue>),
}

/// One or more series sharing an x axis.
///
/// Deserializes from `[1, 2, 3]`, `[[1, 2], [3, 4]]` or
/// `[{"label": "Mon", "value": 1}, ...]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "SeriesInput")]
pub struct SeriesData {
    /// Series values; non-finite values are gaps
    pub series: Vec<Vec<f64>>,
    /// Optional x-axis labels
    pub labels: Vec<String>,
}

impl From<SeriesInput> for SeriesData {
    fn from(input: SeriesInput) -> Self {
        match input {
            SeriesInput::Single(values) => Self {
                series: vec![values],
                labels: Vec::new(),
            },
            SeriesInput::Multi(series) => Self {
                series,
                labels: Vec::new(),
            },
            SeriesInput::Labeled(points) => {
                let (labels, values) = points.into_iter().map(|p| (p.label, p.value)).unzip();
                Self {
                    series: vec![values],
                    labels,
                }
            }
        }
    }
}

impl SeriesData {
    /// Number of x positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.series.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Whether there is nothing to plot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Range over every finite value.
    #[must_use]
    pub fn range(&self) -> Option<ValueRange> {
        ValueRange::from_values(self.series.iter().flatten().copied())
    }
}

/// Values of every series at one x position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// X position
    pub index: usize,
    /// X-axis label, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// One value per series; `None` where a series is shorter or has a gap
    pub values: Vec<Option<f64>>,
}

fn point_at(data: &SeriesData, index: usize) -> Option<SeriesPoint> {
    (index < data.len()).then(|| SeriesPoint {
        index,
        label: data.labels.get(index).cloned(),
        values: data
            .series
            .iter()
            .map(|s| s.get(index).copied().filter(|v| v.is_finite()))
            .collect(),
    })
}

fn tooltip_for(data: &SeriesData, index: usize, options: &ChartOptions) -> Option<Tooltip> {
    let point = point_at(data, index)?;
    let title = point
        .label
        .clone()
        .unwrap_or_else(|| format!("#{}", index + 1));
    let multi = point.values.len() > 1;
    let mut tooltip = Tooltip::new(title);
    for (s, value) in point.values.iter().enumerate() {
        let text = value.map_or_else(|| "-".to_string(), |v| format_value(v, options.decimals));
        tooltip = tooltip.line(if multi {
            format!("Series {}: {text}", s + 1)
        } else {
            text
        });
    }
    Some(tooltip)
}

struct Frame {
    plot: Rect,
    axis: AxisMap,
    y: LinearScale,
}

fn frame(data: &SeriesData, ctx: &PaintContext<'_>, compact: bool) -> Option<Frame> {
    let range = data.range()?;
    let b = ctx.bounds;
    let plot = if compact || !ctx.options.show_labels {
        b
    } else {
        // Room for the min/max labels on the left.
        let gutter = ctx.px(ctx.options.font_size.max(1.0) * 4.0).min(b.width / 3.0);
        Rect::new(b.x + gutter, b.y, (b.width - gutter).max(0.0), b.height)
    };
    // Keep the stroke inside the surface at the extremes.
    let inset = if compact { ctx.px(ctx.options.line_width.max(0.0)) } else { 0.0 };
    let plot = Rect::new(
        plot.x + inset,
        plot.y + inset,
        2.0f64.mul_add(-inset, plot.width).max(0.0),
        2.0f64.mul_add(-inset, plot.height).max(0.0),
    );
    Some(Frame {
        plot,
        axis: AxisMap::spread(plot.x, plot.width, data.len()),
        y: LinearScale::new(range, plot.bottom(), plot.y),
    })
}

fn geometry_for(data: &SeriesData, ctx: &PaintContext<'_>, compact: bool) -> Vec<GeometryRecord> {
    frame(data, ctx, compact).map_or_else(Vec::new, |f| f.axis.records(0))
}

/// Points of a series with x revealed up to `cutoff` (an x coordinate); the
/// segment crossing the cutoff is interpolated. Gaps split the series into
/// runs.
fn runs(values: &[f64], frame: &Frame, grow: f64, cutoff: f64) -> Vec<Vec<Point>> {
    let baseline = frame.plot.bottom();
    let mut runs = Vec::new();
    let mut current: Vec<Point> = Vec::new();

    for (i, value) in values.iter().enumerate() {
        let Some(x) = frame.axis.position(i) else {
            break;
        };
        if !value.is_finite() {
            if !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
            continue;
        }
        let y = (frame.y.map(*value) - baseline).mul_add(grow, baseline);
        let point = Point::new(x, y);
        if x <= cutoff {
            current.push(point);
            continue;
        }
        if let Some(prev) = current.last().copied() {
            let t = (cutoff - prev.x) / (x - prev.x);
            current.push(Point::new(cutoff, (point.y - prev.y).mul_add(t, prev.y)));
        }
        break;
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn paint_series(
    canvas: &mut dyn Canvas,
    data: &SeriesData,
    geometry: &[GeometryRecord],
    ctx: &PaintContext<'_>,
    compact: bool,
) {
    let Some(frame) = frame(data, ctx, compact) else {
        return;
    };
    let line = ctx.px(ctx.options.line_width.max(0.5));

    if !compact {
        let text = ctx.text_style().colored(ctx.palette.muted_text).aligned(TextAlign::Right);
        let range = frame.y.range();
        for value in [range.min, (range.min + range.max) / 2.0, range.max] {
            let y = frame.y.map(value);
            canvas.stroke_path(
                &[Point::new(frame.plot.x, y), Point::new(frame.plot.right(), y)],
                false,
                ctx.palette.grid,
                ctx.px(1.0),
            );
            if ctx.options.show_labels {
                let label = format_value(value, ctx.options.decimals);
                canvas.draw_text(&label, Point::new(frame.plot.x - ctx.px(4.0), y), &text);
            }
        }
    }

    for (s, values) in data.series.iter().enumerate() {
        let sweep = ctx.reveal(s, AnimationStyle::Sweep).clamp(0.0, 1.0);
        let grow = ctx.reveal(s, AnimationStyle::Grow).max(0.0);
        let alpha = ctx.fade_alpha(s);
        let color = ctx.palette.series_color(s);
        let cutoff = frame.plot.width.mul_add(sweep, frame.plot.x);

        for run in runs(values, &frame, grow, cutoff) {
            if run.len() > 1 {
                let mut area = run.clone();
                if let (Some(first), Some(last)) = (run.first(), run.last()) {
                    area.push(Point::new(last.x, frame.plot.bottom()));
                    area.push(Point::new(first.x, frame.plot.bottom()));
                }
                let fill_alpha = alpha * ctx.options.fill_opacity.clamp(0.0, 1.0);
                canvas.fill_polygon(&area, color.fade(fill_alpha));
                canvas.stroke_path(&run, false, color.fade(alpha), line);
            } else if let Some(only) = run.first() {
                canvas.fill_circle(*only, line, color.fade(alpha));
            }
        }

        if compact && sweep >= 1.0 {
            let last = values.iter().rposition(|v| v.is_finite());
            let tip = last.and_then(|i| Some(Point::new(frame.axis.position(i)?, frame.y.map(values[i]))));
            if let Some(tip) = tip {
                canvas.fill_circle(tip, line * 1.5, color.fade(alpha));
            }
        }
    }

    // Hover guide and markers.
    let Some(index) = ctx.highlight else {
        return;
    };
    if geometry.iter().all(|r| r.index != index) {
        return;
    }
    let Some(x) = frame.axis.position(index) else {
        return;
    };
    canvas.stroke_path(
        &[Point::new(x, frame.plot.y), Point::new(x, frame.plot.bottom())],
        false,
        ctx.palette.muted_text,
        ctx.px(1.0),
    );
    for (s, values) in data.series.iter().enumerate() {
        if let Some(v) = values.get(index).filter(|v| v.is_finite()) {
            let p = Point::new(x, frame.y.map(*v));
            canvas.fill_circle(p, line * 2.0, ctx.palette.series_color(s));
        }
    }
}

/// Area chart kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct Area;

/// Sparkline chart kind: an area chart without axes or labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sparkline;

impl ChartKind for Area {
    type Data = SeriesData;
    type Item = SeriesPoint;

    const NAME: &'static str = "area";
    const DEFAULT_STYLE: AnimationStyle = AnimationStyle::Sweep;

    fn item_count(data: &Self::Data) -> usize {
        data.series.len()
    }

    fn item(data: &Self::Data, index: usize) -> Option<SeriesPoint> {
        point_at(data, index)
    }

    fn build_geometry(data: &Self::Data, ctx: &PaintContext<'_>) -> Vec<GeometryRecord> {
        geometry_for(data, ctx, false)
    }

    fn paint(
        canvas: &mut dyn Canvas,
        data: &Self::Data,
        geometry: &[GeometryRecord],
        ctx: &PaintContext<'_>,
    ) {
        paint_series(canvas, data, geometry, ctx, false);
    }

    fn tooltip(
        data: &Self::Data,
        record: &GeometryRecord,
        options: &ChartOptions,
    ) -> Option<Tooltip> {
        tooltip_for(data, record.index, options)
    }

    fn apply_series(data: &mut Self::Data, series: Vec<Vec<f64>>) -> Result<(), DataError> {
        data.series = series;
        Ok(())
    }
}

impl ChartKind for Sparkline {
    type Data = SeriesData;
    type Item = SeriesPoint;

    const NAME: &'static str = "sparkline";
    const DEFAULT_STYLE: AnimationStyle = AnimationStyle::Sweep;

    fn item_count(data: &Self::Data) -> usize {
        data.series.len()
    }

    fn item(data: &Self::Data, index: usize) -> Option<SeriesPoint> {
        point_at(data, index)
    }

    fn build_geometry(data: &Self::Data, ctx: &PaintContext<'_>) -> Vec<GeometryRecord> {
        geometry_for(data, ctx, true)
    }

    fn paint(
        canvas: &mut dyn Canvas,
        data: &Self::Data,
        geometry: &[GeometryRecord],
        ctx: &PaintContext<'_>,
    ) {
        paint_series(canvas, data, geometry, ctx, true);
    }

    fn tooltip(
        data: &Self::Data,
        record: &GeometryRecord,
        options: &ChartOptions,
    ) -> Option<Tooltip> {
        tooltip_for(data, record.index, options)
    }

    fn apply_series(data: &mut Self::Data, series: Vec<Vec<f64>>) -> Result<(), DataError> {
        data.series = series;
        Ok(())
    }
}
