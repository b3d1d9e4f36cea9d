//! Radar chart: one polygon per record over named axes.

use crate::chart::{ChartKind, PaintContext, Tooltip};
use chartkit_core::{
    format_value, AnimationStyle, Canvas, ChartOptions, GeometryRecord, Point, Shape, TextAlign,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::{FRAC_PI_2, TAU};

const RINGS: usize = 4;

/// Radar data: axes in drawing order and one `{axis: value}` record per
/// series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RadarData {
    /// Axis keys, clockwise from 12 o'clock
    pub axes: Vec<String>,
    /// One record per series; missing axes read as zero
    pub series: Vec<BTreeMap<String, f64>>,
    /// Series names for tooltips
    #[serde(default)]
    pub names: Vec<String>,
    /// Value at the outer ring; the largest value when unset
    #[serde(default)]
    pub max: Option<f64>,
}

impl RadarData {
    /// Value of a series on an axis, zero when missing or unusable.
    #[must_use]
    pub fn value(&self, series: usize, axis: usize) -> f64 {
        self.axes
            .get(axis)
            .and_then(|key| self.series.get(series)?.get(key))
            .copied()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }

    /// Value mapped to the outer ring.
    #[must_use]
    pub fn scale_max(&self) -> f64 {
        let max = self.max.filter(|m| m.is_finite() && *m > 0.0).unwrap_or_else(|| {
            (0..self.series.len())
                .flat_map(|s| (0..self.axes.len()).map(move |a| (s, a)))
                .map(|(s, a)| self.value(s, a))
                .fold(0.0, f64::max)
        });
        if max > 0.0 {
            max
        } else {
            1.0
        }
    }

    /// Name of a series.
    #[must_use]
    pub fn series_name(&self, series: usize) -> String {
        self.names
            .get(series)
            .cloned()
            .unwrap_or_else(|| format!("Series {}", series + 1))
    }

    /// Split a vertex index into `(series, axis)`.
    #[must_use]
    pub fn vertex(&self, index: usize) -> Option<(usize, usize)> {
        let n = self.axes.len();
        if n == 0 {
            return None;
        }
        let (series, axis) = (index / n, index % n);
        (series < self.series.len()).then_some((series, axis))
    }
}

/// Hovered vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarPoint {
    /// Series position
    pub series: usize,
    /// Series name
    pub name: String,
    /// Axis key
    pub axis: String,
    /// Value on the axis
    pub value: f64,
}

/// Radar chart kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct Radar;

fn frame(ctx: &PaintContext<'_>) -> (Point, f64) {
    let band = if ctx.options.show_labels {
        ctx.px(ctx.options.font_size.max(1.0) * 1.5)
    } else {
        0.0
    };
    let radius = (ctx.bounds.width.min(ctx.bounds.height) / 2.0 - band).max(0.0);
    (ctx.bounds.center(), radius)
}

fn axis_angle(axis: usize, count: usize) -> f64 {
    (axis as f64 / count as f64).mul_add(TAU, -FRAC_PI_2)
}

impl ChartKind for Radar {
    type Data = RadarData;
    type Item = RadarPoint;

    const NAME: &'static str = "radar";
    const DEFAULT_STYLE: AnimationStyle = AnimationStyle::Grow;

    fn item_count(data: &Self::Data) -> usize {
        data.series.len()
    }

    fn item(data: &Self::Data, index: usize) -> Option<RadarPoint> {
        let (series, axis) = data.vertex(index)?;
        Some(RadarPoint {
            series,
            name: data.series_name(series),
            axis: data.axes[axis].clone(),
            value: data.value(series, axis),
        })
    }

    fn build_geometry(data: &Self::Data, ctx: &PaintContext<'_>) -> Vec<GeometryRecord> {
        let n = data.axes.len();
        if n == 0 {
            return Vec::new();
        }
        let (center, radius) = frame(ctx);
        let max = data.scale_max();
        let marker = ctx.px(ctx.options.line_width.max(1.0) * 2.0);

        let mut records = Vec::with_capacity(n * data.series.len());
        for s in 0..data.series.len() {
            for a in 0..n {
                let r = radius * (data.value(s, a).max(0.0) / max);
                let vertex = center.polar(r, axis_angle(a, n));
                records.push(GeometryRecord::point(s * n + a, vertex, marker).in_series(s));
            }
        }
        records
    }

    fn paint(
        canvas: &mut dyn Canvas,
        data: &Self::Data,
        geometry: &[GeometryRecord],
        ctx: &PaintContext<'_>,
    ) {
        let n = data.axes.len();
        if n == 0 {
            return;
        }
        let (center, radius) = frame(ctx);
        let line = ctx.px(1.0);

        // Web: rings and spokes.
        for ring in 1..=RINGS {
            let r = radius * ring as f64 / RINGS as f64;
            let points: Vec<_> = (0..n).map(|a| center.polar(r, axis_angle(a, n))).collect();
            canvas.stroke_path(&points, true, ctx.palette.grid, line);
        }
        let text = ctx.text_style().colored(ctx.palette.muted_text);
        for (a, key) in data.axes.iter().enumerate() {
            let angle = axis_angle(a, n);
            let spoke = [center, center.polar(radius, angle)];
            canvas.stroke_path(&spoke, false, ctx.palette.grid, line);
            if ctx.options.show_labels {
                let anchor = center.polar(radius + text.size * 0.9, angle);
                let align = match angle.cos() {
                    c if c > 0.3 => TextAlign::Left,
                    c if c < -0.3 => TextAlign::Right,
                    _ => TextAlign::Center,
                };
                canvas.draw_text(key, anchor, &text.clone().aligned(align));
            }
        }

        let highlight = ctx.highlight.and_then(|i| data.vertex(i)).map(|(s, _)| s);
        let stroke_width = ctx.px(ctx.options.line_width.max(0.5));
        for (s, vertices) in geometry.chunks(n).enumerate() {
            let grow = ctx.reveal(s, AnimationStyle::Grow).max(0.0);
            let sweep = ctx.reveal(s, AnimationStyle::Sweep).max(0.0);
            let dim = match highlight {
                Some(h) if h != s => ctx.options.dim_alpha(),
                _ => 1.0,
            };
            let alpha = dim * ctx.fade_alpha(s);
            let color = ctx.palette.series_color(s);

            let points: Vec<Point> = vertices
                .iter()
                .filter_map(|r| match r.shape {
                    Shape::Point { center: p, .. } => {
                        Some(center + (p - center).scale(grow * sweep))
                    }
                    _ => None,
                })
                .collect();

            let fill_alpha = alpha * ctx.options.fill_opacity.clamp(0.0, 1.0);
            canvas.fill_polygon(&points, color.fade(fill_alpha));
            canvas.stroke_path(&points, true, color.fade(alpha), stroke_width);
            for (vertex, record) in points.iter().zip(vertices) {
                let r = match record.shape {
                    Shape::Point { radius, .. } => radius,
                    _ => 0.0,
                };
                let r = if ctx.highlight == Some(record.index) { r * 1.5 } else { r };
                canvas.fill_circle(*vertex, r, color.fade(alpha));
            }
        }
    }

    fn tooltip(
        data: &Self::Data,
        record: &GeometryRecord,
        options: &ChartOptions,
    ) -> Option<Tooltip> {
        let point = Self::item(data, record.index)?;
        Some(Tooltip::new(point.name).line(format!(
            "{}: {}",
            point.axis,
            format_value(point.value, options.decimals)
        )))
    }
}
