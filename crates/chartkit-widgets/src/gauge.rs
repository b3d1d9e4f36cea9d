//! Radial gauge: one value on a 270° track with a needle.

use crate::chart::{ChartKind, PaintContext, Tooltip};
use crate::scale::ValueRange;
use chartkit_core::{
    format_value, AnimationStyle, Canvas, ChartOptions, GeometryRecord, Point, TextAlign,
};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, PI};

/// Track start, 7:30 on a clock face.
const TRACK_START: f64 = 3.0 * PI / 4.0;
/// Track length.
const TRACK_SWEEP: f64 = 3.0 * FRAC_PI_2;
/// Inner track radius relative to the outer one.
const TRACK_INNER: f64 = 0.78;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum GaugeInput {
    Value(f64),
    Labeled {
        value: f64,
        #[serde(default)]
        label: Option<String>,
    },
}

/// Gauge data: `42` or `{"value": 42, "label": "CPU"}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "GaugeInput")]
pub struct GaugeData {
    /// Current value
    pub value: f64,
    /// Caption under the value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl From<GaugeInput> for GaugeData {
    fn from(input: GaugeInput) -> Self {
        match input {
            GaugeInput::Value(value) => Self { value, label: None },
            GaugeInput::Labeled { value, label } => Self { value, label },
        }
    }
}

fn range(options: &ChartOptions) -> ValueRange {
    ValueRange::new(options.min, options.max)
}

fn fraction(data: &GaugeData, options: &ChartOptions) -> f64 {
    if data.value.is_finite() {
        range(options).fraction(data.value)
    } else {
        0.0
    }
}

/// Gauge chart kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gauge;

fn dial(ctx: &PaintContext<'_>) -> (Point, f64) {
    let b = ctx.bounds;
    // The track ends at 45° below the horizontal on both sides.
    let extent = 1.0 + FRAC_1_SQRT_2;
    let radius = (b.width / 2.0).min(b.height / extent).max(0.0);
    let top = (radius.mul_add(-extent, b.height) / 2.0).max(0.0);
    (Point::new(b.center().x, b.y + top + radius), radius)
}

impl ChartKind for Gauge {
    type Data = GaugeData;
    type Item = GaugeData;

    const NAME: &'static str = "gauge";
    const DEFAULT_STYLE: AnimationStyle = AnimationStyle::Sweep;

    fn item_count(_data: &Self::Data) -> usize {
        1
    }

    fn item(data: &Self::Data, index: usize) -> Option<GaugeData> {
        (index == 0).then(|| data.clone())
    }

    fn build_geometry(_data: &Self::Data, ctx: &PaintContext<'_>) -> Vec<GeometryRecord> {
        let (center, radius) = dial(ctx);
        if radius <= 0.0 {
            return Vec::new();
        }
        vec![GeometryRecord::sector(
            0,
            center,
            radius * TRACK_INNER,
            radius,
            TRACK_START,
            TRACK_START + TRACK_SWEEP,
        )]
    }

    fn paint(
        canvas: &mut dyn Canvas,
        data: &Self::Data,
        geometry: &[GeometryRecord],
        ctx: &PaintContext<'_>,
    ) {
        if geometry.is_empty() {
            return;
        }
        let (center, radius) = dial(ctx);
        let grow = ctx.reveal(0, AnimationStyle::Grow).max(0.0);
        let sweep = ctx.reveal(0, AnimationStyle::Sweep).max(0.0);
        let alpha = ctx.item_alpha(0, 0);
        let outer = radius * grow;
        let inner = outer * TRACK_INNER;

        canvas.fill_sector(
            center,
            inner,
            outer,
            TRACK_START,
            TRACK_START + TRACK_SWEEP,
            ctx.palette.track.fade(alpha),
        );

        let shown = fraction(data, ctx.options) * sweep;
        let needle_angle = shown.mul_add(TRACK_SWEEP, TRACK_START);
        let value_color = ctx.palette.series_color(0).fade(alpha);
        if shown > 0.0 {
            canvas.fill_sector(center, inner, outer, TRACK_START, needle_angle, value_color);
        }

        // Needle: a thin triangle from a hub to just inside the track.
        let hub = ctx.px(ctx.options.line_width.max(1.0) * 2.5);
        let tip = center.polar(inner * 0.95, needle_angle);
        let needle = [
            center.polar(hub, needle_angle - FRAC_PI_2),
            tip,
            center.polar(hub, needle_angle + FRAC_PI_2),
        ];
        canvas.fill_polygon(&needle, ctx.palette.needle.fade(alpha));
        canvas.fill_circle(center, hub, ctx.palette.needle.fade(alpha));

        if !ctx.options.show_labels || outer <= 0.0 {
            return;
        }
        let text = ctx.text_style();
        let value_style = text.clone().sized(ctx.px(ctx.options.font_size * 2.0)).bold();
        let value_y = center.y + inner * 0.45;
        let value = format_value(data.value, ctx.options.decimals);
        let value_style = value_style.colored(text.color.fade(alpha));
        canvas.draw_text(&value, Point::new(center.x, value_y), &value_style);
        if let Some(label) = &data.label {
            let caption = text.clone().colored(ctx.palette.muted_text.fade(alpha));
            canvas.draw_text(label, Point::new(center.x, value_y + value_style.size), &caption);
        }

        let r = range(ctx.options);
        let ends = [
            (r.min, TRACK_START, TextAlign::Left),
            (r.max, TRACK_START + TRACK_SWEEP, TextAlign::Right),
        ];
        let muted = text.colored(ctx.palette.muted_text.fade(alpha));
        for (value, angle, align) in ends {
            let anchor = center.polar((inner + outer) / 2.0, angle);
            let position = Point::new(anchor.x, anchor.y + muted.size);
            let label = format_value(value, ctx.options.decimals);
            canvas.draw_text(&label, position, &muted.clone().aligned(align));
        }
    }

    fn tooltip(
        data: &Self::Data,
        _record: &GeometryRecord,
        options: &ChartOptions,
    ) -> Option<Tooltip> {
        let r = range(options);
        let title = data.label.clone().unwrap_or_else(|| "Value".to_string());
        Some(
            Tooltip::new(title)
                .line(format_value(data.value, options.decimals))
                .line(format!(
                    "Range: {} to {}",
                    format_value(r.min, options.decimals),
                    format_value(r.max, options.decimals)
                )),
        )
    }
}
