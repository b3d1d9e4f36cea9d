//! Donut (and pie) chart: categorical slices around a ring from 12 o'clock.

use crate::chart::{ChartKind, PaintContext, Tooltip};
use chartkit_core::{
    format_value, AnimationStyle, Canvas, ChartOptions, GeometryRecord, Point, Shape,
};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, TAU};

/// A labeled value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slice {
    /// Category label
    pub label: String,
    /// Value; negative and non-finite values count as zero
    pub value: f64,
}

impl Slice {
    fn share(&self) -> f64 {
        if self.value.is_finite() {
            self.value.max(0.0)
        } else {
            0.0
        }
    }
}

/// Donut data: slices in drawing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DonutData {
    /// Slices
    pub slices: Vec<Slice>,
}

impl DonutData {
    /// Sum of usable slice values.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.slices.iter().map(Slice::share).sum()
    }
}

/// Donut chart kind. `innerRadius: 0` draws a pie.
#[derive(Debug, Clone, Copy, Default)]
pub struct Donut;

/// Slice hovered with the item and its share of the total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonutItem {
    /// The slice
    #[serde(flatten)]
    pub slice: Slice,
    /// Fraction of the total in `[0, 1]`
    pub share: f64,
}

fn radii(ctx: &PaintContext<'_>) -> (Point, f64, f64) {
    let center = ctx.bounds.center();
    let outer = (ctx.bounds.width.min(ctx.bounds.height) / 2.0).max(0.0);
    let ratio = if ctx.options.inner_radius.is_finite() {
        ctx.options.inner_radius.clamp(0.0, 0.95)
    } else {
        0.0
    };
    (center, outer * ratio, outer)
}

impl ChartKind for Donut {
    type Data = DonutData;
    type Item = DonutItem;

    const NAME: &'static str = "donut";
    const DEFAULT_STYLE: AnimationStyle = AnimationStyle::Sweep;

    fn item_count(data: &Self::Data) -> usize {
        data.slices.len()
    }

    fn item(data: &Self::Data, index: usize) -> Option<DonutItem> {
        let slice = data.slices.get(index)?;
        let total = data.total();
        let share = if total > 0.0 { slice.share() / total } else { 0.0 };
        Some(DonutItem {
            slice: slice.clone(),
            share,
        })
    }

    fn build_geometry(data: &Self::Data, ctx: &PaintContext<'_>) -> Vec<GeometryRecord> {
        let total = data.total();
        let (center, inner, outer) = radii(ctx);
        if total <= 0.0 || outer <= 0.0 {
            return Vec::new();
        }

        let last = data.slices.len() - 1;
        let mut start = -FRAC_PI_2;
        data.slices
            .iter()
            .enumerate()
            .map(|(i, slice)| {
                // The ring closes exactly at a full turn.
                let end = if i == last {
                    -FRAC_PI_2 + TAU
                } else {
                    (slice.share() / total).mul_add(TAU, start)
                };
                let record = GeometryRecord::sector(i, center, inner, outer, start, end);
                start = end;
                record
            })
            .collect()
    }

    fn paint(
        canvas: &mut dyn Canvas,
        data: &Self::Data,
        geometry: &[GeometryRecord],
        ctx: &PaintContext<'_>,
    ) {
        let pad = ctx.px(ctx.options.gap.max(0.0)) / 2.0;

        for record in geometry {
            let Shape::Sector {
                center,
                inner_radius,
                outer_radius,
                start_angle,
                end_angle,
            } = record.shape
            else {
                continue;
            };
            let sweep = ctx.reveal(record.index, AnimationStyle::Sweep).clamp(0.0, 1.0);
            let grow = ctx.reveal(record.index, AnimationStyle::Grow).max(0.0);

            let end = (end_angle - start_angle).mul_add(sweep, start_angle);
            let outer = (outer_radius - inner_radius).mul_add(grow, inner_radius);
            // Angular padding shrinks each slice by `gap/2` of arc at the rim.
            let angular_pad = if outer > 0.0 { pad / outer } else { 0.0 };
            let (a0, a1) = (start_angle + angular_pad, end - angular_pad);
            if a1 <= a0 || outer <= inner_radius {
                continue;
            }

            let alpha = ctx.item_alpha(record.index, record.index);
            let color = ctx.palette.series_color(record.index).fade(alpha);
            canvas.fill_sector(center, inner_radius, outer, a0, a1, color);
        }

        if ctx.options.show_labels && !geometry.is_empty() {
            let (center, inner, _) = radii(ctx);
            let value_style = ctx.text_style().sized(ctx.px(ctx.options.font_size * 1.6)).bold();
            if inner > value_style.size * 1.5 {
                let total = format_value(data.total(), ctx.options.decimals);
                let caption = ctx.text_style().colored(ctx.palette.muted_text);
                canvas.draw_text(
                    &total,
                    Point::new(center.x, center.y - caption.size * 0.6),
                    &value_style,
                );
                canvas.draw_text(
                    "Total",
                    Point::new(center.x, center.y + value_style.size * 0.6),
                    &caption,
                );
            }
        }
    }

    fn tooltip(
        data: &Self::Data,
        record: &GeometryRecord,
        options: &ChartOptions,
    ) -> Option<Tooltip> {
        let item = Self::item(data, record.index)?;
        Some(
            Tooltip::new(&item.slice.label)
                .line(format_value(item.slice.value, options.decimals))
                .line(format!("{:.*}%", options.decimals, item.share * 100.0)),
        )
    }
}
