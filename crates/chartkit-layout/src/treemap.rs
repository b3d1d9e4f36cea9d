//! Squarified treemap layout.
//!
//! Items are sorted by descending weight and packed into strips. A strip
//! keeps growing while adding the next item does not make its worst cell
//! aspect ratio any worse; otherwise it is flushed and the remaining region
//! shrinks by its thickness. Wide regions take horizontal strips stacked top
//! to bottom, tall regions take vertical strips side by side.

use chartkit_core::Rect;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// An item to lay out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedItem<T> {
    /// Relative size. Non-positive and non-finite weights are skipped.
    pub weight: f64,
    /// Caller data carried alongside
    pub payload: T,
}

impl<T> WeightedItem<T> {
    /// Create an item.
    pub const fn new(weight: f64, payload: T) -> Self {
        Self { weight, payload }
    }
}

/// One placed cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutRect {
    /// Cell bounds, already shrunk by half the gap on every side
    pub rect: Rect,
    /// Position of the item in the input slice
    pub index: usize,
    /// The item's weight
    pub weight: f64,
}

/// A placed group from [`squarify_groups`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupLayout {
    /// Position of the group in the input slice
    pub group: usize,
    /// Sum of the group's usable weights
    pub weight: f64,
    /// Group bounds
    pub rect: Rect,
    /// Header band, when the group is tall enough to carry one
    pub header: Option<Rect>,
    /// Child cells; `index` points into the group's item slice
    pub children: Vec<LayoutRect>,
}

/// Lay out `items` inside `region`.
///
/// Output is in layout order (descending weight, ties in input order) and
/// is a pure function of the arguments.
pub fn squarify<T>(items: &[WeightedItem<T>], region: Rect, gap: f64) -> Vec<LayoutRect> {
    squarify_weights(items.iter().map(|item| item.weight), region, gap)
}

/// [`squarify`] over bare weights.
pub fn squarify_weights<I>(weights: I, region: Rect, gap: f64) -> Vec<LayoutRect>
where
    I: IntoIterator<Item = f64>,
{
    let mut entries: Vec<(usize, f64)> = weights
        .into_iter()
        .enumerate()
        .filter(|(_, w)| w.is_finite() && *w > 0.0)
        .collect();
    if entries.is_empty() {
        return Vec::new();
    }
    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let region = Rect::new(
        region.x,
        region.y,
        sanitize_extent(region.width),
        sanitize_extent(region.height),
    );
    let half_gap = if gap.is_finite() { gap.max(0.0) / 2.0 } else { 0.0 };

    let mut out = Vec::with_capacity(entries.len());
    let mut remaining = region;
    let mut remaining_total: f64 = entries.iter().map(|(_, w)| w).sum();
    let mut row: Vec<(usize, f64)> = Vec::new();
    let mut row_sum = 0.0;

    for &entry in &entries {
        if !row.is_empty() {
            let current = worst_ratio(&row, row_sum, remaining, remaining_total);
            row.push(entry);
            let extended = worst_ratio(&row, row_sum + entry.1, remaining, remaining_total);
            row.pop();

            if extended > current {
                remaining = layout_row(&row, row_sum, remaining, remaining_total, false, &mut out);
                remaining_total -= row_sum;
                row.clear();
                row_sum = 0.0;
            }
        }
        row.push(entry);
        row_sum += entry.1;
    }
    layout_row(&row, row_sum, remaining, remaining_total, true, &mut out);

    for cell in &mut out {
        cell.rect = cell.rect.inset(half_gap);
    }
    out
}

/// Two-level layout: groups by total weight, then each group's items inside
/// the group cell below an optional header band.
///
/// A group only gets a header when its cell is more than twice as tall as
/// `header`. Groups without usable weight are skipped.
pub fn squarify_groups<T>(
    groups: &[Vec<WeightedItem<T>>],
    region: Rect,
    gap: f64,
    header: f64,
) -> Vec<GroupLayout> {
    let totals: Vec<f64> = groups
        .iter()
        .map(|items| {
            items
                .iter()
                .map(|item| item.weight)
                .filter(|w| w.is_finite() && *w > 0.0)
                .sum()
        })
        .collect();

    squarify_weights(totals.iter().copied(), region, gap)
        .into_iter()
        .map(|cell| {
            let rect = cell.rect;
            let (header, body) = if header > 0.0 && rect.height > header * 2.0 {
                (
                    Some(Rect::new(rect.x, rect.y, rect.width, header)),
                    Rect::new(rect.x, rect.y + header, rect.width, rect.height - header),
                )
            } else {
                (None, rect)
            };
            GroupLayout {
                group: cell.index,
                weight: cell.weight,
                rect,
                header,
                children: squarify(&groups[cell.index], body, gap),
            }
        })
        .collect()
}

fn sanitize_extent(extent: f64) -> f64 {
    if extent.is_finite() {
        extent.max(0.0)
    } else {
        0.0
    }
}

/// (length along the strip, extent the strip's thickness is cut from)
fn strip_axes(rect: Rect) -> (f64, f64) {
    if rect.width >= rect.height {
        (rect.width, rect.height)
    } else {
        (rect.height, rect.width)
    }
}

/// Worst aspect ratio of a candidate row placed as the next strip.
fn worst_ratio(row: &[(usize, f64)], row_sum: f64, rect: Rect, total: f64) -> f64 {
    if row.is_empty() || row_sum <= 0.0 || total <= 0.0 {
        return f64::INFINITY;
    }

    let (length, short) = strip_axes(rect);
    let thickness = short * (row_sum / total);
    if thickness <= 0.0 || length <= 0.0 {
        return f64::INFINITY;
    }

    row.iter()
        .map(|(_, w)| {
            let other = length * (w / row_sum);
            (thickness / other).max(other / thickness)
        })
        .fold(0.0f64, f64::max)
}

/// Place a row as one strip and return the region left over.
///
/// The last row takes the whole remaining extent and the last cell of each
/// row takes the rest of the strip, so rounding never leaves slivers.
fn layout_row(
    row: &[(usize, f64)],
    row_sum: f64,
    rect: Rect,
    total: f64,
    last: bool,
    out: &mut Vec<LayoutRect>,
) -> Rect {
    if row.is_empty() {
        return rect;
    }

    let horizontal = rect.width >= rect.height;
    let (length, short) = strip_axes(rect);
    let thickness = if last || total <= 0.0 {
        short
    } else {
        (short * (row_sum / total)).min(short)
    };

    let mut offset = 0.0;
    for (position, &(index, weight)) in row.iter().enumerate() {
        let extent = if position + 1 == row.len() {
            (length - offset).max(0.0)
        } else {
            length * (weight / row_sum)
        };
        let cell = if horizontal {
            Rect::new(rect.x + offset, rect.y, extent, thickness)
        } else {
            Rect::new(rect.x, rect.y + offset, thickness, extent)
        };
        out.push(LayoutRect {
            rect: cell,
            index,
            weight,
        });
        offset += extent;
    }

    if horizontal {
        Rect::new(
            rect.x,
            rect.y + thickness,
            rect.width,
            (rect.height - thickness).max(0.0),
        )
    } else {
        Rect::new(
            rect.x + thickness,
            rect.y,
            (rect.width - thickness).max(0.0),
            rect.height,
        )
    }
}
