//! Market heatmap: a treemap of cells sized by weight and colored by change.

use crate::chart::{ChartKind, PaintContext, Tooltip};
use chartkit_core::{
    format_percent, format_value, AnimationStyle, Canvas, ChartOptions, Color, GeometryRecord,
    Palette, Point, Rect, Shape, TextAlign, TextStyle,
};
use chartkit_layout::{squarify, squarify_groups, GroupLayout, WeightedItem};
use serde::{Deserialize, Serialize};

/// Change (in percent) at which the color ramp saturates.
const SATURATION_CHANGE: f64 = 3.0;

/// One heatmap cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    /// Label drawn inside the cell
    pub label: String,
    /// Area weight
    pub weight: f64,
    /// Percent change driving the color
    #[serde(default)]
    pub change: f64,
    /// Optional sector the cell is grouped under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// Heatmap data: cells in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeatmapData {
    /// Cells
    pub cells: Vec<HeatmapCell>,
}

impl HeatmapData {
    /// Group names in order of first appearance, with the cell indices of
    /// each. `None` when no cell names a group.
    #[must_use]
    pub fn groups(&self) -> Option<Vec<(String, Vec<usize>)>> {
        if self.cells.iter().all(|c| c.group.is_none()) {
            return None;
        }
        let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
        for (i, cell) in self.cells.iter().enumerate() {
            let name = cell.group.clone().unwrap_or_default();
            match groups.iter_mut().find(|(g, _)| *g == name) {
                Some((_, members)) => members.push(i),
                None => groups.push((name, vec![i])),
            }
        }
        Some(groups)
    }
}

/// Treemap heatmap chart kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct Heatmap;

/// Fill color for a percent change.
#[must_use]
pub fn change_color(palette: &Palette, change: f64) -> Color {
    if !change.is_finite() || change == 0.0 {
        return palette.neutral;
    }
    let intensity = (change.abs() / SATURATION_CHANGE).min(1.0);
    let target = if change > 0.0 {
        palette.positive
    } else {
        palette.negative
    };
    if intensity >= 1.0 {
        return target;
    }
    palette
        .neutral
        .lerp(&target, 0.65f64.mul_add(intensity, 0.35) as f32)
}

fn header_height(ctx: &PaintContext<'_>) -> f64 {
    if ctx.options.show_labels {
        ctx.px(ctx.options.font_size.max(1.0) * 1.6)
    } else {
        0.0
    }
}

fn group_layout(
    data: &HeatmapData,
    groups: &[(String, Vec<usize>)],
    ctx: &PaintContext<'_>,
) -> Vec<GroupLayout> {
    let items: Vec<Vec<WeightedItem<usize>>> = groups
        .iter()
        .map(|(_, members)| {
            members
                .iter()
                .map(|&i| WeightedItem::new(data.cells[i].weight, i))
                .collect()
        })
        .collect();
    squarify_groups(&items, ctx.bounds, ctx.px(ctx.options.gap), header_height(ctx))
}

impl ChartKind for Heatmap {
    type Data = HeatmapData;
    type Item = HeatmapCell;

    const NAME: &'static str = "heatmap";
    const DEFAULT_STYLE: AnimationStyle = AnimationStyle::Grow;

    fn item_count(data: &Self::Data) -> usize {
        data.cells.len()
    }

    fn item(data: &Self::Data, index: usize) -> Option<HeatmapCell> {
        data.cells.get(index).cloned()
    }

    fn build_geometry(data: &Self::Data, ctx: &PaintContext<'_>) -> Vec<GeometryRecord> {
        let gap = ctx.px(ctx.options.gap);
        match data.groups() {
            None => {
                let items: Vec<_> = data
                    .cells
                    .iter()
                    .map(|c| WeightedItem::new(c.weight, ()))
                    .collect();
                squarify(&items, ctx.bounds, gap)
                    .into_iter()
                    .map(|cell| GeometryRecord::rect(cell.index, cell.rect))
                    .collect()
            }
            Some(groups) => {
                let mut records = Vec::with_capacity(data.cells.len());
                for group in group_layout(data, &groups, ctx) {
                    let members = &groups[group.group].1;
                    records.extend(group.children.iter().map(|child| {
                        GeometryRecord::rect(members[child.index], child.rect)
                            .in_series(group.group)
                    }));
                }
                records
            }
        }
    }

    fn paint(
        canvas: &mut dyn Canvas,
        data: &Self::Data,
        geometry: &[GeometryRecord],
        ctx: &PaintContext<'_>,
    ) {
        let text = ctx.text_style();

        if let Some(groups) = data.groups() {
            if ctx.options.show_labels {
                for group in group_layout(data, &groups, ctx) {
                    if let Some(header) = group.header {
                        let position = Point::new(
                            header.x + ctx.px(4.0),
                            header.y + header.height / 2.0,
                        );
                        let style = text
                            .clone()
                            .aligned(TextAlign::Left)
                            .colored(ctx.palette.muted_text)
                            .bold();
                        canvas.draw_text(&groups[group.group].0, position, &style);
                    }
                }
            }
        }

        for record in geometry {
            let Shape::Rect(rect) = record.shape else {
                continue;
            };
            let Some(cell) = data.cells.get(record.index) else {
                continue;
            };

            let grow = ctx.reveal(record.index, AnimationStyle::Grow).max(0.0);
            let sweep = ctx.reveal(record.index, AnimationStyle::Sweep).clamp(0.0, 1.0);
            let drawn = scale_rect(rect, grow, sweep);
            if !drawn.is_renderable() {
                continue;
            }

            let alpha = ctx.item_alpha(record.index, record.index);
            let fill = change_color(ctx.palette, cell.change);
            canvas.fill_rect(drawn, fill.fade(alpha));

            if ctx.options.show_labels && grow >= 1.0 && sweep >= 1.0 {
                let label_color = fill.best_contrast(Color::WHITE, Color::BLACK).fade(alpha);
                paint_label(canvas, cell, drawn, ctx, &text.clone().colored(label_color));
            }
        }
    }

    fn tooltip(
        data: &Self::Data,
        record: &GeometryRecord,
        options: &ChartOptions,
    ) -> Option<Tooltip> {
        let cell = data.cells.get(record.index)?;
        let mut tooltip = Tooltip::new(&cell.label)
            .line(format!("Weight: {}", format_value(cell.weight, options.decimals)))
            .line(format!("Change: {}", format_percent(cell.change, options.decimals)));
        if let Some(group) = &cell.group {
            tooltip = tooltip.line(format!("Group: {group}"));
        }
        Some(tooltip)
    }
}

/// Scale about the center for `Grow`, reveal from the left for `Sweep`.
fn scale_rect(rect: Rect, grow: f64, sweep: f64) -> Rect {
    let width = rect.width * grow;
    let height = rect.height * grow;
    let grown = Rect::new(
        rect.x + (rect.width - width) / 2.0,
        rect.y + (rect.height - height) / 2.0,
        width,
        height,
    );
    Rect::new(grown.x, grown.y, grown.width * sweep, grown.height)
}

fn paint_label(
    canvas: &mut dyn Canvas,
    cell: &HeatmapCell,
    rect: Rect,
    ctx: &PaintContext<'_>,
    style: &TextStyle,
) {
    let line_height = style.size * 1.2;
    let margin = ctx.px(4.0);
    if rect.height < line_height + margin
        || canvas.measure_text(&cell.label, style) + margin > rect.width
    {
        return;
    }

    let center = rect.center();
    let change = format_percent(cell.change, ctx.options.decimals);
    let two_lines = rect.height >= line_height * 2.0 + margin
        && canvas.measure_text(&change, style) + margin <= rect.width;

    if two_lines {
        let label_style = style.clone().bold();
        canvas.draw_text(
            &cell.label,
            Point::new(center.x, center.y - line_height / 2.0),
            &label_style,
        );
        canvas.draw_text(
            &change,
            Point::new(center.x, center.y + line_height / 2.0),
            style,
        );
    } else {
        canvas.draw_text(&cell.label, center, &style.clone().bold());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(label: &str, weight: f64, change: f64, group: Option<&str>) -> HeatmapCell {
        HeatmapCell {
            label: label.to_string(),
            weight,
            change,
            group: group.map(str::to_string),
        }
    }

    #[test]
    fn test_deserialize_cells() {
        let data: HeatmapData =
            serde_json::from_str(r#"[{"label":"AAPL","weight":50,"change":1.2},{"label":"X","weight":2}]"#)
                .unwrap();
        assert_eq!(data.cells.len(), 2);
        assert_eq!(data.cells[1].change, 0.0);
        assert!(data.groups().is_none());
    }

    #[test]
    fn test_groups_in_first_appearance_order() {
        let data = HeatmapData {
            cells: vec![
                cell("a", 1.0, 0.0, Some("tech")),
                cell("b", 1.0, 0.0, Some("energy")),
                cell("c", 1.0, 0.0, Some("tech")),
            ],
        };
        let groups = data.groups().unwrap();
        assert_eq!(groups[0], ("tech".to_string(), vec![0, 2]));
        assert_eq!(groups[1], ("energy".to_string(), vec![1]));
    }

    #[test]
    fn test_change_color_ramp() {
        let p = Palette::dark();
        assert_eq!(change_color(&p, 0.0), p.neutral);
        assert_eq!(change_color(&p, 10.0), p.positive);
        assert_eq!(change_color(&p, -10.0), p.negative);
        let mild = change_color(&p, 0.5);
        assert_ne!(mild, p.positive);
        assert_ne!(mild, p.neutral);
    }

    #[test]
    fn test_scale_rect() {
        let r = Rect::new(0.0, 0.0, 10.0, 20.0);
        assert_eq!(scale_rect(r, 0.5, 1.0), Rect::new(2.5, 5.0, 5.0, 10.0));
        assert_eq!(scale_rect(r, 1.0, 0.5), Rect::new(0.0, 0.0, 5.0, 20.0));
    }

    #[test]
    fn test_tooltip_lines() {
        let data = HeatmapData {
            cells: vec![cell("MSFT", 1500.0, -0.42, Some("tech"))],
        };
        let record = GeometryRecord::rect(0, Rect::default());
        let tooltip = Heatmap::tooltip(&data, &record, &ChartOptions::default()).unwrap();
        assert_eq!(tooltip.title, "MSFT");
        assert_eq!(
            tooltip.lines,
            vec!["Weight: 1.5K", "Change: -0.4%", "Group: tech"]
        );
    }
}
