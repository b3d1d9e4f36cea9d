//! Order-book depth chart: cumulative bid and ask quantity over price.

use crate::chart::{ChartKind, PaintContext, Tooltip};
use crate::scale::{LinearScale, ValueRange};
use chartkit_core::{
    format_value, AnimationStyle, AxisMap, Canvas, ChartOptions, GeometryRecord, Point, Rect,
    TextAlign,
};
use serde::{Deserialize, Serialize};

/// One price level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Level {
    /// Price
    pub price: f64,
    /// Quantity resting at the price
    pub quantity: f64,
}

impl Level {
    fn is_valid(&self) -> bool {
        self.price.is_finite() && self.quantity.is_finite() && self.quantity > 0.0
    }
}

/// Book side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy orders
    Bid,
    /// Sell orders
    Ask,
}

impl Side {
    const fn title(self) -> &'static str {
        match self {
            Self::Bid => "Bid",
            Self::Ask => "Ask",
        }
    }

    const fn item(self) -> usize {
        match self {
            Self::Bid => 0,
            Self::Ask => 1,
        }
    }
}

/// Order book snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepthData {
    /// Bid levels in any order
    #[serde(default)]
    pub bids: Vec<Level>,
    /// Ask levels in any order
    #[serde(default)]
    pub asks: Vec<Level>,
}

/// A level with its cumulative depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthPoint {
    /// Book side
    pub side: Side,
    /// Price
    pub price: f64,
    /// Quantity at this price
    pub quantity: f64,
    /// Quantity from the best price out to this one
    pub total: f64,
}

impl DepthData {
    /// Valid levels with cumulative depth, ascending by price.
    ///
    /// Depth accumulates outward from the spread: bids from the highest price
    /// down, asks from the lowest up. Levels with a non-finite price or a
    /// non-positive quantity are dropped.
    #[must_use]
    pub fn points(&self) -> Vec<DepthPoint> {
        let mut bids: Vec<Level> = self.bids.iter().copied().filter(Level::is_valid).collect();
        let mut asks: Vec<Level> = self.asks.iter().copied().filter(Level::is_valid).collect();
        bids.sort_by(|a, b| b.price.total_cmp(&a.price));
        asks.sort_by(|a, b| a.price.total_cmp(&b.price));

        let mut points = Vec::with_capacity(bids.len() + asks.len());
        points.extend(accumulate(&bids, Side::Bid).into_iter().rev());
        points.extend(accumulate(&asks, Side::Ask));
        points.sort_by(|a, b| a.price.total_cmp(&b.price));
        points
    }

    /// Midpoint between the best bid and the best ask.
    #[must_use]
    pub fn mid_price(&self) -> Option<f64> {
        let best_bid = self
            .bids
            .iter()
            .filter(|l| l.is_valid())
            .map(|l| l.price)
            .fold(None, |best: Option<f64>, p| Some(best.map_or(p, |b| b.max(p))));
        let best_ask = self
            .asks
            .iter()
            .filter(|l| l.is_valid())
            .map(|l| l.price)
            .fold(None, |best: Option<f64>, p| Some(best.map_or(p, |b| b.min(p))));
        Some((best_bid? + best_ask?) / 2.0)
    }
}

fn accumulate(levels: &[Level], side: Side) -> Vec<DepthPoint> {
    let mut total = 0.0;
    levels
        .iter()
        .map(|level| {
            total += level.quantity;
            DepthPoint {
                side,
                price: level.price,
                quantity: level.quantity,
                total,
            }
        })
        .collect()
}

/// Depth chart kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct Depth;

struct DepthFrame {
    plot: Rect,
    x: LinearScale,
    y: LinearScale,
}

fn depth_frame(points: &[DepthPoint], ctx: &PaintContext<'_>) -> Option<DepthFrame> {
    let prices = ValueRange::from_values(points.iter().map(|p| p.price))?;
    let depth = ValueRange::from_values(points.iter().map(|p| p.total))?.including_zero();
    let b = ctx.bounds;
    let band = if ctx.options.show_labels {
        ctx.px(ctx.options.font_size.max(1.0) * 1.8)
    } else {
        0.0
    };
    let plot = Rect::new(b.x, b.y + band, b.width, (b.height - band).max(0.0));
    Some(DepthFrame {
        plot,
        x: LinearScale::new(prices, plot.x, plot.right()),
        y: LinearScale::new(depth, plot.bottom(), plot.y),
    })
}

/// Closed step outline from the spread outward to the plot edge at `edge_x`.
fn step_outline(side: &[Point], baseline: f64, edge_x: f64) -> Vec<Point> {
    let Some(first) = side.first() else {
        return Vec::new();
    };
    let mut outline = vec![Point::new(first.x, baseline)];
    let mut level = baseline;
    for p in side {
        outline.push(Point::new(p.x, level));
        outline.push(*p);
        level = p.y;
    }
    outline.push(Point::new(edge_x, level));
    outline.push(Point::new(edge_x, baseline));
    outline
}

impl ChartKind for Depth {
    type Data = DepthData;
    type Item = DepthPoint;

    const NAME: &'static str = "depth";
    const DEFAULT_STYLE: AnimationStyle = AnimationStyle::Sweep;

    fn item_count(_data: &Self::Data) -> usize {
        2
    }

    fn item(data: &Self::Data, index: usize) -> Option<DepthPoint> {
        data.points().get(index).copied()
    }

    fn build_geometry(data: &Self::Data, ctx: &PaintContext<'_>) -> Vec<GeometryRecord> {
        let points = data.points();
        let Some(frame) = depth_frame(&points, ctx) else {
            return Vec::new();
        };
        let axis = AxisMap::Explicit(points.iter().map(|p| frame.x.map(p.price)).collect());
        points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| {
                let x = axis.position(i)?;
                Some(GeometryRecord::axis(i, x, axis.half_slot(i)).in_series(p.side.item()))
            })
            .collect()
    }

    fn paint(
        canvas: &mut dyn Canvas,
        data: &Self::Data,
        geometry: &[GeometryRecord],
        ctx: &PaintContext<'_>,
    ) {
        let points = data.points();
        let Some(frame) = depth_frame(&points, ctx) else {
            return;
        };
        let baseline = frame.plot.bottom();
        let line = ctx.px(ctx.options.line_width.max(0.5));
        let mid_x = data
            .mid_price()
            .map_or(frame.plot.center().x, |m| frame.x.map(m));

        for side in [Side::Bid, Side::Ask] {
            let item = side.item();
            let sweep = ctx.reveal(item, AnimationStyle::Sweep).clamp(0.0, 1.0);
            let grow = ctx.reveal(item, AnimationStyle::Grow).max(0.0);
            let alpha = ctx.fade_alpha(item);
            let color = match side {
                Side::Bid => ctx.palette.positive,
                Side::Ask => ctx.palette.negative,
            };

            // Outward from the spread: bids right to left, asks left to right.
            let mut side_points: Vec<Point> = points
                .iter()
                .filter(|p| p.side == side)
                .map(|p| {
                    let x = (frame.x.map(p.price) - mid_x).mul_add(sweep, mid_x);
                    let y = (frame.y.map(p.total) - baseline).mul_add(grow, baseline);
                    Point::new(x, y)
                })
                .collect();
            let edge = match side {
                Side::Bid => {
                    side_points.reverse();
                    (frame.plot.x - mid_x).mul_add(sweep, mid_x)
                }
                Side::Ask => (frame.plot.right() - mid_x).mul_add(sweep, mid_x),
            };

            let outline = step_outline(&side_points, baseline, edge);
            if outline.is_empty() {
                continue;
            }
            let fill_alpha = alpha * ctx.options.fill_opacity.clamp(0.0, 1.0);
            canvas.fill_polygon(&outline, color.fade(fill_alpha));
            // Stroke only the top edge.
            canvas.stroke_path(&outline[1..outline.len() - 1], false, color.fade(alpha), line);
        }

        if ctx.options.show_labels {
            if let Some(mid) = data.mid_price() {
                let text = ctx.text_style().colored(ctx.palette.muted_text).aligned(TextAlign::Center);
                let label = format_value(mid, ctx.options.decimals);
                let y = ctx.bounds.y + (frame.plot.y - ctx.bounds.y) / 2.0;
                canvas.draw_text(&label, Point::new(mid_x, y), &text);
            }
        }

        let Some(index) = ctx.highlight else {
            return;
        };
        let Some(record) = geometry.iter().find(|r| r.index == index) else {
            return;
        };
        let Some(point) = points.get(record.index) else {
            return;
        };
        let x = frame.x.map(point.price);
        canvas.stroke_path(
            &[Point::new(x, frame.plot.y), Point::new(x, baseline)],
            false,
            ctx.palette.muted_text,
            ctx.px(1.0),
        );
        let color = match point.side {
            Side::Bid => ctx.palette.positive,
            Side::Ask => ctx.palette.negative,
        };
        canvas.fill_circle(Point::new(x, frame.y.map(point.total)), line * 2.0, color);
    }

    fn tooltip(
        data: &Self::Data,
        record: &GeometryRecord,
        options: &ChartOptions,
    ) -> Option<Tooltip> {
        let point = Self::item(data, record.index)?;
        Some(
            Tooltip::new(point.side.title())
                .line(format!("Price: {}", format_value(point.price, options.decimals)))
                .line(format!(
                    "Quantity: {}",
                    format_value(point.quantity, options.decimals)
                ))
                .line(format!("Total: {}", format_value(point.total, options.decimals))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> DepthData {
        serde_json::from_value(serde_json::json!({
            "bids": [
                {"price": 99, "quantity": 2},
                {"price": 100, "quantity": 1},
                {"price": 98, "quantity": 0},
                {"price": 97, "quantity": 3}
            ],
            "asks": [
                {"price": 102, "quantity": 4},
                {"price": 101, "quantity": 1}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_points_ascending_with_outward_totals() {
        let points = book().points();
        let summary: Vec<_> = points.iter().map(|p| (p.side, p.price, p.total)).collect();
        assert_eq!(
            summary,
            vec![
                (Side::Bid, 97.0, 6.0),
                (Side::Bid, 99.0, 3.0),
                (Side::Bid, 100.0, 1.0),
                (Side::Ask, 101.0, 1.0),
                (Side::Ask, 102.0, 5.0),
            ]
        );
    }

    #[test]
    fn test_mid_price() {
        assert_eq!(book().mid_price(), Some(100.5));
        let one_sided = DepthData {
            bids: vec![Level {
                price: 1.0,
                quantity: 1.0,
            }],
            asks: Vec::new(),
        };
        assert_eq!(one_sided.mid_price(), None);
    }

    #[test]
    fn test_step_outline() {
        let side = [Point::new(10.0, 8.0), Point::new(5.0, 4.0)];
        let outline = step_outline(&side, 10.0, 0.0);
        assert_eq!(
            outline,
            vec![
                Point::new(10.0, 10.0),
                Point::new(10.0, 10.0),
                Point::new(10.0, 8.0),
                Point::new(5.0, 8.0),
                Point::new(5.0, 4.0),
                Point::new(0.0, 4.0),
                Point::new(0.0, 10.0),
            ]
        );
        assert!(step_outline(&[], 10.0, 0.0).is_empty());
    }

    #[test]
    fn test_tooltip() {
        let data = book();
        let record = GeometryRecord::axis(4, 0.0, 1.0);
        let t = Depth::tooltip(&data, &record, &ChartOptions::default()).unwrap();
        assert_eq!(t.title, "Ask");
        assert_eq!(t.lines, vec!["Price: 102.0", "Quantity: 4.0", "Total: 5.0"]);
    }

    #[test]
    fn test_side_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Side::Bid).unwrap(), "\"bid\"");
    }
}
