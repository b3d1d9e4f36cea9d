//! Pointer-to-item hit-testing over per-draw geometry snapshots.
//!
//! Every draw rebuilds a list of [`GeometryRecord`]s at final (not animated)
//! positions. Pointer queries run against the latest list and either name a
//! record or report no match, which is the common case over empty margins.

use crate::geometry::{normalize_angle, Point, Rect};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Tolerance for angular boundaries, so an angle rebuilt through
/// `sin`/`cos`/`atan2` still lands in the slice that starts there.
pub const ANGLE_EPSILON: f64 = 1e-9;

/// Interactive region geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Axis-aligned rectangle (treemap cells, bars).
    Rect(Rect),
    /// Annular wedge (pie/donut slices, gauge track). Angles follow the
    /// canvas convention, see [`Point::angle_from`].
    Sector {
        /// Center of the ring
        center: Point,
        /// Inner radius (0 for a pie)
        inner_radius: f64,
        /// Outer radius
        outer_radius: f64,
        /// Inclusive start angle
        start_angle: f64,
        /// Exclusive end angle
        end_angle: f64,
    },
    /// A vertex matched by proximity (radar).
    Point {
        /// Vertex position
        center: Point,
        /// Marker radius; acts as a minimum hit tolerance
        radius: f64,
    },
    /// A data index on a horizontal axis (area, sparkline, depth).
    AxisIndex {
        /// Pixel position of the index
        x: f64,
        /// Half the slot width around `x`
        half_slot: f64,
    },
}

/// One interactive region with its back-reference into the data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryRecord {
    /// Region geometry
    pub shape: Shape,
    /// Data index reported to callbacks
    pub index: usize,
    /// Series the item belongs to (0 for single-series charts)
    pub series: usize,
}

impl GeometryRecord {
    /// Rectangle record.
    #[must_use]
    pub const fn rect(index: usize, rect: Rect) -> Self {
        Self {
            shape: Shape::Rect(rect),
            index,
            series: 0,
        }
    }

    /// Sector record.
    #[must_use]
    pub const fn sector(
        index: usize,
        center: Point,
        inner_radius: f64,
        outer_radius: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Self {
        Self {
            shape: Shape::Sector {
                center,
                inner_radius,
                outer_radius,
                start_angle,
                end_angle,
            },
            index,
            series: 0,
        }
    }

    /// Proximity point record.
    #[must_use]
    pub const fn point(index: usize, center: Point, radius: f64) -> Self {
        Self {
            shape: Shape::Point { center, radius },
            index,
            series: 0,
        }
    }

    /// Axis index record.
    #[must_use]
    pub const fn axis(index: usize, x: f64, half_slot: f64) -> Self {
        Self {
            shape: Shape::AxisIndex { x, half_slot },
            index,
            series: 0,
        }
    }

    /// Tag the record with a series.
    #[must_use]
    pub const fn in_series(mut self, series: usize) -> Self {
        self.series = series;
        self
    }
}

/// Hit-testing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitTester {
    /// Extra radius beyond a sector's outer edge that still counts as a hit
    pub hover_slack: f64,
    /// Maximum distance from a proximity point
    pub point_tolerance: f64,
}

impl Default for HitTester {
    fn default() -> Self {
        Self {
            hover_slack: 6.0,
            point_tolerance: 12.0,
        }
    }
}

impl HitTester {
    /// Create a tester.
    #[must_use]
    pub const fn new(hover_slack: f64, point_tolerance: f64) -> Self {
        Self {
            hover_slack,
            point_tolerance,
        }
    }

    /// Data index under the pointer, `None` for no match.
    #[must_use]
    pub fn hit_test(&self, pointer: Point, records: &[GeometryRecord]) -> Option<usize> {
        self.hit_record(pointer, records).map(|r| r.index)
    }

    /// Record under the pointer.
    ///
    /// Containment shapes (rects, sectors) are checked first in record
    /// order and the first match wins. Otherwise the nearest proximity shape
    /// (point, axis index) within tolerance wins, the earlier record on ties.
    #[must_use]
    pub fn hit_record<'a>(
        &self,
        pointer: Point,
        records: &'a [GeometryRecord],
    ) -> Option<&'a GeometryRecord> {
        if !pointer.x.is_finite() || !pointer.y.is_finite() {
            return None;
        }

        let reference = records.iter().find_map(|r| match r.shape {
            Shape::Sector { start_angle, .. } => Some(start_angle),
            _ => None,
        });

        let contained = records.iter().find(|r| match r.shape {
            Shape::Rect(rect) => rect.contains_point(&pointer),
            Shape::Sector {
                center,
                inner_radius,
                outer_radius,
                start_angle,
                end_angle,
            } => {
                let distance = pointer.distance(&center);
                if distance < inner_radius || distance > outer_radius + self.hover_slack {
                    return false;
                }
                let reference = reference.unwrap_or(start_angle);
                let mut angle = normalize_angle(pointer.angle_from(&center), reference);
                if angle >= reference + TAU - ANGLE_EPSILON {
                    angle -= TAU;
                }
                angle >= start_angle - ANGLE_EPSILON && angle < end_angle - ANGLE_EPSILON
            }
            Shape::Point { .. } | Shape::AxisIndex { .. } => false,
        });
        if contained.is_some() {
            return contained;
        }

        let mut best: Option<(f64, &GeometryRecord)> = None;
        for record in records {
            let candidate = match record.shape {
                Shape::Point { center, radius } => {
                    let d = pointer.distance(&center);
                    (d <= radius.max(self.point_tolerance)).then_some(d)
                }
                Shape::AxisIndex { x, half_slot } => {
                    let d = (pointer.x - x).abs();
                    (d <= half_slot).then_some(d)
                }
                Shape::Rect(_) | Shape::Sector { .. } => None,
            };
            if let Some(d) = candidate {
                if best.map_or(true, |(best_d, _)| d < best_d) {
                    best = Some((d, record));
                }
            }
        }
        best.map(|(_, r)| r)
    }
}

// =============================================================================
// AxisMap
// =============================================================================

/// Pixel positions of data indices along a horizontal axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AxisMap {
    /// Evenly spaced indices.
    Linear {
        /// Position of index 0
        start: f64,
        /// Distance between consecutive indices
        step: f64,
        /// Number of indices
        count: usize,
    },
    /// Positions given per index, ascending.
    Explicit(Vec<f64>),
}

impl AxisMap {
    /// Spread `count` indices across `[left, left + width]`, end points
    /// included. A single index sits in the middle.
    #[must_use]
    pub fn spread(left: f64, width: f64, count: usize) -> Self {
        match count {
            0 => Self::Linear {
                start: left,
                step: 0.0,
                count: 0,
            },
            1 => Self::Linear {
                start: left + width / 2.0,
                step: width,
                count: 1,
            },
            n => Self::Linear {
                start: left,
                step: width / (n - 1) as f64,
                count: n,
            },
        }
    }

    /// Number of indices.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Linear { count, .. } => *count,
            Self::Explicit(xs) => xs.len(),
        }
    }

    /// Whether the axis has no indices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pixel position of an index.
    #[must_use]
    pub fn position(&self, index: usize) -> Option<f64> {
        match self {
            Self::Linear { start, step, count } => {
                (index < *count).then(|| step.mul_add(index as f64, *start))
            }
            Self::Explicit(xs) => xs.get(index).copied(),
        }
    }

    /// Half the slot width around an index.
    ///
    /// Linear axes use half the step. Explicit axes use half the wider gap to
    /// a neighbor. A lone index owns the whole axis.
    #[must_use]
    pub fn half_slot(&self, index: usize) -> f64 {
        match self {
            Self::Linear { step, count, .. } => {
                if *count <= 1 {
                    f64::INFINITY
                } else {
                    step.abs() / 2.0
                }
            }
            Self::Explicit(xs) => {
                let at = |i: usize| xs.get(i).copied();
                let Some(x) = at(index) else {
                    return 0.0;
                };
                let left = index.checked_sub(1).and_then(at).map(|l| (x - l).abs());
                let right = at(index + 1).map(|r| (r - x).abs());
                match (left, right) {
                    (None, None) => f64::INFINITY,
                    (l, r) => l.unwrap_or(0.0).max(r.unwrap_or(0.0)) / 2.0,
                }
            }
        }
    }

    /// Nearest index to `x`, if `x` falls inside its slot.
    #[must_use]
    pub fn nearest_index(&self, x: f64) -> Option<usize> {
        if !x.is_finite() || self.is_empty() {
            return None;
        }
        let index = match self {
            Self::Linear { start, step, count } => {
                if *count == 1 || *step == 0.0 {
                    0
                } else {
                    let raw = ((x - start) / step).round();
                    raw.clamp(0.0, (*count - 1) as f64) as usize
                }
            }
            Self::Explicit(xs) => xs
                .iter()
                .enumerate()
                .fold((0, f64::INFINITY), |(bi, bd), (i, p)| {
                    let d = (x - p).abs();
                    if d < bd {
                        (i, d)
                    } else {
                        (bi, bd)
                    }
                })
                .0,
        };
        let position = self.position(index)?;
        ((x - position).abs() <= self.half_slot(index)).then_some(index)
    }

    /// One axis-index record per index, tagged with `series`.
    #[must_use]
    pub fn records(&self, series: usize) -> Vec<GeometryRecord> {
        (0..self.len())
            .filter_map(|i| {
                self.position(i)
                    .map(|x| GeometryRecord::axis(i, x, self.half_slot(i)).in_series(series))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn deg(d: f64) -> f64 {
        d * PI / 180.0
    }

    fn three_slices(center: Point) -> Vec<GeometryRecord> {
        let start = -FRAC_PI_2;
        let sweep = TAU / 3.0;
        (0..3)
            .map(|i| {
                let a0 = (i as f64).mul_add(sweep, start);
                GeometryRecord::sector(i, center, 40.0, 100.0, a0, a0 + sweep)
            })
            .collect()
    }

    // -------------------------------------------------------------------------
    // Rect family
    // -------------------------------------------------------------------------

    #[test]
    fn test_rect_center_hits() {
        let records = vec![
            GeometryRecord::rect(0, Rect::new(0.0, 0.0, 50.0, 50.0)),
            GeometryRecord::rect(1, Rect::new(50.0, 0.0, 50.0, 50.0)),
        ];
        let tester = HitTester::default();
        assert_eq!(tester.hit_test(Point::new(25.0, 25.0), &records), Some(0));
        assert_eq!(tester.hit_test(Point::new(75.0, 25.0), &records), Some(1));
    }

    #[test]
    fn test_rect_shared_edge_goes_to_first() {
        let records = vec![
            GeometryRecord::rect(0, Rect::new(0.0, 0.0, 50.0, 50.0)),
            GeometryRecord::rect(1, Rect::new(50.0, 0.0, 50.0, 50.0)),
        ];
        assert_eq!(
            HitTester::default().hit_test(Point::new(50.0, 10.0), &records),
            Some(0)
        );
    }

    #[test]
    fn test_rect_outside_misses() {
        let records = vec![GeometryRecord::rect(0, Rect::new(10.0, 10.0, 20.0, 20.0))];
        let tester = HitTester::default();
        assert_eq!(tester.hit_test(Point::new(9.0, 20.0), &records), None);
        assert_eq!(tester.hit_test(Point::new(31.0, 20.0), &records), None);
        assert_eq!(tester.hit_test(Point::new(20.0, 31.0), &records), None);
    }

    #[test]
    fn test_empty_records_miss() {
        assert_eq!(HitTester::default().hit_test(Point::ORIGIN, &[]), None);
    }

    #[test]
    fn test_non_finite_pointer_misses() {
        let records = vec![GeometryRecord::rect(0, Rect::new(0.0, 0.0, 10.0, 10.0))];
        assert_eq!(
            HitTester::default().hit_test(Point::new(f64::NAN, 1.0), &records),
            None
        );
    }

    // -------------------------------------------------------------------------
    // Sector family
    // -------------------------------------------------------------------------

    #[test]
    fn test_sector_slices_by_angle() {
        let center = Point::new(200.0, 200.0);
        let records = three_slices(center);
        let tester = HitTester::default();
        let at = |d: f64| center.polar(70.0, deg(d));

        assert_eq!(tester.hit_test(at(-89.0), &records), Some(0));
        assert_eq!(tester.hit_test(at(31.0), &records), Some(1));
        assert_eq!(tester.hit_test(at(151.0), &records), Some(2));
    }

    #[test]
    fn test_sector_boundary_belongs_to_following_slice() {
        let center = Point::new(200.0, 200.0);
        let records = three_slices(center);
        let tester = HitTester::default();

        assert_eq!(tester.hit_test(center.polar(70.0, deg(30.0)), &records), Some(1));
        assert_eq!(tester.hit_test(center.polar(70.0, deg(150.0)), &records), Some(2));
        assert_eq!(tester.hit_test(center.polar(70.0, deg(-90.0)), &records), Some(0));
        assert_eq!(tester.hit_test(center.polar(70.0, deg(270.0)), &records), Some(0));
    }

    #[test]
    fn test_sector_just_before_twelve_is_last_slice() {
        let center = Point::new(0.0, 0.0);
        let records = three_slices(center);
        assert_eq!(
            HitTester::default().hit_test(center.polar(70.0, deg(-91.0)), &records),
            Some(2)
        );
    }

    #[test]
    fn test_sector_radial_bounds() {
        let center = Point::new(0.0, 0.0);
        let records = three_slices(center);
        let tester = HitTester::new(5.0, 10.0);

        // Inside the hole.
        assert_eq!(tester.hit_test(center.polar(30.0, deg(0.0)), &records), None);
        // Within hover slack.
        assert_eq!(tester.hit_test(center.polar(104.0, deg(0.0)), &records), Some(0));
        // Beyond slack.
        assert_eq!(tester.hit_test(center.polar(106.0, deg(0.0)), &records), None);
    }

    #[test]
    fn test_zero_sweep_sector_never_hits() {
        let center = Point::ORIGIN;
        let records = vec![
            GeometryRecord::sector(0, center, 0.0, 50.0, -FRAC_PI_2, -FRAC_PI_2),
            GeometryRecord::sector(1, center, 0.0, 50.0, -FRAC_PI_2, 3.0 * FRAC_PI_2),
        ];
        assert_eq!(
            HitTester::default().hit_test(center.polar(20.0, -FRAC_PI_2), &records),
            Some(1)
        );
    }

    // -------------------------------------------------------------------------
    // Point family
    // -------------------------------------------------------------------------

    #[test]
    fn test_point_nearest_within_tolerance() {
        let records = vec![
            GeometryRecord::point(0, Point::new(0.0, 0.0), 3.0),
            GeometryRecord::point(1, Point::new(10.0, 0.0), 3.0).in_series(1),
        ];
        let tester = HitTester::new(0.0, 8.0);
        let hit = tester.hit_record(Point::new(7.0, 0.0), &records).unwrap();
        assert_eq!(hit.index, 1);
        assert_eq!(hit.series, 1);
        assert_eq!(tester.hit_test(Point::new(50.0, 50.0), &records), None);
    }

    #[test]
    fn test_point_tie_goes_to_first() {
        let records = vec![
            GeometryRecord::point(0, Point::new(0.0, 0.0), 3.0),
            GeometryRecord::point(1, Point::new(10.0, 0.0), 3.0),
        ];
        assert_eq!(
            HitTester::new(0.0, 8.0).hit_test(Point::new(5.0, 0.0), &records),
            Some(0)
        );
    }

    // -------------------------------------------------------------------------
    // AxisIndex family
    // -------------------------------------------------------------------------

    #[test]
    fn test_axis_spread() {
        let axis = AxisMap::spread(0.0, 100.0, 5);
        assert_eq!(axis.position(0), Some(0.0));
        assert_eq!(axis.position(4), Some(100.0));
        assert_eq!(axis.position(5), None);
        assert_eq!(axis.half_slot(2), 12.5);
    }

    #[test]
    fn test_axis_nearest_index() {
        let axis = AxisMap::spread(0.0, 100.0, 5);
        assert_eq!(axis.nearest_index(26.0), Some(1));
        assert_eq!(axis.nearest_index(-12.0), Some(0));
        assert_eq!(axis.nearest_index(-13.0), None);
        assert_eq!(axis.nearest_index(113.0), None);
    }

    #[test]
    fn test_axis_single_point_owns_axis() {
        let axis = AxisMap::spread(0.0, 100.0, 1);
        assert_eq!(axis.position(0), Some(50.0));
        assert_eq!(axis.nearest_index(3.0), Some(0));
    }

    #[test]
    fn test_axis_explicit() {
        let axis = AxisMap::Explicit(vec![0.0, 10.0, 40.0]);
        assert_eq!(axis.nearest_index(4.0), Some(0));
        assert_eq!(axis.nearest_index(30.0), Some(2));
        assert_eq!(axis.half_slot(2), 15.0);
        assert_eq!(axis.nearest_index(56.0), None);
    }

    #[test]
    fn test_axis_records_hit_like_axis_map() {
        let axis = AxisMap::spread(10.0, 200.0, 9);
        let records = axis.records(0);
        let tester = HitTester::default();
        for x in [0.0, 10.0, 33.3, 120.0, 209.0, 236.0] {
            assert_eq!(
                tester.hit_test(Point::new(x, 0.0), &records),
                axis.nearest_index(x),
                "x = {x}"
            );
        }
    }

    #[test]
    fn test_containment_beats_proximity() {
        let records = vec![
            GeometryRecord::point(0, Point::new(5.0, 5.0), 3.0),
            GeometryRecord::rect(1, Rect::new(0.0, 0.0, 20.0, 20.0)),
        ];
        assert_eq!(
            HitTester::default().hit_test(Point::new(5.0, 5.0), &records),
            Some(1)
        );
    }

    proptest! {
        #[test]
        fn prop_equal_slices_match_by_angle(n in 1usize..12, k in 0usize..12, frac in 0.01f64..0.99) {
            let k = k % n;
            let center = Point::new(100.0, 100.0);
            let sweep = TAU / n as f64;
            let records: Vec<_> = (0..n)
                .map(|i| {
                    let a0 = (i as f64).mul_add(sweep, -FRAC_PI_2);
                    GeometryRecord::sector(i, center, 0.0, 80.0, a0, a0 + sweep)
                })
                .collect();
            let angle = (k as f64 + frac).mul_add(sweep, -FRAC_PI_2);
            let pointer = center.polar(40.0, angle);
            prop_assert_eq!(HitTester::default().hit_test(pointer, &records), Some(k));
        }

        #[test]
        fn prop_hit_is_deterministic(x in -50.0f64..150.0, y in -50.0f64..150.0) {
            let records = vec![
                GeometryRecord::rect(0, Rect::new(0.0, 0.0, 60.0, 100.0)),
                GeometryRecord::rect(1, Rect::new(60.0, 0.0, 40.0, 100.0)),
            ];
            let tester = HitTester::default();
            let p = Point::new(x, y);
            prop_assert_eq!(tester.hit_test(p, &records), tester.hit_test(p, &records));
        }
    }
}
