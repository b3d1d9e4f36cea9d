#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
//! Layout engines for chartkit.
//!
//! Currently a squarified treemap: weighted items are partitioned into
//! non-overlapping rectangles with area proportional to weight while keeping
//! cells as close to square as the greedy row strategy allows.
//!
//! ```
//! use chartkit_core::Rect;
//! use chartkit_layout::{squarify, WeightedItem};
//!
//! let items = [WeightedItem::new(2.0, "a"), WeightedItem::new(1.0, "b")];
//! let cells = squarify(&items, Rect::new(0.0, 0.0, 90.0, 60.0), 0.0);
//! assert_eq!(cells.len(), 2);
//! ```

mod treemap;

pub use treemap::{
    squarify, squarify_groups, squarify_weights, GroupLayout, LayoutRect, WeightedItem,
};
