//! Core types and traits for chartkit.
//!
//! This crate provides the pieces every chart widget is built from:
//! - Geometric primitives: [`Point`], [`Size`], [`Rect`]
//! - Color parsing and brightness: [`Color`]
//! - Light/dark surface detection: [`resolve_is_light`], [`Palette`]
//! - Frame-driven animation: [`Animator`], [`Easing`], [`FrameHost`]
//! - Pointer hit-testing: [`HitTester`], [`GeometryRecord`], [`AxisMap`]
//! - Drawing surfaces: [`Canvas`], [`RecordingCanvas`]
//! - Options snapshots: [`ChartOptions`]

pub mod animation;
pub mod canvas;
mod color;
mod error;
pub mod format;
mod geometry;
pub mod hit;
mod options;
pub mod theme;

pub use animation::{
    AnimationSpec, AnimationState, AnimationStyle, Animator, Easing, FrameHost, FrameProgress,
    FrameToken, ManualFrameHost, ResolvedAnimation, DEFAULT_DURATION_MS,
};
pub use canvas::{Canvas, DrawCommand, RecordingCanvas, TextAlign, TextStyle};
pub use color::{Color, ColorParseError};
pub use error::{json_kind, DataError, OptionsError};
pub use format::{format_percent, format_value};
pub use geometry::{normalize_angle, Point, Rect, Size};
pub use hit::{AxisMap, GeometryRecord, HitTester, Shape, ANGLE_EPSILON};
pub use options::ChartOptions;
pub use theme::{
    inherited_background, resolve_is_light, Background, Container, Palette, ThemeDecision,
    LIGHT_THRESHOLD,
};
