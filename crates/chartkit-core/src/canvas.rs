//! Drawing surface abstraction and a recording implementation.
//!
//! Widgets paint through [`Canvas`] in device pixels. The browser host backs
//! it with a 2D context; [`RecordingCanvas`] captures the calls as
//! [`DrawCommand`]s so paint output can be inspected without a display.

use crate::color::Color;
use crate::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Horizontal text anchoring relative to the draw position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    /// Position is the left edge
    Left,
    /// Position is the horizontal center
    #[default]
    Center,
    /// Position is the right edge
    Right,
}

/// Text style. Text is always vertically centered on the draw position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font size in device pixels
    pub size: f64,
    /// Font family list, CSS syntax
    pub family: String,
    /// Fill color
    pub color: Color,
    /// Horizontal anchoring
    pub align: TextAlign,
    /// Bold weight
    pub bold: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 12.0,
            family: "sans-serif".to_string(),
            color: Color::WHITE,
            align: TextAlign::Center,
            bold: false,
        }
    }
}

impl TextStyle {
    /// Set alignment.
    #[must_use]
    pub const fn aligned(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    /// Set color.
    #[must_use]
    pub const fn colored(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set size.
    #[must_use]
    pub const fn sized(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    /// Set bold weight.
    #[must_use]
    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// CSS font shorthand, e.g. `bold 12px sans-serif`.
    #[must_use]
    pub fn css_font(&self) -> String {
        let weight = if self.bold { "bold " } else { "" };
        format!("{weight}{}px {}", self.size, self.family)
    }
}

/// Drawing surface in device pixels.
pub trait Canvas {
    /// Reset the whole surface, then fill it if `background` is given.
    fn clear(&mut self, background: Option<Color>);

    /// Fill a rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Stroke a rectangle outline.
    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f64);

    /// Fill an annular wedge. Angles follow the canvas convention.
    fn fill_sector(
        &mut self,
        center: Point,
        inner_radius: f64,
        outer_radius: f64,
        start_angle: f64,
        end_angle: f64,
        color: Color,
    );

    /// Fill a circle.
    fn fill_circle(&mut self, center: Point, radius: f64, color: Color);

    /// Fill a closed polygon.
    fn fill_polygon(&mut self, points: &[Point], color: Color);

    /// Stroke a polyline.
    fn stroke_path(&mut self, points: &[Point], closed: bool, color: Color, width: f64);

    /// Draw text at a position.
    fn draw_text(&mut self, text: &str, position: Point, style: &TextStyle);

    /// Width of `text` when drawn with `style`.
    ///
    /// The default is a metric-free estimate; surfaces with real font
    /// metrics override it.
    fn measure_text(&self, text: &str, style: &TextStyle) -> f64 {
        text.chars().count() as f64 * style.size * 0.6
    }
}

/// A recorded canvas call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    /// Surface reset
    Clear {
        /// Optional fill
        background: Option<Color>,
    },
    /// Filled rectangle
    FillRect {
        /// Bounds
        rect: Rect,
        /// Fill
        color: Color,
    },
    /// Rectangle outline
    StrokeRect {
        /// Bounds
        rect: Rect,
        /// Stroke color
        color: Color,
        /// Stroke width
        width: f64,
    },
    /// Annular wedge
    Sector {
        /// Center
        center: Point,
        /// Inner radius
        inner_radius: f64,
        /// Outer radius
        outer_radius: f64,
        /// Start angle
        start_angle: f64,
        /// End angle
        end_angle: f64,
        /// Fill
        color: Color,
    },
    /// Filled circle
    Circle {
        /// Center
        center: Point,
        /// Radius
        radius: f64,
        /// Fill
        color: Color,
    },
    /// Filled polygon
    Polygon {
        /// Vertices
        points: Vec<Point>,
        /// Fill
        color: Color,
    },
    /// Stroked polyline
    Path {
        /// Vertices
        points: Vec<Point>,
        /// Whether the last vertex joins the first
        closed: bool,
        /// Stroke color
        color: Color,
        /// Stroke width
        width: f64,
    },
    /// Text run
    Text {
        /// Content
        text: String,
        /// Anchor position
        position: Point,
        /// Style
        style: TextStyle,
    },
}

impl DrawCommand {
    /// Fill or stroke color of the command, `None` for clears.
    #[must_use]
    pub fn color(&self) -> Option<Color> {
        match self {
            Self::Clear { .. } => None,
            Self::FillRect { color, .. }
            | Self::StrokeRect { color, .. }
            | Self::Sector { color, .. }
            | Self::Circle { color, .. }
            | Self::Polygon { color, .. }
            | Self::Path { color, .. } => Some(*color),
            Self::Text { style, .. } => Some(style.color),
        }
    }
}

/// A [`Canvas`] that records draw operations as [`DrawCommand`]s.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    /// Create a new empty recording canvas.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the recorded draw commands.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take ownership of the recorded commands, clearing the canvas.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Get the number of recorded commands.
    #[must_use]
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    /// Check if no commands have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Text of every recorded text run, in draw order.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Commands recorded since the most recent clear.
    #[must_use]
    pub fn last_frame(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| matches!(c, DrawCommand::Clear { .. }))
            .unwrap_or(0);
        &self.commands[start..]
    }
}

impl Canvas for RecordingCanvas {
    fn clear(&mut self, background: Option<Color>) {
        self.commands.push(DrawCommand::Clear { background });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f64) {
        self.commands
            .push(DrawCommand::StrokeRect { rect, color, width });
    }

    fn fill_sector(
        &mut self,
        center: Point,
        inner_radius: f64,
        outer_radius: f64,
        start_angle: f64,
        end_angle: f64,
        color: Color,
    ) {
        self.commands.push(DrawCommand::Sector {
            center,
            inner_radius,
            outer_radius,
            start_angle,
            end_angle,
            color,
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            color,
        });
    }

    fn stroke_path(&mut self, points: &[Point], closed: bool, color: Color, width: f64) {
        self.commands.push(DrawCommand::Path {
            points: points.to_vec(),
            closed,
            color,
            width,
        });
    }

    fn draw_text(&mut self, text: &str, position: Point, style: &TextStyle) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            position,
            style: style.clone(),
        });
    }
}
