//! Light/dark theme resolution from the chart background.
//!
//! A chart either paints its own background color or sits on top of whatever
//! its container shows (`"transparent"`). In the second case the effective
//! surface is found by walking up the container chain until some ancestor
//! reports an opaque-enough background.

use crate::color::Color;
use serde::{Deserialize, Serialize};

/// Brightness above which a surface counts as light (0–255 scale).
pub const LIGHT_THRESHOLD: f64 = 150.0;

/// The `background` option, parsed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Background {
    /// Inherit the surface from the ambient container chain.
    Transparent,
    /// An explicit fill color.
    Solid(Color),
}

impl Background {
    /// Parse a background specification.
    ///
    /// Anything that is not a usable color (the `transparent` keyword, a
    /// fully transparent color, or an unparsable string) inherits from the
    /// ambient container.
    #[must_use]
    pub fn parse(spec: &str) -> Self {
        match Color::parse(spec) {
            Ok(color) if !color.is_transparent() => Self::Solid(color),
            Ok(_) => Self::Transparent,
            Err(err) => {
                tracing::debug!(%err, spec, "background is not a color, inheriting from container");
                Self::Transparent
            }
        }
    }

    /// The explicit fill, if any.
    #[must_use]
    pub const fn fill(&self) -> Option<Color> {
        match self {
            Self::Transparent => None,
            Self::Solid(c) => Some(*c),
        }
    }
}

/// A node in the containment chain a chart is attached to.
pub trait Container {
    /// The node's own computed background color, if it paints one.
    fn effective_background_color(&self) -> Option<Color>;

    /// The enclosing node, `None` at the root.
    fn parent(&self) -> Option<&dyn Container>;
}

/// Walk up from `node` to the first ancestor-or-self with a visible background.
#[must_use]
pub fn inherited_background(node: &dyn Container) -> Option<Color> {
    let mut current = Some(node);
    while let Some(n) = current {
        if let Some(color) = n.effective_background_color().filter(|c| !c.is_transparent()) {
            return Some(color);
        }
        current = n.parent();
    }
    None
}

/// Decide whether the surface behind a chart is light.
///
/// Explicit backgrounds are classified directly; transparent ones consult the
/// ambient chain. With no information at all the surface is assumed dark.
#[must_use]
pub fn resolve_is_light(background: &str, ambient: Option<&dyn Container>) -> bool {
    let surface = match Background::parse(background) {
        Background::Solid(color) => Some(color),
        Background::Transparent => ambient.and_then(inherited_background),
    };
    surface.is_some_and(|c| c.brightness() > LIGHT_THRESHOLD)
}

/// Result of one theme resolution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ThemeDecision {
    /// Whether the effective surface is light.
    pub is_light: bool,
}

impl ThemeDecision {
    /// Resolve from the background option and ambient container.
    #[must_use]
    pub fn resolve(background: &str, ambient: Option<&dyn Container>) -> Self {
        Self {
            is_light: resolve_is_light(background, ambient),
        }
    }
}

/// Default colors derived from a theme decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    /// Primary text
    pub text: Color,
    /// Secondary text (axis labels, captions)
    pub muted_text: Color,
    /// Grid lines and axes
    pub grid: Color,
    /// Unfilled gauge track / radar web
    pub track: Color,
    /// Gauge needle
    pub needle: Color,
    /// Tooltip background
    pub tooltip_background: Color,
    /// Tooltip text
    pub tooltip_text: Color,
    /// Rising values
    pub positive: Color,
    /// Falling values
    pub negative: Color,
    /// Unchanged values
    pub neutral: Color,
    /// Categorical colors, cycled by item index
    pub series: Vec<Color>,
}

impl Palette {
    /// Palette for light surfaces.
    #[must_use]
    pub fn light() -> Self {
        Self {
            text: Color::new(0.07, 0.09, 0.15, 1.0),
            muted_text: Color::new(0.42, 0.45, 0.5, 1.0),
            grid: Color::new(0.0, 0.0, 0.0, 0.08),
            track: Color::new(0.0, 0.0, 0.0, 0.08),
            needle: Color::new(0.12, 0.16, 0.22, 1.0),
            tooltip_background: Color::new(1.0, 1.0, 1.0, 0.96),
            tooltip_text: Color::new(0.07, 0.09, 0.15, 1.0),
            positive: Color::new(0.09, 0.64, 0.29, 1.0),
            negative: Color::new(0.86, 0.15, 0.15, 1.0),
            neutral: Color::new(0.8, 0.82, 0.85, 1.0),
            series: Self::categorical(),
        }
    }

    /// Palette for dark surfaces.
    #[must_use]
    pub fn dark() -> Self {
        Self {
            text: Color::new(0.9, 0.91, 0.93, 1.0),
            muted_text: Color::new(0.61, 0.64, 0.69, 1.0),
            grid: Color::new(1.0, 1.0, 1.0, 0.08),
            track: Color::new(1.0, 1.0, 1.0, 0.1),
            needle: Color::new(0.9, 0.91, 0.93, 1.0),
            tooltip_background: Color::new(0.07, 0.09, 0.15, 0.96),
            tooltip_text: Color::new(0.9, 0.91, 0.93, 1.0),
            positive: Color::new(0.13, 0.77, 0.37, 1.0),
            negative: Color::new(0.94, 0.27, 0.27, 1.0),
            neutral: Color::new(0.22, 0.25, 0.32, 1.0),
            series: Self::categorical(),
        }
    }

    /// Palette for a resolved theme.
    #[must_use]
    pub fn for_decision(decision: ThemeDecision) -> Self {
        if decision.is_light {
            Self::light()
        } else {
            Self::dark()
        }
    }

    /// Categorical color for an item index.
    #[must_use]
    pub fn series_color(&self, index: usize) -> Color {
        if self.series.is_empty() {
            return self.text;
        }
        self.series[index % self.series.len()]
    }

    fn categorical() -> Vec<Color> {
        vec![
            Color::new(0.23, 0.51, 0.96, 1.0),
            Color::new(0.06, 0.73, 0.51, 1.0),
            Color::new(0.96, 0.62, 0.04, 1.0),
            Color::new(0.94, 0.27, 0.27, 1.0),
            Color::new(0.55, 0.36, 0.96, 1.0),
            Color::new(0.02, 0.71, 0.83, 1.0),
            Color::new(0.93, 0.28, 0.6, 1.0),
            Color::new(0.52, 0.8, 0.09, 1.0),
        ]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Node {
        background: Option<Color>,
        parent: Option<Box<Node>>,
    }

    impl Node {
        fn leaf(background: Option<Color>) -> Self {
            Self {
                background,
                parent: None,
            }
        }

        fn child_of(parent: Self, background: Option<Color>) -> Self {
            Self {
                background,
                parent: Some(Box::new(parent)),
            }
        }
    }

    impl Container for Node {
        fn effective_background_color(&self) -> Option<Color> {
            self.background
        }

        fn parent(&self) -> Option<&dyn Container> {
            self.parent.as_deref().map(|p| p as &dyn Container)
        }
    }

    #[test]
    fn test_explicit_backgrounds() {
        assert!(resolve_is_light("#FFFFFF", None));
        assert!(!resolve_is_light("#000000", None));
        assert!(resolve_is_light("rgb(200,200,200)", None));
        assert!(!resolve_is_light("rgb(100,100,100)", None));
    }

    #[test]
    fn test_threshold_around_150() {
        assert!(!resolve_is_light("rgb(145,145,145)", None));
        assert!(resolve_is_light("rgb(155,155,155)", None));
        // Green weighs most: pure green at 255 is ~150 brightness only.
        assert!(!resolve_is_light("rgb(0,255,0)", None));
    }

    #[test]
    fn test_threshold_is_strict_at_150() {
        assert!(!resolve_is_light("rgb(150,150,150)", None));
        assert!(resolve_is_light("rgb(151,151,151)", None));
    }

    #[test]
    fn test_transparent_without_ambient_is_dark() {
        assert!(!resolve_is_light("transparent", None));
    }

    #[test]
    fn test_transparent_walks_ancestors() {
        let root = Node::leaf(Some(Color::WHITE));
        let middle = Node::child_of(root, Some(Color::TRANSPARENT));
        let leaf = Node::child_of(middle, None);
        assert!(resolve_is_light("transparent", Some(&leaf)));
    }

    #[test]
    fn test_nearest_opaque_ancestor_wins() {
        let root = Node::leaf(Some(Color::WHITE));
        let middle = Node::child_of(root, Some(Color::rgb(0.1, 0.1, 0.1)));
        let leaf = Node::child_of(middle, None);
        assert!(!resolve_is_light("transparent", Some(&leaf)));
    }

    #[test]
    fn test_chain_without_background_is_dark() {
        let root = Node::leaf(None);
        let leaf = Node::child_of(root, Some(Color::TRANSPARENT));
        assert!(!resolve_is_light("transparent", Some(&leaf)));
    }

    #[test]
    fn test_explicit_background_ignores_ambient() {
        let light_root = Node::leaf(Some(Color::WHITE));
        assert!(!resolve_is_light("#101010", Some(&light_root)));
    }

    #[test]
    fn test_zero_alpha_color_counts_as_transparent() {
        let light_root = Node::leaf(Some(Color::WHITE));
        assert!(resolve_is_light("rgba(0,0,0,0)", Some(&light_root)));
    }

    #[test]
    fn test_unparsable_background_inherits() {
        let light_root = Node::leaf(Some(Color::WHITE));
        assert_eq!(Background::parse("var(--bg)"), Background::Transparent);
        assert!(resolve_is_light("var(--bg)", Some(&light_root)));
    }

    #[test]
    fn test_palette_for_decision() {
        let light = Palette::for_decision(ThemeDecision { is_light: true });
        let dark = Palette::for_decision(ThemeDecision { is_light: false });
        assert!(light.text.brightness() < dark.text.brightness());
        assert_eq!(light, Palette::light());
    }

    #[test]
    fn test_series_color_cycles() {
        let p = Palette::dark();
        let n = p.series.len();
        assert_eq!(p.series_color(0), p.series_color(n));
    }
}
