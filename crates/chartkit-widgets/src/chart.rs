//! Chart instances: the runtime shared by every chart kind.
//!
//! A [`Chart`] owns one kind's data, the current [`ChartOptions`] snapshot,
//! the resolved theme, an [`Animator`] and the geometry of the last draw.
//! Everything platform-specific (clock, frames, drawing surface, ambient
//! container, tooltip element) comes from a [`Host`].

use chartkit_core::{
    AnimationState, AnimationStyle, Animator, Background, Canvas, ChartOptions, Container,
    DataError, DrawCommand, FrameHost, FrameProgress, FrameToken, GeometryRecord, ManualFrameHost,
    OptionsError, Palette, Point, Rect, RecordingCanvas, Size, TextStyle, ThemeDecision,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Host
// =============================================================================

/// Visible size of the chart in CSS pixels plus the device-pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in CSS pixels
    pub width: f64,
    /// Height in CSS pixels
    pub height: f64,
    /// Device pixels per CSS pixel
    pub device_pixel_ratio: f64,
}

impl Viewport {
    /// Create a viewport.
    #[must_use]
    pub const fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
        }
    }

    /// Device-pixel ratio, `1.0` when the host reports nonsense.
    #[must_use]
    pub fn dpr(&self) -> f64 {
        if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio
        } else {
            1.0
        }
    }

    /// Backing-store size in device pixels.
    #[must_use]
    pub fn device_size(&self) -> Size {
        let clamp = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Size::new(clamp(self.width), clamp(self.height)).scale(self.dpr())
    }

    /// Whole surface in device pixels.
    #[must_use]
    pub fn device_rect(&self) -> Rect {
        Rect::from_size(self.device_size())
    }
}

/// Hover tooltip content, anchored in CSS pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tooltip {
    /// Bold first line
    pub title: String,
    /// Detail lines
    pub lines: Vec<String>,
    /// Anchor x in CSS pixels
    pub x: f64,
    /// Anchor y in CSS pixels
    pub y: f64,
}

impl Tooltip {
    /// Create a tooltip without an anchor.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
            x: 0.0,
            y: 0.0,
        }
    }

    /// Append a detail line.
    #[must_use]
    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    /// Set the anchor.
    #[must_use]
    pub const fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }
}

/// Platform services a chart runs on.
pub trait Host: FrameHost {
    /// Monotonic clock in milliseconds.
    fn now(&self) -> f64;

    /// Current visible size. Hosts resize their surface to match here.
    fn viewport(&mut self) -> Viewport;

    /// Drawing surface in device pixels.
    fn surface(&mut self) -> &mut dyn Canvas;

    /// The container the chart is attached to, for background inheritance.
    ///
    /// Asked on every theme resolution; hosts whose attachment point can
    /// move re-read it here.
    fn ambient(&mut self) -> Option<&dyn Container>;

    /// Show, move or (with `None`) hide the tooltip.
    fn show_tooltip(&mut self, tooltip: Option<&Tooltip>);

    /// Release platform resources. Called once, from [`Chart::dispose`].
    fn release(&mut self);
}

// =============================================================================
// ChartKind
// =============================================================================

/// Per-draw inputs handed to a chart kind.
#[derive(Debug, Clone, Copy)]
pub struct PaintContext<'a> {
    /// Current options snapshot
    pub options: &'a ChartOptions,
    /// Colors for the resolved theme
    pub palette: &'a Palette,
    /// Animation progress of this draw
    pub progress: FrameProgress,
    /// Plot area in device pixels (surface minus padding)
    pub bounds: Rect,
    /// Device pixels per CSS pixel
    pub dpr: f64,
    /// Hovered item, or the active index when nothing is hovered
    pub highlight: Option<usize>,
}

impl PaintContext<'_> {
    /// CSS pixels to device pixels.
    #[must_use]
    pub fn px(&self, css: f64) -> f64 {
        css * self.dpr
    }

    /// Progress of an animated item.
    #[must_use]
    pub fn progress(&self, item: usize) -> f64 {
        self.progress.item(item)
    }

    /// Progress for geometric reveals (`Sweep`, `Grow`), `1.0` otherwise.
    #[must_use]
    pub fn reveal(&self, item: usize, style: AnimationStyle) -> f64 {
        if self.progress.style() == style {
            self.progress(item)
        } else {
            1.0
        }
    }

    /// Alpha from interactive dimming.
    #[must_use]
    pub fn dim_alpha(&self, index: usize) -> f64 {
        match self.highlight {
            Some(h) if h != index => self.options.dim_alpha(),
            _ => 1.0,
        }
    }

    /// Alpha from the `Fade` animation style.
    #[must_use]
    pub fn fade_alpha(&self, item: usize) -> f64 {
        if self.progress.style() == AnimationStyle::Fade {
            self.progress(item).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    /// Combined alpha of an item: dim and fade multiply.
    #[must_use]
    pub fn item_alpha(&self, index: usize, animation_item: usize) -> f64 {
        self.dim_alpha(index) * self.fade_alpha(animation_item)
    }

    /// Label style in device pixels.
    #[must_use]
    pub fn text_style(&self) -> TextStyle {
        TextStyle {
            size: self.px(self.options.font_size.max(1.0)),
            family: self.options.font_family.clone(),
            color: self.palette.text,
            ..TextStyle::default()
        }
    }
}

/// One chart type: how its data turns into geometry, pixels and tooltips.
///
/// Kinds are stateless markers; all state lives in [`Chart`].
pub trait ChartKind: 'static {
    /// Input snapshot passed to `set_data`.
    type Data: DeserializeOwned + Default;
    /// Item handed to click/hover callbacks.
    type Item: Serialize + Clone + fmt::Debug;

    /// Registry name.
    const NAME: &'static str;
    /// Animation style used when the options don't name one.
    const DEFAULT_STYLE: AnimationStyle;

    /// Number of independently animated (staggered) units.
    fn item_count(data: &Self::Data) -> usize;

    /// Item behind a geometry record index.
    fn item(data: &Self::Data, index: usize) -> Option<Self::Item>;

    /// Interactive regions at final (not animated) positions.
    fn build_geometry(data: &Self::Data, ctx: &PaintContext<'_>) -> Vec<GeometryRecord>;

    /// Draw one frame.
    fn paint(
        canvas: &mut dyn Canvas,
        data: &Self::Data,
        geometry: &[GeometryRecord],
        ctx: &PaintContext<'_>,
    );

    /// Tooltip content for a hovered record (anchor is filled in by the chart).
    fn tooltip(
        data: &Self::Data,
        record: &GeometryRecord,
        options: &ChartOptions,
    ) -> Option<Tooltip>;

    /// Replace the data with numeric series.
    fn apply_series(data: &mut Self::Data, series: Vec<Vec<f64>>) -> Result<(), DataError> {
        let _ = (data, series);
        Err(DataError::Unsupported {
            kind: Self::NAME,
            payload: "series",
        })
    }

    /// Replace the data with stacked segments per category.
    fn apply_stacked(data: &mut Self::Data, stacked: Vec<Vec<f64>>) -> Result<(), DataError> {
        let _ = (data, stacked);
        Err(DataError::Unsupported {
            kind: Self::NAME,
            payload: "stacked data",
        })
    }
}

// =============================================================================
// Chart
// =============================================================================

/// Click/hover callback: the matched item and its index, or `None` twice.
pub type ItemCallback<T> = Box<dyn FnMut(Option<T>, Option<usize>)>;

/// A live chart instance.
///
/// Calling anything but [`Chart::dispose`] after disposal is a caller error;
/// such calls do nothing.
pub struct Chart<K: ChartKind, H: Host> {
    host: H,
    data: K::Data,
    options: ChartOptions,
    theme: ThemeDecision,
    palette: Palette,
    animator: Animator,
    geometry: Vec<GeometryRecord>,
    hovered: Option<usize>,
    active: Option<usize>,
    pointer: Option<Point>,
    on_click: Option<ItemCallback<K::Item>>,
    on_hover: Option<ItemCallback<K::Item>>,
    disposed: bool,
}

impl<K: ChartKind, H: Host> fmt::Debug for Chart<K, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chart")
            .field("kind", &K::NAME)
            .field("theme", &self.theme)
            .field("animation", &self.animator.state())
            .field("records", &self.geometry.len())
            .field("hovered", &self.hovered)
            .field("active", &self.active)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl<K: ChartKind, H: Host> Chart<K, H> {
    /// Create a chart with empty data and draw it once.
    pub fn create(host: H, options: ChartOptions) -> Self {
        let animator = Animator::new(options.animation(K::DEFAULT_STYLE).resolve());
        let mut chart = Self {
            host,
            data: K::Data::default(),
            options,
            theme: ThemeDecision::default(),
            palette: Palette::default(),
            animator,
            geometry: Vec::new(),
            hovered: None,
            active: None,
            pointer: None,
            on_click: None,
            on_hover: None,
            disposed: false,
        };
        chart.refresh_theme();
        tracing::debug!(kind = K::NAME, is_light = chart.theme.is_light, "chart created");
        chart.redraw();
        chart
    }

    /// Replace the data and restart the animation.
    pub fn set_data(&mut self, data: K::Data) {
        if self.disposed {
            return;
        }
        self.data = data;
        self.clear_interaction();
        self.restart();
    }

    /// Replace the data from JSON and restart the animation.
    ///
    /// # Errors
    ///
    /// Returns an error, keeping the current data, if the JSON does not match
    /// the kind's data shape.
    pub fn set_data_json(&mut self, json: &str) -> Result<(), DataError> {
        let data = serde_json::from_str(json)?;
        self.set_data(data);
        Ok(())
    }

    /// Replace the data with numeric series and restart the animation.
    ///
    /// # Errors
    ///
    /// Returns an error if the kind does not take series.
    pub fn set_series(&mut self, series: Vec<Vec<f64>>) -> Result<(), DataError> {
        if self.disposed {
            return Ok(());
        }
        K::apply_series(&mut self.data, series)?;
        self.clear_interaction();
        self.restart();
        Ok(())
    }

    /// Replace the data with stacked segments and restart the animation.
    ///
    /// # Errors
    ///
    /// Returns an error if the kind does not stack.
    pub fn set_stacked_data(&mut self, stacked: Vec<Vec<f64>>) -> Result<(), DataError> {
        if self.disposed {
            return Ok(());
        }
        K::apply_stacked(&mut self.data, stacked)?;
        self.clear_interaction();
        self.restart();
        Ok(())
    }

    /// Shallow-merge an options patch.
    ///
    /// The theme is re-resolved. The animation restarts when the patch
    /// changes the animation settings; otherwise the chart just redraws.
    ///
    /// # Errors
    ///
    /// Returns an error, keeping the previous snapshot, if the patch is
    /// rejected.
    pub fn set_options(&mut self, patch: &serde_json::Value) -> Result<(), OptionsError> {
        if self.disposed {
            return Ok(());
        }
        let merged = match self.options.merge(patch) {
            Ok(merged) => merged,
            Err(err) => {
                tracing::warn!(kind = K::NAME, %err, "options patch rejected");
                return Err(err);
            }
        };
        let animation = merged.animation(K::DEFAULT_STYLE).resolve();
        let restart = animation != *self.animator.config();

        self.options = merged;
        self.animator.reconfigure(animation);
        self.refresh_theme();
        if !self.options.show_tooltip {
            self.host.show_tooltip(None);
        }

        if restart {
            self.restart();
        } else {
            self.redraw();
        }
        Ok(())
    }

    /// Draw the current state without touching the animation.
    pub fn redraw(&mut self) {
        if self.disposed {
            return;
        }
        let progress = self.animator.progress_at(self.host.now());
        self.draw(progress);
    }

    /// React to a container size change.
    pub fn resize(&mut self) {
        if self.disposed {
            return;
        }
        self.refresh_theme();
        self.redraw();
    }

    /// Frame callback from the host.
    pub fn on_frame(&mut self) {
        if self.disposed {
            return;
        }
        let now = self.host.now();
        let progress = self.animator.tick(&mut self.host, now);
        self.draw(progress);
    }

    /// Highlight an item programmatically, or clear with `None`.
    pub fn set_active_index(&mut self, index: Option<usize>) {
        if self.disposed || self.active == index {
            return;
        }
        self.active = index;
        self.redraw();
    }

    /// Pointer moved to `(x, y)` in CSS pixels relative to the chart.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if self.disposed {
            return;
        }
        let pointer = Point::new(x, y);
        self.pointer = Some(pointer);
        let record = self.hit(pointer);
        let index = record.map(|r| r.index);
        tracing::trace!(kind = K::NAME, x, y, ?index, "pointer hit");

        if self.options.show_tooltip {
            let tooltip = record
                .and_then(|r| K::tooltip(&self.data, &r, &self.options))
                .map(|t| t.at(x, y));
            self.host.show_tooltip(tooltip.as_ref());
        }

        if index != self.hovered {
            self.hovered = index;
            self.redraw();
            self.notify_hover();
        }
    }

    /// Pointer left the chart.
    pub fn pointer_leave(&mut self) {
        if self.disposed {
            return;
        }
        self.pointer = None;
        self.host.show_tooltip(None);
        if self.hovered.take().is_some() {
            self.redraw();
            self.notify_hover();
        }
    }

    /// Click at `(x, y)` in CSS pixels. The callback fires with `None` when
    /// nothing was hit.
    pub fn click(&mut self, x: f64, y: f64) {
        if self.disposed {
            return;
        }
        let index = self.hit(Point::new(x, y)).map(|r| r.index);
        let item = index.and_then(|i| K::item(&self.data, i));
        if let Some(callback) = self.on_click.as_mut() {
            callback(item, index);
        }
    }

    /// Register the click callback.
    pub fn on_click(&mut self, callback: impl FnMut(Option<K::Item>, Option<usize>) + 'static) {
        self.on_click = Some(Box::new(callback));
    }

    /// Register the hover callback. It fires when the hovered item changes.
    pub fn on_hover(&mut self, callback: impl FnMut(Option<K::Item>, Option<usize>) + 'static) {
        self.on_hover = Some(Box::new(callback));
    }

    /// Stop the animation and release host resources. Safe to call twice.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.animator.cancel(&mut self.host);
        self.host.show_tooltip(None);
        self.host.release();
        self.on_click = None;
        self.on_hover = None;
        self.geometry.clear();
        tracing::debug!(kind = K::NAME, "chart disposed");
    }

    /// Current data.
    pub const fn data(&self) -> &K::Data {
        &self.data
    }

    /// Current options snapshot.
    pub const fn options(&self) -> &ChartOptions {
        &self.options
    }

    /// Last theme decision.
    pub const fn theme(&self) -> ThemeDecision {
        self.theme
    }

    /// Colors in use.
    pub const fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Geometry of the last draw.
    pub fn geometry(&self) -> &[GeometryRecord] {
        &self.geometry
    }

    /// Hovered item index.
    pub const fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Programmatically highlighted index.
    pub const fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// Scheduler state.
    pub const fn animation_state(&self) -> AnimationState {
        self.animator.state()
    }

    /// Whether [`Chart::dispose`] ran.
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// The host.
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// The host, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Data index at `(x, y)` in CSS pixels against the last draw.
    pub fn hit_test(&mut self, x: f64, y: f64) -> Option<usize> {
        self.hit(Point::new(x, y)).map(|r| r.index)
    }

    fn hit(&mut self, css: Point) -> Option<GeometryRecord> {
        let dpr = self.host.viewport().dpr();
        self.options
            .hit_tester(dpr)
            .hit_record(css.scale(dpr), &self.geometry)
            .copied()
    }

    fn restart(&mut self) {
        let now = self.host.now();
        let count = K::item_count(&self.data);
        let progress = self.animator.start(&mut self.host, now, count);
        self.draw(progress);
    }

    fn clear_interaction(&mut self) {
        if self.hovered.take().is_some() {
            self.host.show_tooltip(None);
        }
    }

    fn refresh_theme(&mut self) {
        self.theme = ThemeDecision::resolve(&self.options.background, self.host.ambient());
        let mut palette = Palette::for_decision(self.theme);
        if let Some(text) = self.options.text_color_override() {
            palette.text = text;
            palette.tooltip_text = text;
        }
        if let Some(grid) = self.options.grid_color_override() {
            palette.grid = grid;
        }
        self.palette = palette;
    }

    fn notify_hover(&mut self) {
        let index = self.hovered;
        let item = index.and_then(|i| K::item(&self.data, i));
        if let Some(callback) = self.on_hover.as_mut() {
            callback(item, index);
        }
    }

    fn draw(&mut self, progress: FrameProgress) {
        let viewport = self.host.viewport();
        let dpr = viewport.dpr();
        let ctx = PaintContext {
            options: &self.options,
            palette: &self.palette,
            progress,
            bounds: viewport.device_rect().inset(self.options.padding.max(0.0) * dpr),
            dpr,
            highlight: self.hovered.or(self.active),
        };

        let geometry = K::build_geometry(&self.data, &ctx);
        tracing::debug!(
            kind = K::NAME,
            records = geometry.len(),
            settled = progress.is_settled(),
            "geometry rebuilt"
        );

        let canvas = self.host.surface();
        canvas.clear(Background::parse(&self.options.background).fill());
        K::paint(canvas, &self.data, &geometry, &ctx);
        self.geometry = geometry;
    }
}

impl<K: ChartKind> Chart<K, HeadlessHost> {
    /// Fire pending frames, advancing the headless clock by `step_ms` before
    /// each, until the animation stops requesting them. Returns the number of
    /// frames drawn.
    pub fn run_frames(&mut self, step_ms: f64) -> usize {
        let mut frames = 0;
        while self.host.fire_frame() {
            self.host.advance(step_ms);
            self.on_frame();
            frames += 1;
        }
        frames
    }
}

// =============================================================================
// HeadlessHost
// =============================================================================

/// Host without a display: a manual frame queue, a recording canvas, a fixed
/// viewport and an optional ambient chain. Used for server-side rendering and
/// tests.
pub struct HeadlessHost {
    frames: ManualFrameHost,
    canvas: RecordingCanvas,
    viewport: Viewport,
    clock_ms: f64,
    ambient: Option<Box<dyn Container>>,
    tooltip: Option<Tooltip>,
    released: bool,
}

impl fmt::Debug for HeadlessHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessHost")
            .field("viewport", &self.viewport)
            .field("clock_ms", &self.clock_ms)
            .field("outstanding_frames", &self.frames.outstanding())
            .field("commands", &self.canvas.command_count())
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

impl HeadlessHost {
    /// Create a host with a `width`×`height` CSS-pixel viewport.
    #[must_use]
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        Self {
            frames: ManualFrameHost::new(),
            canvas: RecordingCanvas::new(),
            viewport: Viewport::new(width, height, device_pixel_ratio),
            clock_ms: 0.0,
            ambient: None,
            tooltip: None,
            released: false,
        }
    }

    /// Attach an ambient container chain.
    #[must_use]
    pub fn with_ambient(mut self, ambient: impl Container + 'static) -> Self {
        self.ambient = Some(Box::new(ambient));
        self
    }

    /// Replace the ambient container chain.
    pub fn set_ambient(&mut self, ambient: Option<Box<dyn Container>>) {
        self.ambient = ambient;
    }

    /// Change the viewport; call [`Chart::resize`] afterwards.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Advance the clock.
    pub fn advance(&mut self, ms: f64) {
        self.clock_ms += ms;
    }

    /// Consume the oldest pending frame request. Returns whether one existed.
    pub fn fire_frame(&mut self) -> bool {
        self.frames.fire().is_some()
    }

    /// Frame bookkeeping.
    #[must_use]
    pub const fn frames(&self) -> &ManualFrameHost {
        &self.frames
    }

    /// Everything drawn so far.
    #[must_use]
    pub const fn canvas(&self) -> &RecordingCanvas {
        &self.canvas
    }

    /// Drain the recorded commands.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        self.canvas.take_commands()
    }

    /// Currently shown tooltip.
    #[must_use]
    pub const fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    /// Whether the chart released the host.
    #[must_use]
    pub const fn is_released(&self) -> bool {
        self.released
    }
}

impl FrameHost for HeadlessHost {
    fn request_frame(&mut self) -> FrameToken {
        self.frames.request_frame()
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        self.frames.cancel_frame(token);
    }
}

impl Host for HeadlessHost {
    fn now(&self) -> f64 {
        self.clock_ms
    }

    fn viewport(&mut self) -> Viewport {
        self.viewport
    }

    fn surface(&mut self) -> &mut dyn Canvas {
        &mut self.canvas
    }

    fn ambient(&mut self) -> Option<&dyn Container> {
        self.ambient.as_deref()
    }

    fn show_tooltip(&mut self, tooltip: Option<&Tooltip>) {
        self.tooltip = tooltip.cloned();
    }

    fn release(&mut self) {
        self.released = true;
    }
}

/// Tooltip payload as JSON, for hosts that render it themselves.
#[must_use]
pub fn tooltip_json(tooltip: &Tooltip) -> String {
    serde_json::to_string(tooltip).unwrap_or_default()
}
