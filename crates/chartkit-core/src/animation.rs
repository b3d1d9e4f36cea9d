//! Progressive reveal animation: easing, per-item stagger and a frame-driven
//! scheduler.
//!
//! The scheduler never owns a timer. The host hands it a [`FrameHost`] to
//! request and cancel frames and feeds it timestamps from its frame callback,
//! which keeps every run reproducible from a list of synthetic timestamps.

use serde::{Deserialize, Serialize};

/// Default run duration when the configured one is unusable.
pub const DEFAULT_DURATION_MS: f64 = 800.0;

// =============================================================================
// Easing
// =============================================================================

/// Easing curves for item progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Easing {
    /// `t`
    Linear,
    /// Cubic ease out, `1 - (1 - t)^3`
    #[default]
    EaseOut,
    /// Cubic ease in for the first half, ease out for the second
    EaseInOut,
    /// Damped oscillation, `1 - e^(-6t)·cos(6.5t)`; overshoots transiently
    Spring,
}

impl Easing {
    /// Apply the curve to a normalized time value.
    ///
    /// Input is clamped to `[0, 1]` and both end points are exact, so a
    /// finished item always reports exactly `1.0`. Between the end points
    /// `Spring` may leave `[0, 1]`.
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        if t.is_nan() || t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match self {
            Self::Linear => t,
            Self::EaseOut => 1.0 - (1.0 - t).powi(3),
            Self::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0f64).mul_add(t, 2.0).powi(3) / 2.0
                }
            }
            Self::Spring => (-6.0 * t).exp().mul_add(-(6.5 * t).cos(), 1.0),
        }
    }

    /// Parse an easing id, falling back to the default for unknown ids.
    ///
    /// Matching ignores case, `-` and `_`, so `ease-out`, `easeOut` and
    /// `EASE_OUT` are the same curve.
    #[must_use]
    pub fn from_id(id: &str) -> Self {
        match normalize_id(id).as_str() {
            "linear" => Self::Linear,
            "easeout" => Self::EaseOut,
            "easeinout" => Self::EaseInOut,
            "spring" => Self::Spring,
            _ => {
                tracing::debug!(id, "unknown easing, using default");
                Self::default()
            }
        }
    }

    /// Canonical id.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::EaseOut => "easeOut",
            Self::EaseInOut => "easeInOut",
            Self::Spring => "spring",
        }
    }
}

impl From<String> for Easing {
    fn from(id: String) -> Self {
        Self::from_id(&id)
    }
}

impl From<Easing> for String {
    fn from(easing: Easing) -> Self {
        easing.id().to_string()
    }
}

/// How a renderer turns item progress into visuals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationStyle {
    /// Interpolate angular or positional extent.
    Sweep,
    /// Interpolate a size or radius from zero or a baseline.
    Grow,
    /// Interpolate opacity; geometry stays at its final position.
    Fade,
    /// No animation; draw the final state immediately.
    Disabled,
}

impl AnimationStyle {
    /// Parse a style id. Unknown ids yield `None` so the caller can fall back
    /// to its own default.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        match normalize_id(id).as_str() {
            "sweep" => Some(Self::Sweep),
            "grow" => Some(Self::Grow),
            "fade" => Some(Self::Fade),
            "none" | "off" | "disabled" => Some(Self::Disabled),
            _ => None,
        }
    }

    /// Canonical id.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Sweep => "sweep",
            Self::Grow => "grow",
            Self::Fade => "fade",
            Self::Disabled => "none",
        }
    }
}

fn normalize_id(id: &str) -> String {
    id.chars()
        .filter(|c| *c != '-' && *c != '_' && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

// =============================================================================
// AnimationSpec / ResolvedAnimation
// =============================================================================

/// Animation settings as configured; may hold unusable values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationSpec {
    /// Master switch
    pub enabled: bool,
    /// Per-item duration
    pub duration_ms: f64,
    /// Easing curve
    pub easing: Easing,
    /// Stagger between consecutive items
    pub delay_ms: f64,
    /// Visual style
    pub style: AnimationStyle,
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_ms: DEFAULT_DURATION_MS,
            easing: Easing::default(),
            delay_ms: 0.0,
            style: AnimationStyle::Grow,
        }
    }
}

impl AnimationSpec {
    /// Sanitize into the settings the scheduler runs with.
    #[must_use]
    pub fn resolve(&self) -> ResolvedAnimation {
        let duration_ms = if self.duration_ms.is_finite() && self.duration_ms > 0.0 {
            self.duration_ms
        } else {
            DEFAULT_DURATION_MS
        };
        let delay_ms = if self.delay_ms.is_finite() {
            self.delay_ms.max(0.0)
        } else {
            0.0
        };
        ResolvedAnimation {
            enabled: self.enabled && self.style != AnimationStyle::Disabled,
            duration_ms,
            easing: self.easing,
            delay_ms,
            style: self.style,
        }
    }
}

/// Sanitized animation settings. Total over all inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAnimation {
    /// Whether frames are scheduled at all
    pub enabled: bool,
    /// Per-item duration, always positive
    pub duration_ms: f64,
    /// Easing curve
    pub easing: Easing,
    /// Stagger, never negative
    pub delay_ms: f64,
    /// Visual style
    pub style: AnimationStyle,
}

impl ResolvedAnimation {
    /// Settings that render the final state immediately.
    #[must_use]
    pub fn disabled() -> Self {
        AnimationSpec {
            enabled: false,
            style: AnimationStyle::Disabled,
            ..AnimationSpec::default()
        }
        .resolve()
    }

    /// Unclamped progress argument for an item.
    #[must_use]
    pub fn raw_progress(&self, item: usize, elapsed_ms: f64) -> f64 {
        self.delay_ms.mul_add(-(item as f64), elapsed_ms) / self.duration_ms
    }

    /// Eased progress for an item. Items still inside their stagger offset
    /// report `0.0`; disabled animations always report `1.0`.
    #[must_use]
    pub fn progress(&self, item: usize, elapsed_ms: f64) -> f64 {
        if !self.enabled {
            return 1.0;
        }
        self.easing.apply(self.raw_progress(item, elapsed_ms))
    }

    /// Time until the last of `item_count` items finishes.
    #[must_use]
    pub fn total_duration_ms(&self, item_count: usize) -> f64 {
        self.delay_ms
            .mul_add(item_count.saturating_sub(1) as f64, self.duration_ms)
    }

    /// Whether a run over `item_count` items is over at `elapsed_ms`.
    #[must_use]
    pub fn is_complete(&self, elapsed_ms: f64, item_count: usize) -> bool {
        elapsed_ms >= self.total_duration_ms(item_count)
    }
}

impl Default for ResolvedAnimation {
    fn default() -> Self {
        AnimationSpec::default().resolve()
    }
}

// =============================================================================
// Frame scheduling
// =============================================================================

/// Handle for a requested frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(pub u64);

/// The host's per-frame scheduling primitive.
pub trait FrameHost {
    /// Ask for one callback on the next paintable frame.
    fn request_frame(&mut self) -> FrameToken;

    /// Withdraw a request. Cancelling an already-fired token is harmless.
    fn cancel_frame(&mut self, token: FrameToken);
}

/// In-memory frame host. Frames fire only when the owner calls
/// [`ManualFrameHost::fire`].
#[derive(Debug, Default)]
pub struct ManualFrameHost {
    next: u64,
    outstanding: Vec<FrameToken>,
    requested: usize,
    cancelled: usize,
}

impl ManualFrameHost {
    /// Create an empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the oldest outstanding request, as if its frame arrived.
    pub fn fire(&mut self) -> Option<FrameToken> {
        if self.outstanding.is_empty() {
            None
        } else {
            Some(self.outstanding.remove(0))
        }
    }

    /// Requests not yet fired or cancelled.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    /// Total requests made.
    #[must_use]
    pub const fn requested(&self) -> usize {
        self.requested
    }

    /// Total cancellations of outstanding requests.
    #[must_use]
    pub const fn cancelled(&self) -> usize {
        self.cancelled
    }
}

impl FrameHost for ManualFrameHost {
    fn request_frame(&mut self) -> FrameToken {
        self.next += 1;
        self.requested += 1;
        let token = FrameToken(self.next);
        self.outstanding.push(token);
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        if let Some(pos) = self.outstanding.iter().position(|t| *t == token) {
            self.outstanding.remove(pos);
            self.cancelled += 1;
        }
    }
}

// =============================================================================
// Animator
// =============================================================================

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationState {
    /// Nothing has been started.
    Idle,
    /// A run is in flight.
    Running {
        /// Host timestamp at `start`
        start_ms: f64,
        /// Items being revealed
        item_count: usize,
    },
    /// The last run finished or rendered immediately.
    Completed,
}

/// Progress snapshot for one draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameProgress {
    config: ResolvedAnimation,
    elapsed_ms: f64,
    settled: bool,
}

impl FrameProgress {
    /// Final state: every item at exactly `1.0`.
    #[must_use]
    pub const fn settled(config: ResolvedAnimation) -> Self {
        Self {
            config,
            elapsed_ms: 0.0,
            settled: true,
        }
    }

    /// Mid-run snapshot.
    #[must_use]
    pub const fn at(config: ResolvedAnimation, elapsed_ms: f64) -> Self {
        Self {
            config,
            elapsed_ms,
            settled: false,
        }
    }

    /// Progress of one item.
    #[must_use]
    pub fn item(&self, index: usize) -> f64 {
        if self.settled {
            1.0
        } else {
            self.config.progress(index, self.elapsed_ms)
        }
    }

    /// Whether this is the final, pinned state.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        self.settled
    }

    /// Style renderers should apply.
    #[must_use]
    pub const fn style(&self) -> AnimationStyle {
        self.config.style
    }

    /// Elapsed time of the run.
    #[must_use]
    pub const fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }
}

/// Frame-driven run scheduler for one widget instance.
#[derive(Debug)]
pub struct Animator {
    config: ResolvedAnimation,
    state: AnimationState,
    pending: Option<FrameToken>,
}

impl Animator {
    /// Create an idle animator.
    #[must_use]
    pub const fn new(config: ResolvedAnimation) -> Self {
        Self {
            config,
            state: AnimationState::Idle,
            pending: None,
        }
    }

    /// Current settings.
    #[must_use]
    pub const fn config(&self) -> &ResolvedAnimation {
        &self.config
    }

    /// Replace the settings. A run in flight keeps going with the new curve;
    /// callers restart explicitly when they want a fresh run.
    pub fn reconfigure(&mut self, config: ResolvedAnimation) {
        self.config = config;
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> AnimationState {
        self.state
    }

    /// Whether a run is in flight.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self.state, AnimationState::Running { .. })
    }

    /// Start a run, superseding any run in flight.
    ///
    /// The pending frame request is cancelled before anything else. Disabled
    /// animations (or nothing to animate) complete immediately without
    /// requesting a frame.
    pub fn start<H: FrameHost + ?Sized>(
        &mut self,
        host: &mut H,
        now_ms: f64,
        item_count: usize,
    ) -> FrameProgress {
        if self.cancel_pending(host) {
            tracing::debug!("animation run superseded");
        }

        if !self.config.enabled || item_count == 0 {
            self.state = AnimationState::Completed;
            return FrameProgress::settled(self.config);
        }

        self.state = AnimationState::Running {
            start_ms: now_ms,
            item_count,
        };
        self.pending = Some(host.request_frame());
        tracing::debug!(
            item_count,
            duration_ms = self.config.duration_ms,
            delay_ms = self.config.delay_ms,
            "animation run started"
        );
        FrameProgress::at(self.config, 0.0)
    }

    /// Advance on a frame callback.
    ///
    /// Requests the next frame unless the run is complete, in which case the
    /// returned progress is settled. A frame arriving with no request pending
    /// (a stray callback) changes nothing.
    pub fn tick<H: FrameHost + ?Sized>(&mut self, host: &mut H, now_ms: f64) -> FrameProgress {
        if self.pending.take().is_none() {
            return self.progress_at(now_ms);
        }

        match self.state {
            AnimationState::Running {
                start_ms,
                item_count,
            } => {
                let elapsed = (now_ms - start_ms).max(0.0);
                if self.config.is_complete(elapsed, item_count) {
                    self.state = AnimationState::Completed;
                    tracing::debug!(elapsed_ms = elapsed, "animation run completed");
                    FrameProgress::settled(self.config)
                } else {
                    self.pending = Some(host.request_frame());
                    FrameProgress::at(self.config, elapsed)
                }
            }
            AnimationState::Idle | AnimationState::Completed => FrameProgress::settled(self.config),
        }
    }

    /// Progress for an out-of-band redraw (hover, resize) without advancing.
    #[must_use]
    pub fn progress_at(&self, now_ms: f64) -> FrameProgress {
        match self.state {
            AnimationState::Running { start_ms, .. } => {
                FrameProgress::at(self.config, (now_ms - start_ms).max(0.0))
            }
            AnimationState::Idle | AnimationState::Completed => FrameProgress::settled(self.config),
        }
    }

    /// Stop any run and withdraw its frame request.
    pub fn cancel<H: FrameHost + ?Sized>(&mut self, host: &mut H) {
        self.cancel_pending(host);
        if self.is_running() {
            self.state = AnimationState::Completed;
        }
    }

    fn cancel_pending<H: FrameHost + ?Sized>(&mut self, host: &mut H) -> bool {
        match self.pending.take() {
            Some(token) => {
                host.cancel_frame(token);
                true
            }
            None => false,
        }
    }
}
