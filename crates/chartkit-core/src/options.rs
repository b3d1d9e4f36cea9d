//! Chart options: an immutable snapshot replaced by merging JSON patches.

use crate::animation::{AnimationSpec, AnimationStyle, Easing, DEFAULT_DURATION_MS};
use crate::color::Color;
use crate::error::{json_kind, OptionsError};
use crate::hit::HitTester;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Options shared by every chart kind. Keys are camelCase on the wire.
///
/// Kinds ignore the options that don't apply to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartOptions {
    /// Background color, or `transparent` to inherit the container's
    pub background: String,
    /// Inner padding in CSS pixels
    pub padding: f64,
    /// Gap between adjacent cells, bars and slices in CSS pixels
    pub gap: f64,
    /// Master animation switch
    pub animate: bool,
    /// Per-item animation duration in milliseconds
    pub animation_duration: f64,
    /// Easing identifier
    pub animation_easing: Easing,
    /// Stagger between consecutive items in milliseconds
    pub animation_delay: f64,
    /// Style identifier; the chart kind's default when unset or unknown
    pub animation_style: Option<String>,
    /// Extra radius outside sectors that still hovers them, CSS pixels
    pub hover_slack: f64,
    /// Proximity radius for point hits, CSS pixels
    pub point_hit_radius: f64,
    /// Draw in-chart labels
    pub show_labels: bool,
    /// Show the hover tooltip
    pub show_tooltip: bool,
    /// Label font size in CSS pixels
    pub font_size: f64,
    /// Label font family
    pub font_family: String,
    /// Text color override
    pub text_color: Option<String>,
    /// Grid color override
    pub grid_color: Option<String>,
    /// Stroke width in CSS pixels
    pub line_width: f64,
    /// Alpha of area fills
    pub fill_opacity: f64,
    /// Donut hole as a fraction of the outer radius
    pub inner_radius: f64,
    /// Gauge range minimum
    pub min: f64,
    /// Gauge range maximum
    pub max: f64,
    /// Decimal places in labels
    pub decimals: usize,
    /// Alpha multiplier of items that are not hovered or active
    pub dim_opacity: f64,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            background: "transparent".to_string(),
            padding: 8.0,
            gap: 2.0,
            animate: true,
            animation_duration: DEFAULT_DURATION_MS,
            animation_easing: Easing::EaseOut,
            animation_delay: 0.0,
            animation_style: None,
            hover_slack: 6.0,
            point_hit_radius: 12.0,
            show_labels: true,
            show_tooltip: true,
            font_size: 12.0,
            font_family: "system-ui, -apple-system, sans-serif".to_string(),
            text_color: None,
            grid_color: None,
            line_width: 2.0,
            fill_opacity: 0.3,
            inner_radius: 0.6,
            min: 0.0,
            max: 100.0,
            decimals: 1,
            dim_opacity: 0.35,
        }
    }
}

impl ChartOptions {
    /// Parse a full options object; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not an object or a value is ill-typed.
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        let patch: Value = serde_json::from_str(json)?;
        Self::default().merge(&patch)
    }

    /// Shallow-merge a JSON object over this snapshot, producing a new one.
    ///
    /// A `null` value resets the key to its default, and so does an
    /// ill-typed value (logged at warn). Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if `patch` is not a JSON object. `self` is untouched
    /// either way.
    pub fn merge(&self, patch: &Value) -> Result<Self, OptionsError> {
        let Value::Object(patch) = patch else {
            return Err(OptionsError::NotAnObject(json_kind(patch)));
        };

        let mut merged = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            other => return Err(OptionsError::NotAnObject(json_kind(&other))),
        };
        for (key, value) in patch {
            merged.remove(key);
            if value.is_null() {
                continue;
            }
            let mut candidate = merged.clone();
            candidate.insert(key.clone(), value.clone());
            match serde_json::from_value::<Self>(Value::Object(candidate)) {
                Ok(_) => {
                    merged.insert(key.clone(), value.clone());
                }
                Err(err) => {
                    tracing::warn!(
                        %err,
                        key = key.as_str(),
                        "ill-typed option, using the default"
                    );
                }
            }
        }
        Ok(serde_json::from_value(Value::Object(merged))?)
    }

    /// Animation settings, falling back to the kind's `default_style`.
    #[must_use]
    pub fn animation(&self, default_style: AnimationStyle) -> AnimationSpec {
        let style = self
            .animation_style
            .as_deref()
            .and_then(AnimationStyle::from_id)
            .unwrap_or(default_style);
        AnimationSpec {
            enabled: self.animate,
            duration_ms: self.animation_duration,
            easing: self.animation_easing,
            delay_ms: self.animation_delay,
            style,
        }
    }

    /// Hit-testing settings in device pixels.
    #[must_use]
    pub fn hit_tester(&self, device_pixel_ratio: f64) -> HitTester {
        HitTester::new(
            self.hover_slack.max(0.0) * device_pixel_ratio,
            self.point_hit_radius.max(0.0) * device_pixel_ratio,
        )
    }

    /// Parsed text color override.
    #[must_use]
    pub fn text_color_override(&self) -> Option<Color> {
        parse_override(self.text_color.as_deref(), "textColor")
    }

    /// Parsed grid color override.
    #[must_use]
    pub fn grid_color_override(&self) -> Option<Color> {
        parse_override(self.grid_color.as_deref(), "gridColor")
    }

    /// `dim_opacity` clamped to `[0, 1]`.
    #[must_use]
    pub fn dim_alpha(&self) -> f64 {
        if self.dim_opacity.is_finite() {
            self.dim_opacity.clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

fn parse_override(spec: Option<&str>, key: &str) -> Option<Color> {
    let spec = spec?;
    match Color::parse(spec) {
        Ok(color) => Some(color),
        Err(err) => {
            tracing::warn!(%err, key, spec, "ignoring color override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let o = ChartOptions::default();
        assert_eq!(o.background, "transparent");
        assert!(o.animate);
        assert_eq!(o.animation_duration, 800.0);
        assert_eq!(o.animation_easing, Easing::EaseOut);
    }

    #[test]
    fn test_from_json_camel_case() {
        let o = ChartOptions::from_json(
            r#"{"animationDuration": 300, "animationEasing": "spring", "showLabels": false}"#,
        )
        .unwrap();
        assert_eq!(o.animation_duration, 300.0);
        assert_eq!(o.animation_easing, Easing::Spring);
        assert!(!o.show_labels);
        assert_eq!(o.padding, 8.0);
    }

    #[test]
    fn test_merge_is_shallow_and_persistent() {
        let a = ChartOptions::default();
        let b = a.merge(&json!({"gap": 4})).unwrap();
        let c = b.merge(&json!({"padding": 0})).unwrap();
        assert_eq!(a.gap, 2.0);
        assert_eq!(b.gap, 4.0);
        assert_eq!(c.gap, 4.0);
        assert_eq!(c.padding, 0.0);
    }

    #[test]
    fn test_merge_null_resets() {
        let a = ChartOptions::default().merge(&json!({"gap": 9})).unwrap();
        let b = a.merge(&json!({"gap": null})).unwrap();
        assert_eq!(b.gap, 2.0);
    }

    #[test]
    fn test_merge_rejects_non_object() {
        let err = ChartOptions::default().merge(&json!("dark")).unwrap_err();
        assert!(matches!(err, OptionsError::NotAnObject("a string")));
    }

    #[test]
    fn test_ill_typed_value_falls_back_per_key() {
        let previous = ChartOptions::default()
            .merge(&json!({"padding": 20, "animationDuration": 300}))
            .unwrap();
        let o = previous
            .merge(&json!({"animationDuration": "fast", "gap": 5}))
            .unwrap();
        assert_eq!(o.animation_duration, DEFAULT_DURATION_MS);
        assert_eq!(o.gap, 5.0);
        assert_eq!(o.padding, 20.0);
    }

    #[test]
    fn test_from_json_rejects_malformed_text() {
        let err = ChartOptions::from_json("{padding:").unwrap_err();
        assert!(matches!(err, OptionsError::Invalid(_)));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let o = ChartOptions::default()
            .merge(&json!({"legend": true}))
            .unwrap();
        assert_eq!(o, ChartOptions::default());
    }

    #[test]
    fn test_unknown_easing_falls_back() {
        let o = ChartOptions::default()
            .merge(&json!({"animationEasing": "bouncy"}))
            .unwrap();
        assert_eq!(o.animation_easing, Easing::EaseOut);
    }

    #[test]
    fn test_animation_style_default_and_override() {
        let o = ChartOptions::default();
        assert_eq!(o.animation(AnimationStyle::Sweep).style, AnimationStyle::Sweep);

        let o = o.merge(&json!({"animationStyle": "fade"})).unwrap();
        assert_eq!(o.animation(AnimationStyle::Sweep).style, AnimationStyle::Fade);

        let o = o.merge(&json!({"animationStyle": "wobble"})).unwrap();
        assert_eq!(o.animation(AnimationStyle::Grow).style, AnimationStyle::Grow);
    }

    #[test]
    fn test_animation_spec_resolves_bad_duration() {
        let o = ChartOptions::default()
            .merge(&json!({"animationDuration": -5, "animationDelay": -3}))
            .unwrap();
        let resolved = o.animation(AnimationStyle::Grow).resolve();
        assert_eq!(resolved.duration_ms, 800.0);
        assert_eq!(resolved.delay_ms, 0.0);
    }

    #[test]
    fn test_hit_tester_scales_by_dpr() {
        let tester = ChartOptions::default().hit_tester(2.0);
        assert_eq!(tester.hover_slack, 12.0);
        assert_eq!(tester.point_tolerance, 24.0);
    }

    #[test]
    fn test_default_hit_tester_matches_options() {
        let tester = ChartOptions::default().hit_tester(1.0);
        assert_eq!(tester, HitTester::default());
        assert_eq!(tester.point_tolerance, 12.0);
    }

    #[test]
    fn test_color_overrides() {
        let o = ChartOptions::default()
            .merge(&json!({"textColor": "#ff0000", "gridColor": "not-a-color"}))
            .unwrap();
        assert_eq!(o.text_color_override(), Some(Color::rgb(1.0, 0.0, 0.0)));
        assert_eq!(o.grid_color_override(), None);
    }

    #[test]
    fn test_dim_alpha_clamped() {
        let o = ChartOptions::default()
            .merge(&json!({"dimOpacity": 3}))
            .unwrap();
        assert_eq!(o.dim_alpha(), 1.0);
    }
}
