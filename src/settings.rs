//! Analog Glitch Configuration
//!
//! This module defines the effect settings as pure data, following the same
//! pattern as the other post-processing settings structs: public flags,
//! private intensities behind clamping setters, and no GPU state.
//!
//! Two types live here:
//!
//! - [`AnalogGlitchSettings`]: the authored profile. Serializable, mutable,
//!   clamped to valid ranges.
//! - [`EffectParameters`]: the resolved, read-only snapshot the pass consumes
//!   once per frame.
//!
//! The pass never reads settings directly; it asks a [`ParameterSource`] for
//! the current snapshot every frame. Any external volume/profile system can
//! plug in by implementing that trait.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut glitch = AnalogGlitchSettings::new();
//! glitch.set_enabled(true);
//! glitch.set_scan_line_jitter(0.4);
//! glitch.set_color_drift(0.2);
//!
//! let shared = Arc::new(RwLock::new(glitch));
//! let pass = AnalogGlitchPass::new(&backend, &shader, shared.clone());
//! ```

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::Result;
use crate::params::saturate;

// ============================================================================
// EffectParameters
// ============================================================================

/// The effect parameters resolved for the current frame.
///
/// Intensities are expected in `[0, 1]`. Custom sources may return anything;
/// the pass runs [`saturated`](Self::saturated) on every value before use.
/// Produced fresh every frame by a [`ParameterSource`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EffectParameters {
    /// Intensity of horizontal scanline tearing.
    pub scan_line_jitter: f32,
    /// Speed/intensity of vertical image displacement.
    pub vertical_jump: f32,
    /// Intensity of horizontal jitter.
    pub horizontal_shake: f32,
    /// Intensity of per-channel color separation.
    pub color_drift: f32,
    /// Whether the effect should be applied at all.
    pub is_active: bool,
}

impl EffectParameters {
    /// Copy with every intensity clamped to `[0, 1]`; NaN becomes 0.
    #[must_use]
    pub fn saturated(&self) -> Self {
        Self {
            scan_line_jitter: saturate(self.scan_line_jitter),
            vertical_jump: saturate(self.vertical_jump),
            horizontal_shake: saturate(self.horizontal_shake),
            color_drift: saturate(self.color_drift),
            is_active: self.is_active,
        }
    }
}

// ============================================================================
// ParameterSource
// ============================================================================

/// Resolves the effect parameters for the current frame.
///
/// Returning `None` means "no glitch configuration is available right now"
/// (e.g. the host's volume stack is not initialized yet). The pass treats it
/// as a silent skip and asks again next frame.
pub trait ParameterSource {
    fn resolve(&self) -> Option<EffectParameters>;
}

impl ParameterSource for AnalogGlitchSettings {
    fn resolve(&self) -> Option<EffectParameters> {
        Some(self.parameters())
    }
}

impl ParameterSource for Arc<RwLock<AnalogGlitchSettings>> {
    fn resolve(&self) -> Option<EffectParameters> {
        Some(self.read().parameters())
    }
}

impl<T: ParameterSource> ParameterSource for Option<T> {
    fn resolve(&self) -> Option<EffectParameters> {
        self.as_ref().and_then(ParameterSource::resolve)
    }
}

/// Adapts a closure into a [`ParameterSource`].
///
/// Created with [`source_fn`].
pub struct FnSource<F>(F);

impl<F> ParameterSource for FnSource<F>
where
    F: Fn() -> Option<EffectParameters>,
{
    fn resolve(&self) -> Option<EffectParameters> {
        (self.0)()
    }
}

/// Wraps a closure as a [`ParameterSource`].
///
/// ```rust,ignore
/// let source = source_fn(move || volume_stack.get::<GlitchVolume>().map(GlitchVolume::resolve));
/// ```
pub fn source_fn<F>(f: F) -> FnSource<F>
where
    F: Fn() -> Option<EffectParameters>,
{
    FnSource(f)
}

// ============================================================================
// AnalogGlitchSettings
// ============================================================================

/// Analog glitch configuration.
///
/// `weight` blends the profile against an all-zero profile, the same way a
/// single volume with partial weight would: every intensity handed to the
/// pass is scaled by it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalogGlitchSettings {
    /// Whether the effect is enabled.
    pub enabled: bool,

    #[serde(deserialize_with = "unit_interval")]
    weight: f32,
    #[serde(deserialize_with = "unit_interval")]
    scan_line_jitter: f32,
    #[serde(deserialize_with = "unit_interval")]
    vertical_jump: f32,
    #[serde(deserialize_with = "unit_interval")]
    horizontal_shake: f32,
    #[serde(deserialize_with = "unit_interval")]
    color_drift: f32,
}

impl Default for AnalogGlitchSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            weight: 1.0,
            scan_line_jitter: 0.0,
            vertical_jump: 0.0,
            horizontal_shake: 0.0,
            color_drift: 0.0,
        }
    }
}

impl AnalogGlitchSettings {
    /// Creates new settings with default values (disabled, all intensities zero).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses settings from JSON. Missing fields take their defaults and
    /// out-of-range intensities are clamped to `[0, 1]`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the settings to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[inline]
    #[must_use]
    pub fn weight(&self) -> f32 {
        self.weight
    }

    #[inline]
    #[must_use]
    pub fn scan_line_jitter(&self) -> f32 {
        self.scan_line_jitter
    }

    #[inline]
    #[must_use]
    pub fn vertical_jump(&self) -> f32 {
        self.vertical_jump
    }

    #[inline]
    #[must_use]
    pub fn horizontal_shake(&self) -> f32 {
        self.horizontal_shake
    }

    #[inline]
    #[must_use]
    pub fn color_drift(&self) -> f32 {
        self.color_drift
    }

    /// Sets whether the effect is enabled.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Sets the blend weight. A weight of 0 deactivates the effect.
    pub fn set_weight(&mut self, weight: f32) {
        self.weight = saturate(weight);
    }

    pub fn set_scan_line_jitter(&mut self, value: f32) {
        self.scan_line_jitter = saturate(value);
    }

    pub fn set_vertical_jump(&mut self, value: f32) {
        self.vertical_jump = saturate(value);
    }

    pub fn set_horizontal_shake(&mut self, value: f32) {
        self.horizontal_shake = saturate(value);
    }

    pub fn set_color_drift(&mut self, value: f32) {
        self.color_drift = saturate(value);
    }

    /// Returns `true` when the pass should run: enabled with non-zero weight.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enabled && self.weight > 0.0
    }

    /// Resolves the weighted snapshot handed to the pass.
    #[must_use]
    pub fn parameters(&self) -> EffectParameters {
        let w = self.weight;
        EffectParameters {
            scan_line_jitter: self.scan_line_jitter * w,
            vertical_jump: self.vertical_jump * w,
            horizontal_shake: self.horizontal_shake * w,
            color_drift: self.color_drift * w,
            is_active: self.is_active(),
        }
    }
}

fn unit_interval<'de, D>(deserializer: D) -> std::result::Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    f32::deserialize(deserializer).map(saturate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_inactive() {
        let settings = AnalogGlitchSettings::default();
        assert!(!settings.is_active());
        assert!(!settings.parameters().is_active);
    }

    #[test]
    fn setters_clamp_to_unit_interval() {
        let mut s = AnalogGlitchSettings::new();
        s.set_scan_line_jitter(1.7);
        s.set_vertical_jump(-0.3);
        s.set_horizontal_shake(f32::NAN);
        s.set_weight(4.0);
        assert_eq!(s.scan_line_jitter(), 1.0);
        assert_eq!(s.vertical_jump(), 0.0);
        assert_eq!(s.horizontal_shake(), 0.0);
        assert_eq!(s.weight(), 1.0);
    }

    #[test]
    fn zero_weight_deactivates() {
        let mut s = AnalogGlitchSettings::new();
        s.set_enabled(true);
        s.set_weight(0.0);
        assert!(!s.is_active());
    }

    #[test]
    fn weight_scales_intensities() {
        let mut s = AnalogGlitchSettings::new();
        s.set_enabled(true);
        s.set_weight(0.5);
        s.set_color_drift(0.8);
        s.set_vertical_jump(0.4);
        let p = s.parameters();
        assert!(p.is_active);
        assert!((p.color_drift - 0.4).abs() < 1e-6);
        assert!((p.vertical_jump - 0.2).abs() < 1e-6);
    }

    #[test]
    fn json_fills_defaults_and_clamps() {
        let s = AnalogGlitchSettings::from_json(
            r#"{ "enabled": true, "scan_line_jitter": 2.5, "color_drift": 0.25 }"#,
        )
        .unwrap();
        assert!(s.enabled);
        assert_eq!(s.weight(), 1.0);
        assert_eq!(s.scan_line_jitter(), 1.0);
        assert_eq!(s.color_drift(), 0.25);
        assert_eq!(s.vertical_jump(), 0.0);
    }

    #[test]
    fn json_round_trips_through_to_json() {
        let mut s = AnalogGlitchSettings::new();
        s.set_enabled(true);
        s.set_horizontal_shake(0.75);
        let back = AnalogGlitchSettings::from_json(&s.to_json().unwrap()).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = AnalogGlitchSettings::from_json("{ enabled: yes").unwrap_err();
        assert!(matches!(err, crate::GlitchError::Config(_)));
    }

    #[test]
    fn shared_settings_resolve_live_values() {
        let shared = Arc::new(RwLock::new(AnalogGlitchSettings::new()));
        assert!(!shared.resolve().unwrap().is_active);
        shared.write().set_enabled(true);
        assert!(shared.resolve().unwrap().is_active);
    }

    #[test]
    fn missing_source_resolves_to_none() {
        let source: Option<AnalogGlitchSettings> = None;
        assert!(source.resolve().is_none());
        assert!(source_fn(|| None).resolve().is_none());
    }
}
