//! Shader Parameter Derivation
//!
//! Maps the resolved [`EffectParameters`] onto the values the glitch shader
//! actually consumes. Everything here is a pure function of its inputs; the
//! only cross-frame state (the vertical jump accumulator) is owned by the
//! pass and passed in explicitly.
//!
//! Intensities are saturated to `[0, 1]` first.
//!
//! | Uniform            | Value                                              |
//! |--------------------|----------------------------------------------------|
//! | `_ScanLineJitter`  | `(0.002 + j³·0.05, saturate(1 − j·1.2))`          |
//! | `_VerticalJump`    | `(vertical_jump, vertical_jump_time)`              |
//! | `_HorizontalShake` | `horizontal_shake · 0.2`                           |
//! | `_ColorDrift`      | `(color_drift · 0.04, time · 606.11)`              |

use glam::Vec2;

use crate::settings::EffectParameters;

/// Rate at which the vertical jump phase advances per second at full intensity.
pub const VERTICAL_JUMP_RATE: f32 = 11.3;

/// Dispersion applied to scanlines even at zero jitter.
pub const SCAN_LINE_BASE_DISPERSION: f32 = 0.002;
pub const SCAN_LINE_DISPERSION_SCALE: f32 = 0.05;
pub const SCAN_LINE_THRESHOLD_SCALE: f32 = 1.2;

pub const HORIZONTAL_SHAKE_SCALE: f32 = 0.2;

pub const COLOR_DRIFT_SCALE: f32 = 0.04;
pub const COLOR_DRIFT_TIME_SCALE: f32 = 606.11;

/// Clamps to `[0, 1]`, mapping NaN to 0.
#[inline]
#[must_use]
pub fn saturate(x: f32) -> f32 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

/// Advances the vertical jump accumulator by one frame.
///
/// The accumulator, not raw elapsed time, drives the jump waveform so that
/// jump speed follows the `vertical_jump` intensity.
#[inline]
#[must_use]
pub fn advance_vertical_jump_time(current: f32, delta_seconds: f32, vertical_jump: f32) -> f32 {
    current + delta_seconds * vertical_jump * VERTICAL_JUMP_RATE
}

/// Shader-ready values for one frame.
///
/// Captured by value into the render callback; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DerivedShaderParameters {
    /// `(dispersion, threshold)`
    pub scan_line_jitter: Vec2,
    /// `(intensity, accumulated jump time)`
    pub vertical_jump: Vec2,
    pub horizontal_shake: f32,
    /// `(drift amount, drift phase)`
    pub color_drift: Vec2,
}

impl DerivedShaderParameters {
    /// Derives shader values from the frame's parameters.
    ///
    /// `vertical_jump_time` must already include this frame's advance.
    #[must_use]
    pub fn derive(params: &EffectParameters, vertical_jump_time: f32, time_seconds: f32) -> Self {
        let params = params.saturated();
        let jitter = params.scan_line_jitter;
        let threshold = saturate(1.0 - jitter * SCAN_LINE_THRESHOLD_SCALE);
        let dispersion = SCAN_LINE_BASE_DISPERSION + jitter.powi(3) * SCAN_LINE_DISPERSION_SCALE;

        Self {
            scan_line_jitter: Vec2::new(dispersion, threshold),
            vertical_jump: Vec2::new(params.vertical_jump, vertical_jump_time),
            horizontal_shake: params.horizontal_shake * HORIZONTAL_SHAKE_SCALE,
            color_drift: Vec2::new(
                params.color_drift * COLOR_DRIFT_SCALE,
                time_seconds * COLOR_DRIFT_TIME_SCALE,
            ),
        }
    }

    /// Packs the values into the GPU uniform layout.
    ///
    /// `time_seconds` feeds the shader's noise seed.
    #[must_use]
    pub fn to_uniforms(&self, time_seconds: f32) -> GlitchUniforms {
        GlitchUniforms {
            scan_line_jitter: self.scan_line_jitter,
            vertical_jump: self.vertical_jump,
            color_drift: self.color_drift,
            horizontal_shake: self.horizontal_shake,
            time: time_seconds,
        }
    }
}

/// GPU uniform block for `analog_glitch.wgsl`.
///
/// 32 bytes; every `vec2` sits on an 8-byte boundary so the layout matches
/// WGSL uniform address space rules without explicit padding.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlitchUniforms {
    pub scan_line_jitter: Vec2,
    pub vertical_jump: Vec2,
    pub color_drift: Vec2,
    pub horizontal_shake: f32,
    pub time: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn params(jitter: f32) -> EffectParameters {
        EffectParameters {
            scan_line_jitter: jitter,
            is_active: true,
            ..Default::default()
        }
    }

    #[test]
    fn zero_jitter_has_base_dispersion_and_full_threshold() {
        let d = DerivedShaderParameters::derive(&params(0.0), 0.0, 0.0);
        assert!(approx(d.scan_line_jitter.x, 0.002));
        assert!(approx(d.scan_line_jitter.y, 1.0));
    }

    #[test]
    fn jitter_curves_are_monotonic() {
        let mut prev = DerivedShaderParameters::derive(&params(0.0), 0.0, 0.0);
        for step in 1..=100 {
            let j = step as f32 / 100.0;
            let d = DerivedShaderParameters::derive(&params(j), 0.0, 0.0);
            assert!(d.scan_line_jitter.x >= prev.scan_line_jitter.x, "dispersion at {j}");
            assert!(d.scan_line_jitter.y <= prev.scan_line_jitter.y, "threshold at {j}");
            prev = d;
        }
    }

    #[test]
    fn threshold_saturates_at_zero() {
        let d = DerivedShaderParameters::derive(&params(1.0), 0.0, 0.0);
        assert_eq!(d.scan_line_jitter.y, 0.0);
        assert!(approx(d.scan_line_jitter.x, 0.052));
    }

    #[test]
    fn derivation_is_deterministic() {
        let p = EffectParameters {
            scan_line_jitter: 0.37,
            vertical_jump: 0.61,
            horizontal_shake: 0.12,
            color_drift: 0.9,
            is_active: true,
        };
        let a = DerivedShaderParameters::derive(&p, 3.25, 17.5);
        let b = DerivedShaderParameters::derive(&p, 3.25, 17.5);
        assert_eq!(a.scan_line_jitter.x.to_bits(), b.scan_line_jitter.x.to_bits());
        assert_eq!(a.scan_line_jitter.y.to_bits(), b.scan_line_jitter.y.to_bits());
        assert_eq!(a.color_drift.y.to_bits(), b.color_drift.y.to_bits());
        assert_eq!(a, b);
    }

    #[test]
    fn vertical_jump_time_advances_by_rate() {
        let t = advance_vertical_jump_time(1.0, 0.016, 0.3);
        assert!(approx(t, 1.05424));
        assert_eq!(advance_vertical_jump_time(2.0, 0.016, 0.0), 2.0);
    }

    #[test]
    fn uniforms_are_32_bytes() {
        assert_eq!(std::mem::size_of::<GlitchUniforms>(), 32);
        let d = DerivedShaderParameters::derive(&params(0.5), 1.0, 2.0);
        let u = d.to_uniforms(2.0);
        let bytes = bytemuck::bytes_of(&u);
        assert_eq!(bytes.len(), 32);
        assert_eq!(u.time, 2.0);
        assert_eq!(u.scan_line_jitter, d.scan_line_jitter);
    }

    #[test]
    fn out_of_range_inputs_match_clamped_inputs() {
        let wild = EffectParameters {
            scan_line_jitter: 2.0,
            vertical_jump: -1.0,
            horizontal_shake: f32::NAN,
            color_drift: f32::INFINITY,
            is_active: true,
        };
        let clamped = EffectParameters {
            scan_line_jitter: 1.0,
            vertical_jump: 0.0,
            horizontal_shake: 0.0,
            color_drift: 1.0,
            is_active: true,
        };
        let a = DerivedShaderParameters::derive(&wild, 0.5, 1.0);
        let b = DerivedShaderParameters::derive(&clamped, 0.5, 1.0);
        assert_eq!(a, b);
        assert!(approx(a.scan_line_jitter.x, 0.052));
        assert_eq!(a.scan_line_jitter.y, 0.0);
        assert!(approx(a.color_drift.x, 0.04));
    }

    #[test]
    fn saturate_handles_nan_and_bounds() {
        assert_eq!(saturate(f32::NAN), 0.0);
        assert_eq!(saturate(-1.0), 0.0);
        assert_eq!(saturate(2.0), 1.0);
        assert_eq!(saturate(0.25), 0.25);
    }
}
