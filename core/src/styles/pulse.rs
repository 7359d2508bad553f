//! Time-varying glow evaluation
//!
//! Pulsing is applied when an instance is emitted, not when the style cache
//! is built, since it depends on wall-clock time.

use std::f32::consts::TAU;

use clarity_types::{Appearance, Rgba};

/// Glow size after applying the pulse at `t_secs`.
///
/// With `glow_pulse = (intensity, speed)`, the size oscillates between
/// `(1 - intensity) * glow_size` and `glow_size` at `speed` Hz.
pub fn effective_glow_size(appearance: &Appearance, t_secs: f32) -> f32 {
    let [intensity, speed] = appearance.glow_pulse;
    if intensity > 0.0 {
        let phase = (TAU * t_secs * speed).sin() * 0.5 + 0.5;
        mix(1.0 - intensity, 1.0, phase) * appearance.glow_size
    } else {
        appearance.glow_size
    }
}

/// Glow color, zeroed when there is no glow to draw
pub fn effective_glow_color(appearance: &Appearance) -> Rgba {
    if appearance.glow_size > 0.0 {
        appearance.glow
    } else {
        [0.0; 4]
    }
}

#[inline]
fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
