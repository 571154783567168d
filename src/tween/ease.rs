//! Easing curves.
//!
//! Each curve maps normalized time `t` in `[0, 1]` to progress, with
//! `apply(0) == 0` and `apply(1) == 1`. Overshooting curves (`BackOut`,
//! `ElasticOut`) leave that range in between.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Easing function selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ease {
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    QuartIn,
    QuartOut,
    QuartInOut,
    SineIn,
    SineOut,
    /// Default for `Tween::to`.
    #[default]
    SineInOut,
    BackOut,
    ElasticOut,
    BounceOut,
}

impl Ease {
    /// Evaluate the curve at `t` (clamped to `[0, 1]`).
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::QuadIn => t * t,
            Ease::QuadOut => t * (2.0 - t),
            Ease::QuadInOut => in_out(t, |x| x * x),
            Ease::CubicIn => t.powi(3),
            Ease::CubicOut => 1.0 - (1.0 - t).powi(3),
            Ease::CubicInOut => in_out(t, |x| x.powi(3)),
            Ease::QuartIn => t.powi(4),
            Ease::QuartOut => 1.0 - (1.0 - t).powi(4),
            Ease::QuartInOut => in_out(t, |x| x.powi(4)),
            Ease::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Ease::SineOut => (t * PI / 2.0).sin(),
            Ease::SineInOut => -0.5 * ((PI * t).cos() - 1.0),
            Ease::BackOut => {
                let s = 1.7;
                let u = t - 1.0;
                u * u * ((s + 1.0) * u + s) + 1.0
            }
            Ease::ElasticOut => {
                if t == 0.0 || t == 1.0 {
                    return t;
                }
                let period = 0.3;
                let s = period / 4.0;
                2f64.powf(-10.0 * t) * ((t - s) * (2.0 * PI) / period).sin() + 1.0
            }
            Ease::BounceOut => bounce_out(t),
        }
    }
}

/// Build a symmetric in-out curve from an ease-in curve.
fn in_out(t: f64, ease_in: impl Fn(f64) -> f64) -> f64 {
    if t < 0.5 {
        ease_in(t * 2.0) / 2.0
    } else {
        1.0 - ease_in((1.0 - t) * 2.0) / 2.0
    }
}

fn bounce_out(t: f64) -> f64 {
    if t < 1.0 / 2.75 {
        7.5625 * t * t
    } else if t < 2.0 / 2.75 {
        let t = t - 1.5 / 2.75;
        7.5625 * t * t + 0.75
    } else if t < 2.5 / 2.75 {
        let t = t - 2.25 / 2.75;
        7.5625 * t * t + 0.9375
    } else {
        let t = t - 2.625 / 2.75;
        7.5625 * t * t + 0.984375
    }
}
