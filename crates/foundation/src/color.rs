//! Sentiment → color mapping.
//!
//! Scores are mapped onto two linear segments that meet at the neutral
//! anchor: `[-1, 0)` blends negative → neutral, `[0, 1]` blends neutral →
//! positive. Both segments produce the neutral anchor exactly at `0`.

use serde::{Deserialize, Serialize};

/// 8-bit RGB triple.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Linear RGBA in `[0, 1]`, alpha fixed at 1.
    pub fn to_rgba_f32(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            1.0,
        ]
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Anchor for a score of -1.
pub const NEGATIVE_COLOR: Rgb = Rgb::new(239, 68, 68);
/// Anchor for a score of 0.
pub const NEUTRAL_COLOR: Rgb = Rgb::new(234, 179, 8);
/// Anchor for a score of +1.
pub const POSITIVE_COLOR: Rgb = Rgb::new(34, 197, 94);

/// Maps a sentiment score to a color.
///
/// The score is clamped to `[-1, 1]`; NaN is treated as neutral.
pub fn color_for(score: f64) -> Rgb {
    let score = if score.is_nan() {
        0.0
    } else {
        score.clamp(-1.0, 1.0)
    };

    if score < 0.0 {
        lerp_rgb(NEGATIVE_COLOR, NEUTRAL_COLOR, score + 1.0)
    } else {
        lerp_rgb(NEUTRAL_COLOR, POSITIVE_COLOR, score)
    }
}

fn lerp_rgb(from: Rgb, to: Rgb, t: f64) -> Rgb {
    Rgb::new(
        lerp_channel(from.r, to.r, t),
        lerp_channel(from.g, to.g, t),
        lerp_channel(from.b, to.b, t),
    )
}

fn lerp_channel(from: u8, to: u8, t: f64) -> u8 {
    let v = from as f64 + (to as f64 - from as f64) * t;
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::{NEGATIVE_COLOR, NEUTRAL_COLOR, POSITIVE_COLOR, Rgb, color_for};

    #[test]
    fn anchors_are_exact() {
        assert_eq!(color_for(-1.0), NEGATIVE_COLOR);
        assert_eq!(color_for(0.0), NEUTRAL_COLOR);
        assert_eq!(color_for(1.0), POSITIVE_COLOR);
    }

    #[test]
    fn continuous_at_zero_from_both_sides() {
        let left = color_for(-1e-9);
        let right = color_for(1e-9);
        assert_eq!(left, NEUTRAL_COLOR);
        assert_eq!(right, NEUTRAL_COLOR);
        assert_eq!(color_for(-0.0), NEUTRAL_COLOR);
    }

    #[test]
    fn out_of_range_scores_clamp() {
        assert_eq!(color_for(-7.5), NEGATIVE_COLOR);
        assert_eq!(color_for(3.0), POSITIVE_COLOR);
        assert_eq!(color_for(f64::NAN), NEUTRAL_COLOR);
    }

    fn assert_monotonic(samples: &[f64]) {
        let colors: Vec<[u8; 3]> = samples.iter().map(|s| color_for(*s).channels()).collect();
        for ch in 0..3 {
            let first = colors[0][ch] as i32;
            let last = colors[colors.len() - 1][ch] as i32;
            let rising = last >= first;
            for pair in colors.windows(2) {
                let (a, b) = (pair[0][ch] as i32, pair[1][ch] as i32);
                if rising {
                    assert!(b >= a, "channel {ch} not non-decreasing: {a} -> {b}");
                } else {
                    assert!(b <= a, "channel {ch} not non-increasing: {a} -> {b}");
                }
            }
        }
    }

    #[test]
    fn channels_are_monotonic_within_each_branch() {
        let negative: Vec<f64> = (0..=100).map(|i| -1.0 + i as f64 / 100.0).collect();
        let positive: Vec<f64> = (0..=100).map(|i| i as f64 / 100.0).collect();
        assert_monotonic(&negative);
        assert_monotonic(&positive);
    }

    #[test]
    fn midpoints_round_per_channel() {
        // Halfway between NEGATIVE and NEUTRAL: (236.5, 123.5, 38) rounds away from zero.
        assert_eq!(color_for(-0.5), Rgb::new(237, 124, 38));
    }

    #[test]
    fn hex_formatting() {
        assert_eq!(NEGATIVE_COLOR.to_hex(), "#ef4444");
    }
}
