//! Candidate chord scoring against the residual field.
//!
//! Scoring is read-only; the one mutating step in the engine is
//! [`crate::field::Field::deplete`], applied exactly once per committed step
//! after the scan for that iteration has finished.

use serde::{Deserialize, Serialize};

use crate::field::Field;

/// How residual values along a chord fold into a single score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreAggregate {
    /// Sum of residuals divided by the pixel count. Length-neutral: a short
    /// chord through dense demand beats a long chord through sparse demand.
    #[default]
    MeanPerPixel,
    /// Raw sum of residuals. Favours longer chords; matches the behaviour of
    /// unnormalized summing schemes.
    Sum,
}

/// Score a candidate chord's pixel set against the residual.
///
/// An empty pixel set (chord fully clipped away) scores negative infinity so
/// it can never win a candidate scan.
pub fn score_chord(residual: &Field, pixels: &[(u32, u32)], aggregate: ScoreAggregate) -> f32 {
    if pixels.is_empty() {
        return f32::NEG_INFINITY;
    }
    let sum: f32 = pixels
        .iter()
        .map(|&(x, y)| residual.get(x as usize, y as usize))
        .sum();
    match aggregate {
        ScoreAggregate::MeanPerPixel => sum / pixels.len() as f32,
        ScoreAggregate::Sum => sum,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::chord_pixels;

    #[test]
    fn empty_pixel_set_scores_negative_infinity() {
        let residual = Field::filled(10, 10, 1.0);
        assert_eq!(
            score_chord(&residual, &[], ScoreAggregate::MeanPerPixel),
            f32::NEG_INFINITY
        );
    }

    #[test]
    fn mean_is_sum_over_count() {
        let mut residual = Field::new(4, 1);
        residual.set(0, 0, 0.2);
        residual.set(1, 0, 0.4);
        let pixels = [(0u32, 0u32), (1, 0), (2, 0), (3, 0)];
        let sum = score_chord(&residual, &pixels, ScoreAggregate::Sum);
        let mean = score_chord(&residual, &pixels, ScoreAggregate::MeanPerPixel);
        assert!((sum - 0.6).abs() < 1e-6);
        assert!((mean - 0.15).abs() < 1e-6);
    }

    #[test]
    fn mean_does_not_favour_longer_chords() {
        let residual = Field::filled(32, 32, 0.5);
        let long = chord_pixels((0, 0), (31, 31), 1, 32, 32);
        let short = chord_pixels((0, 0), (4, 4), 1, 32, 32);
        let long_mean = score_chord(&residual, &long, ScoreAggregate::MeanPerPixel);
        let short_mean = score_chord(&residual, &short, ScoreAggregate::MeanPerPixel);
        assert!((long_mean - short_mean).abs() < 1e-6);
        // The unnormalized sum does favour the longer chord.
        let long_sum = score_chord(&residual, &long, ScoreAggregate::Sum);
        let short_sum = score_chord(&residual, &short, ScoreAggregate::Sum);
        assert!(long_sum > short_sum);
    }

    #[test]
    fn depletion_monotonically_lowers_the_score() {
        let mut residual = Field::filled(16, 16, 0.8);
        let pixels = chord_pixels((0, 3), (15, 12), 1, 16, 16);

        let before = score_chord(&residual, &pixels, ScoreAggregate::MeanPerPixel);
        residual.deplete(&pixels, 0.3);
        let after = score_chord(&residual, &pixels, ScoreAggregate::MeanPerPixel);
        assert!(after < before);

        // Depleting an already-blank chord leaves its score unchanged.
        residual.deplete(&pixels, 1.0);
        let blank = score_chord(&residual, &pixels, ScoreAggregate::MeanPerPixel);
        residual.deplete(&pixels, 1.0);
        let still_blank = score_chord(&residual, &pixels, ScoreAggregate::MeanPerPixel);
        assert_eq!(blank, still_blank);
        assert_eq!(blank, 0.0);
    }
}
