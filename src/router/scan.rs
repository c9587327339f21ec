//! Per-iteration candidate evaluation.
//!
//! Every nail other than the current one (and the far end of the chord drawn
//! in the previous step) is rasterized and scored against the residual. The
//! scan is read-only; the reduction to a single winner is deterministic
//! (higher score wins, ties go to the lower nail index), so the result is
//! identical whether candidates are evaluated sequentially or by Rayon
//! workers in arbitrary order.

use crate::field::Field;
use crate::layout::CircleLayout;
use crate::raster::chord_pixels;
use crate::scorer::{score_chord, ScoreAggregate};

use super::params::ParallelScanOptions;

/// Winning candidate of one scan.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Candidate {
    pub nail: usize,
    pub score: f32,
}

/// Deterministic reduction rule: higher score, then lower nail index.
#[inline]
fn better(a: Candidate, b: Candidate) -> Candidate {
    if b.score > a.score || (b.score == a.score && b.nail < a.nail) {
        b
    } else {
        a
    }
}

/// Evaluate all allowed chords leaving `current` and return the best one.
///
/// `banned` is the far end of the previously drawn chord; skipping it keeps
/// the route from retracing its immediately preceding step. Returns `None`
/// only when no candidate exists at all.
pub(crate) fn best_candidate(
    residual: &Field,
    layout: &CircleLayout,
    current: usize,
    banned: Option<usize>,
    thickness: u32,
    aggregate: ScoreAggregate,
    parallel: ParallelScanOptions,
) -> Option<Candidate> {
    let candidate_count = layout.len().saturating_sub(1 + usize::from(banned.is_some()));
    if parallel.should_parallelize(candidate_count) {
        #[cfg(feature = "parallel")]
        {
            return best_candidate_parallel(
                residual, layout, current, banned, thickness, aggregate,
            );
        }
    }
    best_candidate_sequential(residual, layout, current, banned, thickness, aggregate)
}

fn best_candidate_sequential(
    residual: &Field,
    layout: &CircleLayout,
    current: usize,
    banned: Option<usize>,
    thickness: u32,
    aggregate: ScoreAggregate,
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for nail in 0..layout.len() {
        if nail == current || Some(nail) == banned {
            continue;
        }
        let candidate = evaluate(residual, layout, current, nail, thickness, aggregate);
        best = Some(match best {
            Some(incumbent) => better(incumbent, candidate),
            None => candidate,
        });
    }
    best
}

#[cfg(feature = "parallel")]
fn best_candidate_parallel(
    residual: &Field,
    layout: &CircleLayout,
    current: usize,
    banned: Option<usize>,
    thickness: u32,
    aggregate: ScoreAggregate,
) -> Option<Candidate> {
    use rayon::prelude::*;

    (0..layout.len())
        .into_par_iter()
        .filter(|&nail| nail != current && Some(nail) != banned)
        .map(|nail| evaluate(residual, layout, current, nail, thickness, aggregate))
        .reduce_with(better)
}

#[inline]
fn evaluate(
    residual: &Field,
    layout: &CircleLayout,
    from: usize,
    to: usize,
    thickness: u32,
    aggregate: ScoreAggregate,
) -> Candidate {
    let pixels = chord_pixels(
        layout.nail_px(from),
        layout.nail_px(to),
        thickness,
        residual.w,
        residual.h,
    );
    Candidate {
        nail: to,
        score: score_chord(residual, &pixels, aggregate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutParams;
    use nalgebra::Point2;

    fn layout() -> CircleLayout {
        CircleLayout::generate(&LayoutParams {
            num_nails: 8,
            radius: 40.0,
            center: Point2::new(50.0, 50.0),
            space: (100, 100),
        })
        .unwrap()
    }

    #[test]
    fn uniform_field_ties_break_to_lowest_index() {
        let residual = Field::filled(100, 100, 0.5);
        let best = best_candidate(
            &residual,
            &layout(),
            0,
            None,
            1,
            ScoreAggregate::MeanPerPixel,
            ParallelScanOptions::disabled(),
        )
        .unwrap();
        assert_eq!(best.nail, 1);
        assert!((best.score - 0.5).abs() < 1e-6);
    }

    #[test]
    fn banned_nail_is_never_selected() {
        let residual = Field::filled(100, 100, 0.5);
        let best = best_candidate(
            &residual,
            &layout(),
            0,
            Some(1),
            1,
            ScoreAggregate::MeanPerPixel,
            ParallelScanOptions::disabled(),
        )
        .unwrap();
        assert_eq!(best.nail, 2);
    }

    #[test]
    fn sum_aggregate_prefers_the_diameter() {
        let residual = Field::filled(100, 100, 0.5);
        let best = best_candidate(
            &residual,
            &layout(),
            0,
            None,
            1,
            ScoreAggregate::Sum,
            ParallelScanOptions::disabled(),
        )
        .unwrap();
        // Nail 4 is diametrically opposite nail 0 on an 8-nail circle.
        assert_eq!(best.nail, 4);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_and_sequential_scans_agree() {
        let mut residual = Field::filled(100, 100, 0.1);
        // Brighten a band so the winner is not just a tie-break artifact.
        for x in 20..80 {
            residual.set(x, 70, 1.0);
        }
        let layout = layout();
        for aggregate in [ScoreAggregate::MeanPerPixel, ScoreAggregate::Sum] {
            let seq = best_candidate(
                &residual,
                &layout,
                0,
                None,
                1,
                aggregate,
                ParallelScanOptions::disabled(),
            )
            .unwrap();
            let par = best_candidate(
                &residual,
                &layout,
                0,
                None,
                1,
                aggregate,
                ParallelScanOptions::new(true, 1),
            )
            .unwrap();
            assert_eq!(seq.nail, par.nail);
            assert_eq!(seq.score, par.score);
        }
    }
}
