//! Greedy route construction.
//!
//! The [`Router`] owns the residual field for the duration of the run. Each
//! iteration scans all candidate chords from the current nail (read-only),
//! commits the winner by depleting the residual, then evaluates the stop
//! conditions in a fixed order: blankness, step limit, stall patience. Once
//! drawn, a chord's effect on the residual is permanent; the loop never
//! rolls a step back.

use std::time::Instant;

use log::debug;

use crate::error::RouteError;
use crate::field::Field;
use crate::layout::CircleLayout;
use crate::raster::chord_pixels;
use crate::types::{ResidualStats, RouteReport, RouteState, StepRecord, StopReason};

use super::params::{BlankMetric, RouterParams};
use super::scan::best_candidate;

/// Greedy routing engine over a validated configuration and an owned
/// residual field.
#[derive(Debug)]
pub struct Router {
    params: RouterParams,
    layout: CircleLayout,
    residual: Field,
}

impl Router {
    /// Validate the configuration, generate the nail layout, and take
    /// ownership of the luminance field.
    ///
    /// Fails fast with [`RouteError::InvalidConfiguration`] or
    /// [`RouteError::DimensionMismatch`]; no partial state survives an
    /// error.
    pub fn new(params: RouterParams, field: Field) -> Result<Self, RouteError> {
        params.validate()?;
        let layout = CircleLayout::generate(&params.layout)?;
        let (space_w, space_h) = layout.space();
        if field.w != space_w || field.h != space_h {
            return Err(RouteError::DimensionMismatch {
                field_w: field.w,
                field_h: field.h,
                space_w,
                space_h,
            });
        }
        Ok(Self {
            params,
            layout,
            residual: field,
        })
    }

    /// Nail layout the router was built with.
    pub fn layout(&self) -> &CircleLayout {
        &self.layout
    }

    /// Run the greedy loop to termination.
    pub fn run(mut self) -> RouteReport {
        let start = Instant::now();
        let residual_before = ResidualStats::of(&self.residual);

        let mut route = vec![self.params.start_nail];
        let mut steps: Vec<StepRecord> = Vec::new();
        let mut current = self.params.start_nail;
        // Far end of the chord drawn in the previous step; scanning skips it
        // so the route never retraces its immediately preceding chord.
        let mut previous: Option<usize> = None;
        let mut last_score: Option<f32> = None;
        let mut no_improve = 0usize;

        let mut state = RouteState::Running;
        let mut reason = StopReason::ScoreExhausted;

        while state == RouteState::Running {
            let best = match best_candidate(
                &self.residual,
                &self.layout,
                current,
                previous,
                self.params.line_thickness,
                self.params.aggregate,
                self.params.parallel_scan,
            ) {
                Some(candidate) => candidate,
                None => {
                    reason = StopReason::ScoreExhausted;
                    state = reason.state();
                    break;
                }
            };

            if best.score < self.params.min_score {
                debug!(
                    "scan from nail {current}: best score {:.6} below min {:.6}, stopping",
                    best.score, self.params.min_score
                );
                reason = StopReason::ScoreExhausted;
                state = reason.state();
                break;
            }

            // Commit: the one mutating step in the engine, applied exactly
            // once after scoring for this iteration has finished.
            let pixels = chord_pixels(
                self.layout.nail_px(current),
                self.layout.nail_px(best.nail),
                self.params.line_thickness,
                self.residual.w,
                self.residual.h,
            );
            self.residual.deplete(&pixels, self.params.thread_strength);

            let step = steps.len() + 1;
            steps.push(StepRecord {
                step,
                from: current,
                to: best.nail,
                score: best.score,
            });
            route.push(best.nail);
            previous = Some(current);
            current = best.nail;

            if step % 100 == 0 {
                debug!(
                    "step {step}: at nail {current}, residual mean {:.4} max {:.4}",
                    self.residual.mean(),
                    self.residual.max()
                );
            }

            // Stop checks, in order: blankness, step limit, stall patience.
            let blankness = match self.params.blank_metric {
                BlankMetric::Mean => self.residual.mean(),
                BlankMetric::Max => self.residual.max(),
            };
            if blankness < self.params.blank_threshold {
                debug!("residual blank ({blankness:.5}) after step {step}, stopping");
                reason = StopReason::ResidualBlank;
                state = reason.state();
                break;
            }
            if step >= self.params.max_steps {
                debug!("step limit {} reached", self.params.max_steps);
                reason = StopReason::StepLimit;
                state = reason.state();
                break;
            }
            match last_score {
                Some(prev) if best.score > prev + self.params.improvement_eps => no_improve = 0,
                Some(_) => no_improve += 1,
                None => {}
            }
            last_score = Some(best.score);
            if no_improve > self.params.patience {
                debug!("no improvement for {no_improve} consecutive steps, stopping");
                reason = StopReason::Stalled;
                state = reason.state();
                break;
            }
        }

        let residual_after = ResidualStats::of(&self.residual);
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        debug!(
            "route finished: {} steps, {:?}, {:.3} ms",
            steps.len(),
            reason,
            elapsed_ms
        );

        RouteReport {
            state,
            reason,
            route,
            steps,
            residual_before,
            residual_after,
            elapsed_ms,
            final_residual: self.params.keep_residual.then_some(self.residual),
        }
    }
}
