//! Parameter types configuring the routing engine.
//!
//! All knobs live in one value object validated once at engine construction
//! and immutable thereafter. Defaults reproduce the reference setup: an
//! 800×800 working space, 180 nails, up to 3500 steps.

use serde::{Deserialize, Serialize};

use crate::error::RouteError;
use crate::layout::LayoutParams;
use crate::scorer::ScoreAggregate;

/// Aggregate used for the whole-field blankness stop check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlankMetric {
    /// Mean residual over the field.
    #[default]
    Mean,
    /// Maximum residual over the field. Stricter: the run only counts as
    /// blank when no bright pixel remains anywhere.
    Max,
}

/// Controls whether the per-iteration candidate scan runs sequentially or
/// with Rayon.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ParallelScanOptions {
    enabled: bool,
    min_candidates: usize,
}

impl ParallelScanOptions {
    /// Construct explicit options.
    pub fn new(enabled: bool, min_candidates: usize) -> Self {
        Self {
            enabled,
            min_candidates: min_candidates.max(1),
        }
    }

    /// Disable parallel scanning regardless of candidate count.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            min_candidates: usize::MAX,
        }
    }

    /// Returns true when the scan over `candidate_count` nails should use
    /// the parallel path.
    pub fn should_parallelize(&self, candidate_count: usize) -> bool {
        self.enabled && candidate_count >= self.min_candidates
    }

    /// Update the minimum candidate threshold for parallel scanning.
    pub fn with_min_candidates(mut self, min_candidates: usize) -> Self {
        self.min_candidates = min_candidates.max(1);
        self
    }
}

impl Default for ParallelScanOptions {
    fn default() -> Self {
        Self {
            enabled: cfg!(feature = "parallel"),
            min_candidates: 64,
        }
    }
}

/// Router-wide parameters controlling the greedy loop.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouterParams {
    /// Nail placement on the working circle.
    pub layout: LayoutParams,
    /// Nail index the route starts at.
    pub start_nail: usize,
    /// Residual removed per drawn chord pixel, in `(0, 1]`.
    pub thread_strength: f32,
    /// Chord thickness in pixels; odd, >= 1.
    pub line_thickness: u32,
    /// Maximum number of committed steps (>= 1).
    pub max_steps: usize,
    /// Minimum candidate score required to commit a step; anything below
    /// ends the run by convergence.
    pub min_score: f32,
    /// Aggregate used for the blankness check.
    pub blank_metric: BlankMetric,
    /// The run stops once the blankness aggregate falls below this value.
    pub blank_threshold: f32,
    /// A step only resets the stall counter when its score exceeds the
    /// previous step's score by more than this epsilon.
    pub improvement_eps: f32,
    /// Consecutive non-improving steps tolerated before stopping.
    pub patience: usize,
    /// How residual values along a chord fold into a score.
    pub aggregate: ScoreAggregate,
    /// Parallel candidate-scan gate.
    pub parallel_scan: ParallelScanOptions,
    /// Capture the final residual field in the report.
    pub keep_residual: bool,
}

impl Default for RouterParams {
    fn default() -> Self {
        Self {
            layout: LayoutParams::default(),
            start_nail: 0,
            thread_strength: 0.22,
            line_thickness: 1,
            max_steps: 3500,
            min_score: 1e-6,
            blank_metric: BlankMetric::default(),
            blank_threshold: 0.01,
            improvement_eps: 0.0,
            patience: 300,
            aggregate: ScoreAggregate::default(),
            parallel_scan: ParallelScanOptions::default(),
            keep_residual: false,
        }
    }
}

impl RouterParams {
    /// Check every parameter against its documented domain.
    ///
    /// Called once by [`crate::router::Router::new`]; no iteration runs and
    /// no state is built when any check fails.
    pub fn validate(&self) -> Result<(), RouteError> {
        if self.layout.num_nails < 3 {
            return Err(RouteError::config(format!(
                "num_nails must be >= 3, got {}",
                self.layout.num_nails
            )));
        }
        if !(self.layout.radius > 0.0) {
            return Err(RouteError::config(format!(
                "radius must be positive, got {}",
                self.layout.radius
            )));
        }
        if self.start_nail >= self.layout.num_nails {
            return Err(RouteError::config(format!(
                "start_nail {} out of range for {} nails",
                self.start_nail, self.layout.num_nails
            )));
        }
        if !(self.thread_strength > 0.0 && self.thread_strength <= 1.0) {
            return Err(RouteError::config(format!(
                "thread_strength must be in (0, 1], got {}",
                self.thread_strength
            )));
        }
        if self.line_thickness < 1 || self.line_thickness % 2 == 0 {
            return Err(RouteError::config(format!(
                "line_thickness must be an odd integer >= 1, got {}",
                self.line_thickness
            )));
        }
        if self.max_steps == 0 {
            return Err(RouteError::config("max_steps must be >= 1".to_string()));
        }
        if !self.blank_threshold.is_finite() || self.blank_threshold < 0.0 {
            return Err(RouteError::config(format!(
                "blank_threshold must be finite and >= 0, got {}",
                self.blank_threshold
            )));
        }
        if !self.improvement_eps.is_finite() || self.improvement_eps < 0.0 {
            return Err(RouteError::config(format!(
                "improvement_eps must be finite and >= 0, got {}",
                self.improvement_eps
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_parameters_validate() {
        assert!(RouterParams::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_domain_values() {
        let cases: Vec<Box<dyn Fn(&mut RouterParams)>> = vec![
            Box::new(|p| p.layout.num_nails = 2),
            Box::new(|p| p.layout.radius = -1.0),
            Box::new(|p| p.start_nail = 180),
            Box::new(|p| p.thread_strength = 0.0),
            Box::new(|p| p.thread_strength = 1.5),
            Box::new(|p| p.line_thickness = 0),
            Box::new(|p| p.line_thickness = 2),
            Box::new(|p| p.max_steps = 0),
            Box::new(|p| p.blank_threshold = -0.1),
            Box::new(|p| p.improvement_eps = f32::NAN),
        ];
        for (i, mutate) in cases.iter().enumerate() {
            let mut params = RouterParams::default();
            mutate(&mut params);
            assert!(
                matches!(
                    params.validate(),
                    Err(RouteError::InvalidConfiguration(_))
                ),
                "case {i} should fail validation"
            );
        }
    }

    #[test]
    fn parallel_gate_respects_threshold() {
        let options = ParallelScanOptions::new(true, 32);
        assert!(!options.should_parallelize(31));
        assert!(options.should_parallelize(32));
        assert!(!ParallelScanOptions::disabled().should_parallelize(usize::MAX));
    }
}
