//! Result types produced by the router.

use serde::Serialize;

use crate::field::Field;

/// One committed routing step.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct StepRecord {
    /// 1-based step number.
    pub step: usize,
    /// Nail the thread leaves from.
    pub from: usize,
    /// Nail the thread arrives at.
    pub to: usize,
    /// Score of the chord at selection time.
    pub score: f32,
}

/// Route builder state machine. Both stopped states are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RouteState {
    Running,
    /// The step counter reached the configured maximum.
    StoppedByLimit,
    /// A convergence heuristic fired; see [`StopReason`] for which one.
    StoppedByConvergence,
}

/// Which stop condition ended the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// Step counter reached `max_steps` after committing the last step.
    StepLimit,
    /// The best candidate fell below the minimum-score threshold; nothing
    /// was committed in the final iteration.
    ScoreExhausted,
    /// The whole-field blankness aggregate fell below its threshold after
    /// committing the last step.
    ResidualBlank,
    /// No score improvement for more than `patience` consecutive steps.
    Stalled,
}

impl StopReason {
    /// Terminal state this reason maps to.
    pub fn state(self) -> RouteState {
        match self {
            StopReason::StepLimit => RouteState::StoppedByLimit,
            StopReason::ScoreExhausted | StopReason::ResidualBlank | StopReason::Stalled => {
                RouteState::StoppedByConvergence
            }
        }
    }
}

/// Whole-field residual statistics.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct ResidualStats {
    pub mean: f32,
    pub max: f32,
}

impl ResidualStats {
    pub fn of(field: &Field) -> Self {
        Self {
            mean: field.mean(),
            max: field.max(),
        }
    }
}

/// Complete outcome of a routing run.
#[derive(Clone, Debug, Serialize)]
pub struct RouteReport {
    /// Terminal state of the loop.
    pub state: RouteState,
    /// Which stop condition fired.
    pub reason: StopReason,
    /// Ordered nail indices, starting at the configured start nail.
    /// Consecutive entries are the chords drawn, in drawing order.
    pub route: Vec<usize>,
    /// One record per committed step, parallel to `route` windows.
    pub steps: Vec<StepRecord>,
    /// Residual statistics before the first step.
    pub residual_before: ResidualStats,
    /// Residual statistics after the last committed step.
    pub residual_after: ResidualStats,
    /// Wall-clock duration of the run in milliseconds.
    pub elapsed_ms: f64,
    /// Final residual snapshot, captured when `keep_residual` is set.
    #[serde(skip)]
    pub final_residual: Option<Field>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_reasons_map_to_terminal_states() {
        assert_eq!(StopReason::StepLimit.state(), RouteState::StoppedByLimit);
        for reason in [
            StopReason::ScoreExhausted,
            StopReason::ResidualBlank,
            StopReason::Stalled,
        ] {
            assert_eq!(reason.state(), RouteState::StoppedByConvergence);
        }
    }
}
