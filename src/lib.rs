#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod error;
pub mod field;
pub mod layout;
pub mod router;
pub mod types;

// Collaborators around the engine: preparation, artifacts, CLI plumbing.
pub mod config;
pub mod export;
pub mod io;
pub mod prep;

// Engine internals, public for tools and tests.
pub mod raster;
pub mod scorer;

// --- High-level re-exports -------------------------------------------------

pub use crate::error::RouteError;
pub use crate::field::Field;
pub use crate::layout::{CircleLayout, LayoutParams};
pub use crate::router::{BlankMetric, ParallelScanOptions, Router, RouterParams};
pub use crate::scorer::ScoreAggregate;
pub use crate::types::{ResidualStats, RouteReport, RouteState, StepRecord, StopReason};

/// Small prelude for quick experiments.
///
/// ```
/// use string_art::prelude::*;
///
/// let params = RouterParams::default();
/// let (w, h) = params.layout.space;
/// let report = Router::new(params, Field::filled(w, h, 0.0))
///     .expect("default parameters are valid")
///     .run();
/// assert_eq!(report.state, RouteState::StoppedByConvergence);
/// assert!(report.steps.is_empty());
/// ```
pub mod prelude {
    pub use crate::field::Field;
    pub use crate::router::{Router, RouterParams};
    pub use crate::types::{RouteReport, RouteState, StopReason};
}
