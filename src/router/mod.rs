//! Greedy route builder.
//!
//! Overview
//! - Validates a [`RouterParams`] value object once, at construction.
//! - Generates the nail layout and takes ownership of the luminance field,
//!   which becomes the residual the run depletes.
//! - Each iteration scans all candidate chords from the current nail
//!   (read-only, optionally in parallel), commits the deterministic winner,
//!   and checks the stop conditions.
//! - Termination is an explicit state machine; the report carries the
//!   terminal state plus which heuristic fired.
//!
//! Modules
//! - [`params`] – configuration types used by the router and CLI.
//! - `scan` – per-iteration candidate evaluation and reduction.
//! - `pipeline` – the [`Router`] implementation.
//!
//! Per step the scan costs `O(N · L)` for `N` nails and average chord pixel
//! count `L`; a full run is `O(S · N · L)` over `S` committed steps. The scan
//! is the hot loop and the only parallel region.

pub mod params;
mod pipeline;
mod scan;

pub use params::{BlankMetric, ParallelScanOptions, RouterParams};
pub use pipeline::Router;
