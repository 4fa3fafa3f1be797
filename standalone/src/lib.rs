//! Standalone MapReduce (lite) engine.
//!
//! Runs the map, shuffle and reduce phases of a frequency counting workload
//! in a single process, then ranks the most frequent keys.

pub mod args;
pub mod engine;
pub mod loader;
pub mod map;
pub mod reduce;
pub mod report;
pub mod shuffle;

pub use engine::{run_standalone_mr_job, Job};
