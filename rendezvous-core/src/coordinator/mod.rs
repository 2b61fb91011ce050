//! Coordinator for the read, merge and write workflow
//!
//! Spawns the workers, sequences their requests, merges both answers and
//! schedules its own shutdown.

pub mod merge;
pub mod workflow;

pub use merge::apply_increment;
pub use workflow::{
    run, Coordinator, CoordinatorConfig, CoordinatorHandle, CoordinatorPhase, RunReport,
};
