//! Scheduler layer
//!
//! Drives a submitted job from `Pending` to a terminal state by polling the
//! orchestrator at a fixed interval, bounded by the workflow deadline.

pub mod poller;

pub use poller::{LifecyclePoller, LifecycleState, TerminalState, TerminalStatus};
