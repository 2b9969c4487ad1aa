//! Skiff workflow
//!
//! Drives one batch job through its lifecycle against an orchestrator:
//!
//! - Builder: static job descriptor with the local inputs directory mounted
//! - Scheduler: status polling until a terminal state or the deadline
//! - Services: result download and archive extraction
//! - Workflow: the sequence tying these together
//!
//! All orchestrator traffic goes through [`skiff_client::JobsApi`], so the
//! workflow runs unchanged against the HTTP client or an in-memory fake.

pub mod builder;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod service;
pub mod workflow;

pub use config::Config;
pub use error::{Result, WorkflowError};
pub use scheduler::{LifecyclePoller, LifecycleState, TerminalState, TerminalStatus};
pub use service::ResultRetriever;
pub use workflow::{Workflow, WorkflowOutcome};
