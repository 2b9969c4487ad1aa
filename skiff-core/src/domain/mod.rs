//! Core domain types
//!
//! This module contains the job model exchanged with the orchestration service.
//! These types are shared between the HTTP client (wire format) and the
//! workflow (state resolution and result retrieval).

pub mod execution;
pub mod job;
pub mod result;
