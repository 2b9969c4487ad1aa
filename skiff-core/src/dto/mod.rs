//! Data Transfer Objects for the orchestration API
//!
//! Request and response envelopes wrapping the domain types. Field names follow
//! the service's JSON schema.

pub mod job;
