//! Skiff Core
//!
//! Core types for the Skiff batch job client.
//!
//! This crate contains:
//! - Domain types: the job model as understood by the orchestration service
//! - DTOs: request/response envelopes of the service's HTTP API

pub mod domain;
pub mod dto;
mod serde_util;
