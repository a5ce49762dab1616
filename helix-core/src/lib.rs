//! Helix Core
//!
//! Shared types for the Helix mock runner.
//!
//! This crate contains:
//! - Domain types: the session and task records served by the worker API
//! - Stream markers: the structured stdout lines the runner harness reads

pub mod domain;
