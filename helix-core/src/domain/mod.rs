//! Core domain types
//!
//! These types mirror the JSON records the worker API hands to a model
//! process, plus the line protocol the model process writes back on stdout.

pub mod session;
pub mod stream;
pub mod task;
