//! Scheduler layer for the runner
//!
//! Pulls the initial session and then tasks from the worker API, one at a
//! time, handing each task to the inference service.

pub mod poller;

pub use poller::TaskPoller;
