//! Service layer
//!
//! Services hold the runner's business logic. The poller hands each decoded
//! task to an [`InferenceService`], which is trait-based so alternative
//! responders can be swapped in.

mod inference;

pub use inference::InferenceService;
pub use inference::ScriptedInference;
