//! Task domain types

use serde::{Deserialize, Serialize};

/// A unit of work pulled from the next-task endpoint
///
/// `prompt` and `session_id` are mandatory. The remaining fields are part of
/// the upstream record but the mock runner never acts on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub session_id: String,
    pub prompt: String,
    #[serde(default)]
    pub lora_dir: String,
    #[serde(default)]
    pub dataset_dir: String,
}
