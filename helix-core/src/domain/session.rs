//! Session domain types

use serde::{Deserialize, Serialize};

/// Initial session configuration
///
/// Fetched once when the model process boots, before any task is pulled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Directory holding the fine-tuned LoRA weights, empty when none
    pub lora_dir: String,
}

impl Session {
    /// Returns true when the session asks for LoRA weights to be loaded
    pub fn has_lora(&self) -> bool {
        !self.lora_dir.is_empty()
    }
}
