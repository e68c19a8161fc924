//! Chat session configuration

use serde::Deserialize;

/// In-memory conversation settings
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ChatConfig {
    /// Number of past question/answer turns included in each chat prompt.
    /// Zero disables history.
    #[serde(default = "default_history_turns")]
    pub history_turns: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_turns: default_history_turns(),
        }
    }
}

fn default_history_turns() -> usize {
    5
}
