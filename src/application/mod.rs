//! Application layer - the assistant service and its prompts.
//!
//! This layer orchestrates the dispatcher, the normalizer and prompt
//! construction behind the [`LegalAssistant`] query surface.

mod cooldown;
mod errors;
mod legal_assistant;
mod prompts;

pub use cooldown::cooldown_stream;
pub use errors::AssistantError;
pub use legal_assistant::{LegalAssistant, DEFAULT_HISTORY_TURNS};
pub use prompts::{
    case_analysis_prompt, chat_prompt, CaseDetails, ChatTurn, RESPONSE_SHAPE, SYSTEM_INSTRUCTION,
};
