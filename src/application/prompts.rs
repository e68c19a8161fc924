//! Prompt construction for chat and case analysis.
//!
//! Both prompts ask the model for the JSON document shape the normalizer
//! targets. The case-analysis prompt also names the list titles that the
//! bucket view keys on.

use serde::{Deserialize, Serialize};

use super::errors::AssistantError;

/// JSON shape every answer should follow.
pub const RESPONSE_SHAPE: &str = r#"{
  "title": "short title",
  "summary": "one or two sentence summary",
  "content": [
    {"type": "text", "content": "paragraph"},
    {"type": "list", "title": "list title", "items": ["item", "item"]},
    {"type": "suggestion", "content": "suggested action"},
    {"type": "warning", "content": "caveat"},
    {"type": "resource", "title": "name", "content": "description", "url": "https://..."},
    {"type": "code", "content": "statute or template text", "language": "text"}
  ]
}"#;

/// System instruction sent with every request.
pub const SYSTEM_INSTRUCTION: &str = "You are a legal information assistant. You explain \
general legal concepts in plain language. You do not give legal advice and you do not \
claim to be a lawyer. Answer with a single JSON object and nothing else: no markdown, \
no code fences, no text before or after the object.";

/// A case description submitted for analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseDetails {
    /// Area of law, e.g. "Landlord/Tenant".
    pub case_type: String,
    pub description: String,
    pub jurisdiction: Option<String>,
    pub parties: Option<String>,
    pub desired_outcome: Option<String>,
}

impl CaseDetails {
    pub fn new(case_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            case_type: case_type.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_jurisdiction(mut self, jurisdiction: impl Into<String>) -> Self {
        self.jurisdiction = Some(jurisdiction.into());
        self
    }

    pub fn with_parties(mut self, parties: impl Into<String>) -> Self {
        self.parties = Some(parties.into());
        self
    }

    pub fn with_desired_outcome(mut self, outcome: impl Into<String>) -> Self {
        self.desired_outcome = Some(outcome.into());
        self
    }

    /// Case type and description are required.
    pub fn validate(&self) -> Result<(), AssistantError> {
        if self.case_type.trim().is_empty() {
            return Err(AssistantError::EmptyInput("case type"));
        }
        if self.description.trim().is_empty() {
            return Err(AssistantError::EmptyInput("case description"));
        }
        Ok(())
    }

    /// Text used to pick a topical title when the answer is unparseable.
    pub fn topic_hint(&self) -> String {
        format!("{} {}", self.case_type, self.description)
    }
}

/// One earlier exchange, replayed as context in chat prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub question: String,
    /// Condensed answer: title and summary of the returned document.
    pub answer: String,
}

/// Builds the chat prompt, replaying earlier turns oldest first.
pub fn chat_prompt(message: &str, history: &[ChatTurn]) -> String {
    let mut prompt = String::new();

    if !history.is_empty() {
        prompt.push_str("Earlier in this conversation:\n");
        for turn in history {
            prompt.push_str(&format!("User: {}\nAssistant: {}\n", turn.question, turn.answer));
        }
        prompt.push('\n');
    }

    prompt.push_str(&format!("User question: {}\n\n", message.trim()));
    prompt.push_str(
        "Answer the question as general legal information. Include at least one warning \
item reminding the user to consult a licensed attorney for advice on their situation. \
Respond with JSON in exactly this shape:\n",
    );
    prompt.push_str(RESPONSE_SHAPE);
    prompt
}

/// Builds the case-analysis prompt.
pub fn case_analysis_prompt(case: &CaseDetails) -> String {
    let mut prompt = String::from("Analyze the following legal situation.\n\n");

    prompt.push_str(&format!("Case type: {}\n", case.case_type.trim()));
    if let Some(jurisdiction) = non_blank(&case.jurisdiction) {
        prompt.push_str(&format!("Jurisdiction: {}\n", jurisdiction));
    }
    if let Some(parties) = non_blank(&case.parties) {
        prompt.push_str(&format!("Parties involved: {}\n", parties));
    }
    prompt.push_str(&format!("Description: {}\n", case.description.trim()));
    if let Some(outcome) = non_blank(&case.desired_outcome) {
        prompt.push_str(&format!("Desired outcome: {}\n", outcome));
    }

    prompt.push_str(
        "\nOrganize the analysis into four list items titled exactly \"Key Issues\", \
\"Recommended Actions\", \"Potential Risks\" and \"Next Steps\". Add text items for \
explanation and a warning item noting that this is not legal advice. \
Respond with JSON in exactly this shape:\n",
    );
    prompt.push_str(RESPONSE_SHAPE);
    prompt
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
