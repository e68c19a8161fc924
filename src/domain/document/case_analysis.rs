//! Case analysis view - reshapes a document into named buckets.
//!
//! This is a presentation heuristic, not part of the backend contract. List
//! titles are matched against a small keyword set, so information can be
//! misfiled or fall back to placeholders when the model titles its lists
//! differently. Unmatched lists land in "recommended actions".

use serde::{Deserialize, Serialize};

use super::content::{ContentItem, StructuredDocument};

const PLACEHOLDER_ISSUES: &[&str] = &[
    "Review the facts of your situation in detail",
    "Identify the legal rights and obligations involved",
];

const PLACEHOLDER_ACTIONS: &[&str] = &[
    "Gather all relevant documents and correspondence",
    "Consult a qualified attorney in your jurisdiction",
];

const PLACEHOLDER_RISKS: &[&str] = &[
    "Deadlines or limitation periods may apply to your claim",
    "Outcomes depend on facts and local law",
];

const PLACEHOLDER_NEXT_STEPS: &[&str] = &[
    "Write down a timeline of events",
    "Contact a local legal aid organization or attorney",
];

/// Named buckets derived from a [`StructuredDocument`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseAnalysisResult {
    pub title: String,
    pub summary: String,
    pub key_issues: Vec<String>,
    pub recommended_actions: Vec<String>,
    pub potential_risks: Vec<String>,
    pub next_steps: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    KeyIssues,
    RecommendedActions,
    PotentialRisks,
    NextSteps,
}

impl Bucket {
    /// Classifies a list by its title. "next" is tested before "step" so
    /// that "Next Steps" is not filed as an action.
    fn for_title(title: Option<&str>) -> Self {
        let title = title.unwrap_or_default().to_lowercase();
        if title.contains("issue") {
            Self::KeyIssues
        } else if title.contains("risk") {
            Self::PotentialRisks
        } else if title.contains("next") {
            Self::NextSteps
        } else {
            // "action", "step" and anything unmatched
            Self::RecommendedActions
        }
    }
}

impl CaseAnalysisResult {
    /// Walks the document content and files lists and suggestions into buckets.
    pub fn from_document(document: &StructuredDocument) -> Self {
        let mut result = Self {
            title: document.title.clone(),
            summary: document.summary.clone(),
            key_issues: Vec::new(),
            recommended_actions: Vec::new(),
            potential_risks: Vec::new(),
            next_steps: Vec::new(),
        };

        for item in &document.content {
            match item {
                ContentItem::List { title, items } => {
                    result
                        .bucket_mut(Bucket::for_title(title.as_deref()))
                        .extend(items.iter().cloned());
                }
                ContentItem::Suggestion { content } => {
                    result.recommended_actions.push(content.clone());
                }
                _ => {}
            }
        }

        fill_if_empty(&mut result.key_issues, PLACEHOLDER_ISSUES);
        fill_if_empty(&mut result.recommended_actions, PLACEHOLDER_ACTIONS);
        fill_if_empty(&mut result.potential_risks, PLACEHOLDER_RISKS);
        fill_if_empty(&mut result.next_steps, PLACEHOLDER_NEXT_STEPS);

        result
    }

    fn bucket_mut(&mut self, bucket: Bucket) -> &mut Vec<String> {
        match bucket {
            Bucket::KeyIssues => &mut self.key_issues,
            Bucket::RecommendedActions => &mut self.recommended_actions,
            Bucket::PotentialRisks => &mut self.potential_risks,
            Bucket::NextSteps => &mut self.next_steps,
        }
    }
}

impl From<&StructuredDocument> for CaseAnalysisResult {
    fn from(document: &StructuredDocument) -> Self {
        Self::from_document(document)
    }
}

fn fill_if_empty(bucket: &mut Vec<String>, placeholder: &[&str]) {
    if bucket.is_empty() {
        bucket.extend(placeholder.iter().map(|s| s.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(title: &str, items: &[&str]) -> ContentItem {
        ContentItem::list(
            Some(title.to_string()),
            items.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn lists_are_filed_by_title_keyword() {
        let doc = StructuredDocument::new(
            "Wrongful Termination",
            "You may have a claim.",
            vec![
                list("Key Legal Issues", &["At-will exception"]),
                list("Potential Risks", &["Short filing deadline"]),
                list("Next Steps", &["File with the agency"]),
                list("Recommended Actions", &["Request personnel file"]),
            ],
        );

        let result = CaseAnalysisResult::from_document(&doc);

        assert_eq!(result.title, "Wrongful Termination");
        assert_eq!(result.key_issues, vec!["At-will exception"]);
        assert_eq!(result.potential_risks, vec!["Short filing deadline"]);
        assert_eq!(result.next_steps, vec!["File with the agency"]);
        assert_eq!(result.recommended_actions, vec!["Request personnel file"]);
    }

    #[test]
    fn unmatched_and_untitled_lists_default_to_actions() {
        let doc = StructuredDocument::new(
            "T",
            "S",
            vec![
                list("Things to Consider", &["a"]),
                ContentItem::list(None, vec!["b".into()]),
            ],
        );

        let result = CaseAnalysisResult::from_document(&doc);

        assert_eq!(result.recommended_actions, vec!["a", "b"]);
    }

    #[test]
    fn suggestions_append_to_actions() {
        let doc = StructuredDocument::new(
            "T",
            "S",
            vec![
                list("Action Items", &["first"]),
                ContentItem::suggestion("second"),
            ],
        );

        let result = CaseAnalysisResult::from_document(&doc);

        assert_eq!(result.recommended_actions, vec!["first", "second"]);
    }

    #[test]
    fn empty_buckets_get_placeholders() {
        let doc = StructuredDocument::new("T", "S", vec![ContentItem::text("prose only")]);

        let result = CaseAnalysisResult::from_document(&doc);

        assert_eq!(result.key_issues.len(), PLACEHOLDER_ISSUES.len());
        assert_eq!(result.recommended_actions.len(), PLACEHOLDER_ACTIONS.len());
        assert_eq!(result.potential_risks.len(), PLACEHOLDER_RISKS.len());
        assert_eq!(result.next_steps.len(), PLACEHOLDER_NEXT_STEPS.len());
    }

    #[test]
    fn serializes_with_camel_case_bucket_names() {
        let doc = StructuredDocument::new("T", "S", vec![]);
        let json = serde_json::to_value(CaseAnalysisResult::from(&doc)).unwrap();

        assert!(json.get("keyIssues").is_some());
        assert!(json.get("recommendedActions").is_some());
        assert!(json.get("potentialRisks").is_some());
        assert!(json.get("nextSteps").is_some());
    }
}
