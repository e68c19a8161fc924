//! Structured document types - the normalized, renderable form of an AI answer.

use serde::{Deserialize, Serialize};

/// Placeholder title used when the backend omits one.
pub const DEFAULT_TITLE: &str = "Legal Information";

/// Placeholder summary used when nothing better can be derived.
pub const DEFAULT_SUMMARY: &str = "Here is the information you requested.";

/// Normalized AI answer.
///
/// `title` and `summary` are never empty once produced by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredDocument {
    /// Short heading for the answer.
    pub title: String,
    /// One or two sentence overview.
    pub summary: String,
    /// Ordered body items.
    pub content: Vec<ContentItem>,
}

impl StructuredDocument {
    /// Creates a document, substituting placeholders for blank title or summary.
    pub fn new(
        title: impl Into<String>,
        summary: impl Into<String>,
        content: Vec<ContentItem>,
    ) -> Self {
        let title = non_blank_or(title.into(), DEFAULT_TITLE);
        let summary = non_blank_or(summary.into(), DEFAULT_SUMMARY);
        Self {
            title,
            summary,
            content,
        }
    }

    /// Iterates over the list items of this document.
    pub fn lists(&self) -> impl Iterator<Item = (Option<&str>, &[String])> {
        self.content.iter().filter_map(|item| match item {
            ContentItem::List { title, items } => Some((title.as_deref(), items.as_slice())),
            _ => None,
        })
    }

    /// Returns the number of items of the given kind.
    pub fn count_of(&self, kind: ContentKind) -> usize {
        self.content.iter().filter(|item| item.kind() == kind).count()
    }
}

fn non_blank_or(value: String, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// A single renderable body item.
///
/// The variant decides which fields exist; renderers match on it instead of
/// probing for optional fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    /// A paragraph of prose.
    Text { content: String },
    /// A bulleted list with an optional heading.
    List {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        items: Vec<String>,
    },
    /// A recommended course of action.
    Suggestion { content: String },
    /// A caution the reader should not miss.
    Warning { content: String },
    /// A link to an external resource.
    Resource {
        title: String,
        content: String,
        url: String,
    },
    /// A verbatim block, e.g. a letter template.
    Code {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
}

impl ContentItem {
    /// Creates a text item.
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    /// Creates a warning item.
    pub fn warning(content: impl Into<String>) -> Self {
        Self::Warning {
            content: content.into(),
        }
    }

    /// Creates a suggestion item.
    pub fn suggestion(content: impl Into<String>) -> Self {
        Self::Suggestion {
            content: content.into(),
        }
    }

    /// Creates a list item.
    pub fn list(title: Option<String>, items: Vec<String>) -> Self {
        Self::List { title, items }
    }

    /// Returns the variant tag.
    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Text { .. } => ContentKind::Text,
            Self::List { .. } => ContentKind::List,
            Self::Suggestion { .. } => ContentKind::Suggestion,
            Self::Warning { .. } => ContentKind::Warning,
            Self::Resource { .. } => ContentKind::Resource,
            Self::Code { .. } => ContentKind::Code,
        }
    }

    /// Returns the prose body of the item, if the variant has one.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Text { content }
            | Self::Suggestion { content }
            | Self::Warning { content }
            | Self::Resource { content, .. }
            | Self::Code { content, .. } => Some(content.as_str()),
            Self::List { .. } => None,
        }
    }
}

/// Variant tag of a [`ContentItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    List,
    Suggestion,
    Warning,
    Resource,
    Code,
}

impl ContentKind {
    /// Parses a backend `type` tag, case-insensitively.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "list" => Some(Self::List),
            "suggestion" => Some(Self::Suggestion),
            "warning" => Some(Self::Warning),
            "resource" => Some(Self::Resource),
            "code" => Some(Self::Code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_substitutes_placeholders_for_blank_fields() {
        let doc = StructuredDocument::new("  ", "", vec![]);
        assert_eq!(doc.title, DEFAULT_TITLE);
        assert_eq!(doc.summary, DEFAULT_SUMMARY);
    }

    #[test]
    fn content_item_serializes_with_type_tag() {
        let item = ContentItem::text("Hello");
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({"type": "text", "content": "Hello"})
        );
    }

    #[test]
    fn list_without_title_omits_field() {
        let item = ContentItem::list(None, vec!["a".into()]);
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({"type": "list", "items": ["a"]})
        );
    }

    #[test]
    fn resource_deserializes_from_backend_shape() {
        let item: ContentItem = serde_json::from_value(json!({
            "type": "resource",
            "title": "Legal Aid",
            "content": "Free help",
            "url": "https://example.org"
        }))
        .unwrap();

        assert_eq!(item.kind(), ContentKind::Resource);
        assert_eq!(item.body(), Some("Free help"));
    }

    #[test]
    fn kind_parse_is_case_insensitive() {
        assert_eq!(ContentKind::parse("Warning"), Some(ContentKind::Warning));
        assert_eq!(ContentKind::parse(" CODE "), Some(ContentKind::Code));
        assert_eq!(ContentKind::parse("table"), None);
    }

    #[test]
    fn lists_yields_only_list_items() {
        let doc = StructuredDocument::new(
            "T",
            "S",
            vec![
                ContentItem::text("p"),
                ContentItem::list(Some("Key Issues".into()), vec!["one".into()]),
            ],
        );
        let lists: Vec<_> = doc.lists().collect();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].0, Some("Key Issues"));
        assert_eq!(doc.count_of(ContentKind::Text), 1);
    }
}
