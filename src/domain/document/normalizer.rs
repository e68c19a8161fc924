//! Response normalization.
//!
//! Model output is supposed to be a single JSON document, but in practice it
//! arrives wrapped in prose, inside code fences, sprinkled with markdown, or
//! as a bare content item. The normalizer degrades through these stages:
//!
//! 1. Strip wrapper markers and collapse whitespace
//! 2. Locate the last top-level balanced `{...}` span
//! 3. Strictly parse it
//! 4. Wrap a bare content item into a document
//! 5. Backfill missing `title` / `summary` / `content`
//!
//! If stages 2 or 3 fail, a document is synthesized from the raw text.
//! [`ResponseNormalizer::parse`] never fails.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use super::content::{ContentItem, ContentKind, StructuredDocument, DEFAULT_SUMMARY, DEFAULT_TITLE};

/// Maximum characters of content reused as a synthesized summary.
pub const SUMMARY_MAX_CHARS: usize = 100;

/// Title given to a document built around a bare content item.
pub const SINGLE_ITEM_TITLE: &str = "Legal Analysis";

/// Warning appended to documents synthesized from unparseable text.
pub const DISCLAIMER: &str = "This is general legal information only, not legal advice. \
     Laws vary by jurisdiction; consult a qualified attorney about your specific situation.";

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[A-Za-z0-9_+-]*").expect("valid code fence pattern"));

static HEADING_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]+").expect("valid heading pattern"));

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Prompt keywords and the fallback title they select. First match wins.
const TOPIC_TITLES: &[(&[&str], &str)] = &[
    (
        &["tenant", "landlord", "lease", "eviction", "rental"],
        "Tenant Rights Information",
    ),
    (
        &["employ", "workplace", "wage", "fired", "job"],
        "Employment Law Information",
    ),
    (
        &["divorce", "custody", "child support", "marriage", "alimony"],
        "Family Law Information",
    ),
    (&["contract", "agreement"], "Contract Law Information"),
    (
        &["arrest", "criminal", "police", "charged"],
        "Criminal Law Information",
    ),
    (
        &["refund", "warranty", "consumer", "scam"],
        "Consumer Rights Information",
    ),
];

/// Reasons the structured stages gave up. Never escapes [`ResponseNormalizer::parse`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("no balanced JSON object found in response")]
    NoJsonObject,

    #[error("JSON parse error: {0}")]
    InvalidJson(String),
}

/// Coerces raw model output into a [`StructuredDocument`].
#[derive(Debug, Clone)]
pub struct ResponseNormalizer {
    summary_max_chars: usize,
    disclaimer: String,
}

impl ResponseNormalizer {
    /// Creates a normalizer with the default summary limit and disclaimer.
    pub fn new() -> Self {
        Self {
            summary_max_chars: SUMMARY_MAX_CHARS,
            disclaimer: DISCLAIMER.to_string(),
        }
    }

    /// Overrides the disclaimer appended to raw-text fallbacks.
    pub fn with_disclaimer(mut self, disclaimer: impl Into<String>) -> Self {
        self.disclaimer = disclaimer.into();
        self
    }

    /// Parses raw backend text into a document, degrading gracefully.
    ///
    /// `original_prompt` is only consulted when the text cannot be parsed at
    /// all, to pick a topical title.
    pub fn parse(&self, raw: &str, original_prompt: &str) -> StructuredDocument {
        match self.try_parse(raw) {
            Ok(document) => document,
            Err(err) => {
                warn!(error = %err, "Response not parseable, synthesizing document from raw text");
                self.fallback_document(raw, original_prompt)
            }
        }
    }

    /// Runs the structured stages only.
    pub fn try_parse(&self, raw: &str) -> Result<StructuredDocument, NormalizeError> {
        let cleaned = strip_wrappers(raw);
        let span = last_balanced_object(&cleaned).ok_or(NormalizeError::NoJsonObject)?;

        let object: Map<String, Value> = serde_json::from_str(span)
            .map_err(|e| NormalizeError::InvalidJson(e.to_string()))?;

        if is_single_item(&object) {
            debug!("Response is a bare content item, wrapping into a document");
            return Ok(self.wrap_single_item(object));
        }

        Ok(self.backfill_document(object))
    }

    fn wrap_single_item(&self, object: Map<String, Value>) -> StructuredDocument {
        let summary = text_field(&object, "content")
            .map(|content| truncate_with_ellipsis(content.trim(), self.summary_max_chars))
            .unwrap_or_default();
        let content = decode_item(&Value::Object(object)).into_iter().collect();

        StructuredDocument::new(SINGLE_ITEM_TITLE, summary, content)
    }

    fn backfill_document(&self, object: Map<String, Value>) -> StructuredDocument {
        let title = text_field(&object, "title").unwrap_or_else(|| DEFAULT_TITLE.to_string());

        let content_missing = !object.contains_key("content");
        let mut content: Vec<ContentItem> = match object.get("content") {
            Some(Value::Array(items)) => items.iter().filter_map(decode_item).collect(),
            Some(other) => decode_item(other).into_iter().collect(),
            None => Vec::new(),
        };

        let summary = text_field(&object, "summary")
            .or_else(|| {
                content
                    .iter()
                    .find_map(ContentItem::body)
                    .map(|body| truncate_with_ellipsis(body.trim(), self.summary_max_chars))
            })
            .unwrap_or_else(|| DEFAULT_SUMMARY.to_string());

        if content_missing {
            debug!("Response has no content field, using summary as body");
            content.push(ContentItem::text(summary.clone()));
        }

        StructuredDocument::new(title, summary, content)
    }

    /// Builds a minimal document directly from unparseable text.
    pub fn fallback_document(&self, raw: &str, original_prompt: &str) -> StructuredDocument {
        let text = raw.trim();
        let summary = truncate_with_ellipsis(first_sentence(text), self.summary_max_chars);

        StructuredDocument::new(
            fallback_title(original_prompt),
            summary,
            vec![
                ContentItem::text(text),
                ContentItem::warning(self.disclaimer.clone()),
            ],
        )
    }
}

impl Default for ResponseNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Removes code fences, heading and bold markers and control characters,
/// then collapses whitespace runs to a single space.
fn strip_wrappers(raw: &str) -> String {
    let without_fences = CODE_FENCE.replace_all(raw, " ");
    let without_headings = HEADING_MARKER.replace_all(&without_fences, "");
    let without_bold = without_headings.replace("**", "");
    let without_control: String = without_bold
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect();

    WHITESPACE_RUN
        .replace_all(&without_control, " ")
        .trim()
        .to_string()
}

/// Returns the last top-level `{...}` span whose braces balance, ignoring
/// braces inside string literals. An opening brace that never closes is
/// skipped and the scan resumes just after it.
fn last_balanced_object(text: &str) -> Option<&str> {
    let mut offset = 0;
    let mut last = None;

    loop {
        let scan = scan_balanced(&text[offset..]);
        if let Some((start, end)) = scan.last_span {
            last = Some(&text[offset + start..=offset + end]);
        }
        match scan.unclosed {
            Some(open) => offset += open + 1,
            None => return last,
        }
    }
}

struct BraceScan {
    /// Byte range of the last balanced top-level span.
    last_span: Option<(usize, usize)>,
    /// Start of a top-level span still open at end of input.
    unclosed: Option<usize>,
}

fn scan_balanced(text: &str) -> BraceScan {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;
    let mut start = None;
    let mut last_span = None;

    for (i, c) in text.char_indices() {
        if in_string {
            if escape_next {
                escape_next = false;
            } else if c == '\\' {
                escape_next = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            // Quotes in surrounding prose are not string delimiters.
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start.take() {
                        last_span = Some((s, i));
                    }
                }
            }
            _ => {}
        }
    }

    BraceScan {
        last_span,
        unclosed: if depth > 0 { start } else { None },
    }
}

/// A bare item carries a `type` tag and scalar `content` but neither a
/// title nor a summary.
fn is_single_item(object: &Map<String, Value>) -> bool {
    let has_type = object.get("type").is_some_and(Value::is_string);
    let scalar_content = object
        .get("content")
        .is_some_and(|c| !c.is_array() && !c.is_null());

    has_type
        && scalar_content
        && !object.contains_key("title")
        && !object.contains_key("summary")
}

/// Decodes one loosely-typed value into a content item, repairing what it can.
fn decode_item(value: &Value) -> Option<ContentItem> {
    let object = match value {
        Value::Object(object) => object,
        Value::Array(_) | Value::Null => return None,
        other => return scalar_text(other).map(ContentItem::text),
    };

    let tag = object.get("type").and_then(Value::as_str);
    let content = text_field(object, "content");

    match tag.and_then(ContentKind::parse) {
        Some(ContentKind::Text) => content.map(ContentItem::text),
        Some(ContentKind::Suggestion) => content.map(ContentItem::suggestion),
        Some(ContentKind::Warning) => content.map(ContentItem::warning),
        Some(ContentKind::List) => {
            let items: Vec<String> = object
                .get("items")
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(list_entry).collect())
                .unwrap_or_default();

            if items.is_empty() {
                content.map(ContentItem::text)
            } else {
                Some(ContentItem::list(text_field(object, "title"), items))
            }
        }
        Some(ContentKind::Resource) => {
            let title = text_field(object, "title");
            match text_field(object, "url") {
                Some(url) => Some(ContentItem::Resource {
                    title: title.clone().unwrap_or_else(|| url.clone()),
                    content: content.or(title).unwrap_or_default(),
                    url,
                }),
                None => content.or(title).map(ContentItem::text),
            }
        }
        Some(ContentKind::Code) => content.map(|content| ContentItem::Code {
            content,
            language: text_field(object, "language"),
        }),
        None => {
            warn!(item_type = ?tag, "Unknown content item type, repairing as text");
            content
                .or_else(|| text_field(object, "text"))
                .or_else(|| text_field(object, "title"))
                .map(ContentItem::text)
        }
    }
}

fn list_entry(value: &Value) -> Option<String> {
    match value {
        Value::Object(object) => {
            text_field(object, "content").or_else(|| text_field(object, "text"))
        }
        other => scalar_text(other),
    }
}

/// Reads a non-blank textual field, stringifying numbers and booleans.
fn text_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(scalar_text)
}

fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Cuts `text` to `max_chars` characters, appending "..." when it was longer.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Returns text up to and including the first sentence terminator that is
/// followed by whitespace or the end of input.
fn first_sentence(text: &str) -> &str {
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            let at_boundary = chars.peek().map_or(true, |(_, next)| next.is_whitespace());
            if at_boundary {
                return &text[..i + c.len_utf8()];
            }
        }
    }
    text
}

/// Picks a topical title from the user's prompt.
pub fn fallback_title(prompt: &str) -> &'static str {
    let prompt = prompt.to_lowercase();
    TOPIC_TITLES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| prompt.contains(k)))
        .map(|(_, title)| *title)
        .unwrap_or(DEFAULT_TITLE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> ResponseNormalizer {
        ResponseNormalizer::new()
    }

    const WELL_FORMED: &str = r#"{"title":"Tenant Rights","summary":"Tenants have rights.","content":[{"type":"text","content":"Your landlord must keep the unit habitable."},{"type":"list","title":"Key Issues","items":["Repairs","Deposit"]},{"type":"resource","title":"Legal Aid","content":"Free help","url":"https://example.org"},{"type":"code","content":"Dear landlord,","language":"text"}]}"#;

    // ─── Structured Stages ───────────────────────────────────────────

    #[test]
    fn well_formed_document_round_trips() {
        let doc = normalizer().parse(WELL_FORMED, "tenant question");
        let reserialized = serde_json::to_string(&doc).unwrap();
        let again = normalizer().parse(&reserialized, "tenant question");

        assert_eq!(doc.title, "Tenant Rights");
        assert_eq!(doc.summary, "Tenants have rights.");
        assert_eq!(doc.content.len(), 4);
        assert_eq!(doc, again);
    }

    #[test]
    fn fenced_json_parses_like_unwrapped() {
        let fenced = format!("```json\n{}\n```", WELL_FORMED);
        assert_eq!(
            normalizer().parse(&fenced, ""),
            normalizer().parse(WELL_FORMED, "")
        );
    }

    #[test]
    fn surrounding_prose_is_ignored() {
        let raw = format!("Sure! Here is your answer:\n{}\nHope this helps.", WELL_FORMED);
        let doc = normalizer().parse(&raw, "");
        assert_eq!(doc.title, "Tenant Rights");
    }

    #[test]
    fn last_balanced_object_wins() {
        let raw = r#"Draft: {"title":"Draft","summary":"old","content":[]} Final: {"title":"Final","summary":"new","content":[]}"#;
        let doc = normalizer().parse(raw, "");
        assert_eq!(doc.title, "Final");
        assert_eq!(doc.summary, "new");
    }

    #[test]
    fn braces_inside_strings_do_not_split_spans() {
        let raw = r#"{"title":"Use {braces} carefully","summary":"s","content":[]}"#;
        let doc = normalizer().parse(raw, "");
        assert_eq!(doc.title, "Use {braces} carefully");
    }

    #[test]
    fn markdown_markers_are_stripped() {
        let raw = "## Answer\n{\"title\":\"**Lease** Basics\",\"summary\":\"s\",\"content\":[]}";
        let doc = normalizer().parse(raw, "");
        assert_eq!(doc.title, "Lease Basics");
    }

    #[test]
    fn literal_newlines_inside_values_are_repaired() {
        let raw = "{\"title\":\"T\",\"summary\":\"line one\nline two\",\"content\":[]}";
        let doc = normalizer().parse(raw, "");
        assert_eq!(doc.summary, "line one line two");
    }

    #[test]
    fn unclosed_brace_in_leading_prose_is_skipped() {
        let raw = format!("Fill in section {{A of the form. {}", WELL_FORMED);
        let doc = normalizer().parse(&raw, "");
        assert_eq!(doc.title, "Tenant Rights");
        assert_eq!(doc.content.len(), 4);
    }

    #[test]
    fn unclosed_brace_after_document_keeps_document() {
        let raw = format!("{} and then {{ trailing", WELL_FORMED);
        let doc = normalizer().parse(&raw, "");
        assert_eq!(doc.title, "Tenant Rights");
    }

    // ─── Single Item Wrapping ────────────────────────────────────────

    #[test]
    fn bare_item_is_wrapped_with_legal_analysis_title() {
        let raw = r#"{"type":"text","content":"Short answer."}"#;
        let doc = normalizer().parse(raw, "");

        assert_eq!(doc.title, SINGLE_ITEM_TITLE);
        assert_eq!(doc.summary, "Short answer.");
        assert_eq!(doc.content, vec![ContentItem::text("Short answer.")]);
    }

    #[test]
    fn titled_object_with_type_keeps_its_title() {
        let raw = r#"{"type":"analysis","title":"Eviction Notice Rules","content":"Landlords must give 30 days notice."}"#;
        let doc = normalizer().parse(raw, "");

        assert_eq!(doc.title, "Eviction Notice Rules");
        assert_eq!(doc.summary, "Landlords must give 30 days notice.");
        assert_eq!(
            doc.content,
            vec![ContentItem::text("Landlords must give 30 days notice.")]
        );
    }

    #[test]
    fn bare_item_summary_is_truncated_with_ellipsis() {
        let long = "x".repeat(150);
        let raw = format!(r#"{{"type":"warning","content":"{}"}}"#, long);
        let doc = normalizer().parse(&raw, "");

        assert_eq!(doc.summary, format!("{}...", "x".repeat(100)));
        assert_eq!(doc.content, vec![ContentItem::warning(long)]);
    }

    // ─── Backfill ────────────────────────────────────────────────────

    #[test]
    fn missing_title_gets_placeholder() {
        let doc = normalizer().parse(r#"{"summary":"s","content":[]}"#, "");
        assert_eq!(doc.title, DEFAULT_TITLE);
    }

    #[test]
    fn missing_summary_uses_truncated_content() {
        let raw = r#"{"title":"T","content":[{"type":"list","items":["a"]},{"type":"text","content":"Body text."}]}"#;
        let doc = normalizer().parse(raw, "");
        assert_eq!(doc.summary, "Body text.");
    }

    #[test]
    fn missing_summary_without_text_uses_placeholder() {
        let doc = normalizer().parse(r#"{"title":"T","content":[]}"#, "");
        assert_eq!(doc.summary, DEFAULT_SUMMARY);
    }

    #[test]
    fn string_content_is_wrapped_in_text_item() {
        let doc = normalizer().parse(r#"{"title":"T","summary":"S","content":"Plain body"}"#, "");
        assert_eq!(doc.content, vec![ContentItem::text("Plain body")]);
    }

    #[test]
    fn missing_content_uses_summary_as_body() {
        let doc = normalizer().parse(r#"{"title":"T","summary":"Only summary"}"#, "");
        assert_eq!(doc.content, vec![ContentItem::text("Only summary")]);
    }

    // ─── Item Repair ─────────────────────────────────────────────────

    #[test]
    fn unknown_type_is_repaired_to_text() {
        let raw = r#"{"title":"T","summary":"S","content":[{"type":"table","content":"cells"}]}"#;
        let doc = normalizer().parse(raw, "");
        assert_eq!(doc.content, vec![ContentItem::text("cells")]);
    }

    #[test]
    fn resource_without_url_degrades_to_text() {
        let raw = r#"{"title":"T","summary":"S","content":[{"type":"resource","title":"Legal Aid","content":"Call them"}]}"#;
        let doc = normalizer().parse(raw, "");
        assert_eq!(doc.content, vec![ContentItem::text("Call them")]);
    }

    #[test]
    fn list_keeps_only_textual_entries() {
        let raw = r#"{"title":"T","summary":"S","content":[{"type":"list","title":"Steps","items":["one",2,null,{"content":"three"}]}]}"#;
        let doc = normalizer().parse(raw, "");
        assert_eq!(
            doc.content,
            vec![ContentItem::list(
                Some("Steps".into()),
                vec!["one".into(), "2".into(), "three".into()]
            )]
        );
    }

    #[test]
    fn empty_items_are_dropped() {
        let raw = r#"{"title":"T","summary":"S","content":[{"type":"text","content":"  "},null,{"type":"text","content":"kept"}]}"#;
        let doc = normalizer().parse(raw, "");
        assert_eq!(doc.content, vec![ContentItem::text("kept")]);
    }

    // ─── Total Failure Fallback ──────────────────────────────────────

    #[test]
    fn garbage_yields_one_text_and_one_warning() {
        let raw = "I cannot format this. But here is some advice anyway.";
        let doc = normalizer().parse(raw, "my landlord kept my deposit");

        assert_eq!(doc.title, "Tenant Rights Information");
        assert_eq!(doc.summary, "I cannot format this.");
        assert_eq!(doc.count_of(ContentKind::Text), 1);
        assert_eq!(doc.count_of(ContentKind::Warning), 1);
        assert_eq!(doc.content[0], ContentItem::text(raw));
        assert_eq!(doc.content[1], ContentItem::warning(DISCLAIMER));
    }

    #[test]
    fn invalid_json_span_falls_back() {
        let raw = "{title: missing quotes}";
        let result = normalizer().try_parse(raw);
        assert!(matches!(result, Err(NormalizeError::InvalidJson(_))));

        let doc = normalizer().parse(raw, "");
        assert_eq!(doc.title, DEFAULT_TITLE);
        assert_eq!(doc.content.len(), 2);
    }

    #[test]
    fn unbalanced_braces_report_no_object() {
        assert_eq!(
            normalizer().try_parse("{\"title\": \"T\""),
            Err(NormalizeError::NoJsonObject)
        );
    }

    #[test]
    fn empty_input_still_produces_valid_document() {
        let doc = normalizer().parse("", "");
        assert!(!doc.title.is_empty());
        assert!(!doc.summary.is_empty());
        assert_eq!(doc.content.len(), 2);
    }

    #[test]
    fn fallback_summary_is_capped() {
        let raw = "word ".repeat(60);
        let doc = normalizer().parse(&raw, "");
        assert_eq!(doc.summary.chars().count(), 103);
        assert!(doc.summary.ends_with("..."));
    }

    #[test]
    fn custom_disclaimer_is_used() {
        let doc = ResponseNormalizer::new()
            .with_disclaimer("Not advice.")
            .parse("garbage", "");
        assert_eq!(doc.content[1], ContentItem::warning("Not advice."));
    }

    // ─── Helpers ─────────────────────────────────────────────────────

    #[test]
    fn fallback_title_matches_topics() {
        assert_eq!(fallback_title("I was FIRED without notice"), "Employment Law Information");
        assert_eq!(fallback_title("custody of my kids"), "Family Law Information");
        assert_eq!(fallback_title("Is this agreement binding?"), "Contract Law Information");
        assert_eq!(fallback_title("What is a tort?"), DEFAULT_TITLE);
    }

    #[test]
    fn truncate_handles_multibyte_characters() {
        let text = "é".repeat(5);
        assert_eq!(truncate_with_ellipsis(&text, 3), "ééé...");
        assert_eq!(truncate_with_ellipsis(&text, 5), text);
    }

    #[test]
    fn first_sentence_ignores_decimal_points() {
        assert_eq!(first_sentence("It costs 3.50 dollars. Pay now."), "It costs 3.50 dollars.");
        assert_eq!(first_sentence("No terminator"), "No terminator");
    }
}
