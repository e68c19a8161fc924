//! Markdown rendering of structured documents for terminal output.

use super::case_analysis::CaseAnalysisResult;
use super::content::{ContentItem, StructuredDocument};

/// Renders a document as markdown: title heading, summary quote, then each
/// item in order.
pub fn render_markdown(document: &StructuredDocument) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", document.title));
    out.push_str(&format!("> {}\n\n", document.summary));

    for item in &document.content {
        match item {
            ContentItem::Text { content } => {
                out.push_str(&format!("{}\n\n", content));
            }
            ContentItem::List { title, items } => {
                if let Some(title) = title {
                    out.push_str(&format!("## {}\n", title));
                }
                for entry in items {
                    out.push_str(&format!("- {}\n", entry));
                }
                out.push('\n');
            }
            ContentItem::Suggestion { content } => {
                out.push_str(&format!("**Suggestion:** {}\n\n", content));
            }
            ContentItem::Warning { content } => {
                out.push_str(&format!("**Warning:** {}\n\n", content));
            }
            ContentItem::Resource {
                title,
                content,
                url,
            } => {
                out.push_str(&format!("[{}]({}) - {}\n\n", title, url, content));
            }
            ContentItem::Code { content, language } => {
                out.push_str(&format!(
                    "```{}\n{}\n```\n\n",
                    language.as_deref().unwrap_or(""),
                    content
                ));
            }
        }
    }

    out.trim_end().to_string() + "\n"
}

/// Renders the bucketed case view as markdown sections.
pub fn render_case_analysis(result: &CaseAnalysisResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", result.title));
    out.push_str(&format!("> {}\n\n", result.summary));

    let sections = [
        ("Key Issues", &result.key_issues),
        ("Recommended Actions", &result.recommended_actions),
        ("Potential Risks", &result.potential_risks),
        ("Next Steps", &result.next_steps),
    ];
    for (heading, entries) in sections {
        out.push_str(&format!("## {}\n", heading));
        for entry in entries {
            out.push_str(&format!("- {}\n", entry));
        }
        out.push('\n');
    }

    out.trim_end().to_string() + "\n"
}
