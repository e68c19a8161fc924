//! Document module - normalized AI answers and their derived views.
//!
//! - `StructuredDocument` / `ContentItem` - the renderable schema
//! - `ResponseNormalizer` - raw model text to `StructuredDocument`
//! - `CaseAnalysisResult` - best-effort bucketed view for case analysis
//! - `render_markdown` - plain markdown rendering for terminals

mod case_analysis;
mod content;
mod normalizer;
mod render;

pub use case_analysis::CaseAnalysisResult;
pub use content::{ContentItem, ContentKind, StructuredDocument, DEFAULT_SUMMARY, DEFAULT_TITLE};
pub use normalizer::{
    fallback_title, truncate_with_ellipsis, NormalizeError, ResponseNormalizer, DISCLAIMER,
    SINGLE_ITEM_TITLE, SUMMARY_MAX_CHARS,
};
pub use render::{render_case_analysis, render_markdown};
