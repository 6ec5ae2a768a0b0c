//! Post-generation checks on a report: lexical quality rules, citation
//! cross-referencing and quantitative statistics.

pub mod citations;
pub mod quality;
pub mod rules;
pub mod stats;

pub use citations::{cross_reference, extract_citations, top_cited, CitationDistribution, CitationRef, CitedSession};
pub use quality::{render_quality_summary, validate, validate_with, QualityCheckResult, QualityStats};
pub use rules::RuleSet;
pub use stats::{
    render_console_summary, render_markdown, session_details, summarize, QuantitativeStats, SerializedStats,
    SessionAnalytics, TOP_CITED_LIMIT,
};
