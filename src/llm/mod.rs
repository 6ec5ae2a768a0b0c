//! Everything that touches the model: sizing, selection, prompt text and the HTTP call.

pub mod client;
pub mod models;
pub mod prompts;
pub mod tokens;

pub use client::{GeneratedReport, OpenRouterClient, ReportGenerator, REQUEST_TIMEOUT_SECS};
pub use models::{
    catalog, lookup, resolve, select_model, ModelChoice, ModelDescriptor, ModelSelection, Usage,
    AUTO_SELECT_THRESHOLD_TOKENS, DEFAULT_MODEL_KEY, HIGH_CAPACITY_MODEL_KEY,
};
pub use prompts::{
    compose_analysis_prompt, hypothesis_extraction_prompt, InterviewOverrides, InterviewQuestion,
    REPORT_SYSTEM_MESSAGE, SYSTEM_INSTRUCTION,
};
pub use tokens::estimate_tokens;
