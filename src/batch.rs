//! One analysis run: load, compose, select, generate, check, write.
//!
//! Generation and validation are strictly sequential. Artifacts are staged in
//! a scratch directory and moved into place only once all three are written.
//! The generator is only built once the theme, dataset and model check out.

use crate::dataset::{format_transcript, load_research, DataSource, ResearchContext};
use crate::error::AnalysisError;
use crate::llm::{
    compose_analysis_prompt, estimate_tokens, hypothesis_extraction_prompt, lookup, select_model,
    InterviewOverrides, ModelChoice, ModelDescriptor, ModelSelection, ReportGenerator, Usage,
    HIGH_CAPACITY_MODEL_KEY, REPORT_SYSTEM_MESSAGE, SYSTEM_INSTRUCTION,
};
use crate::report::{
    cross_reference, render_markdown, render_quality_summary, session_details, summarize, validate,
    QualityCheckResult, QuantitativeStats, SerializedStats, TOP_CITED_LIMIT,
};
use crate::themes::{theme_config, theme_slugs, Hypothesis, ThemeConfig};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

pub const REPORT_FILE: &str = "final-report.md";
pub const QUANTITATIVE_FILE: &str = "quantitative-analysis.md";
pub const METADATA_FILE: &str = "metadata.json";

/// Sessions sampled when drafting hypotheses and no limit is given.
pub const DRAFT_SAMPLE_SESSIONS: usize = 5;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub slug: String,
    /// Keep only the first N sessions; `None` or 0 keeps all.
    pub limit: Option<usize>,
    pub model: ModelChoice,
    pub research_path: Option<PathBuf>,
    pub overrides: Option<InterviewOverrides>,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Treat a failed quality check as fatal instead of recording it.
    pub require_quality: bool,
    /// Cap on the output reservation requested from the model.
    pub max_output_tokens: Option<usize>,
}

impl BatchOptions {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            limit: None,
            model: ModelChoice::default(),
            research_path: None,
            overrides: None,
            data_dir: PathBuf::from("."),
            output_dir: PathBuf::from("logs"),
            require_quality: false,
            max_output_tokens: None,
        }
    }
}

#[derive(Debug)]
pub enum BatchOutcome {
    Completed(Box<RunSummary>),
    /// The slug matched no sessions; nothing was generated or written.
    NoSessions {
        slug: String,
        known_slugs: Vec<String>,
    },
}

#[derive(Debug)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub output_dir: PathBuf,
    pub report_path: PathBuf,
    pub quantitative_path: PathBuf,
    pub metadata_path: PathBuf,
    pub selection: ModelSelection,
    pub stats: QuantitativeStats,
    pub quality: QualityCheckResult,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ModelMetadata<'a> {
    key: &'a str,
    name: &'a str,
    max_context_tokens: usize,
    max_output_tokens: usize,
    auto_selected: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResearchMetadata<'a> {
    title: &'a str,
    timestamp: &'a str,
    included_in_analysis: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunMetadata<'a> {
    run_id: Uuid,
    slug: &'a str,
    model: ModelMetadata<'a>,
    session_count: usize,
    message_count: usize,
    estimated_tokens: usize,
    total_tokens: usize,
    /// Seconds spent in the generation call, one decimal.
    execution_time: String,
    timestamp: DateTime<Utc>,
    deep_research: Option<ResearchMetadata<'a>>,
    quantitative_analysis: SerializedStats,
    quality_check: &'a QualityCheckResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    usage: Option<&'a Usage>,
}

fn load_optional_research(path: Option<&Path>) -> Result<Option<ResearchContext>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let research = load_research(path)
        .with_context(|| format!("Failed to load research file '{}'", path.display()))?;
    match &research {
        Some(r) => tracing::info!(title = %r.title, "research context loaded"),
        None => tracing::warn!(path = %path.display(), "continuing without research context"),
    }
    Ok(research)
}

/// Apply the configured output cap without ever raising the model's own limit.
fn effective_model(model: &ModelDescriptor, cap: Option<usize>) -> ModelDescriptor {
    let mut effective = *model;
    if let Some(cap) = cap.filter(|c| *c > 0) {
        effective.max_output_tokens = effective.max_output_tokens.min(cap);
    }
    effective
}

/// Pick a fresh `<slug>-<timestamp>` directory under `parent`.
fn run_directory(parent: &Path, slug: &str, run_id: &Uuid) -> PathBuf {
    let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S");
    let candidate = parent.join(format!("{}-{}", slug, timestamp));
    if candidate.exists() {
        let short = run_id.simple().to_string();
        parent.join(format!("{}-{}-{}", slug, timestamp, &short[..8]))
    } else {
        candidate
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| AnalysisError::io(path, e))?;
    Ok(())
}

/// Write all three artifacts into `final_dir`, or none of them.
fn write_artifacts(
    final_dir: &Path,
    report: &str,
    quantitative: &str,
    metadata: &RunMetadata<'_>,
) -> Result<()> {
    let parent = final_dir
        .parent()
        .context("Output directory has no parent")?;
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create output directory '{}'", parent.display()))?;

    let staging = final_dir.with_extension("partial");
    fs::create_dir_all(&staging).map_err(|e| AnalysisError::io(&staging, e))?;

    let staged = (|| -> Result<()> {
        write_file(&staging.join(REPORT_FILE), report)?;
        write_file(&staging.join(QUANTITATIVE_FILE), quantitative)?;
        let json = serde_json::to_string_pretty(metadata)?;
        write_file(&staging.join(METADATA_FILE), &json)?;
        fs::rename(&staging, final_dir).map_err(|e| AnalysisError::io(final_dir, e))?;
        Ok(())
    })();

    if staged.is_err() {
        let _ = fs::remove_dir_all(&staging);
    }
    staged
}

fn resolve_theme(slug: &str) -> Result<&'static ThemeConfig> {
    theme_config(slug).ok_or_else(|| {
        AnalysisError::UnknownTheme {
            slug: slug.to_string(),
            available: theme_slugs().join(", "),
        }
        .into()
    })
}

/// Run one batch analysis end to end.
///
/// `connect` builds the generator. It is called once, right before the
/// generation call, so configuration and dataset problems surface first.
pub async fn run<G, F>(options: &BatchOptions, connect: F) -> Result<BatchOutcome>
where
    G: ReportGenerator,
    F: FnOnce() -> crate::error::Result<G>,
{
    let theme = resolve_theme(&options.slug)?;
    if let ModelChoice::Manual(key) = &options.model {
        lookup(key)?;
    }
    tracing::info!(
        slug = %theme.slug,
        title = %theme.title,
        hypotheses = theme.hypotheses.len(),
        "theme resolved"
    );

    let research = load_optional_research(options.research_path.as_deref())?;

    let source = DataSource::new(&options.data_dir);
    let mut sessions = source
        .load_sessions(Some(&options.slug))
        .with_context(|| format!("Failed to load sessions from '{}'", source.root().display()))?;
    if let Some(limit) = options.limit.filter(|l| *l > 0) {
        sessions.truncate(limit);
        tracing::info!(limit, "session limit applied");
    }
    if sessions.is_empty() {
        let known_slugs = source.known_slugs()?;
        tracing::warn!(slug = %options.slug, "no sessions found");
        return Ok(BatchOutcome::NoSessions {
            slug: options.slug.clone(),
            known_slugs,
        });
    }

    let ids: HashSet<&str> = sessions.iter().map(|s| s.id.as_str()).collect();
    let messages = source
        .load_messages(Some(&ids))
        .with_context(|| format!("Failed to load messages from '{}'", source.root().display()))?;
    tracing::info!(
        sessions = sessions.len(),
        messages = messages.len(),
        "dataset loaded"
    );
    let silent = session_details(&sessions, &messages)
        .iter()
        .filter(|d| d.message_count == 0)
        .count();
    if silent > 0 {
        tracing::warn!(sessions = silent, "sessions without any messages");
    }

    let transcript = format_transcript(&sessions, &messages);
    let prompt = compose_analysis_prompt(
        theme,
        &transcript,
        options.overrides.as_ref(),
        research.as_ref(),
    );
    let estimated = estimate_tokens(&prompt);
    let selection = select_model(estimated, &options.model)?;
    tracing::info!(
        model = selection.model.key,
        estimated_tokens = estimated,
        total_tokens = selection.total_tokens,
        context_limit = selection.model.max_context_tokens,
        auto = selection.auto_selected,
        "model selected"
    );
    if selection.large_input_advisory {
        tracing::warn!(
            estimated_tokens = estimated,
            "large input; --model={} is recommended",
            HIGH_CAPACITY_MODEL_KEY
        );
    }

    let model = effective_model(selection.model, options.max_output_tokens);
    let generator = connect()?;
    let started = Instant::now();
    let generated = generator
        .generate(&model, REPORT_SYSTEM_MESSAGE, &prompt)
        .await?;
    let execution_secs = started.elapsed().as_secs_f64();

    let mut stats = summarize(&sessions, &messages)?;
    let distribution = cross_reference(&generated.content, &sessions);
    tracing::info!(
        resolved = distribution.total(),
        cited_sessions = distribution.iter().count(),
        "citations cross-referenced"
    );
    stats.merge_citations(distribution, &sessions, TOP_CITED_LIMIT);
    let quality = validate(&generated.content);

    if options.require_quality && !quality.passed {
        return Err(AnalysisError::QualityGate {
            error_count: quality.errors.len(),
            summary: render_quality_summary(&quality),
        }
        .into());
    }

    let run_id = Uuid::new_v4();
    let output_dir = run_directory(&options.output_dir, &options.slug, &run_id);
    let metadata = RunMetadata {
        run_id,
        slug: &options.slug,
        model: ModelMetadata {
            key: model.key,
            name: model.name,
            max_context_tokens: model.max_context_tokens,
            max_output_tokens: model.max_output_tokens,
            auto_selected: selection.auto_selected,
        },
        session_count: sessions.len(),
        message_count: messages.len(),
        estimated_tokens: estimated,
        total_tokens: selection.total_tokens,
        execution_time: format!("{:.1}", execution_secs),
        timestamp: Utc::now(),
        deep_research: research.as_ref().map(|r| ResearchMetadata {
            title: &r.title,
            timestamp: &r.timestamp,
            included_in_analysis: true,
        }),
        quantitative_analysis: stats.serialize(),
        quality_check: &quality,
        usage: generated.usage.as_ref(),
    };

    write_artifacts(
        &output_dir,
        &generated.content,
        &render_markdown(&stats),
        &metadata,
    )?;
    tracing::info!(path = %output_dir.display(), "artifacts written");

    Ok(BatchOutcome::Completed(Box::new(RunSummary {
        run_id,
        report_path: output_dir.join(REPORT_FILE),
        quantitative_path: output_dir.join(QUANTITATIVE_FILE),
        metadata_path: output_dir.join(METADATA_FILE),
        output_dir,
        selection,
        stats,
        quality,
    })))
}

/// Pull the JSON array out of a model answer, tolerating code fences and chatter.
fn parse_drafted_hypotheses(content: &str) -> crate::error::Result<Vec<Hypothesis>> {
    let (Some(start), Some(end)) = (content.find('['), content.rfind(']')) else {
        return Err(AnalysisError::MalformedResponse(
            "expected a JSON array of hypotheses".to_string(),
        ));
    };
    if end < start {
        return Err(AnalysisError::MalformedResponse(
            "expected a JSON array of hypotheses".to_string(),
        ));
    }
    Ok(serde_json::from_str(&content[start..=end])?)
}

/// Ask the model to draft hypotheses for `options.slug` from a sample of its sessions.
///
/// The slug does not need a registered theme; drafting is how new themes start.
/// Nothing is written to disk.
pub async fn draft_hypotheses<G, F>(options: &BatchOptions, connect: F) -> Result<Vec<Hypothesis>>
where
    G: ReportGenerator,
    F: FnOnce() -> crate::error::Result<G>,
{
    let theme = theme_config(&options.slug);
    let title = theme.map_or(options.slug.as_str(), |t| t.title.as_str());
    let description = options
        .overrides
        .as_ref()
        .and_then(|o| o.description.as_deref())
        .filter(|d| !d.trim().is_empty())
        .or(theme.map(|t| t.description.as_str()))
        .unwrap_or_default();

    let source = DataSource::new(&options.data_dir);
    let mut sessions = source
        .load_sessions(Some(&options.slug))
        .with_context(|| format!("Failed to load sessions from '{}'", source.root().display()))?;
    if sessions.is_empty() {
        return Err(AnalysisError::NoSessions {
            slug: options.slug.clone(),
        }
        .into());
    }
    sessions.truncate(options.limit.filter(|l| *l > 0).unwrap_or(DRAFT_SAMPLE_SESSIONS));

    let ids: HashSet<&str> = sessions.iter().map(|s| s.id.as_str()).collect();
    let messages = source
        .load_messages(Some(&ids))
        .with_context(|| format!("Failed to load messages from '{}'", source.root().display()))?;
    let samples = format_transcript(&sessions, &messages);
    let prompt = hypothesis_extraction_prompt(title, description, &samples);

    let selection = select_model(estimate_tokens(&prompt), &options.model)?;
    let model = effective_model(selection.model, options.max_output_tokens);
    tracing::info!(
        slug = %options.slug,
        sessions = sessions.len(),
        model = model.key,
        "drafting hypotheses"
    );

    let generator = connect()?;
    let generated = generator.generate(&model, SYSTEM_INSTRUCTION, &prompt).await?;
    let hypotheses = parse_drafted_hypotheses(&generated.content)
        .context("Model did not return usable hypotheses")?;
    tracing::info!(count = hypotheses.len(), "hypotheses drafted");
    Ok(hypotheses)
}
