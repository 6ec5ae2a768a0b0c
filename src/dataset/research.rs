use crate::error::{AnalysisError, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

const DEFAULT_RESEARCH_TITLE: &str = "Deep Research Result";
const MARKDOWN_SUMMARY_CHARS: usize = 500;

/// External research folded into the prompt as background context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchContext {
    pub title: String,
    pub summary: String,
    pub key_findings: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    pub timestamp: String,
    /// Used verbatim in place of the summary when present.
    pub full_content: Option<String>,
}

/// Load a research file (`.json` or `.md`/`.markdown`).
///
/// A missing file or an unsupported extension yields `Ok(None)` with a warning;
/// unreadable files and malformed JSON are errors.
pub fn load_research(path: &Path) -> Result<Option<ResearchContext>> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "research file not found");
        return Ok(None);
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "json" => {
            let content = read(path)?;
            Ok(Some(parse_research_json(&content)?))
        }
        "md" | "markdown" => {
            let content = read(path)?;
            Ok(Some(research_from_markdown(content)))
        }
        other => {
            tracing::warn!(path = %path.display(), extension = other, "unsupported research file format");
            Ok(None)
        }
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))
}

/// Text of a scalar field; non-string values are kept as compact JSON.
fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn text_field(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| raw.get(key)).and_then(text_value)
}

/// A list field as strings. A lone scalar counts as a one-item list.
fn list_field(raw: &Value, keys: &[&str]) -> Vec<String> {
    match keys.iter().find_map(|key| raw.get(key)) {
        Some(Value::Array(items)) => items.iter().filter_map(source_text).collect(),
        Some(other) => text_value(other).into_iter().collect(),
        None => Vec::new(),
    }
}

/// `{"title": .., "url": ..}` objects read as `title (url)`; anything else as text.
fn source_text(value: &Value) -> Option<String> {
    let title = value.get("title").and_then(Value::as_str);
    let url = value.get("url").and_then(Value::as_str);
    match (title, url) {
        (Some(title), Some(url)) => Some(format!("{} ({})", title, url)),
        (Some(only), None) | (None, Some(only)) => Some(only.to_string()),
        (None, None) => text_value(value),
    }
}

/// Any JSON document is accepted. Known fields are picked out and the whole
/// document is kept as the full content.
fn parse_research_json(content: &str) -> Result<ResearchContext> {
    let raw: Value = serde_json::from_str(content)?;
    Ok(ResearchContext {
        title: text_field(&raw, &["title"]).unwrap_or_else(|| DEFAULT_RESEARCH_TITLE.to_string()),
        summary: text_field(&raw, &["summary"]).unwrap_or_default(),
        key_findings: list_field(&raw, &["keyFindings", "key_findings"]),
        sources: list_field(&raw, &["sources"]),
        timestamp: text_field(&raw, &["timestamp"]).unwrap_or_else(|| Utc::now().to_rfc3339()),
        full_content: Some(serde_json::to_string_pretty(&raw)?),
    })
}

fn research_from_markdown(content: String) -> ResearchContext {
    let head: String = content.chars().take(MARKDOWN_SUMMARY_CHARS).collect();
    ResearchContext {
        title: DEFAULT_RESEARCH_TITLE.to_string(),
        summary: format!("{}...", head),
        key_findings: Vec::new(),
        sources: Vec::new(),
        timestamp: Utc::now().to_rfc3339(),
        full_content: Some(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn json_research_accepts_snake_case_findings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("research.json");
        fs::write(
            &path,
            r#"{"title":"MLETR動向","summary":"各国の採用状況","key_findings":["英国は2023年に施行"],"timestamp":"2025-01-01"}"#,
        )
        .unwrap();

        let research = load_research(&path).unwrap().unwrap();
        assert_eq!(research.title, "MLETR動向");
        assert_eq!(research.key_findings, vec!["英国は2023年に施行".to_string()]);
        assert_eq!(research.timestamp, "2025-01-01");
        assert!(research.full_content.unwrap().contains("\"summary\""));
    }

    #[test]
    fn json_research_defaults_title() {
        let research = parse_research_json(r#"{"keyFindings":["a","b"]}"#).unwrap();
        assert_eq!(research.title, DEFAULT_RESEARCH_TITLE);
        assert_eq!(research.summary, "");
        assert_eq!(research.key_findings.len(), 2);
    }

    #[test]
    fn json_research_accepts_object_sources_and_mixed_findings() {
        let research = parse_research_json(
            r#"{"title":"T","summary":"S","keyFindings":["採用国が増加",{"point":"費用"},3],"sources":[{"title":"MLETR","url":"https://uncitral.un.org/mletr"},"社内メモ",{"id":7}]}"#,
        )
        .unwrap();
        assert_eq!(
            research.key_findings,
            vec![
                "採用国が増加".to_string(),
                r#"{"point":"費用"}"#.to_string(),
                "3".to_string(),
            ]
        );
        assert_eq!(
            research.sources,
            vec![
                "MLETR (https://uncitral.un.org/mletr)".to_string(),
                "社内メモ".to_string(),
                r#"{"id":7}"#.to_string(),
            ]
        );
    }

    #[test]
    fn json_research_tolerates_unexpected_shapes() {
        let research = parse_research_json(r#"[{"note":"top-level array"}]"#).unwrap();
        assert_eq!(research.title, DEFAULT_RESEARCH_TITLE);
        assert!(research.key_findings.is_empty());
        assert!(research.full_content.unwrap().contains("top-level array"));

        let research = parse_research_json(r#"{"title":42,"keyFindings":"単一の発見"}"#).unwrap();
        assert_eq!(research.title, "42");
        assert_eq!(research.key_findings, vec!["単一の発見".to_string()]);
    }

    #[test]
    fn markdown_research_keeps_full_text_and_short_summary() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.md");
        let body = "調".repeat(800);
        fs::write(&path, &body).unwrap();

        let research = load_research(&path).unwrap().unwrap();
        assert_eq!(research.summary.chars().count(), MARKDOWN_SUMMARY_CHARS + 3);
        assert_eq!(research.full_content.as_deref(), Some(body.as_str()));
    }

    #[test]
    fn missing_or_unsupported_files_are_skipped() {
        let dir = tempdir().unwrap();
        assert!(load_research(&dir.path().join("absent.json")).unwrap().is_none());

        let txt = dir.path().join("notes.txt");
        fs::write(&txt, "plain").unwrap();
        assert!(load_research(&txt).unwrap().is_none());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();
        assert!(load_research(&path).is_err());
    }
}
