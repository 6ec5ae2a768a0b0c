//! Theme table: the hypotheses and context each analysis run is scoped to.
//!
//! Themes are process-wide read-only data. The table is built once on first
//! access and never mutated afterwards.

mod ai_plan;
mod bill_of_lading;
mod marumie_shikin;

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisDepth {
    Basic,
    Detailed,
    Comprehensive,
}

/// A pre-declared claim the generated report has to weigh against transcript evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hypothesis {
    pub id: String,
    pub category: String,
    pub description: String,
    pub priority: Priority,
}

impl Hypothesis {
    pub fn new(id: &str, category: &str, priority: Priority, description: &str) -> Self {
        Self {
            id: id.to_string(),
            category: category.to_string(),
            description: description.to_string(),
            priority,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeConfig {
    pub slug: String,
    pub title: String,
    pub description: String,
    /// Report sections follow this order.
    pub hypotheses: Vec<Hypothesis>,
    pub context_keywords: Vec<String>,
    pub analysis_depth: AnalysisDepth,
}

static THEMES: OnceLock<Vec<ThemeConfig>> = OnceLock::new();

fn build_themes() -> Vec<ThemeConfig> {
    vec![
        bill_of_lading::theme(),
        ai_plan::theme(),
        marumie_shikin::theme(),
    ]
}

/// All registered themes, in registration order.
pub fn all_themes() -> &'static [ThemeConfig] {
    THEMES.get_or_init(build_themes)
}

/// Look up a theme by slug.
pub fn theme_config(slug: &str) -> Option<&'static ThemeConfig> {
    all_themes().iter().find(|theme| theme.slug == slug)
}

pub fn theme_slugs() -> Vec<&'static str> {
    all_themes().iter().map(|theme| theme.slug.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn slugs_are_unique() {
        let slugs = theme_slugs();
        let unique: HashSet<_> = slugs.iter().collect();
        assert_eq!(slugs.len(), unique.len());
    }

    #[test]
    fn lookup_by_slug() {
        let theme = theme_config("bill-of-lading").expect("bill-of-lading theme");
        assert_eq!(theme.title, "船荷証券の電子化法案");
        assert_eq!(theme.hypotheses.first().map(|h| h.id.as_str()), Some("B1"));
        assert!(theme_config("no-such-theme").is_none());
    }

    #[test]
    fn hypothesis_ids_are_unique_within_each_theme() {
        for theme in all_themes() {
            let ids: HashSet<_> = theme.hypotheses.iter().map(|h| h.id.as_str()).collect();
            assert_eq!(ids.len(), theme.hypotheses.len(), "duplicate ids in {}", theme.slug);
            assert!(!theme.hypotheses.is_empty());
        }
    }

    #[test]
    fn table_is_built_once() {
        let first = all_themes().as_ptr();
        let second = all_themes().as_ptr();
        assert_eq!(first, second);
    }

    #[test]
    fn theme_serializes_with_camel_case_keys() {
        let theme = theme_config("ai-plan-test").unwrap();
        let value = serde_json::to_value(theme).unwrap();
        assert!(value.get("contextKeywords").is_some());
        assert_eq!(value["analysisDepth"], "comprehensive");
        assert_eq!(value["hypotheses"][0]["priority"], "high");
    }
}
