use super::citations::extract_citations;
use super::rules::{group_thousands, patterns, RuleSet};
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityStats {
    pub char_count: usize,
    pub citation_count: usize,
    /// Forbidden phrases found outside quoted material, in rule-table order.
    pub forbidden_phrases: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityCheckResult {
    pub passed: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: QualityStats,
}

/// Validate a generated report against the default rule set.
pub fn validate(report: &str) -> QualityCheckResult {
    validate_with(report, &RuleSet::default())
}

/// Evaluate every rule and collect all findings; nothing short-circuits.
pub fn validate_with(report: &str, rules: &RuleSet) -> QualityCheckResult {
    let pats = patterns();
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let char_count = report.chars().count();
    if char_count < rules.min_chars {
        warnings.push(format!(
            "文字数が少なすぎます（{}字 < {}字）",
            group_thousands(char_count),
            group_thousands(rules.min_chars)
        ));
    } else if char_count > rules.max_chars {
        warnings.push(format!(
            "文字数が多すぎます（{}字 > {}字）",
            group_thousands(char_count),
            group_thousands(rules.max_chars)
        ));
    }

    let citation_count = extract_citations(report).len();
    if citation_count == 0 {
        errors.push("引用が1つも含まれていません（#セッション番号 が必要）".to_string());
    } else if citation_count < rules.citation_warning_floor {
        warnings.push(format!(
            "引用が少なすぎます（{}件）。より多くの具体例を引用してください",
            citation_count
        ));
    }

    // Quoted participant speech may legitimately contain forbidden wording.
    let without_quotes = pats.quoted_citation.replace_all(report, "");
    let authored = pats.speaker_line.replace_all(&without_quotes, "");

    let mut forbidden_phrases = Vec::new();
    for category in rules.forbidden {
        for phrase in category.phrases {
            if authored.contains(phrase) {
                errors.push(format!(
                    "禁止された{}が含まれています: 「{}」",
                    category.label, phrase
                ));
                forbidden_phrases.push(phrase.to_string());
            }
        }
    }

    if pats.html_tag.is_match(report) {
        errors.push("HTMLタグが含まれています。Markdownのみを使用してください".to_string());
    }

    if pats.bold.is_match(report) {
        warnings.push("太字マークダウン（**）が使用されています。日本語では推奨されません".to_string());
    }

    QualityCheckResult {
        passed: errors.is_empty(),
        errors,
        warnings,
        stats: QualityStats {
            char_count,
            citation_count,
            forbidden_phrases,
        },
    }
}

/// Console summary of a validation result.
pub fn render_quality_summary(result: &QualityCheckResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Quality check");
    let _ = writeln!(
        out,
        "  characters: {}",
        group_thousands(result.stats.char_count)
    );
    let _ = writeln!(out, "  citations:  {}", result.stats.citation_count);

    if !result.errors.is_empty() {
        let _ = writeln!(out, "\nErrors:");
        for error in &result.errors {
            let _ = writeln!(out, "  - {}", error);
        }
    }
    if !result.warnings.is_empty() {
        let _ = writeln!(out, "\nWarnings:");
        for warning in &result.warnings {
            let _ = writeln!(out, "  - {}", warning);
        }
    }

    let verdict = match (result.passed, result.warnings.is_empty()) {
        (true, true) => "All quality checks passed.",
        (true, false) => "Required checks passed (with warnings).",
        (false, _) => "Report does not meet the quality bar.",
    };
    let _ = writeln!(out, "\n{}", verdict);
    out
}
