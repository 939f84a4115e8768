//! Report output formats.
//!
//! The structured object, the CSV export and the Markdown summary are all rendered from
//! [`report_rows`]. None of them looks at the evaluation method or prompt to label a row.

use std::borrow::Cow;

use serde::{Serialize, Serializer};

use crate::criteria::EvaluationMethod;

use super::aggregate::JudgementIssue;
use super::explanation::ExplanationSource;
use super::identity::ReportIdentity;
use super::types::{Outcome, RankedDocument, ReportArtifact, WinCounts};

pub const CSV_HEADER: [&str; 9] = [
    "Comparison",
    "Criterion",
    "Document A",
    "Document A Score",
    "Document A Analysis",
    "Document B",
    "Document B Score",
    "Document B Analysis",
    "Detailed Reasoning",
];

// =============================================================================
// Shared row model
// =============================================================================

/// One judgement as every output format sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow<'a> {
    pub ordinal: usize,
    pub criterion: &'a str,
    pub document_a: &'a str,
    pub score_a: f64,
    pub analysis_a: Option<&'a str>,
    pub document_b: &'a str,
    pub score_b: f64,
    pub analysis_b: Option<&'a str>,
    pub winner: &'a str,
    pub outcome: Outcome,
    pub counted: bool,
    pub reasoning: &'a str,
}

/// Rows in store order.
pub fn report_rows(artifact: &ReportArtifact) -> Vec<ReportRow<'_>> {
    artifact
        .judgements
        .iter()
        .map(|nj| {
            let input = &nj.judgement.input;
            ReportRow {
                ordinal: nj.judgement.ordinal,
                criterion: &nj.criterion_label,
                document_a: &input.document_a,
                score_a: input.score_a,
                analysis_a: input.analysis_a.as_deref(),
                document_b: &input.document_b,
                score_b: input.score_b,
                analysis_b: input.analysis_b.as_deref(),
                winner: &input.winner,
                outcome: nj.outcome,
                counted: nj.counted,
                reasoning: &input.reasoning,
            }
        })
        .collect()
}

// =============================================================================
// Structured object
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ReportObject {
    #[serde(flatten)]
    pub identity: ReportIdentity,
    pub evaluation_method: EvaluationMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_prompt: Option<String>,
    pub criteria: Vec<String>,
    pub criterion_count: usize,
    pub documents: Vec<String>,
    pub ranking: Vec<RankedDocument>,
    pub win_counts: WinCounts,
    pub top_document: Option<String>,
    pub explanation: String,
    pub explanation_source: ExplanationSource,
    pub comparisons: Vec<ComparisonEntry>,
    pub issues: Vec<JudgementIssue>,
    pub input_digest: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonEntry {
    pub ordinal: usize,
    pub criterion: String,
    pub document_a: String,
    #[serde(serialize_with = "serialize_score")]
    pub score_a: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_a: Option<String>,
    pub document_b: String,
    #[serde(serialize_with = "serialize_score")]
    pub score_b: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_b: Option<String>,
    pub winner: String,
    pub outcome: Outcome,
    pub counted: bool,
    pub reasoning: String,
}

impl ComparisonEntry {
    fn from_row(row: &ReportRow<'_>) -> Self {
        Self {
            ordinal: row.ordinal,
            criterion: row.criterion.to_string(),
            document_a: row.document_a.to_string(),
            score_a: row.score_a,
            analysis_a: row.analysis_a.map(str::to_string),
            document_b: row.document_b.to_string(),
            score_b: row.score_b,
            analysis_b: row.analysis_b.map(str::to_string),
            winner: row.winner.to_string(),
            outcome: row.outcome,
            counted: row.counted,
            reasoning: row.reasoning.to_string(),
        }
    }
}

pub fn to_report_object(artifact: &ReportArtifact) -> ReportObject {
    ReportObject {
        identity: artifact.identity.clone(),
        evaluation_method: artifact.evaluation_method,
        custom_prompt: artifact.custom_prompt.clone(),
        criteria: artifact.criteria.clone(),
        criterion_count: artifact.criterion_count,
        documents: artifact.documents.clone(),
        ranking: artifact.ranking.clone(),
        win_counts: artifact.win_counts.clone(),
        top_document: artifact.top_document.clone(),
        explanation: artifact.explanation.clone(),
        explanation_source: artifact.explanation_source.clone(),
        comparisons: report_rows(artifact)
            .iter()
            .map(ComparisonEntry::from_row)
            .collect(),
        issues: artifact.issues.clone(),
        input_digest: artifact.input_digest.clone(),
    }
}

// =============================================================================
// CSV
// =============================================================================

/// Header plus one record per judgement, in store order.
pub fn to_csv(artifact: &ReportArtifact) -> String {
    let mut out = csv_record(&CSV_HEADER);
    for row in report_rows(artifact) {
        let ordinal = row.ordinal.to_string();
        let score_a = format_score(row.score_a);
        let score_b = format_score(row.score_b);
        out.push_str(&csv_record(&[
            ordinal.as_str(),
            row.criterion,
            row.document_a,
            score_a.as_str(),
            row.analysis_a.unwrap_or(""),
            row.document_b,
            score_b.as_str(),
            row.analysis_b.unwrap_or(""),
            row.reasoning,
        ]));
    }
    out
}

/// Comma-joined record terminated by `\n`, with RFC 4180 quoting where needed.
pub fn csv_record(fields: &[&str]) -> String {
    let mut line = fields
        .iter()
        .map(|f| csv_field(f))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Scores render without a trailing `.0` when integral; non-finite scores as `NaN`,
/// `inf` or `-inf`.
pub fn format_score(score: f64) -> String {
    format!("{score}")
}

/// Finite scores as JSON numbers, anything else as the same text the CSV carries.
fn serialize_score<S: Serializer>(score: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if score.is_finite() {
        serializer.serialize_f64(*score)
    } else {
        serializer.serialize_str(&format_score(*score))
    }
}

// =============================================================================
// Markdown
// =============================================================================

pub fn render_report_markdown(artifact: &ReportArtifact) -> String {
    let mut out = String::new();
    match &artifact.identity.name {
        Some(name) => out.push_str(&format!("# {name}\n\n")),
        None => out.push_str("# Comparison Report\n\n"),
    }
    out.push_str(&format!("- Report ID: `{}`\n", artifact.identity.report_id));
    out.push_str(&format!("- Created: {}\n", artifact.identity.created_at_key()));
    out.push_str(&format!(
        "- Evaluation method: {}\n",
        artifact.evaluation_method.as_str()
    ));
    if let Some(prompt) = &artifact.custom_prompt {
        out.push_str(&format!("- Custom prompt: {prompt}\n"));
    }
    out.push_str(&format!("- Criteria: {}\n", artifact.criterion_count));
    out.push_str(&format!("- Documents: {}\n", artifact.documents.len()));
    out.push_str(&format!("- Comparisons: {}\n", artifact.judgements.len()));
    out.push_str(&format!("- Input digest: `{}`\n", artifact.input_digest));

    out.push_str("\n## Ranking\n\n");
    if artifact.ranking.is_empty() {
        out.push_str("_No documents were compared._\n");
    }
    for entry in &artifact.ranking {
        out.push_str(&format!(
            "{}. {} ({} {})\n",
            entry.rank,
            entry.document,
            entry.wins,
            if entry.wins == 1 { "win" } else { "wins" }
        ));
    }

    out.push_str("\n## Explanation\n\n");
    out.push_str(&artifact.explanation);
    out.push('\n');

    let rows = report_rows(artifact);
    if !rows.is_empty() {
        out.push_str("\n## Comparisons\n\n");
        for row in &rows {
            out.push_str(&format!(
                "- #{} [{}] {} ({}) vs {} ({}): winner {}{}\n",
                row.ordinal,
                row.criterion,
                row.document_a,
                format_score(row.score_a),
                row.document_b,
                format_score(row.score_b),
                row.winner,
                if row.counted { "" } else { " (not counted)" }
            ));
        }
    }

    if !artifact.issues.is_empty() {
        out.push_str("\n## Issues\n\n");
        for issue in &artifact.issues {
            out.push_str(&format!("- {issue}\n"));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::criteria::EvaluationConfig;
    use crate::report::build::{build_report, ReportOptions};
    use crate::report::store::PairwiseResultStore;
    use crate::report::types::JudgementInput;

    fn build(config: EvaluationConfig, inputs: Vec<JudgementInput>) -> ReportArtifact {
        let store: PairwiseResultStore = inputs.into_iter().collect();
        build_report(&config, &store, &BTreeMap::new(), &ReportOptions::default()).unwrap()
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
        assert_eq!(csv_field(""), "");
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(4.0), "4");
        assert_eq!(format_score(4.5), "4.5");
        assert_eq!(format_score(0.0), "0");
        assert_eq!(format_score(f64::INFINITY), "inf");
    }

    #[test]
    fn test_csv_header_and_rows() {
        let artifact = build(
            EvaluationConfig::fixed(["X"]),
            vec![JudgementInput::new("X", "a.pdf", "b.pdf", 4.0, 3.0, "a.pdf")
                .with_reasoning("A cites sources, B does not")],
        );
        let csv = to_csv(&artifact);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], CSV_HEADER.join(","));
        assert_eq!(lines[1], "1,X,a.pdf,4,,b.pdf,3,,\"A cites sources, B does not\"");
    }

    #[test]
    fn test_analyses_fill_placeholder_columns() {
        let artifact = build(
            EvaluationConfig::fixed(["X"]),
            vec![JudgementInput::new("X", "a", "b", 1.0, 2.0, "b")
                .with_analyses("thin", "thorough")],
        );
        let csv = to_csv(&artifact);
        assert_eq!(csv.lines().nth(1), Some("1,X,a,1,thin,b,2,thorough,"));

        let object = to_report_object(&artifact);
        assert_eq!(object.comparisons[0].analysis_b.as_deref(), Some("thorough"));
    }

    #[test]
    fn test_missing_optional_fields_never_render_null_in_csv() {
        let artifact = build(
            EvaluationConfig::fixed(["X"]),
            vec![JudgementInput::new("X", "a", "b", 1.0, 2.0, "b")],
        );
        let csv = to_csv(&artifact);
        assert!(!csv.contains("null"));
        assert!(!csv.contains("None"));

        let json = serde_json::to_value(to_report_object(&artifact)).unwrap();
        assert!(json["comparisons"][0].get("analysis_a").is_none());
    }

    #[test]
    fn test_non_finite_scores_agree_across_formats() {
        let artifact = build(
            EvaluationConfig::fixed(["X"]),
            vec![JudgementInput::new("X", "a", "b", f64::NAN, f64::NEG_INFINITY, "a")],
        );
        let csv = to_csv(&artifact);
        assert_eq!(csv.lines().nth(1), Some("1,X,a,NaN,,b,-inf,,"));

        let json = serde_json::to_value(to_report_object(&artifact)).unwrap();
        assert_eq!(json["comparisons"][0]["score_a"], "NaN");
        assert_eq!(json["comparisons"][0]["score_b"], "-inf");
        assert!(!serde_json::to_string(&json).unwrap().contains("null"));
    }

    #[test]
    fn test_report_object_shape() {
        let artifact = build(
            EvaluationConfig::prompt("Which is more persuasive?"),
            vec![
                JudgementInput::new("Custom Evaluation", "a", "b", 5.0, 2.0, "a"),
                JudgementInput::new("", "b", "c", 1.0, 3.0, "c"),
            ],
        );
        let json = serde_json::to_value(to_report_object(&artifact)).unwrap();
        assert_eq!(json["evaluation_method"], "prompt");
        assert_eq!(json["custom_prompt"], "Which is more persuasive?");
        assert_eq!(json["criteria"][0], "Custom Evaluation");
        assert_eq!(json["win_counts"]["a"], 1);
        assert_eq!(json["ranking"][0]["document"], "a");
        assert_eq!(json["comparisons"][1]["criterion"], "Custom Evaluation");
        assert!(json["report_id"].is_string());
        assert!(json["created_at"].is_string());
    }

    #[test]
    fn test_markdown_mentions_ranking_and_explanation() {
        let artifact = build(
            EvaluationConfig::fixed(["X"]),
            vec![JudgementInput::new("X", "a.pdf", "b.pdf", 4.0, 3.0, "zzz")],
        );
        let md = render_report_markdown(&artifact);
        assert!(md.starts_with("# Comparison Report"));
        assert!(md.contains("## Ranking"));
        assert!(md.contains("1. a.pdf (0 wins)"));
        assert!(md.contains(&artifact.explanation));
        assert!(md.contains("(not counted)"));
        assert!(md.contains("## Issues"));
    }
}
