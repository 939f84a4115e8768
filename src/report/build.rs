//! One report-generation pass: snapshot, aggregate, explain.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::criteria::{CriterionRegistry, EvaluationConfig};

use super::aggregate::{aggregate, JudgementIssue};
use super::explanation::{explain, DEFAULT_EXPLANATION_MARKER};
use super::identity::ReportIdentity;
use super::store::{JudgementSnapshot, PairwiseResultStore};
use super::types::{PairwiseJudgement, ReportArtifact};

/// How judgement issues affect a pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Record issues on the artifact and keep going.
    #[default]
    Lenient,
    /// Reject the report on the first issue.
    Strict,
}

impl FromStr for ValidationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(ValidationPolicy::Lenient),
            "strict" => Ok(ValidationPolicy::Strict),
            other => Err(format!("unknown validation policy: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportOptions {
    pub validation: ValidationPolicy,
    pub explanation_marker: String,
    pub name: Option<String>,
    pub owner: Option<String>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            validation: ValidationPolicy::Lenient,
            explanation_marker: DEFAULT_EXPLANATION_MARKER.to_string(),
            name: None,
            owner: None,
        }
    }
}

impl ReportOptions {
    /// Defaults overridden by `RANKCENTRAL_VALIDATION` and `RANKCENTRAL_EXPLANATION_MARKER`.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if let Some(policy) = std::env::var("RANKCENTRAL_VALIDATION")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            opts.validation = policy;
        }
        if let Ok(marker) = std::env::var("RANKCENTRAL_EXPLANATION_MARKER") {
            if !marker.trim().is_empty() {
                opts.explanation_marker = marker;
            }
        }
        opts
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn strict(mut self) -> Self {
        self.validation = ValidationPolicy::Strict;
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("report rejected under strict validation: {0}")]
    Rejected(#[from] JudgementIssue),
}

/// Build a report from the current contents of `store`.
pub fn build_report(
    config: &EvaluationConfig,
    store: &PairwiseResultStore,
    artifacts: &BTreeMap<String, String>,
    opts: &ReportOptions,
) -> Result<ReportArtifact, ReportError> {
    build_report_from_snapshot(config, &store.snapshot(), artifacts, opts)
}

pub fn build_report_from_snapshot(
    config: &EvaluationConfig,
    snapshot: &JudgementSnapshot,
    artifacts: &BTreeMap<String, String>,
    opts: &ReportOptions,
) -> Result<ReportArtifact, ReportError> {
    let registry = CriterionRegistry::new(config);
    let aggregation = aggregate(snapshot.as_slice(), &registry);

    if opts.validation == ValidationPolicy::Strict {
        if let Some(issue) = aggregation.issues.first() {
            return Err(ReportError::Rejected(issue.clone()));
        }
    }

    let explanation = explain(
        &aggregation.win_counts,
        snapshot.len(),
        artifacts,
        &opts.explanation_marker,
    );
    let top_document = aggregation.ranking.first().map(|r| r.document.clone());

    debug!(
        judgements = snapshot.len(),
        documents = aggregation.documents.len(),
        issues = aggregation.issues.len(),
        top = top_document.as_deref().unwrap_or(""),
        "report pass complete"
    );

    Ok(ReportArtifact {
        identity: ReportIdentity::new(opts.name.clone(), opts.owner.clone()),
        evaluation_method: config.method,
        custom_prompt: config.custom_prompt.clone(),
        criteria: registry.labels(),
        criterion_count: config.criterion_count(),
        documents: aggregation.documents,
        judgements: aggregation.judgements,
        win_counts: aggregation.win_counts,
        ranking: aggregation.ranking,
        top_document,
        explanation: explanation.text,
        explanation_source: explanation.source,
        issues: aggregation.issues,
        input_digest: hash_input(config, snapshot.as_slice()),
    })
}

fn hash_input(config: &EvaluationConfig, judgements: &[PairwiseJudgement]) -> String {
    #[derive(Serialize)]
    struct Canonical<'a> {
        config: &'a EvaluationConfig,
        judgements: &'a [PairwiseJudgement],
    }
    let bytes = serde_json::to_vec(&Canonical { config, judgements }).unwrap_or_default();
    blake3::hash(&bytes).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::EvaluationMethod;
    use crate::report::explanation::{ExplanationSource, NO_EXPLANATION_TEXT};
    use crate::report::types::JudgementInput;

    fn scenario_store() -> PairwiseResultStore {
        vec![
            JudgementInput::new("X", "a.pdf", "b.pdf", 4.0, 3.0, "a.pdf"),
            JudgementInput::new("X", "b.pdf", "c.pdf", 2.0, 5.0, "c.pdf"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_build_scenario_report() {
        let config = EvaluationConfig::fixed(["X"]);
        let opts = ReportOptions::default();
        let report = build_report(&config, &scenario_store(), &BTreeMap::new(), &opts).unwrap();

        assert_eq!(report.evaluation_method, EvaluationMethod::Fixed);
        assert_eq!(report.ranked_documents(), vec!["a.pdf", "c.pdf", "b.pdf"]);
        assert_eq!(report.top_document.as_deref(), Some("a.pdf"));
        assert!(report.explanation.contains("a.pdf"));
        assert!(report.explanation.contains('1'));
        assert_eq!(report.criterion_count, 1);
        assert_eq!(report.documents, vec!["a.pdf", "b.pdf", "c.pdf"]);
    }

    #[test]
    fn test_empty_store_produces_unavailable_explanation() {
        let config = EvaluationConfig::prompt("Which is clearer?");
        let store = PairwiseResultStore::new();
        let opts = ReportOptions::default();
        let report = build_report(&config, &store, &BTreeMap::new(), &opts).unwrap();
        assert!(report.ranking.is_empty());
        assert!(report.top_document.is_none());
        assert_eq!(report.explanation, NO_EXPLANATION_TEXT);
        assert_eq!(report.explanation_source, ExplanationSource::Unavailable);
    }

    #[test]
    fn test_strict_policy_rejects_on_issue() {
        let config = EvaluationConfig::fixed(["X"]);
        let store: PairwiseResultStore =
            vec![JudgementInput::new("X", "a", "b", 1.0, 0.0, "q")].into_iter().collect();

        let lenient = ReportOptions::default();
        let report = build_report(&config, &store, &BTreeMap::new(), &lenient).unwrap();
        assert_eq!(report.issues.len(), 1);

        let strict = ReportOptions::default().strict();
        let err = build_report(&config, &store, &BTreeMap::new(), &strict).unwrap_err();
        assert!(err.to_string().contains("judgement #1"));
    }

    #[test]
    fn test_digest_is_stable_and_input_sensitive() {
        let config = EvaluationConfig::fixed(["X"]);
        let opts = ReportOptions::default();
        let a = build_report(&config, &scenario_store(), &BTreeMap::new(), &opts).unwrap();
        let b = build_report(&config, &scenario_store(), &BTreeMap::new(), &opts).unwrap();
        assert_eq!(a.input_digest, b.input_digest);
        assert_ne!(a.identity.report_id, b.identity.report_id);

        let mut other = scenario_store();
        other.append(JudgementInput::new("X", "a.pdf", "c.pdf", 1.0, 1.0, "tie"));
        let c = build_report(&config, &other, &BTreeMap::new(), &opts).unwrap();
        assert_ne!(a.input_digest, c.input_digest);
    }

    #[test]
    fn test_options_carry_identity_fields() {
        let config = EvaluationConfig::fixed(["X"]);
        let opts = ReportOptions::default().name("Vendors").owner("user-9");
        let report = build_report(&config, &scenario_store(), &BTreeMap::new(), &opts).unwrap();
        assert_eq!(report.identity.name.as_deref(), Some("Vendors"));
        assert_eq!(report.identity.owner.as_deref(), Some("user-9"));

        let renamed = report.renamed("Vendors (final)");
        assert_eq!(renamed.identity.name.as_deref(), Some("Vendors (final)"));
        assert_eq!(renamed.identity.report_id, report.identity.report_id);
        assert_eq!(report.identity.name.as_deref(), Some("Vendors"));
    }

    #[test]
    fn test_validation_policy_parse() {
        let strict: ValidationPolicy = "STRICT".parse().unwrap();
        let lenient: ValidationPolicy = " lenient ".parse().unwrap();
        assert_eq!(strict, ValidationPolicy::Strict);
        assert_eq!(lenient, ValidationPolicy::Lenient);
        assert!("loose".parse::<ValidationPolicy>().is_err());
    }

    #[test]
    fn test_options_from_env() {
        std::env::set_var("RANKCENTRAL_VALIDATION", "strict");
        std::env::set_var("RANKCENTRAL_EXPLANATION_MARKER", "Winner Notes");
        let opts = ReportOptions::from_env();
        assert_eq!(opts.validation, ValidationPolicy::Strict);
        assert_eq!(opts.explanation_marker, "Winner Notes");

        // Unparsable or blank values keep the defaults.
        std::env::set_var("RANKCENTRAL_VALIDATION", "sometimes");
        std::env::set_var("RANKCENTRAL_EXPLANATION_MARKER", "   ");
        let opts = ReportOptions::from_env();
        assert_eq!(opts.validation, ValidationPolicy::Lenient);
        assert_eq!(opts.explanation_marker, DEFAULT_EXPLANATION_MARKER);

        std::env::remove_var("RANKCENTRAL_VALIDATION");
        std::env::remove_var("RANKCENTRAL_EXPLANATION_MARKER");
        let opts = ReportOptions::from_env();
        assert_eq!(opts.validation, ValidationPolicy::Lenient);
        assert_eq!(opts.explanation_marker, DEFAULT_EXPLANATION_MARKER);
        assert!(opts.name.is_none());
    }
}
