#![forbid(unsafe_code)]

//! # rankcentral
//!
//! Ranking and report export for pairwise document comparisons.
//!
//! An external judge (a reviewer or an LLM call) compares documents two at a time under
//! one or more criteria. This crate folds those judgements into win counts, a stable
//! ranking and an explanation of the winner, then renders the result as a structured
//! report object and as a CSV export. Both renderings read criterion labels from a single
//! normalization step, so an interactive ranking view and a downloaded spreadsheet never
//! disagree.

pub mod criteria;
pub mod report;

pub use criteria::{
    load_config_from_path, ConfigError, CriterionRegistry, EvaluationConfig, EvaluationMethod,
    CUSTOM_EVALUATION_LABEL, UNKNOWN_CRITERION_LABEL,
};
pub use report::{
    build_report, render_report_markdown, to_csv, to_report_object, JudgementInput,
    PairwiseResultStore, ReportArtifact, ReportError, ReportKey, ReportOptions, ValidationPolicy,
};
