//! Pairwise comparison report engine.
//!
//! Turns a stream of per-criterion, per-pair judgements into:
//! - Win counts and a deterministic ranking (first-seen tie-break)
//! - An explanation for the top-ranked document
//! - A structured report object, a CSV export and a Markdown summary that agree row for row
//!
//! A pass is a pure function of its inputs; independent passes may run in parallel.

pub mod aggregate;
pub mod build;
pub mod explanation;
pub mod identity;
pub mod serialize;
pub mod store;
pub mod types;

pub use aggregate::{aggregate, rank_documents, Aggregation, IssueKind, JudgementIssue};
pub use build::{
    build_report, build_report_from_snapshot, ReportError, ReportOptions, ValidationPolicy,
};
pub use explanation::{
    explain, parse_explanation_artifact, synthesize_explanation, Explanation, ExplanationSource,
    DEFAULT_EXPLANATION_MARKER, NO_EXPLANATION_TEXT,
};
pub use identity::{ReportIdentity, ReportKey};
pub use serialize::{
    render_report_markdown, report_rows, to_csv, to_report_object, ComparisonEntry, ReportObject,
    ReportRow, CSV_HEADER,
};
pub use store::{JudgementSnapshot, PairwiseResultStore};
pub use types::*;
