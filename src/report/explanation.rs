//! Narrative explanation for the top-ranked document.
//!
//! A previously generated explanation artifact is preferred. Otherwise a fixed-template
//! sentence is synthesized from the win counts, so an explanation always exists.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::types::WinCounts;

/// Substring identifying a stored explanation artifact. Matched case-sensitively.
pub const DEFAULT_EXPLANATION_MARKER: &str = "Top Document Explanation";
/// Emitted when there is nothing to explain.
pub const NO_EXPLANATION_TEXT: &str =
    "No explanation available: no pairwise comparisons were recorded.";

/// Which tier produced the explanation text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExplanationSource {
    StoredArtifact { name: String },
    Synthesized,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explanation {
    pub text: String,
    pub source: ExplanationSource,
}

/// Resolve the explanation from stored artifacts, falling back to synthesis.
///
/// `artifacts` maps artifact name to text content; the first name (in key order)
/// containing `marker` is used.
pub fn explain(
    win_counts: &WinCounts,
    judgement_count: usize,
    artifacts: &BTreeMap<String, String>,
    marker: &str,
) -> Explanation {
    if let Some(name) = artifacts.keys().find(|name| name.contains(marker)) {
        match parse_explanation_artifact(&artifacts[name]) {
            Some(text) => {
                return Explanation {
                    text,
                    source: ExplanationSource::StoredArtifact { name: name.clone() },
                }
            }
            None => debug!(artifact = %name, "explanation artifact unusable; synthesizing"),
        }
    }
    synthesize_explanation(win_counts, judgement_count)
}

/// Extract the explanation body from a stored artifact.
///
/// The first line is a header and is dropped. The rest loses one layer of wrapping double
/// quotes (if fully wrapped) and has doubled quotes collapsed, undoing CSV quoting.
pub fn parse_explanation_artifact(content: &str) -> Option<String> {
    let (_, body) = content.split_once('\n')?;
    let body = body.trim();
    let unwrapped = if body.len() >= 2 && body.starts_with('"') && body.ends_with('"') {
        &body[1..body.len() - 1]
    } else {
        body
    };
    let text = unwrapped.replace("\"\"", "\"");
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Template sentence naming the leading document and its win count, even when that
/// count is zero.
pub fn synthesize_explanation(win_counts: &WinCounts, judgement_count: usize) -> Explanation {
    let Some((document, wins)) = win_counts.leader() else {
        return Explanation {
            text: NO_EXPLANATION_TEXT.to_string(),
            source: ExplanationSource::Unavailable,
        };
    };

    let text = format!(
        "{document} ranked highest with {wins} {} out of {judgement_count} pairwise {}.",
        plural(wins, "win", "wins"),
        plural(judgement_count, "comparison", "comparisons"),
    );
    Explanation {
        text,
        source: ExplanationSource::Synthesized,
    }
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 {
        one
    } else {
        many
    }
}
