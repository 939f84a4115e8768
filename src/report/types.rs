//! Data model for pairwise judgements and report artifacts.

use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::criteria::EvaluationMethod;

use super::explanation::ExplanationSource;
use super::identity::{ReportIdentity, ReportKey};

/// Winner value marking a tied judgement.
pub const TIE_SENTINEL: &str = "tie";

// =============================================================================
// Judgements
// =============================================================================

/// One raw comparison result, as produced by the external judgement source.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct JudgementInput {
    /// Criterion label as received, before normalization.
    #[serde(default)]
    pub criterion: String,
    #[serde(alias = "documentA")]
    pub document_a: String,
    #[serde(alias = "documentB")]
    pub document_b: String,
    #[serde(alias = "scoreA")]
    pub score_a: f64,
    #[serde(alias = "scoreB")]
    pub score_b: f64,
    /// One of the two document identifiers, or [`TIE_SENTINEL`].
    pub winner: String,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default, alias = "analysisA", skip_serializing_if = "Option::is_none")]
    pub analysis_a: Option<String>,
    #[serde(default, alias = "analysisB", skip_serializing_if = "Option::is_none")]
    pub analysis_b: Option<String>,
}

impl JudgementInput {
    pub fn new(
        criterion: impl Into<String>,
        document_a: impl Into<String>,
        document_b: impl Into<String>,
        score_a: f64,
        score_b: f64,
        winner: impl Into<String>,
    ) -> Self {
        Self {
            criterion: criterion.into(),
            document_a: document_a.into(),
            document_b: document_b.into(),
            score_a,
            score_b,
            winner: winner.into(),
            reasoning: String::new(),
            analysis_a: None,
            analysis_b: None,
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }

    pub fn with_analyses(
        mut self,
        analysis_a: impl Into<String>,
        analysis_b: impl Into<String>,
    ) -> Self {
        self.analysis_a = Some(analysis_a.into());
        self.analysis_b = Some(analysis_b.into());
        self
    }
}

/// A judgement owned by the result store, tagged with its 1-based input position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseJudgement {
    pub ordinal: usize,
    #[serde(flatten)]
    pub input: JudgementInput,
}

impl PairwiseJudgement {
    /// Resolve the winner field against the two document identifiers.
    ///
    /// A literal identifier match wins over the tie sentinel.
    pub fn outcome(&self) -> Outcome {
        let winner = self.input.winner.as_str();
        if winner == self.input.document_a {
            Outcome::A
        } else if winner == self.input.document_b {
            Outcome::B
        } else if winner.trim().eq_ignore_ascii_case(TIE_SENTINEL) {
            Outcome::Tie
        } else {
            Outcome::Unmatched
        }
    }

    /// Identifier of the winning document, if the outcome names one.
    pub fn winning_document(&self) -> Option<&str> {
        match self.outcome() {
            Outcome::A => Some(&self.input.document_a),
            Outcome::B => Some(&self.input.document_b),
            Outcome::Tie | Outcome::Unmatched => None,
        }
    }
}

/// Resolved winner of a judgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    A,
    B,
    Tie,
    /// Winner names neither document nor the tie sentinel.
    Unmatched,
}

/// A judgement after criterion normalization and validation.
///
/// `criterion_label` is the only criterion text any output format may render.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedJudgement {
    pub judgement: PairwiseJudgement,
    pub criterion_label: String,
    pub outcome: Outcome,
    /// Whether this judgement contributed to win counts.
    pub counted: bool,
}

// =============================================================================
// Aggregates
// =============================================================================

/// Win count per document, in first-seen document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WinCounts {
    entries: Vec<(String, usize)>,
    /// Document id to position in `entries`.
    index: HashMap<String, usize>,
}

impl WinCounts {
    /// Zero counts for every document, preserving the given order. Repeats are ignored.
    pub fn zeroed(documents: &[String]) -> Self {
        let mut counts = Self::default();
        for doc in documents {
            if !counts.index.contains_key(doc) {
                counts.index.insert(doc.clone(), counts.entries.len());
                counts.entries.push((doc.clone(), 0));
            }
        }
        counts
    }

    pub(crate) fn increment(&mut self, document: &str) -> bool {
        match self.index.get(document) {
            Some(&idx) => {
                self.entries[idx].1 += 1;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, document: &str) -> Option<usize> {
        self.index.get(document).map(|&idx| self.entries[idx].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.entries.iter().map(|(doc, count)| (doc.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Document with the strictly highest count; the first seen wins a tie.
    pub fn leader(&self) -> Option<(&str, usize)> {
        let mut best: Option<(&str, usize)> = None;
        for (doc, count) in self.iter() {
            match best {
                Some((_, top)) if count <= top => {}
                _ => best = Some((doc, count)),
            }
        }
        best
    }
}

impl Serialize for WinCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (doc, count) in &self.entries {
            map.serialize_entry(doc, count)?;
        }
        map.end()
    }
}

/// One position in the ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedDocument {
    /// 1-based, distinct even for equal win counts.
    pub rank: usize,
    pub document: String,
    pub wins: usize,
}

// =============================================================================
// Report artifact
// =============================================================================

/// Complete output of one report-generation pass.
///
/// Never mutated after construction; see [`ReportArtifact::renamed`].
#[derive(Debug, Clone)]
pub struct ReportArtifact {
    pub identity: ReportIdentity,
    pub evaluation_method: EvaluationMethod,
    pub custom_prompt: Option<String>,
    /// Canonical criterion labels of the configuration.
    pub criteria: Vec<String>,
    pub criterion_count: usize,
    /// Document identifiers in first-seen order.
    pub documents: Vec<String>,
    /// Judgements in store order.
    pub judgements: Vec<NormalizedJudgement>,
    pub win_counts: WinCounts,
    pub ranking: Vec<RankedDocument>,
    pub top_document: Option<String>,
    pub explanation: String,
    pub explanation_source: ExplanationSource,
    pub issues: Vec<super::aggregate::JudgementIssue>,
    /// blake3 digest of the configuration and judgement snapshot.
    pub input_digest: String,
}

impl ReportArtifact {
    pub fn ranked_documents(&self) -> Vec<&str> {
        self.ranking.iter().map(|r| r.document.as_str()).collect()
    }

    /// Rename lookup: `key` may be the report id or its creation timestamp.
    pub fn matches_key(&self, key: &ReportKey, requester: &str) -> bool {
        self.identity.matches(key, requester)
    }

    /// Copy of this artifact carrying a new display name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.identity.name = Some(name.into());
        next
    }
}
