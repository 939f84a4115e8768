//! Win-count aggregation and ranking.

use serde::Serialize;
use tracing::warn;

use crate::criteria::CriterionRegistry;

use super::store::first_seen_documents;
use super::types::{NormalizedJudgement, Outcome, PairwiseJudgement, RankedDocument, WinCounts};

/// A problem found in a single judgement.
///
/// Issues never abort a lenient pass; they are attached to the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("judgement #{ordinal}: {kind}")]
pub struct JudgementIssue {
    pub ordinal: usize,
    pub kind: IssueKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IssueKind {
    /// Winner is neither document nor the tie sentinel. Excluded from win counts.
    #[error("winner '{winner}' matches neither document")]
    UnmatchedWinner { winner: String },
    /// A document was compared against itself. Excluded from win counts.
    #[error("document '{document}' compared with itself")]
    SelfComparison { document: String },
    #[error("negative score {score} for '{document}'")]
    NegativeScore { document: String, score: f64 },
    #[error("non-finite score for '{document}'")]
    NonFiniteScore { document: String },
    /// Fixed-criteria label outside the configured set.
    #[error("unknown criterion '{criterion}'")]
    UnknownCriterion { criterion: String },
}

impl IssueKind {
    /// Whether a judgement with this issue is left out of win counts.
    pub fn excludes_from_counts(&self) -> bool {
        matches!(
            self,
            IssueKind::UnmatchedWinner { .. } | IssueKind::SelfComparison { .. }
        )
    }
}

/// Result of folding a judgement sequence.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub judgements: Vec<NormalizedJudgement>,
    pub documents: Vec<String>,
    pub win_counts: WinCounts,
    pub ranking: Vec<RankedDocument>,
    pub issues: Vec<JudgementIssue>,
}

/// Normalize, validate and tally `judgements`, then rank documents.
pub fn aggregate(judgements: &[PairwiseJudgement], registry: &CriterionRegistry) -> Aggregation {
    let documents = first_seen_documents(judgements);
    let mut win_counts = WinCounts::zeroed(&documents);
    let mut issues = Vec::new();
    let mut normalized = Vec::with_capacity(judgements.len());

    for judgement in judgements {
        let criterion = registry.resolve(&judgement.input.criterion);
        let found = inspect(judgement, criterion.recognized);
        let counted = !found.iter().any(IssueKind::excludes_from_counts);
        let outcome = judgement.outcome();

        if counted {
            if let Some(winner) = judgement.winning_document() {
                win_counts.increment(winner);
            }
        }

        for kind in found {
            warn!(ordinal = judgement.ordinal, issue = %kind, "judgement issue");
            issues.push(JudgementIssue {
                ordinal: judgement.ordinal,
                kind,
            });
        }

        normalized.push(NormalizedJudgement {
            judgement: judgement.clone(),
            criterion_label: criterion.label,
            outcome,
            counted,
        });
    }

    let ranking = rank_documents(&win_counts);
    Aggregation {
        judgements: normalized,
        documents,
        win_counts,
        ranking,
        issues,
    }
}

/// Sort by descending win count; equal counts keep first-seen order.
pub fn rank_documents(win_counts: &WinCounts) -> Vec<RankedDocument> {
    let mut entries: Vec<(&str, usize)> = win_counts.iter().collect();
    // Vec::sort_by is stable.
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries
        .into_iter()
        .enumerate()
        .map(|(idx, (document, wins))| RankedDocument {
            rank: idx + 1,
            document: document.to_string(),
            wins,
        })
        .collect()
}

fn inspect(judgement: &PairwiseJudgement, criterion_recognized: bool) -> Vec<IssueKind> {
    let input = &judgement.input;
    let mut found = Vec::new();

    if input.document_a == input.document_b {
        found.push(IssueKind::SelfComparison {
            document: input.document_a.clone(),
        });
    }
    if judgement.outcome() == Outcome::Unmatched {
        found.push(IssueKind::UnmatchedWinner {
            winner: input.winner.clone(),
        });
    }
    let scored = [
        (&input.document_a, input.score_a),
        (&input.document_b, input.score_b),
    ];
    for (document, score) in scored {
        if !score.is_finite() {
            found.push(IssueKind::NonFiniteScore {
                document: document.clone(),
            });
        } else if score < 0.0 {
            found.push(IssueKind::NegativeScore {
                document: document.clone(),
                score,
            });
        }
    }
    if !criterion_recognized {
        found.push(IssueKind::UnknownCriterion {
            criterion: input.criterion.clone(),
        });
    }
    found
}
