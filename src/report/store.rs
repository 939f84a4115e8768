//! Append-only store of pairwise judgements.

use std::collections::HashSet;
use std::sync::Arc;

use super::types::{JudgementInput, PairwiseJudgement};

/// Ordered collection of judgements for one report.
///
/// Judgements are never removed or reordered. Store order is the row order of every
/// output format.
#[derive(Debug, Clone, Default)]
pub struct PairwiseResultStore {
    judgements: Vec<PairwiseJudgement>,
}

impl PairwiseResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a judgement and return its 1-based ordinal.
    pub fn append(&mut self, input: JudgementInput) -> usize {
        let ordinal = self.judgements.len() + 1;
        self.judgements.push(PairwiseJudgement { ordinal, input });
        ordinal
    }

    pub fn len(&self) -> usize {
        self.judgements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.judgements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PairwiseJudgement> {
        self.judgements.iter()
    }

    pub fn document_ids(&self) -> Vec<String> {
        first_seen_documents(&self.judgements)
    }

    /// Copy the current contents; appends made afterwards are not visible to the snapshot.
    pub fn snapshot(&self) -> JudgementSnapshot {
        JudgementSnapshot {
            judgements: Arc::from(self.judgements.as_slice()),
        }
    }
}

impl Extend<JudgementInput> for PairwiseResultStore {
    fn extend<T: IntoIterator<Item = JudgementInput>>(&mut self, iter: T) {
        for input in iter {
            self.append(input);
        }
    }
}

impl FromIterator<JudgementInput> for PairwiseResultStore {
    fn from_iter<T: IntoIterator<Item = JudgementInput>>(iter: T) -> Self {
        let mut store = Self::new();
        store.extend(iter);
        store
    }
}

impl<'a> IntoIterator for &'a PairwiseResultStore {
    type Item = &'a PairwiseJudgement;
    type IntoIter = std::slice::Iter<'a, PairwiseJudgement>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Immutable, cheaply clonable view of a store taken at the start of a pass.
#[derive(Debug, Clone)]
pub struct JudgementSnapshot {
    judgements: Arc<[PairwiseJudgement]>,
}

impl JudgementSnapshot {
    pub fn as_slice(&self) -> &[PairwiseJudgement] {
        &self.judgements
    }

    pub fn len(&self) -> usize {
        self.judgements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.judgements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PairwiseJudgement> {
        self.judgements.iter()
    }

    pub fn document_ids(&self) -> Vec<String> {
        first_seen_documents(&self.judgements)
    }
}

/// Union of A/B identifiers in order of first appearance.
pub fn first_seen_documents(judgements: &[PairwiseJudgement]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut documents: Vec<String> = Vec::new();
    for judgement in judgements {
        for doc in [&judgement.input.document_a, &judgement.input.document_b] {
            if seen.insert(doc.as_str()) {
                documents.push(doc.clone());
            }
        }
    }
    documents
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(a: &str, b: &str, winner: &str) -> JudgementInput {
        JudgementInput::new("X", a, b, 1.0, 0.0, winner)
    }

    #[test]
    fn test_append_assigns_sequential_ordinals() {
        let mut store = PairwiseResultStore::new();
        assert_eq!(store.append(input("a", "b", "a")), 1);
        assert_eq!(store.append(input("b", "c", "c")), 2);
        let ordinals: Vec<usize> = store.iter().map(|j| j.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2]);
    }

    #[test]
    fn test_iteration_is_restartable() {
        let store: PairwiseResultStore =
            vec![input("a", "b", "a"), input("b", "c", "tie")].into_iter().collect();
        let first: Vec<_> = store.iter().map(|j| j.ordinal).collect();
        let second: Vec<_> = (&store).into_iter().map(|j| j.ordinal).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_document_ids_first_seen_order() {
        let store: PairwiseResultStore = vec![
            input("b.pdf", "a.pdf", "a.pdf"),
            input("c.pdf", "b.pdf", "tie"),
            input("a.pdf", "d.pdf", "d.pdf"),
        ]
        .into_iter()
        .collect();
        assert_eq!(store.document_ids(), vec!["b.pdf", "a.pdf", "c.pdf", "d.pdf"]);
    }

    #[test]
    fn test_snapshot_ignores_later_appends() {
        let mut store = PairwiseResultStore::new();
        store.append(input("a", "b", "a"));
        let snapshot = store.snapshot();
        store.append(input("c", "d", "d"));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.document_ids(), vec!["a", "b"]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_document_ids_with_many_unique_pairs() {
        let store: PairwiseResultStore = (0..20_000)
            .map(|i| input(&format!("d{}", 2 * i), &format!("d{}", 2 * i + 1), "tie"))
            .collect();
        let ids = store.document_ids();
        assert_eq!(ids.len(), 40_000);
        assert_eq!(ids[0], "d0");
        assert_eq!(ids[39_999], "d39999");
    }
}
