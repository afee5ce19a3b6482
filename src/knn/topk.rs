use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::types::EntityId;

/// A candidate neighbor and its similarity to the query entity.
///
/// Ordered by rank: `a < b` means `a` is the better neighbor (higher
/// similarity, then lower id). The max of a `BinaryHeap` is therefore the
/// worst retained candidate.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ScoredNeighbor {
    pub(crate) id: EntityId,
    pub(crate) similarity: f32,
}

impl ScoredNeighbor {
    pub(crate) fn new(id: EntityId, similarity: f32) -> Self {
        Self { id, similarity }
    }
}

impl Ord for ScoredNeighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .similarity
            .total_cmp(&self.similarity)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for ScoredNeighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScoredNeighbor {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScoredNeighbor {}

/// Bounded selection of the `k` best candidates.
pub(crate) struct TopK {
    heap: BinaryHeap<ScoredNeighbor>,
    k: usize,
}

impl TopK {
    pub(crate) fn new(k: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(k),
            k,
        }
    }

    /// Keeps `candidate` if fewer than `k` are held or it beats the worst.
    pub(crate) fn offer(&mut self, candidate: ScoredNeighbor) {
        if self.heap.len() < self.k {
            self.heap.push(candidate);
            return;
        }
        if let Some(mut worst) = self.heap.peek_mut() {
            if candidate < *worst {
                *worst = candidate;
            }
        }
    }

    /// Retained ids, best first.
    pub(crate) fn into_ranked_ids(self) -> Vec<EntityId> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|n| n.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(k: usize, candidates: &[(EntityId, f32)]) -> Vec<EntityId> {
        let mut topk = TopK::new(k);
        for &(id, sim) in candidates {
            topk.offer(ScoredNeighbor::new(id, sim));
        }
        topk.into_ranked_ids()
    }

    #[test]
    fn test_keeps_best_k() {
        let ids = ranked(2, &[(1, 0.1), (2, 0.9), (3, 0.5), (4, 0.3)]);
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_fewer_than_k() {
        let ids = ranked(5, &[(7, 0.2), (3, 0.4)]);
        assert_eq!(ids, vec![3, 7]);
    }

    #[test]
    fn test_ties_prefer_lower_id() {
        let ids = ranked(2, &[(9, 0.5), (4, 0.5), (6, 0.5)]);
        assert_eq!(ids, vec![4, 6]);
    }

    #[test]
    fn test_negative_similarities_rank_last() {
        let ids = ranked(3, &[(1, -0.5), (2, 0.1), (3, -0.1)]);
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_ordering_is_rank() {
        let better = ScoredNeighbor::new(5, 0.9);
        let worse = ScoredNeighbor::new(1, 0.2);
        assert!(better < worse);
        assert!(ScoredNeighbor::new(1, 0.5) < ScoredNeighbor::new(2, 0.5));
    }

    #[test]
    fn test_zero_k_keeps_nothing() {
        assert!(ranked(0, &[(1, 1.0)]).is_empty());
    }
}
