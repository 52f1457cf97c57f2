//! Result ranking.

use std::cmp::Ordering;

use armory_core::{Catalog, RankingCriterion};

use crate::combination::Combination;
use crate::request::SearchResult;

/// Orders matches by an ordered list of criteria.
///
/// The primary criterion decides first, later criteria break ties, and the
/// discovery index breaks whatever ties remain, so the order is total and
/// reproducible.
#[derive(Debug, Clone)]
pub struct ResultRanker {
    criteria: Vec<RankingCriterion>,
}

impl ResultRanker {
    pub fn new(criteria: Vec<RankingCriterion>) -> Self {
        Self { criteria }
    }

    pub fn criteria(&self) -> &[RankingCriterion] {
        &self.criteria
    }

    /// Ranking keys of `combination`, one per criterion.
    pub fn keys(&self, catalog: &Catalog, combination: &Combination) -> Vec<i64> {
        self.criteria
            .iter()
            .map(|c| combination.criterion_value(catalog, c.key))
            .collect()
    }

    pub fn compare(&self, a: &SearchResult, b: &SearchResult) -> Ordering {
        self.criteria
            .iter()
            .zip(a.keys.iter().zip(&b.keys))
            .map(|(criterion, (&x, &y))| criterion.order.compare(x, y))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
            .then(a.discovery_index.cmp(&b.discovery_index))
    }

    /// Drops non-matches and sorts the rest.
    pub fn rank(&self, results: Vec<SearchResult>) -> Vec<SearchResult> {
        let mut matches: Vec<SearchResult> = results.into_iter().filter(|r| r.is_match).collect();
        matches.sort_by(|a, b| self.compare(a, b));
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armory_core::{CriterionKey, SortOrder};

    fn result(keys: &[i64], discovery_index: u64, is_match: bool) -> SearchResult {
        SearchResult {
            combination: Combination::default(),
            is_match,
            keys: keys.to_vec(),
            discovery_index,
        }
    }

    fn order(results: &[SearchResult]) -> Vec<u64> {
        results.iter().map(|r| r.discovery_index).collect()
    }

    #[test]
    fn test_primary_then_secondary_then_discovery() {
        let ranker = ResultRanker::new(vec![
            RankingCriterion::natural(CriterionKey::BaseDefense),
            RankingCriterion::new(CriterionKey::FireResistance, SortOrder::Ascending),
        ]);
        let ranked = ranker.rank(vec![
            result(&[10, 5], 0, true),
            result(&[20, 1], 1, true),
            result(&[10, 2], 2, true),
            result(&[10, 2], 3, true),
            result(&[99, 0], 4, false),
        ]);

        assert_eq!(order(&ranked), vec![1, 2, 3, 0]);
    }

    #[test]
    fn test_ranking_is_reproducible() {
        let ranker = ResultRanker::new(RankingCriterion::defaults());
        let input: Vec<SearchResult> = (0..20)
            .map(|i| result(&[i % 3, -(i % 2), 7], 19 - i as u64, true))
            .collect();

        let first = ranker.rank(input.clone());
        let mut reversed = input;
        reversed.reverse();
        let second = ranker.rank(reversed);
        assert_eq!(order(&first), order(&second));
    }
}
