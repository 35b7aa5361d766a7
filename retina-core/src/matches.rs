//! Candidate match ordering
//!
//! The similarity index returns (post id, score) pairs; callers must see
//! them in non-increasing score order, with ties kept in the index's own
//! order since the index is authoritative.

use serde::{Deserialize, Serialize};

/// One similarity hit: a post and its visual-similarity score in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateMatch {
    /// The matched post.
    pub post_id: i64,
    /// Similarity score as a percentage.
    pub score: f32,
}

/// Sort matches by descending score; ties keep their input order.
pub fn sort_by_score(matches: &mut [CandidateMatch]) {
    matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(post_id: i64, score: f32) -> CandidateMatch {
        CandidateMatch { post_id, score }
    }

    #[test]
    fn test_sorts_descending() {
        let mut matches = vec![m(1, 50.0), m(2, 95.0), m(3, 80.5)];
        sort_by_score(&mut matches);
        let ids: Vec<_> = matches.iter().map(|c| c.post_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let mut matches = vec![m(10, 90.0), m(11, 90.0), m(12, 90.0), m(13, 95.0)];
        sort_by_score(&mut matches);
        let ids: Vec<_> = matches.iter().map(|c| c.post_id).collect();
        assert_eq!(ids, vec![13, 10, 11, 12]);
    }

    #[test]
    fn test_empty_and_single() {
        let mut empty: Vec<CandidateMatch> = vec![];
        sort_by_score(&mut empty);
        assert!(empty.is_empty());

        let mut one = vec![m(1, 42.0)];
        sort_by_score(&mut one);
        assert_eq!(one[0].post_id, 1);
    }
}
