//! Similarity matcher
//!
//! The index itself (perceptual hashing, nearest-neighbor lookup) is an
//! external oracle reached over HTTP; this module submits the resolved image
//! payload, decodes the raw (post id, score) pairs, drops matches whose post
//! the caller may not see, and orders the rest by descending score. An empty
//! match list is a legitimate "no similar posts" outcome, not an error.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use retina_core::{sort_by_score, CandidateMatch};

use crate::auth::Viewer;
use crate::posts::{Post, PostStore};

/// A raw oracle hit before visibility filtering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RawMatch {
    pub post_id: i64,
    /// Similarity percentage in [0, 100].
    pub score: f32,
}

/// Errors talking to the similarity index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("similarity index request failed: {0}")]
    Request(String),
    #[error("similarity index returned an unreadable response: {0}")]
    Decode(String),
}

/// The external similarity-index oracle.
#[async_trait]
pub trait SimilarityIndex: Send + Sync {
    /// Submit an image payload and receive raw ranked pairs.
    async fn query(&self, image: &[u8]) -> Result<Vec<RawMatch>, IndexError>;
}

/// HTTP client for an IQDB-style index service.
///
/// Posts the payload as a multipart `file` field to `<base>/query` and
/// expects a JSON array of `{post_id, score}` objects.
pub struct HttpSimilarityIndex {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpSimilarityIndex {
    pub fn new(base_url: Url, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        let endpoint = base_url.join("query").unwrap_or(base_url);
        Self { client, endpoint }
    }
}

#[async_trait]
impl SimilarityIndex for HttpSimilarityIndex {
    async fn query(&self, image: &[u8]) -> Result<Vec<RawMatch>, IndexError> {
        let part = reqwest::multipart::Part::bytes(image.to_vec()).file_name("query");
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| IndexError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IndexError::Request(format!(
                "{} returned HTTP {}",
                self.endpoint, status
            )));
        }

        let matches: Vec<RawMatch> = response
            .json()
            .await
            .map_err(|e| IndexError::Decode(e.to_string()))?;

        tracing::debug!(count = matches.len(), "similarity index returned matches");
        Ok(matches)
    }
}

/// Filter raw oracle hits down to posts `viewer` may see and order them by
/// descending score. Ties keep the oracle's order; unknown and invisible
/// posts are dropped, never an error.
pub async fn rank_matches(
    raw: Vec<RawMatch>,
    posts: &dyn PostStore,
    viewer: &Viewer,
) -> Vec<(CandidateMatch, Post)> {
    let mut candidates: Vec<CandidateMatch> = Vec::with_capacity(raw.len());
    let mut found: HashMap<i64, Post> = HashMap::with_capacity(raw.len());

    for hit in raw {
        if found.contains_key(&hit.post_id) {
            candidates.push(CandidateMatch {
                post_id: hit.post_id,
                score: hit.score,
            });
            continue;
        }
        let Some(post) = posts.find(hit.post_id).await else {
            tracing::debug!(post_id = hit.post_id, "dropping match for unknown post");
            continue;
        };
        if !post.visible_to(viewer) {
            tracing::debug!(post_id = hit.post_id, "dropping match for invisible post");
            continue;
        }
        found.insert(hit.post_id, post);
        candidates.push(CandidateMatch {
            post_id: hit.post_id,
            score: hit.score,
        });
    }

    sort_by_score(&mut candidates);

    candidates
        .into_iter()
        .filter_map(|candidate| {
            let post = found.get(&candidate.post_id)?.clone();
            Some((candidate, post))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::UserLevel;
    use crate::posts::MemoryPostStore;
    use chrono::Utc;

    fn hit(post_id: i64, score: f32) -> RawMatch {
        RawMatch { post_id, score }
    }

    fn member() -> Viewer {
        Viewer {
            user_id: Some(1),
            level: UserLevel::Member,
        }
    }

    #[tokio::test]
    async fn test_orders_by_descending_score() {
        let posts = MemoryPostStore::new();
        posts.insert_simple(1, vec![]);
        posts.insert_simple(2, vec![]);
        posts.insert_simple(3, vec![]);

        let ranked = rank_matches(
            vec![hit(1, 60.0), hit(2, 95.5), hit(3, 80.0)],
            &posts,
            &member(),
        )
        .await;

        let ids: Vec<_> = ranked.iter().map(|(c, _)| c.post_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn test_drops_unknown_posts() {
        let posts = MemoryPostStore::new();
        posts.insert_simple(1, vec![]);

        let ranked = rank_matches(vec![hit(1, 90.0), hit(404, 99.0)], &posts, &member()).await;
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].0.post_id, 1);
    }

    #[tokio::test]
    async fn test_drops_invisible_posts() {
        let posts = MemoryPostStore::new();
        posts.insert_simple(1, vec![]);
        posts.insert(Post {
            id: 2,
            rating: "e".to_string(),
            min_level: UserLevel::Admin,
            is_deleted: false,
            source: String::new(),
            preview: vec![],
            created_at: Utc::now(),
        });

        let ranked = rank_matches(vec![hit(2, 99.0), hit(1, 50.0)], &posts, &member()).await;
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].0.post_id, 1);
    }

    #[tokio::test]
    async fn test_empty_result_is_valid() {
        let posts = MemoryPostStore::new();
        let ranked = rank_matches(vec![], &posts, &member()).await;
        assert!(ranked.is_empty());
    }
}
