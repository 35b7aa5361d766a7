//! Post-storage collaborator
//!
//! Resolves post identifiers to stored image bytes and to the public JSON
//! representation embedded in structured search results. The real gallery
//! storage is an externally-owned system; this module only defines the
//! narrow interface the search pipeline needs, plus the in-memory
//! implementation used by the server binary and the test suites.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::auth::{UserLevel, Viewer};

/// A stored post with its preview image.
#[derive(Debug, Clone)]
pub struct Post {
    pub id: i64,
    /// Content rating tag ("s", "q", "e").
    pub rating: String,
    /// Minimum viewer level required to see this post.
    pub min_level: UserLevel,
    pub is_deleted: bool,
    /// Where the post's image originally came from.
    pub source: String,
    /// Stored preview image bytes, used as the similarity query payload
    /// when searching by post id.
    pub preview: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Whether this post may be shown to `viewer`.
    pub fn visible_to(&self, viewer: &Viewer) -> bool {
        !self.is_deleted && viewer.level >= self.min_level
    }

    /// Public JSON representation for structured responses.
    pub fn api_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "rating": self.rating,
            "source": self.source,
            "is_deleted": self.is_deleted,
            "created_at": self.created_at.to_rfc3339(),
        })
    }
}

/// Narrow lookup interface onto post storage.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Fetch a post by id; `None` when no such post exists.
    ///
    /// Visibility is the caller's concern: a found-but-invisible post must
    /// be treated the same as a missing one.
    async fn find(&self, id: i64) -> Option<Post>;
}

/// In-memory post store backed by a concurrent map.
#[derive(Default)]
pub struct MemoryPostStore {
    posts: DashMap<i64, Post>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, post: Post) {
        self.posts.insert(post.id, post);
    }

    /// Convenience for tests and seeding: a visible member-level post.
    pub fn insert_simple(&self, id: i64, preview: Vec<u8>) -> Post {
        let post = Post {
            id,
            rating: "s".to_string(),
            min_level: UserLevel::Anonymous,
            is_deleted: false,
            source: String::new(),
            preview,
            created_at: Utc::now(),
        };
        self.insert(post.clone());
        post
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn find(&self, id: i64) -> Option<Post> {
        self.posts.get(&id).map(|p| p.clone())
    }
}
