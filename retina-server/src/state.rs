//! Application state module
//!
//! Defines shared state accessible across all request handlers. Every
//! collaborator sits behind an `Arc`; requests share them read-mostly and
//! the stores handle their own interior mutability.

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::auth::{IpBanStore, SessionStore, UserEventLog, UserStore};
use crate::config::Config;
use crate::fetch::{HttpFetcher, ReqwestFetcher};
use crate::posts::{MemoryPostStore, PostStore};
use crate::similarity::{HttpSimilarityIndex, SimilarityIndex};

/// Application state containing shared resources.
#[derive(Clone)]
pub struct AppState {
    /// Outbound fetch collaborator for pages and images
    pub fetcher: Arc<dyn HttpFetcher>,
    /// Similarity-index oracle; `None` when no service is configured
    pub index: Option<Arc<dyn SimilarityIndex>>,
    /// Post-storage collaborator
    pub posts: Arc<dyn PostStore>,
    /// User repository
    pub users: Arc<UserStore>,
    /// Active sessions
    pub sessions: Arc<SessionStore>,
    /// IP ban table
    pub ip_bans: Arc<IpBanStore>,
    /// Login audit log
    pub events: Arc<UserEventLog>,
    /// Maximum upload size in bytes
    pub max_file_size: usize,
}

impl AppState {
    /// Build production state from configuration.
    pub fn new(config: &Config) -> Self {
        let fetch_timeout = Duration::from_secs(config.fetch_timeout_secs);

        let index: Option<Arc<dyn SimilarityIndex>> = config
            .similarity_service_url
            .as_deref()
            .and_then(|raw| match Url::parse(raw) {
                Ok(url) => Some(
                    Arc::new(HttpSimilarityIndex::new(url, fetch_timeout))
                        as Arc<dyn SimilarityIndex>,
                ),
                Err(e) => {
                    tracing::warn!(url = raw, error = %e, "ignoring invalid SIMILARITY_SERVICE_URL");
                    None
                }
            });

        Self {
            fetcher: Arc::new(ReqwestFetcher::new(fetch_timeout)),
            index,
            posts: Arc::new(MemoryPostStore::new()),
            users: Arc::new(UserStore::new()),
            sessions: Arc::new(SessionStore::new()),
            ip_bans: Arc::new(IpBanStore::new()),
            events: Arc::new(UserEventLog::new()),
            max_file_size: config.max_file_size(),
        }
    }
}
