//! Retina Server Library - HTTP components for reverse image search
//!
//! This library exposes the server components for use in integration tests.
//! The main binary uses these same components.

pub mod auth;
pub mod config;
pub mod error;
pub mod fetch;
pub mod handlers;
pub mod multipart;
pub mod openapi;
pub mod posts;
pub mod render;
pub mod resolver;
pub mod routes;
pub mod similarity;
pub mod state;
pub mod validation;

pub use auth::{CurrentViewer, IpBan, IpBanCategory, SessionStore, UserStore, Viewer};
pub use config::Config;
pub use error::ApiError;
pub use fetch::{FetchError, FetchedResource, HttpFetcher, ReqwestFetcher};
pub use openapi::ApiDoc;
pub use posts::{MemoryPostStore, Post, PostStore};
pub use resolver::{ImageResolver, ResolveError, ResolvedImage};
pub use routes::{create_router, create_router_with_config};
pub use similarity::{HttpSimilarityIndex, IndexError, RawMatch, SimilarityIndex};
pub use state::AppState;
