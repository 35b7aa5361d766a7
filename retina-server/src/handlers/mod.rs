//! HTTP request handlers
//!
//! This module contains all the request handlers for the API endpoints.

pub mod health;
pub mod search;
pub mod sessions;

pub use crate::state::AppState;
pub use health::{health, ready, HealthResponse, ReadyResponse};
pub use search::{search_handler, search_upload_handler, OutputFormat, SearchMatch, SearchParams};
pub use sessions::{
    create_session_handler, delete_session_handler, LoginRequest, LoginResponse,
};
