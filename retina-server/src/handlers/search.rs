//! Reverse-image-search query handler
//!
//! The query controller: validates that exactly one input channel (url,
//! post_id, or uploaded file) is present, resolves it to an image, queries
//! the similarity index, and renders the ranked matches as an HTML gallery
//! or a structured JSON list.
//!
//! Extraction ambiguity is not a request error: a page with zero or many
//! content images produces an HTTP 200 carrying an empty gallery plus a
//! notice ("&lt;url&gt; has no images" / "&lt;url&gt; has multiple images").
//! Genuine failures (bad input, dead fetches, missing posts) propagate as
//! request errors.

use axum::{
    extract::{Multipart, Query, State},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use retina_core::{CandidateMatch, ImageReference, ReferenceError};

use crate::auth::{CurrentViewer, Viewer};
use crate::error::ApiError;
use crate::multipart::MultipartFields;
use crate::posts::Post;
use crate::render::render_gallery;
use crate::resolver::{ImageResolver, ResolveError};
use crate::similarity::rank_matches;
use crate::state::AppState;

/// How the caller wants the result set formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Rendered gallery fragment for the browser UI.
    Html,
    /// Structured `{post_id, score, post}` list.
    Json,
}

impl OutputFormat {
    fn parse(raw: Option<&str>, default: OutputFormat) -> Result<Self, ApiError> {
        match raw {
            None => Ok(default),
            Some("html") => Ok(OutputFormat::Html),
            Some("json") => Ok(OutputFormat::Json),
            Some(other) => Err(ApiError::bad_request(format!(
                "Unknown format '{other}'; expected 'html' or 'json'"
            ))),
        }
    }
}

/// Query parameters for GET searches.
#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchParams {
    /// Direct image URL or web-page URL to search.
    pub url: Option<String>,
    /// Existing post whose image should be searched.
    pub post_id: Option<i64>,
    /// Response format: "html" (default) or "json".
    pub format: Option<String>,
}

/// One structured search result.
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchMatch {
    /// The matched post.
    pub post_id: i64,
    /// Similarity percentage in [0, 100].
    pub score: f32,
    /// Public representation of the matched post.
    #[schema(value_type = Object)]
    pub post: serde_json::Value,
}

/// GET /iqdb_queries - search by url or post_id
///
/// Exactly one of `url` and `post_id` must be supplied.
#[utoipa::path(
    get,
    path = "/iqdb_queries",
    tag = "Search",
    params(SearchParams),
    responses(
        (status = 200, description = "Gallery or structured matches; ambiguous pages yield an empty result plus a notice"),
        (status = 400, description = "Missing or conflicting input channels"),
        (status = 404, description = "post_id does not exist or is not visible"),
        (status = 502, description = "Fetching the page or image failed")
    )
)]
pub async fn search_handler(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    let format = OutputFormat::parse(params.format.as_deref(), OutputFormat::Html)?;
    let reference = ImageReference::from_parts(params.url.as_deref(), params.post_id, None)
        .map_err(reference_error)?;

    run_query(&state, &viewer, reference, format).await
}

/// POST /iqdb_queries - search by uploaded file
///
/// Accepts multipart/form-data with a required `file` field and an optional
/// `format` field (defaults to "json" for uploads).
#[utoipa::path(
    post,
    path = "/iqdb_queries",
    tag = "Search",
    request_body(
        content_type = "multipart/form-data",
        description = "Query image upload"
    ),
    responses(
        (status = 200, description = "Structured matches for the uploaded image"),
        (status = 400, description = "Missing file, oversized upload, or unsupported type")
    )
)]
pub async fn search_upload_handler(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let fields = MultipartFields::parse(&mut multipart, state.max_file_size).await?;
    let format = OutputFormat::parse(fields.get_text("format"), OutputFormat::Json)?;
    let file = fields.require_file()?;

    let reference = ImageReference::from_parts(None, None, Some(file.data.clone()))
        .map_err(reference_error)?;

    run_query(&state, &viewer, reference, format).await
}

fn reference_error(err: ReferenceError) -> ApiError {
    ApiError::bad_request(err.to_string())
}

/// Resolve, match, and format one search request.
async fn run_query(
    state: &AppState,
    viewer: &Viewer,
    reference: ImageReference,
    format: OutputFormat,
) -> Result<Response, ApiError> {
    let source = reference.describe();
    let resolver = ImageResolver::new(state.fetcher.clone(), state.posts.clone());

    let resolved = match resolver.resolve(&reference, viewer).await {
        Ok(resolved) => resolved,
        // Ambiguous extraction downgrades to a success response with a
        // notice and an empty match list.
        Err(err @ (ResolveError::NoImages { .. } | ResolveError::MultipleImages { .. })) => {
            tracing::info!(source = %source, notice = %err, "search resolved to a notice");
            return Ok(respond(&[], Some(&err.to_string()), format));
        }
        Err(ResolveError::PostNotFound(id)) => {
            return Err(ApiError::not_found(format!("post #{id} not found")));
        }
        Err(err @ ResolveError::NotAnImage { .. }) => {
            return Err(ApiError::bad_gateway(err.to_string()));
        }
        Err(ResolveError::Fetch(err)) => {
            return Err(ApiError::bad_gateway(err.to_string()));
        }
    };

    let index = state
        .index
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("No similarity index configured"))?;

    let raw = index
        .query(&resolved.bytes)
        .await
        .map_err(|e| ApiError::bad_gateway(e.to_string()))?;

    let ranked = rank_matches(raw, &*state.posts, viewer).await;
    tracing::info!(
        source = %source,
        matches = ranked.len(),
        "search completed"
    );

    Ok(respond(&ranked, None, format))
}

/// Format the final result set. A set-aside notice always comes with an
/// empty match list.
fn respond(
    matches: &[(CandidateMatch, Post)],
    notice: Option<&str>,
    format: OutputFormat,
) -> Response {
    match format {
        OutputFormat::Html => Html(render_gallery(matches, notice)).into_response(),
        OutputFormat::Json => match notice {
            Some(notice) => Json(serde_json::json!({ "error": notice })).into_response(),
            None => {
                let results: Vec<SearchMatch> = matches
                    .iter()
                    .map(|(candidate, post)| SearchMatch {
                        post_id: candidate.post_id,
                        score: candidate.score,
                        post: post.api_json(),
                    })
                    .collect();
                Json(results).into_response()
            }
        },
    }
}
