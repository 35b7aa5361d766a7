//! Image resolver
//!
//! Turns an [`ImageReference`] into one concrete image payload. URLs that
//! look like images are fetched as-is; other URLs are fetched and, when the
//! response is a page rather than an image, handed to the page extractor.
//! A page with zero or several content images is not a hard failure: the
//! ambiguity is carried in [`ResolveError`] so the controller can downgrade
//! it to a user-facing notice. Fetches run sequentially; each stage's output
//! feeds the next, and nothing is retried.

use std::sync::Arc;

use thiserror::Error;
use url::Url;

use retina_core::{
    extract_image_candidates, is_image_content_type, looks_like_image_url, sniff_image,
    ExtractionOutcome, ImageReference,
};

use crate::auth::Viewer;
use crate::fetch::{FetchError, HttpFetcher};
use crate::posts::PostStore;

/// A fully resolved image payload, alive for one request.
#[derive(Debug, Clone)]
pub struct ResolvedImage {
    pub bytes: Vec<u8>,
    /// Provenance description for diagnostics.
    pub source: String,
}

/// Why resolution failed.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The page had no content images. Carries the original page URL for
    /// the notice text.
    #[error("{url} has no images")]
    NoImages { url: Url },

    /// The page had more than one content image.
    #[error("{url} has multiple images")]
    MultipleImages { url: Url, count: usize },

    /// The referenced post does not exist or is not visible to the caller.
    #[error("post #{0} not found")]
    PostNotFound(i64),

    /// A URL that was supposed to be an image returned something else.
    #[error("{url} did not return an image")]
    NotAnImage { url: Url },

    /// Network failure fetching the page or image.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Resolves image references against the fetch and post-storage collaborators.
#[derive(Clone)]
pub struct ImageResolver {
    fetcher: Arc<dyn HttpFetcher>,
    posts: Arc<dyn PostStore>,
}

impl ImageResolver {
    pub fn new(fetcher: Arc<dyn HttpFetcher>, posts: Arc<dyn PostStore>) -> Self {
        Self { fetcher, posts }
    }

    /// Resolve `reference` to one image payload on behalf of `viewer`.
    pub async fn resolve(
        &self,
        reference: &ImageReference,
        viewer: &Viewer,
    ) -> Result<ResolvedImage, ResolveError> {
        match reference {
            ImageReference::Url(url) => self.resolve_url(url).await,
            ImageReference::PostId(id) => self.resolve_post(*id, viewer).await,
            ImageReference::Upload(bytes) => Ok(ResolvedImage {
                bytes: bytes.clone(),
                source: "uploaded file".to_string(),
            }),
        }
    }

    async fn resolve_url(&self, url: &Url) -> Result<ResolvedImage, ResolveError> {
        // URLs that name an image are used as-is, no page interpretation.
        if looks_like_image_url(url) {
            return self.fetch_image(url).await;
        }

        let resource = self.fetcher.get(url).await?;

        let is_image = resource
            .content_type
            .as_deref()
            .map(is_image_content_type)
            .unwrap_or(false)
            || sniff_image(&resource.bytes);
        if is_image {
            tracing::debug!(url = %url, "non-image-looking URL served image bytes directly");
            return Ok(ResolvedImage {
                bytes: resource.bytes,
                source: url.to_string(),
            });
        }

        // It's a page: scan it for content images. Candidates resolve
        // against the post-redirect URL, error messages cite the URL the
        // user actually gave us.
        let html = String::from_utf8_lossy(&resource.bytes);
        let candidates = extract_image_candidates(&html, &resource.url);
        match ExtractionOutcome::from_candidates(candidates) {
            ExtractionOutcome::Image(image_url) => {
                tracing::debug!(page = %url, image = %image_url, "extracted single image from page");
                self.fetch_image(&image_url).await
            }
            ExtractionOutcome::NoImages => Err(ResolveError::NoImages { url: url.clone() }),
            ExtractionOutcome::MultipleImages(count) => Err(ResolveError::MultipleImages {
                url: url.clone(),
                count,
            }),
        }
    }

    async fn fetch_image(&self, url: &Url) -> Result<ResolvedImage, ResolveError> {
        let resource = self.fetcher.get(url).await?;

        let is_image = resource
            .content_type
            .as_deref()
            .map(is_image_content_type)
            .unwrap_or(false)
            || sniff_image(&resource.bytes);
        if !is_image {
            return Err(ResolveError::NotAnImage { url: url.clone() });
        }

        Ok(ResolvedImage {
            bytes: resource.bytes,
            source: url.to_string(),
        })
    }

    async fn resolve_post(&self, id: i64, viewer: &Viewer) -> Result<ResolvedImage, ResolveError> {
        let post = self
            .posts
            .find(id)
            .await
            .filter(|post| post.visible_to(viewer))
            .ok_or(ResolveError::PostNotFound(id))?;

        Ok(ResolvedImage {
            bytes: post.preview,
            source: format!("post #{id}"),
        })
    }
}
