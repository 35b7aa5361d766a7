//! Retina Core - domain logic for reverse image search
//!
//! This crate holds the pure, I/O-free parts of the search pipeline:
//!
//! - The [`ImageReference`] model: a request's image input decided once at
//!   the boundary (URL, existing post, or uploaded bytes).
//! - Page image extraction: scanning fetched HTML for content-relevant
//!   embedded images and classifying the result as exactly-one / none / many.
//! - Media sniffing helpers used to tell image URLs and payloads apart from
//!   web pages.
//! - Candidate-match ordering for similarity results.
//!
//! Network fetching, post storage, and the similarity index itself live
//! behind interfaces in `retina-server`; nothing here performs I/O.

pub mod extract;
pub mod matches;
pub mod media;
pub mod reference;

pub use extract::{extract_image_candidates, ExtractionOutcome};
pub use matches::{sort_by_score, CandidateMatch};
pub use media::{is_image_content_type, looks_like_image_url, sniff_image};
pub use reference::{ImageReference, ReferenceError};
