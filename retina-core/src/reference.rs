//! Image reference model
//!
//! A search request supplies its image through exactly one channel: a URL
//! (direct image or web page), an existing post id, or an uploaded file.
//! The ambiguity is settled here, once, at the request boundary, so the
//! rest of the pipeline never re-checks which parameter was set.

use thiserror::Error;
use url::Url;

/// The image input of a single search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageReference {
    /// A user-supplied URL. May point at an image file or at a web page
    /// embedding one; the resolver decides which.
    Url(Url),
    /// An existing post whose stored image is the query.
    PostId(i64),
    /// Raw bytes from a file upload.
    Upload(Vec<u8>),
}

/// Errors constructing an [`ImageReference`] from request parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReferenceError {
    /// No input channel was supplied.
    #[error("no image source given; supply a url, post_id, or file")]
    Missing,
    /// More than one input channel was supplied.
    #[error("conflicting image sources; supply only one of url, post_id, or file")]
    Conflicting,
    /// The url parameter was present but not a parsable absolute URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl ImageReference {
    /// Build a reference from the three possible request channels, enforcing
    /// that exactly one is present.
    pub fn from_parts(
        url: Option<&str>,
        post_id: Option<i64>,
        file: Option<Vec<u8>>,
    ) -> Result<Self, ReferenceError> {
        let url = url.map(str::trim).filter(|u| !u.is_empty());

        let supplied = usize::from(url.is_some())
            + usize::from(post_id.is_some())
            + usize::from(file.is_some());
        match supplied {
            0 => return Err(ReferenceError::Missing),
            1 => {}
            _ => return Err(ReferenceError::Conflicting),
        }

        if let Some(raw) = url {
            let parsed =
                Url::parse(raw).map_err(|_| ReferenceError::InvalidUrl(raw.to_string()))?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(ReferenceError::InvalidUrl(raw.to_string()));
            }
            return Ok(ImageReference::Url(parsed));
        }
        if let Some(id) = post_id {
            return Ok(ImageReference::PostId(id));
        }
        Ok(ImageReference::Upload(file.unwrap_or_default()))
    }

    /// Short human-readable description of the source, for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            ImageReference::Url(url) => url.to_string(),
            ImageReference::PostId(id) => format!("post #{id}"),
            ImageReference::Upload(bytes) => format!("uploaded file ({} bytes)", bytes.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_url() {
        let reference =
            ImageReference::from_parts(Some("https://example.com/a.jpg"), None, None).unwrap();
        assert!(matches!(reference, ImageReference::Url(_)));
    }

    #[test]
    fn test_from_parts_post_id() {
        let reference = ImageReference::from_parts(None, Some(42), None).unwrap();
        assert_eq!(reference, ImageReference::PostId(42));
    }

    #[test]
    fn test_from_parts_upload() {
        let reference = ImageReference::from_parts(None, None, Some(vec![1, 2, 3])).unwrap();
        assert_eq!(reference, ImageReference::Upload(vec![1, 2, 3]));
    }

    #[test]
    fn test_from_parts_missing() {
        assert_eq!(
            ImageReference::from_parts(None, None, None),
            Err(ReferenceError::Missing)
        );
    }

    #[test]
    fn test_blank_url_counts_as_missing() {
        assert_eq!(
            ImageReference::from_parts(Some("   "), None, None),
            Err(ReferenceError::Missing)
        );
    }

    #[test]
    fn test_from_parts_conflicting() {
        assert_eq!(
            ImageReference::from_parts(Some("https://example.com/a.jpg"), Some(1), None),
            Err(ReferenceError::Conflicting)
        );
        assert_eq!(
            ImageReference::from_parts(None, Some(1), Some(vec![0])),
            Err(ReferenceError::Conflicting)
        );
    }

    #[test]
    fn test_from_parts_invalid_url() {
        assert!(matches!(
            ImageReference::from_parts(Some("not a url"), None, None),
            Err(ReferenceError::InvalidUrl(_))
        ));
        assert!(matches!(
            ImageReference::from_parts(Some("ftp://example.com/a.jpg"), None, None),
            Err(ReferenceError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_describe() {
        let reference = ImageReference::from_parts(None, Some(7), None).unwrap();
        assert_eq!(reference.describe(), "post #7");
    }
}
