//! Upload validation module
//!
//! Provides validation utilities for multipart file uploads.

use crate::error::ApiError;

/// Allowed MIME type categories for query-image uploads
const ALLOWED_MIME_PREFIXES: &[&str] = &["image/", "application/octet-stream"];

/// Default max file size in bytes (25 MB)
pub const DEFAULT_MAX_FILE_SIZE: usize = 25 * 1024 * 1024;

/// Validates the Content-Type of an uploaded query image
///
/// Accepts image/* and application/octet-stream (binary data); a missing
/// Content-Type is treated as binary.
pub fn validate_content_type(content_type: Option<&str>) -> Result<(), ApiError> {
    match content_type {
        Some(ct) => {
            let ct_lower = ct.to_lowercase();
            if ALLOWED_MIME_PREFIXES
                .iter()
                .any(|prefix| ct_lower.starts_with(prefix))
            {
                Ok(())
            } else {
                Err(ApiError::bad_request(format!(
                    "Unsupported Content-Type: '{}'. Allowed types: image/*, application/octet-stream",
                    ct
                )))
            }
        }
        None => Ok(()),
    }
}

/// Validates the size of an uploaded file
pub fn validate_file_size(size: usize, max_size: usize) -> Result<(), ApiError> {
    if size > max_size {
        let max_mb = max_size / (1024 * 1024);
        let actual_mb = size / (1024 * 1024);
        Err(ApiError::bad_request(format!(
            "File too large: {} MB exceeds maximum of {} MB",
            actual_mb, max_mb
        )))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_content_type_image() {
        assert!(validate_content_type(Some("image/jpeg")).is_ok());
        assert!(validate_content_type(Some("image/png")).is_ok());
        assert!(validate_content_type(Some("IMAGE/WEBP")).is_ok()); // case insensitive
    }

    #[test]
    fn test_validate_content_type_binary() {
        assert!(validate_content_type(Some("application/octet-stream")).is_ok());
        assert!(validate_content_type(None).is_ok());
    }

    #[test]
    fn test_validate_content_type_rejected() {
        assert!(validate_content_type(Some("text/html")).is_err());
        assert!(validate_content_type(Some("video/mp4")).is_err());
        assert!(validate_content_type(Some("application/json")).is_err());
    }

    #[test]
    fn test_validate_file_size() {
        let max = 10 * 1024 * 1024;
        assert!(validate_file_size(1024, max).is_ok());
        assert!(validate_file_size(max, max).is_ok());
        assert!(validate_file_size(max + 1, max).is_err());
    }
}
