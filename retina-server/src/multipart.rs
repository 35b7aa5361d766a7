//! Multipart form parsing helpers
//!
//! Parses the upload form of a search request: one `file` field carrying
//! the query image plus optional text fields (e.g. `format`).

use std::collections::HashMap;

use axum::extract::Multipart;

use crate::error::ApiError;
use crate::validation::{validate_content_type, validate_file_size};

/// Represents a file uploaded via multipart form
#[derive(Debug, Clone)]
pub struct FileField {
    /// File data bytes
    pub data: Vec<u8>,
    /// Content-Type from the multipart field (if provided)
    pub content_type: Option<String>,
    /// Original filename from the multipart field (if provided)
    pub file_name: Option<String>,
}

/// Parsed multipart form fields
#[derive(Debug)]
pub struct MultipartFields {
    file: Option<FileField>,
    text_fields: HashMap<String, String>,
}

impl MultipartFields {
    /// Parse all fields from a multipart request.
    ///
    /// The `file` field is content-type checked and size limited; every
    /// other field is collected as text.
    pub async fn parse(multipart: &mut Multipart, max_file_size: usize) -> Result<Self, ApiError> {
        let mut file: Option<FileField> = None;
        let mut text_fields = HashMap::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to parse multipart: {}", e)))?
        {
            let name = field.name().unwrap_or("").to_string();

            if name == "file" {
                let content_type = field.content_type().map(|s| s.to_string());
                let file_name = field.file_name().map(|s| s.to_string());

                validate_content_type(content_type.as_deref())?;

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read file: {}", e)))?
                    .to_vec();

                validate_file_size(data.len(), max_file_size)?;

                file = Some(FileField {
                    data,
                    content_type,
                    file_name,
                });
            } else {
                let value = field.text().await.map_err(|e| {
                    ApiError::bad_request(format!("Failed to read field '{}': {}", name, e))
                })?;
                text_fields.insert(name, value);
            }
        }

        Ok(Self { file, text_fields })
    }

    /// Get the file field (required)
    pub fn require_file(&self) -> Result<&FileField, ApiError> {
        self.file.as_ref().ok_or_else(|| {
            ApiError::bad_request("No file provided. Use 'file' field in multipart form.")
        })
    }

    /// Get the file field (optional)
    pub fn get_file(&self) -> Option<&FileField> {
        self.file.as_ref()
    }

    /// Get a text field value
    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.text_fields.get(name).map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_text() {
        let mut text_fields = HashMap::new();
        text_fields.insert("format".to_string(), "json".to_string());

        let fields = MultipartFields {
            file: None,
            text_fields,
        };

        assert_eq!(fields.get_text("format"), Some("json"));
        assert_eq!(fields.get_text("missing"), None);
    }

    #[test]
    fn test_require_file_missing() {
        let fields = MultipartFields {
            file: None,
            text_fields: HashMap::new(),
        };

        assert!(fields.require_file().is_err());
    }
}
