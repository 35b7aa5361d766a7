//! OpenAPI documentation configuration
//!
//! Generates the OpenAPI 3.0 specification for the Retina search API.

use utoipa::OpenApi;

use crate::handlers::{HealthResponse, LoginRequest, LoginResponse, ReadyResponse, SearchMatch};

/// Retina reverse-image-search API - OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Retina - Reverse Image Search API",
        version = "0.1.0",
        description = r#"
## Reverse image search for an image board

Retina resolves a user-supplied image reference into one concrete image and
queries an IQDB-style similarity index for visually similar posts.

### Input channels (exactly one per request)

- **url** - a direct image URL, fetched as-is, or a web-page URL whose
  single content image is extracted and fetched
- **post_id** - an existing post whose stored image is the query
- **file** - an uploaded image (multipart `POST /iqdb_queries`)

A page with zero or several content images is answered with HTTP 200, an
empty match list, and a notice ("&lt;url&gt; has no images" /
"&lt;url&gt; has multiple images").

### Sessions

`POST /session` logs in by name+password and enforces IP bans: a full ban
is rejected with 403 and recorded on the ban, a partial ban does not block
login, a soft-deleted ban is ignored.
"#,
        license(name = "MIT OR Apache-2.0")
    ),
    paths(
        crate::handlers::search::search_handler,
        crate::handlers::search::search_upload_handler,
        crate::handlers::sessions::create_session_handler,
        crate::handlers::sessions::delete_session_handler,
        crate::handlers::health::health,
        crate::handlers::health::ready,
    ),
    components(schemas(
        SearchMatch,
        LoginRequest,
        LoginResponse,
        HealthResponse,
        ReadyResponse,
    )),
    tags(
        (name = "Search", description = "Reverse-image-search queries"),
        (name = "Sessions", description = "Login and logout"),
        (name = "Health", description = "Service monitoring")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_builds() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().unwrap();
        assert!(json.contains("/iqdb_queries"));
        assert!(json.contains("/session"));
    }
}
