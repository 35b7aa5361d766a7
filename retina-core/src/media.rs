//! Media sniffing helpers
//!
//! Used by the resolver to decide whether a URL or payload is an image
//! without interpreting it further, or a web page that needs extraction.

use url::Url;

/// File extensions treated as direct image URLs.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "avif", "bmp"];

/// Whether the URL path ends in a known image extension.
///
/// This is the cheap pre-fetch test: a URL that looks like an image is
/// fetched as-is with no page-extraction step.
pub fn looks_like_image_url(url: &Url) -> bool {
    let path = url.path();
    let Some((_, extension)) = path.rsplit_once('.') else {
        return false;
    };
    let extension = extension.to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&extension.as_str())
}

/// Whether a Content-Type header value denotes an image.
pub fn is_image_content_type(content_type: &str) -> bool {
    content_type
        .trim()
        .to_ascii_lowercase()
        .starts_with("image/")
}

/// Whether the payload's magic bytes identify a decodable image format.
///
/// Last line of defense for servers that mislabel responses: the resolver
/// accepts a fetched payload as an image if either the Content-Type or the
/// bytes themselves say so.
pub fn sniff_image(bytes: &[u8]) -> bool {
    image::guess_format(bytes).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_image_url_extensions() {
        assert!(looks_like_image_url(&url("https://cdn.example.com/a/b.jpg")));
        assert!(looks_like_image_url(&url("https://cdn.example.com/a.PNG")));
        assert!(looks_like_image_url(&url(
            "https://cdn.example.com/720x720/f2/f4/f2f4c401ebe3e181.webp"
        )));
        // Query strings don't hide the extension
        assert!(looks_like_image_url(&url("https://x.test/img.gif?x=1")));
    }

    #[test]
    fn test_non_image_urls() {
        assert!(!looks_like_image_url(&url("https://example.com/posts/7000000")));
        assert!(!looks_like_image_url(&url("https://example.com/page.html")));
        assert!(!looks_like_image_url(&url("https://example.com/")));
    }

    #[test]
    fn test_content_type() {
        assert!(is_image_content_type("image/jpeg"));
        assert!(is_image_content_type("IMAGE/PNG"));
        assert!(is_image_content_type(" image/webp; charset=binary"));
        assert!(!is_image_content_type("text/html"));
        assert!(!is_image_content_type("application/json"));
    }

    #[test]
    fn test_sniff_image() {
        // Minimal PNG signature + IHDR start is enough for format detection
        let png = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";
        assert!(sniff_image(png));
        assert!(!sniff_image(b"<!doctype html><html></html>"));
        assert!(!sniff_image(b""));
    }
}
