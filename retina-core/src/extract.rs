//! Page image extraction
//!
//! Given the HTML of a fetched web page, find the embedded images that are
//! the page's *content*, as opposed to chrome (avatars, icons, logos), and
//! classify the result: exactly one image URL can be searched; zero or many
//! is an ambiguity the caller surfaces to the user as a notice.
//!
//! Relevance rule, in order:
//!
//! 1. If the page declares Open Graph / Twitter Card image metadata
//!    (`og:image`, `og:image:secure_url`, `twitter:image`), the deduplicated
//!    list of those URLs is the candidate set. Social pages advertise
//!    exactly their content images there, one meta tag per photo, which is
//!    what makes the one-photo/many-photos distinction deterministic.
//! 2. Otherwise, `<img src>` URLs are the candidates, minus anything that
//!    matches a chrome path segment (avatar, icon, logo, ...), `data:`
//!    URIs, and images whose declared width and height are both tiny.
//!
//! The scanner below is a minimal hand-rolled tag walker, not an HTML
//! parser: it only needs tag names and attributes, tolerates malformed
//! markup, and never allocates a DOM.

use url::Url;

/// Meta tag names/properties whose content is a content-image URL.
const IMAGE_META_KEYS: &[&str] = &[
    "og:image",
    "og:image:secure_url",
    "twitter:image",
    "twitter:image:src",
];

/// Path fragments that mark an `<img>` as page chrome rather than content.
const CHROME_PATH_FRAGMENTS: &[&str] = &[
    "avatar",
    "icon",
    "logo",
    "emoji",
    "sprite",
    "badge",
    "favicon",
    "profile_images",
];

/// Declared dimensions strictly below this (both axes) mark an image as
/// decorative.
const MIN_CONTENT_DIMENSION: u32 = 64;

/// Result of scanning a page for content images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// Exactly one content image was found; search it.
    Image(Url),
    /// The page has no content images.
    NoImages,
    /// The page has more than one content image; the choice is ambiguous.
    MultipleImages(usize),
}

impl ExtractionOutcome {
    /// Classify a candidate list.
    pub fn from_candidates(mut candidates: Vec<Url>) -> Self {
        match candidates.len() {
            0 => ExtractionOutcome::NoImages,
            1 => ExtractionOutcome::Image(candidates.remove(0)),
            n => ExtractionOutcome::MultipleImages(n),
        }
    }
}

/// A scanned tag: lowercase name plus (lowercase-key, raw-value) attributes.
#[derive(Debug)]
struct Tag {
    name: String,
    attrs: Vec<(String, String)>,
}

impl Tag {
    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Walk the document and yield every start tag with its attributes.
///
/// Comments and closing tags are skipped; quoting ('', "", bare) is handled;
/// anything unparsable is silently passed over.
fn scan_tags(html: &str) -> Vec<Tag> {
    let bytes = html.as_bytes();
    let mut tags = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }

        // Comments: skip to the closing marker.
        if html[i..].starts_with("<!--") {
            match html[i + 4..].find("-->") {
                Some(end) => {
                    i += 4 + end + 3;
                    continue;
                }
                None => break,
            }
        }

        i += 1;
        // Closing tags, doctype, processing instructions: skip to '>'.
        if i < bytes.len() && !bytes[i].is_ascii_alphabetic() {
            while i < bytes.len() && bytes[i] != b'>' {
                i += 1;
            }
            continue;
        }

        // Tag name
        let name_start = i;
        while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
            i += 1;
        }
        let name = html[name_start..i].to_ascii_lowercase();
        if name.is_empty() {
            continue;
        }

        // Attributes
        let mut attrs = Vec::new();
        loop {
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i >= bytes.len() || bytes[i] == b'>' || bytes[i] == b'/' {
                while i < bytes.len() && bytes[i] != b'>' {
                    i += 1;
                }
                break;
            }

            let key_start = i;
            while i < bytes.len()
                && !bytes[i].is_ascii_whitespace()
                && bytes[i] != b'='
                && bytes[i] != b'>'
                && bytes[i] != b'/'
            {
                i += 1;
            }
            let key = html[key_start..i].to_ascii_lowercase();

            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }

            let mut value = String::new();
            if i < bytes.len() && bytes[i] == b'=' {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
                    let quote = bytes[i];
                    i += 1;
                    let value_start = i;
                    while i < bytes.len() && bytes[i] != quote {
                        i += 1;
                    }
                    value = html[value_start..i].to_string();
                    if i < bytes.len() {
                        i += 1; // closing quote
                    }
                } else {
                    let value_start = i;
                    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                        i += 1;
                    }
                    value = html[value_start..i].to_string();
                }
            }

            if !key.is_empty() {
                attrs.push((key, value));
            }
        }

        tags.push(Tag { name, attrs });
    }

    tags
}

/// Resolve a possibly-relative URL against the page URL; `None` when it
/// cannot be parsed or is a `data:` URI.
fn resolve_candidate(raw: &str, base: &Url) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with("data:") {
        return None;
    }
    base.join(raw).ok()
}

/// Whether an `<img>` tag is page chrome rather than content.
fn is_chrome_image(tag: &Tag, url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    if CHROME_PATH_FRAGMENTS
        .iter()
        .any(|fragment| path.contains(fragment))
    {
        return true;
    }

    let dimension = |key: &str| -> Option<u32> {
        tag.attr(key)
            .and_then(|v| v.trim().trim_end_matches("px").parse().ok())
    };
    if let (Some(w), Some(h)) = (dimension("width"), dimension("height")) {
        if w < MIN_CONTENT_DIMENSION && h < MIN_CONTENT_DIMENSION {
            return true;
        }
    }

    false
}

/// Scan a page's HTML for content-image URLs.
///
/// Returned URLs are deduplicated and keep document order, so the caller's
/// one-vs-many classification is deterministic for a given page.
pub fn extract_image_candidates(html: &str, base: &Url) -> Vec<Url> {
    let tags = scan_tags(html);

    let mut meta_candidates: Vec<Url> = Vec::new();
    let mut img_candidates: Vec<Url> = Vec::new();

    for tag in &tags {
        match tag.name.as_str() {
            "meta" => {
                let key = tag
                    .attr("property")
                    .or_else(|| tag.attr("name"))
                    .unwrap_or("")
                    .to_ascii_lowercase();
                if !IMAGE_META_KEYS.contains(&key.as_str()) {
                    continue;
                }
                if let Some(url) = tag.attr("content").and_then(|c| resolve_candidate(c, base)) {
                    if !meta_candidates.contains(&url) {
                        meta_candidates.push(url);
                    }
                }
            }
            "img" => {
                let Some(url) = tag.attr("src").and_then(|s| resolve_candidate(s, base)) else {
                    continue;
                };
                if is_chrome_image(tag, &url) {
                    continue;
                }
                if !img_candidates.contains(&url) {
                    img_candidates.push(url);
                }
            }
            _ => {}
        }
    }

    if !meta_candidates.is_empty() {
        tracing::debug!(
            page = %base,
            count = meta_candidates.len(),
            "extracted image candidates from page metadata"
        );
        meta_candidates
    } else {
        tracing::debug!(
            page = %base,
            count = img_candidates.len(),
            "extracted image candidates from img tags"
        );
        img_candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://social.example/status/123").unwrap()
    }

    fn extract(html: &str) -> Vec<Url> {
        extract_image_candidates(html, &base())
    }

    #[test]
    fn test_single_og_image() {
        let html = r#"
            <html><head>
              <meta property="og:image" content="https://pbs.example/media/photo1.jpg">
              <meta property="og:title" content="a post">
            </head>
            <body><img src="https://pbs.example/avatars/user.png"></body></html>
        "#;
        let candidates = extract(html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].as_str(), "https://pbs.example/media/photo1.jpg");
        assert!(matches!(
            ExtractionOutcome::from_candidates(candidates),
            ExtractionOutcome::Image(_)
        ));
    }

    #[test]
    fn test_multiple_og_images_are_ambiguous() {
        let html = r#"
            <meta property="og:image" content="https://pbs.example/media/photo1.jpg">
            <meta property="og:image" content="https://pbs.example/media/photo2.jpg">
            <meta property="og:image" content="https://pbs.example/media/photo3.jpg">
        "#;
        let candidates = extract(html);
        assert_eq!(candidates.len(), 3);
        assert_eq!(
            ExtractionOutcome::from_candidates(candidates),
            ExtractionOutcome::MultipleImages(3)
        );
    }

    #[test]
    fn test_duplicate_metas_collapse() {
        // og:image and twitter:image usually repeat the same URL
        let html = r#"
            <meta property="og:image" content="https://pbs.example/media/photo1.jpg">
            <meta name="twitter:image" content="https://pbs.example/media/photo1.jpg">
        "#;
        assert_eq!(extract(html).len(), 1);
    }

    #[test]
    fn test_no_images() {
        let html = "<html><body><p>just text, no pictures</p></body></html>";
        assert_eq!(
            ExtractionOutcome::from_candidates(extract(html)),
            ExtractionOutcome::NoImages
        );
    }

    #[test]
    fn test_img_fallback_filters_chrome() {
        let html = r#"
            <img src="/assets/site-logo.png">
            <img src="https://cdn.example/avatars/42.jpg">
            <img src="https://cdn.example/uploads/full/artwork.jpg">
            <img src="/favicon.ico">
        "#;
        let candidates = extract(html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(
            candidates[0].as_str(),
            "https://cdn.example/uploads/full/artwork.jpg"
        );
    }

    #[test]
    fn test_img_fallback_filters_tiny_images() {
        let html = r#"
            <img src="/uploads/spacer.gif" width="1" height="1">
            <img src="/uploads/thumbnail-strip.png" width="32" height="32">
            <img src="/uploads/scan.png" width="1200" height="900">
        "#;
        let candidates = extract(html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].path(), "/uploads/scan.png");
    }

    #[test]
    fn test_relative_urls_resolve_against_page() {
        let html = r#"<img src="../media/pic.jpg">"#;
        let candidates = extract(html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].as_str(), "https://social.example/media/pic.jpg");
    }

    #[test]
    fn test_data_uris_and_garbage_dropped() {
        let html = r#"
            <img src="data:image/gif;base64,R0lGODlhAQABAA==">
            <img src="">
            <img>
        "#;
        assert!(extract(html).is_empty());
    }

    #[test]
    fn test_metadata_wins_over_img_tags() {
        let html = r#"
            <meta property="og:image" content="https://pbs.example/media/the-photo.jpg">
            <img src="https://pbs.example/media/the-photo.jpg">
            <img src="https://pbs.example/media/inline-extra.jpg">
        "#;
        // Without the metadata rule this page would be spuriously ambiguous.
        let candidates = extract(html);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_scanner_tolerates_malformed_markup() {
        let html = r#"
            <!-- <img src="commented-out.jpg"> -->
            <img src='/uploads/single-quoted.jpg' alt=unquoted class>
            <IMG SRC="/uploads/upper.JPG">
            <img src="/uploads/unclosed.jpg"
        "#;
        let candidates = extract(html);
        let paths: Vec<_> = candidates.iter().map(|u| u.path().to_string()).collect();
        assert!(paths.contains(&"/uploads/single-quoted.jpg".to_string()));
        assert!(paths.contains(&"/uploads/upper.JPG".to_string()));
        assert!(!paths.iter().any(|p| p.contains("commented-out")));
    }
}
