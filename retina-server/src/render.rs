//! Gallery rendering for the human-readable response format
//!
//! Produces the HTML fragment the browser UI swaps in: an optional notice
//! banner plus a `.post-gallery` of matched posts, or a "No posts found"
//! placeholder. Interpolated text is escaped here; nothing upstream is
//! trusted to be HTML-safe.

use retina_core::CandidateMatch;

use crate::posts::Post;

/// Escape text for safe interpolation into HTML.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Render the search result page: notice banner (if any) plus the gallery.
pub fn render_gallery(matches: &[(CandidateMatch, Post)], notice: Option<&str>) -> String {
    let mut html = String::from("<!doctype html>\n<html>\n<body>\n");

    if let Some(notice) = notice {
        html.push_str(&format!(
            "<div id=\"notice\" class=\"notice\">{}</div>\n",
            escape_html(notice)
        ));
    }

    html.push_str("<div class=\"post-gallery\">\n");
    if matches.is_empty() {
        html.push_str("<p class=\"no-posts\">No posts found</p>\n");
    } else {
        for (candidate, post) in matches {
            html.push_str(&render_post(candidate, post));
        }
    }
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

/// One gallery entry, addressable as `#post_<id>` for the UI and tests.
fn render_post(candidate: &CandidateMatch, post: &Post) -> String {
    format!(
        concat!(
            "<article id=\"post_{id}\" class=\"post-preview\" data-score=\"{score:.1}\">\n",
            "<a href=\"/posts/{id}\"><img src=\"/posts/{id}/preview\" alt=\"post #{id}\"></a>\n",
            "<span class=\"similarity\">{score:.0}% similar</span>\n",
            "</article>\n"
        ),
        id = post.id,
        score = candidate.score,
    )
}
