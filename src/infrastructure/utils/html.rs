use ammonia::{Builder, UrlRelative};

/// Strips scripts, event handlers and other unsafe markup from rich text.
/// Text without any tag is returned verbatim.
pub fn sanitize_html(content: &str) -> String {
    if !content.contains('<') {
        return content.to_string();
    }

    Builder::default()
        .link_rel(Some("nofollow noopener noreferrer"))
        .url_relative(UrlRelative::Deny)
        .clean(content)
        .to_string()
}

/// Escapes text for an HTML element or quoted attribute.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
